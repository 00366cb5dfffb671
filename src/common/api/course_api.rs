use async_trait::async_trait;

use super::client::ApiClient;
use super::error::ApiError;
use crate::models::{Course, ImageFile, NewCourse, UserProfile};

/// 后端协作方：状态层和建课工具只依赖这个接口
#[async_trait]
pub trait CourseApi: Send + Sync {
    async fn all_courses(&self) -> Result<Vec<Course>, ApiError>;

    async fn course(&self, id: &str) -> Result<Course, ApiError>;

    async fn user_data(&self, token: &str) -> Result<UserProfile, ApiError>;

    async fn enrolled_courses(&self, token: &str) -> Result<Vec<Course>, ApiError>;

    /// 返回服务端的提示信息
    async fn add_course(
        &self,
        token: &str,
        course: &NewCourse,
        image: &ImageFile,
    ) -> Result<String, ApiError>;

    async fn update_role(&self, token: &str) -> Result<String, ApiError>;
}

#[async_trait]
impl CourseApi for ApiClient {
    async fn all_courses(&self) -> Result<Vec<Course>, ApiError> {
        ApiClient::all_courses(self).await
    }

    async fn course(&self, id: &str) -> Result<Course, ApiError> {
        ApiClient::course(self, id).await
    }

    async fn user_data(&self, token: &str) -> Result<UserProfile, ApiError> {
        ApiClient::user_data(self, token).await
    }

    async fn enrolled_courses(&self, token: &str) -> Result<Vec<Course>, ApiError> {
        ApiClient::enrolled_courses(self, token).await
    }

    async fn add_course(
        &self,
        token: &str,
        course: &NewCourse,
        image: &ImageFile,
    ) -> Result<String, ApiError> {
        ApiClient::add_course(self, token, course, image).await
    }

    async fn update_role(&self, token: &str) -> Result<String, ApiError> {
        ApiClient::update_role(self, token).await
    }
}
