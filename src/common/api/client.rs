use std::time::Duration;

use reqwest::{
    Client, ClientBuilder, Response, StatusCode, Url,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info};

use super::error::ApiError;
use super::models::{
    CourseResponse, CoursesResponse, EnrolledCoursesResponse, Envelope, MessageResponse,
    UserDataResponse,
};
use crate::models::{Course, ImageFile, NewCourse, UserProfile};

const COURSES_ALL: &str = "api/course/all";
const COURSE_BY_ID: &str = "api/course";
const USER_DATA: &str = "api/user/data";
const USER_ENROLLED: &str = "api/user/enrolled-courses";
const EDUCATOR_ADD_COURSE: &str = "api/educator/add-course";
const EDUCATOR_UPDATE_ROLE: &str = "api/educator/update-role";

// 后端 REST 接口的客户端
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        let inner = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .default_headers(Self::get_default_headers())
            .build()?;

        Ok(Self {
            inner,
            base_url: Self::normalize_base(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("coursedesk/", env!("CARGO_PKG_VERSION"))),
        );
        headers
    }

    // join 时保留基础地址里的路径前缀
    fn normalize_base(mut url: Url) -> Url {
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // id 作为单个路径段写入，'/'、'?' 等字符会被转义
    fn course_url(&self, id: &str) -> Result<Url, ApiError> {
        if matches!(id, "" | "." | "..") {
            return Err(ApiError::NotFound);
        }

        let mut url = self.endpoint(COURSE_BY_ID)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    // 通用 GET，token 存在时携带 Bearer 头
    pub async fn get<T>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Envelope,
    {
        let url = self.endpoint(path)?;
        self.get_url(url, token).await
    }

    async fn get_url<T>(&self, url: Url, token: Option<&str>) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Envelope,
    {
        debug!("GET {}", url);

        let mut request = self.inner.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await.map_err(|e| {
            error!("请求失败: {}", e);
            ApiError::Reqwest(e)
        })?;

        Self::handle_response::<T>(resp).await
    }

    pub async fn post_multipart<T>(&self, path: &str, token: &str, form: Form) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Envelope,
    {
        let url = self.endpoint(path)?;
        debug!("POST (multipart) {}", url);

        let resp = self
            .inner
            .post(url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!("请求失败: {}", e);
                ApiError::Reqwest(e)
            })?;

        Self::handle_response::<T>(resp).await
    }

    async fn handle_response<T>(resp: Response) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Envelope,
    {
        let status = resp.status();
        let url = resp.url().to_string();

        match status {
            StatusCode::UNAUTHORIZED => return Err(ApiError::Unauthorized),
            StatusCode::NOT_FOUND => return Err(ApiError::NotFound),
            s if s.is_server_error() => return Err(ApiError::Server(s.as_u16())),
            _ => {}
        }

        let text = resp.text().await?;
        let value: Value = serde_json::from_str(&text).map_err(|_| {
            error!("非 JSON 响应: {}", url);
            ApiError::InvalidResponse(text.clone())
        })?;

        let data = serde_json::from_value::<T>(value).map_err(|e| {
            error!("失败的请求的URL: {}", url);
            error!("JSON 结构匹配失败: {}", e);
            error!("期望的结构 可能是: {}", std::any::type_name::<T>());
            ApiError::InvalidResponse(format!("结构匹配失败: {}. 响应: {}", e, text))
        })?;

        if !data.success() {
            let message = data.message().unwrap_or("未知错误").to_string();
            return Err(ApiError::Rejected(message));
        }

        Ok(data)
    }

    pub async fn all_courses(&self) -> Result<Vec<Course>, ApiError> {
        let resp: CoursesResponse = self.get(COURSES_ALL, None).await?;
        info!("获取到 {} 门课程", resp.courses.len());
        Ok(resp.courses)
    }

    pub async fn course(&self, id: &str) -> Result<Course, ApiError> {
        let url = self.course_url(id)?;
        let resp: CourseResponse = self.get_url(url, None).await?;
        resp.course_data
            .ok_or_else(|| ApiError::InvalidResponse("课程数据缺失".to_string()))
    }

    pub async fn user_data(&self, token: &str) -> Result<UserProfile, ApiError> {
        let resp: UserDataResponse = self.get(USER_DATA, Some(token)).await?;
        // success 但没有 user 的情况与 404 同样处理
        resp.user.ok_or(ApiError::NotFound)
    }

    pub async fn enrolled_courses(&self, token: &str) -> Result<Vec<Course>, ApiError> {
        let resp: EnrolledCoursesResponse = self.get(USER_ENROLLED, Some(token)).await?;
        Ok(resp.enrolled_courses)
    }

    pub async fn add_course(
        &self,
        token: &str,
        course: &NewCourse,
        image: &ImageFile,
    ) -> Result<String, ApiError> {
        let course_data = serde_json::to_string(course)?;
        let image_part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime)?;
        let form = Form::new()
            .text("courseData", course_data)
            .part("image", image_part);

        let resp: MessageResponse = self
            .post_multipart(EDUCATOR_ADD_COURSE, token, form)
            .await?;
        Ok(resp.message.unwrap_or_default())
    }

    pub async fn update_role(&self, token: &str) -> Result<String, ApiError> {
        let resp: MessageResponse = self.get(EDUCATOR_UPDATE_ROLE, Some(token)).await?;
        Ok(resp.message.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let base = Url::parse("https://lms.example.com/backend").unwrap();
        let client = ApiClient::new(base).unwrap();

        let url = client.endpoint("/api/course/all").unwrap();
        assert_eq!(url.as_str(), "https://lms.example.com/backend/api/course/all");
    }

    #[test]
    fn endpoint_with_bare_host() {
        let base = Url::parse("http://localhost:5000").unwrap();
        let client = ApiClient::new(base).unwrap();

        let url = client.endpoint(USER_DATA).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/user/data");
    }

    #[test]
    fn course_id_stays_inside_course_path() {
        let base = Url::parse("https://lms.example.com/backend/").unwrap();
        let client = ApiClient::new(base).unwrap();

        let url = client.course_url("64f1c0ffee").unwrap();
        assert_eq!(url.as_str(), "https://lms.example.com/backend/api/course/64f1c0ffee");

        let url = client.course_url("../user/data").unwrap();
        assert_eq!(url.path(), "/backend/api/course/..%2Fuser%2Fdata");

        let url = client.course_url("x?y#z").unwrap();
        assert_eq!(url.path(), "/backend/api/course/x%3Fy%23z");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());

        assert!(matches!(client.course_url(".."), Err(ApiError::NotFound)));
        assert!(matches!(client.course_url(""), Err(ApiError::NotFound)));
    }
}
