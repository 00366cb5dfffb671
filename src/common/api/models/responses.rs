use serde_derive::Deserialize;

use crate::models::{Course, UserProfile};

/// 所有接口共用的 `{success, message}` 外壳
pub trait Envelope {
    fn success(&self) -> bool;
    fn message(&self) -> Option<&str>;
}

macro_rules! envelope {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Envelope for $ty {
                fn success(&self) -> bool {
                    self.success
                }

                fn message(&self) -> Option<&str> {
                    self.message.as_deref()
                }
            }
        )*
    };
}

envelope!(
    CoursesResponse,
    CourseResponse,
    UserDataResponse,
    EnrolledCoursesResponse,
    MessageResponse,
);

/// GET /api/course/all
#[derive(Debug, Deserialize)]
pub struct CoursesResponse {
    pub success: bool,
    pub message: Option<String>,
    #[serde(default)]
    pub courses: Vec<Course>,
}

/// GET /api/course/{id}
#[derive(Debug, Deserialize)]
pub struct CourseResponse {
    pub success: bool,
    pub message: Option<String>,
    #[serde(rename = "courseData")]
    pub course_data: Option<Course>,
}

/// GET /api/user/data
#[derive(Debug, Deserialize)]
pub struct UserDataResponse {
    pub success: bool,
    pub message: Option<String>,
    pub user: Option<UserProfile>,
}

/// GET /api/user/enrolled-courses
#[derive(Debug, Deserialize)]
pub struct EnrolledCoursesResponse {
    pub success: bool,
    pub message: Option<String>,
    #[serde(rename = "enrolledCourses", default)]
    pub enrolled_courses: Vec<Course>,
}

/// 只带提示信息的响应（建课、申请讲师）
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: Option<String>,
}
