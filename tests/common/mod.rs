#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use coursedesk::auth::SessionClaims;
use coursedesk::common::api::{ApiError, CourseApi};
use coursedesk::models::{Chapter, Course, ImageFile, Lecture, NewCourse, Rating, UserProfile};
use tokio::sync::Notify;

/// 可复制的失败类型，调用时再转换成 ApiError
#[derive(Debug, Clone)]
pub enum Failure {
    Unauthorized,
    NotFound,
    Server(u16),
    Rejected(&'static str),
}

impl From<Failure> for ApiError {
    fn from(f: Failure) -> Self {
        match f {
            Failure::Unauthorized => ApiError::Unauthorized,
            Failure::NotFound => ApiError::NotFound,
            Failure::Server(code) => ApiError::Server(code),
            Failure::Rejected(msg) => ApiError::Rejected(msg.to_string()),
        }
    }
}

/// 挂起请求，直到测试放行
#[derive(Debug, Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Debug, Default)]
pub struct FakeApi {
    pub courses: Mutex<Vec<Course>>,
    pub courses_failure: Mutex<Option<Failure>>,
    pub user: Mutex<Option<UserProfile>>,
    pub user_failure: Mutex<Option<Failure>>,
    pub user_gate: Mutex<Option<Arc<Gate>>>,
    pub enrolled: Mutex<Vec<Course>>,
    pub enrolled_failure: Mutex<Option<Failure>>,
    pub add_course_gate: Mutex<Option<Arc<Gate>>>,
    pub add_course_failure: Mutex<Option<Failure>>,
    pub submitted: Mutex<Vec<(String, NewCourse, ImageFile)>>,
    pub add_course_calls: AtomicUsize,
    pub update_role_calls: AtomicUsize,
}

impl FakeApi {
    pub fn add_course_calls(&self) -> usize {
        self.add_course_calls.load(Ordering::SeqCst)
    }

    fn fail(slot: &Mutex<Option<Failure>>) -> Result<(), ApiError> {
        match slot.lock().unwrap().clone() {
            Some(f) => Err(f.into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CourseApi for FakeApi {
    async fn all_courses(&self) -> Result<Vec<Course>, ApiError> {
        Self::fail(&self.courses_failure)?;
        Ok(self.courses.lock().unwrap().clone())
    }

    async fn course(&self, id: &str) -> Result<Course, ApiError> {
        self.courses
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn user_data(&self, _token: &str) -> Result<UserProfile, ApiError> {
        let gate = self.user_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        Self::fail(&self.user_failure)?;
        self.user.lock().unwrap().clone().ok_or(ApiError::NotFound)
    }

    async fn enrolled_courses(&self, _token: &str) -> Result<Vec<Course>, ApiError> {
        Self::fail(&self.enrolled_failure)?;
        Ok(self.enrolled.lock().unwrap().clone())
    }

    async fn add_course(
        &self,
        token: &str,
        course: &NewCourse,
        image: &ImageFile,
    ) -> Result<String, ApiError> {
        self.add_course_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.add_course_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        Self::fail(&self.add_course_failure)?;
        self.submitted
            .lock()
            .unwrap()
            .push((token.to_string(), course.clone(), image.clone()));
        Ok("Course Added".to_string())
    }

    async fn update_role(&self, _token: &str) -> Result<String, ApiError> {
        self.update_role_calls.fetch_add(1, Ordering::SeqCst);
        Ok("You can publish a course now".to_string())
    }
}

pub fn claims(user_id: &str) -> SessionClaims {
    SessionClaims {
        user_id: user_id.to_string(),
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        image_url: "https://img.example.com/ada.png".to_string(),
        role: None,
    }
}

pub fn profile(user_id: &str) -> UserProfile {
    UserProfile {
        id: user_id.to_string(),
        name: "Ada (server)".to_string(),
        email: "ada@example.com".to_string(),
        image_url: String::new(),
        enrolled_courses: vec![],
    }
}

pub fn course(id: &str, ratings: &[f64]) -> Course {
    let json = serde_json::json!({
        "_id": id,
        "courseTitle": format!("课程 {}", id),
        "coursePrice": 100.0,
        "discount": 10,
    });
    let mut course: Course = serde_json::from_value(json).unwrap();
    course.ratings = ratings
        .iter()
        .map(|r| Rating {
            user_id: "u".to_string(),
            rating: *r,
        })
        .collect();
    course.chapters = vec![Chapter {
        id: "ch1".to_string(),
        order: 1,
        title: "第一章".to_string(),
        lectures: vec![Lecture {
            id: "l1".to_string(),
            title: "开篇".to_string(),
            duration: 30,
            url: "https://video.example.com/1".to_string(),
            preview_free: true,
            order: 1,
        }],
        collapsed: false,
    }];
    course
}
