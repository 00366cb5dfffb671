pub mod client;
pub mod course_api;
pub mod error;
pub mod models;

pub use client::ApiClient;
pub use course_api::CourseApi;
pub use error::ApiError;
