pub mod auth;
pub mod builder;
pub mod common;
pub mod config;
pub mod metrics;
pub mod models;
pub mod state;

pub use builder::CourseBuilder;
pub use common::api::{ApiClient, ApiError, CourseApi};
pub use config::AppConfig;
pub use state::{AppContext, AppSnapshot};
