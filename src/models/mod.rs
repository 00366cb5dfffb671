pub mod course;
pub mod upload;
pub mod user;

pub use course::{Chapter, Course, EducatorRef, Lecture, NewCourse, Rating};
pub use upload::ImageFile;
pub use user::UserProfile;
