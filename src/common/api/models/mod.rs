pub mod responses;

pub use responses::{
    CourseResponse, CoursesResponse, EnrolledCoursesResponse, Envelope, MessageResponse,
    UserDataResponse,
};
