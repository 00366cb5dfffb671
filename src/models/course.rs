use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

/// 课程（创建之后以服务端为准）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "_id", default)]
    pub id: String,

    #[serde(rename = "courseTitle")]
    pub title: String,

    // 富文本编辑器产出的 HTML
    #[serde(rename = "courseDescription", default)]
    pub description: String,

    #[serde(rename = "coursePrice", default)]
    pub price: f64,

    // 折扣百分比 0..=100
    #[serde(default)]
    pub discount: f64,

    #[serde(rename = "courseThumbnail", default)]
    pub thumbnail: Option<String>,

    #[serde(rename = "courseContent", default)]
    pub chapters: Vec<Chapter>,

    #[serde(rename = "courseRatings", default)]
    pub ratings: Vec<Rating>,

    #[serde(default)]
    pub educator: Option<EducatorRef>,

    #[serde(rename = "enrolledStudents", default)]
    pub enrolled_students: Vec<String>,

    #[serde(rename = "isPublished", default = "default_published")]
    pub is_published: bool,

    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_published() -> bool {
    true
}

/// 讲师字段：列表接口里是被 populate 的对象，其他接口里只是 id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EducatorRef {
    Id(String),
    Profile {
        #[serde(rename = "_id", default)]
        id: String,
        #[serde(default)]
        name: String,
    },
}

impl EducatorRef {
    pub fn display_name(&self) -> &str {
        match self {
            EducatorRef::Id(id) => id,
            EducatorRef::Profile { name, id } if name.is_empty() => id,
            EducatorRef::Profile { name, .. } => name,
        }
    }
}

/// 章节
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(rename = "chapterId")]
    pub id: String,

    #[serde(rename = "chapterOrder")]
    pub order: u32,

    #[serde(rename = "chapterTitle")]
    pub title: String,

    #[serde(rename = "chapterContent", default)]
    pub lectures: Vec<Lecture>,

    // 仅用于本地展示的折叠状态，不参与序列化
    #[serde(skip)]
    pub collapsed: bool,
}

/// 课时
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecture {
    #[serde(rename = "lectureId")]
    pub id: String,

    #[serde(rename = "lectureTitle")]
    pub title: String,

    // 单位：分钟
    #[serde(rename = "lectureDuration")]
    pub duration: u32,

    #[serde(rename = "lectureUrl")]
    pub url: String,

    #[serde(rename = "isPreviewFree", default)]
    pub preview_free: bool,

    #[serde(rename = "lectureOrder")]
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "userId", default)]
    pub user_id: String,

    pub rating: f64,
}

/// 提交给建课接口的 `courseData`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCourse {
    #[serde(rename = "courseTitle")]
    pub title: String,

    #[serde(rename = "courseDescription")]
    pub description: String,

    #[serde(rename = "coursePrice")]
    pub price: f64,

    pub discount: f64,

    #[serde(rename = "courseContent")]
    pub chapters: Vec<Chapter>,
}
