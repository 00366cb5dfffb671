use std::path::PathBuf;

use serde_derive::Deserialize;
use tracing::debug;

use super::{BuilderError, CourseBuilder};

/// 课程描述文件，命令行用它驱动建课工具
#[derive(Debug, Clone, Deserialize)]
pub struct CourseManifest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub thumbnail: Option<PathBuf>,
    #[serde(default)]
    pub chapters: Vec<ManifestChapter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestChapter {
    pub title: String,
    #[serde(default)]
    pub lectures: Vec<ManifestLecture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestLecture {
    pub title: String,
    pub duration: u32,
    pub url: String,
    #[serde(default)]
    pub preview_free: bool,
}

impl CourseManifest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 逐步调用建课工具的各项操作，和手动编辑走同一套校验
    pub fn apply(&self, builder: &mut CourseBuilder) -> Result<(), BuilderError> {
        builder.set_title(self.title.clone());
        builder.set_description(self.description.clone());
        builder.set_price(self.price)?;
        builder.set_discount(self.discount)?;

        for chapter in &self.chapters {
            // 空标题的章节会被忽略
            let Some(chapter_id) = builder.add_chapter(Some(chapter.title.as_str())) else {
                debug!("跳过空标题章节");
                continue;
            };

            for lecture in &chapter.lectures {
                builder.add_lecture(&chapter_id)?;
                if let Some(form) = builder.lecture_form_mut() {
                    form.title = lecture.title.clone();
                    form.duration = lecture.duration.to_string();
                    form.url = lecture.url.clone();
                    form.preview_free = lecture.preview_free;
                }
                if let Err(e) = builder.save_lecture().map(|_| ()) {
                    builder.close_modal();
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}
