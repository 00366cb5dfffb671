//! 讲师端的建课工具
//!
//! 章节、课时只存在于本地草稿中，提交时整体序列化为一次建课请求，
//! 成功后草稿清空。

mod error;
pub mod manifest;
pub mod preview;

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::auth::AuthProvider;
use crate::common::api::CourseApi;
use crate::common::notify::Notifier;
use crate::models::{Chapter, ImageFile, Lecture, NewCourse};

pub use error::BuilderError;
pub use manifest::CourseManifest;
pub use preview::{ObjectUrlRegistry, PreviewHandle, PreviewStore};

pub const MAX_THUMBNAIL_BYTES: usize = 5 * 1024 * 1024;

/// 建课工具所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderPhase {
    Empty,
    Editing,
    Submitting,
}

/// 课时弹窗里的输入
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LectureForm {
    pub title: String,
    pub duration: String,
    pub url: String,
    pub preview_free: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    EditingLecture {
        chapter_id: String,
        draft: LectureForm,
    },
}

/// 已选中的封面及其预览
#[derive(Debug)]
pub struct Thumbnail {
    pub file: ImageFile,
    pub preview: PreviewHandle,
}

pub struct CourseBuilder {
    title: String,
    description: String,
    price: f64,
    discount: f64,
    thumbnail: Option<Thumbnail>,
    chapters: Vec<Chapter>,
    modal: ModalState,
    submitting: bool,
    notifier: Arc<dyn Notifier>,
    previews: Arc<dyn PreviewStore>,
}

impl CourseBuilder {
    pub fn new(notifier: Arc<dyn Notifier>, previews: Arc<dyn PreviewStore>) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            price: 0.0,
            discount: 0.0,
            thumbnail: None,
            chapters: Vec::new(),
            modal: ModalState::Closed,
            submitting: false,
            notifier,
            previews,
        }
    }

    pub fn phase(&self) -> BuilderPhase {
        if self.submitting {
            BuilderPhase::Submitting
        } else if self.is_empty() {
            BuilderPhase::Empty
        } else {
            BuilderPhase::Editing
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.description.is_empty()
            && self.price == 0.0
            && self.discount == 0.0
            && self.thumbnail.is_none()
            && self.chapters.is_empty()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, chapter_id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == chapter_id)
    }

    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// 富文本编辑器的 HTML
    pub fn set_description(&mut self, html: impl Into<String>) {
        self.description = html.into();
    }

    pub fn set_price(&mut self, price: f64) -> Result<(), BuilderError> {
        if !price.is_finite() || price < 0.0 {
            return Err(self.reject(BuilderError::InvalidPrice));
        }
        self.price = price;
        Ok(())
    }

    pub fn set_discount(&mut self, discount: f64) -> Result<(), BuilderError> {
        if !discount.is_finite() || !(0.0..=100.0).contains(&discount) {
            return Err(self.reject(BuilderError::InvalidDiscount));
        }
        self.discount = discount;
        Ok(())
    }

    // ---------------------------------------------------------------------------------------
    // 章节

    /// `title` 是输入框的结果，取消或留空时什么也不做。返回新章节的 id
    pub fn add_chapter(&mut self, title: Option<&str>) -> Option<String> {
        let title = title.map(str::trim).filter(|t| !t.is_empty())?;

        let order = self.chapters.iter().map(|c| c.order).max().unwrap_or(0) + 1;
        let id = Uuid::new_v4().to_string();
        self.chapters.push(Chapter {
            id: id.clone(),
            order,
            title: title.to_string(),
            lectures: Vec::new(),
            collapsed: false,
        });
        debug!("添加章节 #{}: {}", order, title);
        Some(id)
    }

    // 其余章节的序号保持不变
    pub fn remove_chapter(&mut self, chapter_id: &str) -> Result<Chapter, BuilderError> {
        let index = self
            .chapters
            .iter()
            .position(|c| c.id == chapter_id)
            .ok_or_else(|| BuilderError::ChapterNotFound(chapter_id.to_string()))?;

        if let ModalState::EditingLecture { chapter_id: open, .. } = &self.modal {
            if open == chapter_id {
                self.modal = ModalState::Closed;
            }
        }
        Ok(self.chapters.remove(index))
    }

    pub fn toggle_chapter(&mut self, chapter_id: &str) -> Result<bool, BuilderError> {
        let chapter = self.chapter_mut(chapter_id)?;
        chapter.collapsed = !chapter.collapsed;
        Ok(chapter.collapsed)
    }

    // ---------------------------------------------------------------------------------------
    // 课时

    /// 打开绑定到该章节的课时弹窗
    pub fn add_lecture(&mut self, chapter_id: &str) -> Result<(), BuilderError> {
        self.chapter_mut(chapter_id)?;
        self.modal = ModalState::EditingLecture {
            chapter_id: chapter_id.to_string(),
            draft: LectureForm::default(),
        };
        Ok(())
    }

    pub fn lecture_form_mut(&mut self) -> Option<&mut LectureForm> {
        match &mut self.modal {
            ModalState::EditingLecture { draft, .. } => Some(draft),
            ModalState::Closed => None,
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::Closed;
    }

    /// 按位置删除课时，剩余课时重新编号为 1..N
    pub fn remove_lecture(
        &mut self,
        chapter_id: &str,
        index: usize,
    ) -> Result<Lecture, BuilderError> {
        let chapter = self.chapter_mut(chapter_id)?;
        if index >= chapter.lectures.len() {
            return Err(BuilderError::LectureNotFound {
                chapter: chapter_id.to_string(),
                index,
            });
        }

        let removed = chapter.lectures.remove(index);
        for (i, lecture) in chapter.lectures.iter_mut().enumerate() {
            lecture.order = i as u32 + 1;
        }
        Ok(removed)
    }

    /// 校验弹窗内容并追加课时；失败时弹窗保持打开
    pub fn save_lecture(&mut self) -> Result<&Lecture, BuilderError> {
        let (chapter_id, draft) = match &self.modal {
            ModalState::EditingLecture { chapter_id, draft } => (chapter_id.clone(), draft.clone()),
            ModalState::Closed => return Err(BuilderError::ModalClosed),
        };

        let (title, duration, url) = match validate_lecture(&draft) {
            Ok(fields) => fields,
            Err(e) => return Err(self.reject(e)),
        };

        let index = self
            .chapters
            .iter()
            .position(|c| c.id == chapter_id)
            .ok_or_else(|| BuilderError::ChapterNotFound(chapter_id.clone()))?;
        self.modal = ModalState::Closed;

        let chapter = &mut self.chapters[index];
        let pos = chapter.lectures.len();
        chapter.lectures.push(Lecture {
            id: Uuid::new_v4().to_string(),
            title,
            duration,
            url,
            preview_free: draft.preview_free,
            order: pos as u32 + 1,
        });
        Ok(&chapter.lectures[pos])
    }

    // ---------------------------------------------------------------------------------------
    // 封面

    /// 只接受不超过 5MB 的图片；替换时旧预览随旧封面一起释放
    pub fn set_thumbnail(&mut self, file: ImageFile) -> Result<(), BuilderError> {
        if !file.is_image() {
            return Err(self.reject(BuilderError::InvalidThumbnailType(file.mime.clone())));
        }
        if file.size() > MAX_THUMBNAIL_BYTES {
            return Err(self.reject(BuilderError::ThumbnailTooLarge(file.size())));
        }

        let preview = PreviewHandle::create(Arc::clone(&self.previews), &file);
        debug!("封面: {} ({} 字节)", file.file_name, file.size());
        self.thumbnail = Some(Thumbnail { file, preview });
        Ok(())
    }

    pub fn clear_thumbnail(&mut self) {
        self.thumbnail = None;
    }

    // ---------------------------------------------------------------------------------------
    // 提交

    /// 按顺序校验，第一条不通过的规则会被提示
    pub fn validate(&self) -> Result<(), BuilderError> {
        if self.title.trim().is_empty() {
            return Err(BuilderError::MissingTitle);
        }
        if !has_visible_text(&self.description) {
            return Err(BuilderError::MissingDescription);
        }
        if self.thumbnail.is_none() {
            return Err(BuilderError::MissingThumbnail);
        }
        if self.chapters.is_empty() {
            return Err(BuilderError::NoChapters);
        }
        if let Some(chapter) = self.chapters.iter().find(|c| c.lectures.is_empty()) {
            return Err(BuilderError::EmptyChapter(chapter.title.clone()));
        }
        Ok(())
    }

    pub fn to_new_course(&self) -> NewCourse {
        NewCourse {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            price: self.price,
            discount: self.discount,
            chapters: self.chapters.clone(),
        }
    }

    /// 提交草稿。成功后清空草稿，失败时草稿原样保留
    pub async fn submit<A, P>(&mut self, api: &A, auth: &P) -> Result<String, BuilderError>
    where
        A: CourseApi + ?Sized,
        P: AuthProvider + ?Sized,
    {
        if self.submitting {
            return Err(BuilderError::AlreadySubmitting);
        }
        if let Err(e) = self.validate() {
            return Err(self.reject(e));
        }
        let Some(thumbnail) = self.thumbnail.as_ref() else {
            return Err(self.reject(BuilderError::MissingThumbnail));
        };

        let course = self.to_new_course();
        let image = thumbnail.file.clone();

        info!("提交课程: {} ({} 个章节)", course.title, course.chapters.len());
        let result = {
            let _flag = SubmittingFlag::raise(&mut self.submitting);
            Self::send(api, auth, &course, &image).await
        };

        match result {
            Ok(message) => {
                let message = if message.is_empty() {
                    "课程创建成功".to_string()
                } else {
                    message
                };
                self.notifier.success(&message);
                self.reset();
                Ok(message)
            }
            Err(e) => {
                warn!("提交课程失败: {}", e);
                Err(self.reject(e))
            }
        }
    }

    async fn send<A, P>(
        api: &A,
        auth: &P,
        course: &NewCourse,
        image: &ImageFile,
    ) -> Result<String, BuilderError>
    where
        A: CourseApi + ?Sized,
        P: AuthProvider + ?Sized,
    {
        let token = auth.get_token().await?;
        Ok(api.add_course(&token, course, image).await?)
    }

    /// 清空全部草稿；封面预览随之释放
    pub fn reset(&mut self) {
        self.title.clear();
        self.description.clear();
        self.price = 0.0;
        self.discount = 0.0;
        self.thumbnail = None;
        self.chapters.clear();
        self.modal = ModalState::Closed;
    }

    fn chapter_mut(&mut self, chapter_id: &str) -> Result<&mut Chapter, BuilderError> {
        self.chapters
            .iter_mut()
            .find(|c| c.id == chapter_id)
            .ok_or_else(|| BuilderError::ChapterNotFound(chapter_id.to_string()))
    }

    fn reject(&self, error: BuilderError) -> BuilderError {
        self.notifier.error(&error.to_string());
        error
    }
}

/// 提交期间置位，future 被中途丢弃时也会复位
struct SubmittingFlag<'a>(&'a mut bool);

impl<'a> SubmittingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for SubmittingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

fn validate_lecture(draft: &LectureForm) -> Result<(String, u32, String), BuilderError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(BuilderError::MissingLectureTitle);
    }

    let duration = draft
        .duration
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|d| *d > 0)
        .ok_or(BuilderError::InvalidDuration)?;

    let url = draft.url.trim();
    if url.is_empty() {
        return Err(BuilderError::MissingLectureUrl);
    }
    Url::parse(url).map_err(|e| BuilderError::InvalidLectureUrl(e.to_string()))?;

    Ok((title.to_string(), duration, url.to_string()))
}

// 富文本编辑器的空内容一般是 "<p><br></p>"
fn has_visible_text(html: &str) -> bool {
    lazy_static! {
        static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    }
    let text = TAG.replace_all(html, "");
    !text.replace("&nbsp;", " ").trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::notify::{ToastLevel, ToastQueue};

    fn builder() -> (CourseBuilder, ToastQueue, Arc<ObjectUrlRegistry>) {
        let toasts = ToastQueue::new();
        let registry = Arc::new(ObjectUrlRegistry::new());
        let builder = CourseBuilder::new(Arc::new(toasts.clone()), registry.clone());
        (builder, toasts, registry)
    }

    fn add_valid_lecture(builder: &mut CourseBuilder, chapter_id: &str, title: &str) {
        builder.add_lecture(chapter_id).unwrap();
        let form = builder.lecture_form_mut().unwrap();
        form.title = title.to_string();
        form.duration = "12".to_string();
        form.url = "https://video.example.com/1".to_string();
        builder.save_lecture().unwrap();
    }

    #[test]
    fn chapter_order_is_max_plus_one() {
        let (mut b, _, _) = builder();
        let first = b.add_chapter(Some("第一章")).unwrap();
        b.add_chapter(Some("第二章")).unwrap();
        b.remove_chapter(&first).unwrap();
        b.add_chapter(Some("第三章")).unwrap();

        let orders: Vec<u32> = b.chapters().iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![2, 3]);
    }

    #[test]
    fn cancelled_or_blank_chapter_title_is_noop() {
        let (mut b, _, _) = builder();
        assert!(b.add_chapter(None).is_none());
        assert!(b.add_chapter(Some("   ")).is_none());
        assert!(b.chapters().is_empty());
        assert_eq!(b.phase(), BuilderPhase::Empty);
    }

    #[test]
    fn toggle_only_flips_collapsed() {
        let (mut b, _, _) = builder();
        let id = b.add_chapter(Some("第一章")).unwrap();
        add_valid_lecture(&mut b, &id, "开篇");

        assert!(b.toggle_chapter(&id).unwrap());
        assert!(!b.toggle_chapter(&id).unwrap());
        assert_eq!(b.chapter(&id).unwrap().lectures.len(), 1);
    }

    #[test]
    fn lecture_orders_stay_contiguous() {
        let (mut b, _, _) = builder();
        let id = b.add_chapter(Some("第一章")).unwrap();
        for i in 0..5 {
            add_valid_lecture(&mut b, &id, &format!("课时{}", i));
        }
        b.remove_lecture(&id, 1).unwrap();
        b.remove_lecture(&id, 3).unwrap();
        add_valid_lecture(&mut b, &id, "追加");
        b.remove_lecture(&id, 0).unwrap();

        let orders: Vec<u32> = b.chapter(&id).unwrap().lectures.iter().map(|l| l.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn invalid_lecture_keeps_modal_open() {
        let (mut b, toasts, _) = builder();
        let id = b.add_chapter(Some("第一章")).unwrap();
        b.add_lecture(&id).unwrap();
        {
            let form = b.lecture_form_mut().unwrap();
            form.title = "开篇".to_string();
            form.duration = "0".to_string();
            form.url = "https://video.example.com/1".to_string();
        }

        assert!(matches!(b.save_lecture(), Err(BuilderError::InvalidDuration)));
        assert!(matches!(b.modal(), ModalState::EditingLecture { .. }));
        assert!(b.chapter(&id).unwrap().lectures.is_empty());
        assert_eq!(toasts.last().unwrap().level, ToastLevel::Error);

        b.lecture_form_mut().unwrap().title.clear();
        assert!(matches!(b.save_lecture(), Err(BuilderError::MissingLectureTitle)));
        assert!(b.chapter(&id).unwrap().lectures.is_empty());
    }

    #[test]
    fn saving_lecture_closes_modal_and_clears_draft() {
        let (mut b, _, _) = builder();
        let id = b.add_chapter(Some("第一章")).unwrap();
        add_valid_lecture(&mut b, &id, "开篇");

        assert_eq!(b.modal(), &ModalState::Closed);
        b.add_lecture(&id).unwrap();
        assert_eq!(b.lecture_form_mut().unwrap(), &mut LectureForm::default());
    }

    #[test]
    fn removing_chapter_closes_its_modal() {
        let (mut b, _, _) = builder();
        let id = b.add_chapter(Some("第一章")).unwrap();
        b.add_lecture(&id).unwrap();
        b.remove_chapter(&id).unwrap();
        assert_eq!(b.modal(), &ModalState::Closed);
    }

    #[test]
    fn thumbnail_rules() {
        let (mut b, _, registry) = builder();

        let pdf = ImageFile::new("a.pdf", "application/pdf", vec![0; 10]);
        assert!(matches!(
            b.set_thumbnail(pdf),
            Err(BuilderError::InvalidThumbnailType(_))
        ));

        let huge = ImageFile::new("big.png", "image/png", vec![0; 6 * 1024 * 1024]);
        assert!(matches!(
            b.set_thumbnail(huge),
            Err(BuilderError::ThumbnailTooLarge(_))
        ));
        assert!(b.thumbnail().is_none());
        assert_eq!(registry.live(), 0);

        let ok = ImageFile::new("ok.png", "image/png", vec![0; 2 * 1024 * 1024]);
        b.set_thumbnail(ok).unwrap();
        let first = b.thumbnail().unwrap().preview.url().to_string();
        assert!(registry.contains(&first));

        let other = ImageFile::new("ok2.jpg", "image/jpeg", vec![0; 1024]);
        b.set_thumbnail(other).unwrap();
        assert!(!registry.contains(&first));
        assert_eq!(registry.live(), 1);

        drop(b);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn price_and_discount_bounds() {
        let (mut b, _, _) = builder();
        assert!(b.set_price(-1.0).is_err());
        assert!(b.set_discount(101.0).is_err());
        b.set_price(100.0).unwrap();
        b.set_discount(10.0).unwrap();
        assert_eq!(b.phase(), BuilderPhase::Editing);
    }

    #[test]
    fn validation_order() {
        let (mut b, _, _) = builder();
        assert!(matches!(b.validate(), Err(BuilderError::MissingTitle)));

        b.set_title("Rust 实战");
        b.set_description("<p><br></p>");
        assert!(matches!(b.validate(), Err(BuilderError::MissingDescription)));

        b.set_description("<p>从零开始&nbsp;</p>");
        assert!(matches!(b.validate(), Err(BuilderError::MissingThumbnail)));

        b.set_thumbnail(ImageFile::new("c.png", "image/png", vec![1; 8]))
            .unwrap();
        assert!(matches!(b.validate(), Err(BuilderError::NoChapters)));

        let id = b.add_chapter(Some("第一章")).unwrap();
        assert!(matches!(b.validate(), Err(BuilderError::EmptyChapter(t)) if t == "第一章"));

        add_valid_lecture(&mut b, &id, "开篇");
        assert!(b.validate().is_ok());
    }

    #[test]
    fn visible_text_detection() {
        assert!(!has_visible_text(""));
        assert!(!has_visible_text("<p><br></p>"));
        assert!(!has_visible_text("<p>&nbsp; </p>"));
        assert!(has_visible_text("<h2>简介</h2>"));
    }
}
