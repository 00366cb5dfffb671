use thiserror::Error;

use crate::auth::AuthError;
use crate::common::api::ApiError;

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("章节不存在: {0}")]
    ChapterNotFound(String),

    #[error("章节 {chapter} 中不存在第 {index} 个课时")]
    LectureNotFound { chapter: String, index: usize },

    #[error("没有正在编辑的课时")]
    ModalClosed,

    #[error("请输入课时标题")]
    MissingLectureTitle,

    #[error("课时时长必须是正整数（分钟）")]
    InvalidDuration,

    #[error("请输入课时链接")]
    MissingLectureUrl,

    #[error("课时链接无效: {0}")]
    InvalidLectureUrl(String),

    #[error("请选择图片文件，当前类型为 {0}")]
    InvalidThumbnailType(String),

    #[error("图片不能超过 5MB（当前 {0} 字节）")]
    ThumbnailTooLarge(usize),

    #[error("价格必须是非负数")]
    InvalidPrice,

    #[error("折扣必须在 0 到 100 之间")]
    InvalidDiscount,

    #[error("请输入课程标题")]
    MissingTitle,

    #[error("请输入课程简介")]
    MissingDescription,

    #[error("请上传课程封面")]
    MissingThumbnail,

    #[error("请至少添加一个章节")]
    NoChapters,

    #[error("章节「{0}」至少需要一个课时")]
    EmptyChapter(String),

    #[error("正在提交，请勿重复操作")]
    AlreadySubmitting,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl BuilderError {
    /// 校验类错误：不发请求，修改草稿后即可重试
    pub fn is_validation(&self) -> bool {
        !matches!(self, BuilderError::Auth(_) | BuilderError::Api(_))
    }
}
