use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("网络请求失败: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("响应解析失败: {0}")]
    InvalidResponse(String),

    #[error("无效的接口地址: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("登录已失效，请重新登录")]
    Unauthorized,

    #[error("请求的资源不存在")]
    NotFound,

    #[error("服务端错误 (HTTP {0})，请稍后重试")]
    Server(u16),

    // 后端返回 success: false
    #[error("{0}")]
    Rejected(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidResponse(e.to_string())
    }
}
