use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("当前未登录")]
    NotSignedIn,

    #[error("登录凭证已过期")]
    Expired,

    #[error("无法获取登录凭证: {0}")]
    TokenUnavailable(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
