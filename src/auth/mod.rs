mod errors;
mod session;
mod token;

use async_trait::async_trait;

pub use errors::{AuthError, Result};
pub use session::SessionStore;
pub use token::{StaticTokenAuth, TokenInfo};

const EDUCATOR_ROLE: &str = "educator";

/// 会话里携带的用户声明
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionClaims {
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub image_url: String,
    // 对应认证服务里的 public metadata role
    pub role: Option<String>,
}

impl SessionClaims {
    pub fn is_educator(&self) -> bool {
        self.role.as_deref() == Some(EDUCATOR_ROLE)
    }
}

/// 认证状态的一次快照
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthSnapshot {
    // 认证服务是否已经初始化完毕
    pub loaded: bool,
    pub user: Option<SessionClaims>,
}

impl AuthSnapshot {
    pub fn not_ready() -> Self {
        Self::default()
    }

    pub fn signed_out() -> Self {
        Self {
            loaded: true,
            user: None,
        }
    }

    pub fn signed_in(claims: SessionClaims) -> Self {
        Self {
            loaded: true,
            user: Some(claims),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.loaded && self.user.is_some()
    }
}

/// 第三方认证服务
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn snapshot(&self) -> AuthSnapshot;

    /// 用当前会话换取 Bearer 凭证
    async fn get_token(&self) -> Result<String>;
}
