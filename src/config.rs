//! 运行配置，启动时从环境变量（以及 `.env` 文件）读取

use std::env;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::auth::{SessionClaims, StaticTokenAuth, TokenInfo};

pub const BACKEND_URL_VAR: &str = "COURSEDESK_BACKEND_URL";
pub const CURRENCY_VAR: &str = "COURSEDESK_CURRENCY";
pub const TOKEN_VAR: &str = "COURSEDESK_TOKEN";
pub const USER_ID_VAR: &str = "COURSEDESK_USER_ID";
pub const USER_NAME_VAR: &str = "COURSEDESK_USER_NAME";
pub const USER_EMAIL_VAR: &str = "COURSEDESK_USER_EMAIL";
pub const USER_IMAGE_VAR: &str = "COURSEDESK_USER_IMAGE";
pub const USER_ROLE_VAR: &str = "COURSEDESK_USER_ROLE";

const DEFAULT_CURRENCY: &str = "$";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("缺少环境变量 `{0}`")]
    Missing(&'static str),

    #[error("环境变量 `{var}` 无效: {source}")]
    InvalidUrl {
        var: &'static str,
        source: url::ParseError,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: Url,
    pub currency: String,
    pub token: Option<String>,
    pub claims: Option<SessionClaims>,
}

impl AppConfig {
    /// 先尝试加载 `.env`，再读取进程环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("未加载 .env 文件: {}", e);
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = get(BACKEND_URL_VAR).ok_or(ConfigError::Missing(BACKEND_URL_VAR))?;
        let backend_url = Url::parse(raw_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            var: BACKEND_URL_VAR,
            source,
        })?;

        let claims = get(USER_ID_VAR).map(|user_id| SessionClaims {
            user_id,
            full_name: get(USER_NAME_VAR).unwrap_or_default(),
            email: get(USER_EMAIL_VAR).unwrap_or_default(),
            image_url: get(USER_IMAGE_VAR).unwrap_or_default(),
            role: get(USER_ROLE_VAR),
        });

        Ok(Self {
            backend_url,
            currency: get(CURRENCY_VAR).unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            token: get(TOKEN_VAR),
            claims,
        })
    }

    /// 命令行参数覆盖后端地址
    pub fn with_backend_url(mut self, url: Option<Url>) -> Self {
        if let Some(url) = url {
            self.backend_url = url;
        }
        self
    }

    pub fn auth_provider(&self) -> StaticTokenAuth {
        StaticTokenAuth::new(self.token.clone().map(TokenInfo::new), self.claims.clone())
    }
}
