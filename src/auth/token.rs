use std::time::SystemTime;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{AuthError, AuthProvider, AuthSnapshot, Result, SessionClaims};

#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub access_token: String,
    pub expires_at: Option<SystemTime>, // None 表示不过期
}

impl TokenInfo {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => SystemTime::now() >= at,
            None => false,
        }
    }
}

// 命令行使用的静态凭证，来自配置
#[derive(Debug, Clone)]
pub struct StaticTokenAuth {
    token: Option<TokenInfo>,
    claims: Option<SessionClaims>,
}

impl StaticTokenAuth {
    pub fn new(token: Option<TokenInfo>, claims: Option<SessionClaims>) -> Self {
        Self { token, claims }
    }

    pub fn anonymous() -> Self {
        Self {
            token: None,
            claims: None,
        }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    fn snapshot(&self) -> AuthSnapshot {
        match (&self.token, &self.claims) {
            (Some(_), Some(claims)) => AuthSnapshot::signed_in(claims.clone()),
            _ => AuthSnapshot::signed_out(),
        }
    }

    async fn get_token(&self) -> Result<String> {
        let token = self.token.as_ref().ok_or(AuthError::NotSignedIn)?;
        if token.is_expired() {
            warn!("登录凭证已过期");
            return Err(AuthError::Expired);
        }
        debug!("使用静态登录凭证");
        Ok(token.access_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn anonymous_has_no_token() {
        let auth = StaticTokenAuth::anonymous();
        assert_eq!(auth.snapshot(), AuthSnapshot::signed_out());
        assert_eq!(auth.get_token().await, Err(AuthError::NotSignedIn));
    }

    #[tokio::test]
    async fn expired_token_is_refused() {
        let mut token = TokenInfo::new("abc");
        token.expires_at = Some(SystemTime::now() - Duration::from_secs(1));
        let auth = StaticTokenAuth::new(Some(token), Some(SessionClaims::default()));

        assert_eq!(auth.get_token().await, Err(AuthError::Expired));
    }
}
