use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use colored::Colorize;
use tracing::info;
use uuid::Uuid;

use super::{AuthError, AuthProvider, AuthSnapshot, Result, SessionClaims};

#[derive(Debug, Default)]
struct SessionState {
    loaded: bool,
    claims: Option<SessionClaims>,
    token: Option<String>,
}

/// 可变的会话存储：由宿主（界面或测试）推动登录、登出
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    state: Arc<Mutex<SessionState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 认证服务初始化完成，尚未登录
    pub fn mark_loaded(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.loaded = true;
        }
    }

    // 登录成功之后，创建新的会话，返回会话凭证
    pub fn sign_in(&self, claims: SessionClaims) -> String {
        let token = Uuid::new_v4().to_string();
        self.sign_in_with_token(claims, token.clone());
        token
    }

    pub fn sign_in_with_token(&self, claims: SessionClaims, token: String) {
        info!("{}: {}", "创建会话".green(), claims.user_id);
        if let Ok(mut state) = self.state.lock() {
            state.loaded = true;
            state.claims = Some(claims);
            state.token = Some(token);
        }
    }

    // 销毁会话
    pub fn sign_out(&self) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(claims) = state.claims.take() {
                info!("{}: {}", "销毁会话".yellow(), claims.user_id);
            }
            state.token = None;
        }
    }
}

#[async_trait]
impl AuthProvider for SessionStore {
    fn snapshot(&self) -> AuthSnapshot {
        match self.state.lock() {
            Ok(state) => AuthSnapshot {
                loaded: state.loaded,
                user: state.claims.clone(),
            },
            Err(_) => AuthSnapshot::not_ready(),
        }
    }

    async fn get_token(&self) -> Result<String> {
        let state = self
            .state
            .lock()
            .map_err(|e| AuthError::TokenUnavailable(e.to_string()))?;
        state.token.clone().ok_or(AuthError::NotSignedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_in_then_out() {
        let store = SessionStore::new();
        assert_eq!(store.snapshot(), AuthSnapshot::not_ready());

        let claims = SessionClaims {
            user_id: "u1".to_string(),
            ..Default::default()
        };
        let token = store.sign_in(claims.clone());
        assert_eq!(store.snapshot(), AuthSnapshot::signed_in(claims));
        assert_eq!(store.get_token().await.unwrap(), token);

        store.sign_out();
        assert_eq!(store.snapshot(), AuthSnapshot::signed_out());
        assert_eq!(store.get_token().await, Err(AuthError::NotSignedIn));
    }
}
