//! 全局共享状态：课程目录、当前用户、已报名课程与讲师标记
//!
//! 所有修改都经由 [`AppContext`] 自己的操作完成，使用方只能拿到快照。
//! 锁不会跨越网络等待持有；用户相关的请求在发出前记下会话纪元（epoch），
//! 返回时纪元已变化（中途登出或换了用户）则丢弃结果。

mod error;

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::auth::{AuthError, AuthProvider, AuthSnapshot, SessionClaims};
use crate::common::api::{ApiError, CourseApi};
use crate::common::notify::Notifier;
use crate::models::{Course, UserProfile};

pub use error::StateError;

/// 页面渲染所需的只读快照
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppSnapshot {
    pub courses: Vec<Course>,
    pub user: Option<UserProfile>,
    pub enrolled_courses: Vec<Course>,
    pub is_educator: bool,
    pub catalog_loading: bool,
    pub user_loading: bool,
}

/// 一次认证状态变化引起的反应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTransition {
    Unchanged,
    SignedIn,
    SignedOut,
}

#[derive(Debug, Default)]
struct SharedState {
    snapshot: AppSnapshot,
    epoch: u64,
    last_auth: AuthSnapshot,
}

impl SharedState {
    /// 清空资料、已报名课程与讲师标记
    fn clear_user(&mut self) {
        self.snapshot.user = None;
        self.snapshot.enrolled_courses.clear();
        self.snapshot.is_educator = false;
    }
}

pub struct AppContext<A: ?Sized, P: ?Sized> {
    api: Arc<A>,
    auth: Arc<P>,
    notifier: Arc<dyn Notifier>,
    currency: String,
    state: Arc<Mutex<SharedState>>,
}

impl<A: ?Sized, P: ?Sized> Clone for AppContext<A, P> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            auth: Arc::clone(&self.auth),
            notifier: Arc::clone(&self.notifier),
            currency: self.currency.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A, P> AppContext<A, P>
where
    A: CourseApi + ?Sized,
    P: AuthProvider + ?Sized,
{
    pub fn new(
        api: Arc<A>,
        auth: Arc<P>,
        notifier: Arc<dyn Notifier>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            api,
            auth,
            notifier,
            currency: currency.into(),
            state: Arc::new(Mutex::new(SharedState::default())),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn auth(&self) -> &Arc<P> {
        &self.auth
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn snapshot(&self) -> AppSnapshot {
        self.with_state(|s| s.snapshot.clone())
    }

    pub fn courses(&self) -> Vec<Course> {
        self.with_state(|s| s.snapshot.courses.clone())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.with_state(|s| s.snapshot.user.clone())
    }

    pub fn enrolled_courses(&self) -> Vec<Course> {
        self.with_state(|s| s.snapshot.enrolled_courses.clone())
    }

    pub fn is_educator(&self) -> bool {
        self.with_state(|s| s.snapshot.is_educator)
    }

    pub fn set_is_educator(&self, value: bool) {
        self.with_state(|s| s.snapshot.is_educator = value);
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SharedState) -> R) -> R {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    // 写入前确认会话没有变化
    fn commit<R>(&self, epoch: u64, f: impl FnOnce(&mut SharedState) -> R) -> Option<R> {
        self.with_state(|s| {
            if s.epoch != epoch {
                debug!("会话已变化 ({} -> {})，丢弃过期的响应", epoch, s.epoch);
                None
            } else {
                Some(f(s))
            }
        })
    }

    fn signed_in_claims(&self) -> Option<SessionClaims> {
        let snapshot = self.auth.snapshot();
        if snapshot.loaded { snapshot.user } else { None }
    }

    // -------------------------------------------------------------------------------------------
    // 课程目录

    /// 拉取全部课程；失败时保留原有目录
    pub async fn fetch_all_courses(&self) -> Result<(), StateError> {
        self.with_state(|s| s.snapshot.catalog_loading = true);

        let result = self.api.all_courses().await;

        self.with_state(|s| s.snapshot.catalog_loading = false);
        match result {
            Ok(courses) => {
                info!("课程目录已更新: {} 门", courses.len());
                self.with_state(|s| s.snapshot.courses = courses);
                Ok(())
            }
            Err(e) => {
                self.notifier.error(&e.to_string());
                Err(e.into())
            }
        }
    }

    /// 单门课程详情，不写入共享状态
    pub async fn fetch_course(&self, id: &str) -> Result<Course, StateError> {
        self.api.course(id).await.map_err(|e| {
            self.notifier.error(&e.to_string());
            e.into()
        })
    }

    // -------------------------------------------------------------------------------------------
    // 用户

    /// 拉取当前用户资料。未登录时什么也不做
    pub async fn fetch_user_data(&self) -> Result<(), StateError> {
        let Some(claims) = self.signed_in_claims() else {
            debug!("未登录，跳过用户资料");
            return Ok(());
        };

        let epoch = self.with_state(|s| {
            s.snapshot.user_loading = true;
            if claims.is_educator() {
                s.snapshot.is_educator = true;
            }
            s.epoch
        });

        let result = match self.auth.get_token().await {
            Ok(token) => self.api.user_data(&token).await.map_err(StateError::from),
            Err(e) => Err(e.into()),
        };

        let outcome = self.commit(epoch, |s| {
            s.snapshot.user_loading = false;
            match result {
                Ok(user) => {
                    info!("用户资料已加载: {}", user.id);
                    s.snapshot.user = Some(user);
                    Ok(())
                }
                Err(StateError::Api(ApiError::NotFound)) => {
                    warn!("后端没有该用户记录，使用会话信息生成资料");
                    s.snapshot.user = Some(UserProfile::from_claims(&claims));
                    Ok(())
                }
                Err(e) if e.is_unauthorized() => {
                    s.clear_user();
                    Err(e)
                }
                Err(e) => Err(e),
            }
        });

        match outcome {
            None | Some(Ok(())) => Ok(()),
            Some(Err(e)) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    /// 拉取已报名课程，按最近报名在前排列
    pub async fn fetch_user_enrolled_courses(&self) -> Result<(), StateError> {
        if self.signed_in_claims().is_none() {
            debug!("未登录，跳过已报名课程");
            return Ok(());
        }

        let epoch = self.with_state(|s| s.epoch);

        let result = match self.auth.get_token().await {
            Ok(token) => self
                .api
                .enrolled_courses(&token)
                .await
                .map_err(StateError::from),
            Err(e) => Err(e.into()),
        };

        let result = match result {
            Err(StateError::Api(ApiError::NotFound)) => Ok(Vec::new()),
            other => other,
        };

        let outcome = self.commit(epoch, |s| match result {
            Ok(mut courses) => {
                courses.reverse();
                if let Some(user) = s.snapshot.user.as_mut() {
                    user.enrolled_courses = courses.iter().map(|c| c.id.clone()).collect();
                }
                info!("已报名课程: {} 门", courses.len());
                s.snapshot.enrolled_courses = courses;
                Ok(())
            }
            Err(e) if e.is_unauthorized() => {
                s.clear_user();
                Err(e)
            }
            Err(e) => Err(e),
        });

        match outcome {
            None | Some(Ok(())) => Ok(()),
            Some(Err(e)) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    /// 并发刷新用户资料与已报名课程
    pub async fn refresh_user_data(&self) -> Result<(), StateError> {
        let (user, enrolled) = futures::join!(
            self.fetch_user_data(),
            self.fetch_user_enrolled_courses()
        );
        user.and(enrolled)
    }

    /// 申请成为讲师
    pub async fn become_educator(&self) -> Result<(), StateError> {
        let result = match self.auth.get_token().await {
            Ok(token) => self.api.update_role(&token).await.map_err(StateError::from),
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(message) => {
                self.set_is_educator(true);
                let message = if message.is_empty() {
                    "你现在可以发布课程了".to_string()
                } else {
                    message
                };
                self.notifier.success(&message);
                Ok(())
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    // -------------------------------------------------------------------------------------------
    // 认证状态变化

    /// 同步处理认证状态变化。登出时立即清空用户相关状态；
    /// 返回 [`AuthTransition::SignedIn`] 时调用方应刷新用户数据
    pub fn on_auth_change(&self, auth: AuthSnapshot) -> AuthTransition {
        self.with_state(|s| {
            let previous = std::mem::replace(&mut s.last_auth, auth.clone());

            if !auth.loaded {
                return AuthTransition::Unchanged;
            }

            match (&previous.user, &auth.user) {
                (_, None) => {
                    if previous.user.is_some() || !previous.loaded {
                        info!("已登出，清空用户状态");
                    }
                    s.epoch += 1;
                    s.clear_user();
                    s.snapshot.user_loading = false;
                    AuthTransition::SignedOut
                }
                (Some(prev), Some(now)) if previous.loaded && prev.user_id == now.user_id => {
                    AuthTransition::Unchanged
                }
                (prev, Some(now)) => {
                    // 换了用户时旧请求也要作废
                    if prev.is_some() {
                        s.epoch += 1;
                        s.clear_user();
                    }
                    info!("已登录: {}", now.user_id);
                    AuthTransition::SignedIn
                }
            }
        })
    }

    /// 读取认证服务的当前状态并作出反应
    pub async fn sync_with_auth(&self) -> Result<AuthTransition, StateError> {
        let transition = self.on_auth_change(self.auth.snapshot());
        if transition == AuthTransition::SignedIn {
            self.refresh_user_data().await?;
        }
        Ok(transition)
    }

    fn report(&self, error: &StateError) {
        if error.is_unauthorized() {
            self.notifier.warning("登录已失效，请重新登录");
        } else {
            self.notifier.error(&error.to_string());
        }
    }
}

impl StateError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            StateError::Api(ApiError::Unauthorized)
                | StateError::Auth(AuthError::NotSignedIn | AuthError::Expired)
        )
    }
}
