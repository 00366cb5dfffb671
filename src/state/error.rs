use thiserror::Error;

use crate::auth::AuthError;
use crate::common::api::ApiError;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
