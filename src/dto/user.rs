use derive_more::Display;
use serde::Deserialize;
use validator::Validate;

/// Path parameters for routes addressing a single user
#[derive(Debug, Deserialize, Display, Validate)]
#[display("{username}")]
pub struct UsernamePath {
    #[validate(length(min = 1, max = 80))]
    pub username: String,
}
