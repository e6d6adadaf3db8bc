use program_core::model::UserId;

use crate::error::EnrollmentError;

/// Identity of the caller, as resolved by the auth layer in front of the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthContext {
    #[default]
    Anonymous,
    User(UserId),
}

impl AuthContext {
    #[must_use]
    pub fn user(user_id: UserId) -> Self {
        Self::User(user_id)
    }

    /// # Errors
    ///
    /// Returns `EnrollmentError::Unauthenticated` for anonymous callers.
    pub fn require_user(&self) -> Result<UserId, EnrollmentError> {
        match self {
            AuthContext::User(id) => Ok(*id),
            AuthContext::Anonymous => Err(EnrollmentError::Unauthenticated),
        }
    }
}

impl From<Option<UserId>> for AuthContext {
    fn from(user: Option<UserId>) -> Self {
        user.map_or(AuthContext::Anonymous, AuthContext::User)
    }
}
