use tracing::info;

use crate::api::AuthApi;
use crate::error::AppError;
use crate::models::{Role, User};

/// Current-user context handed to every service.
///
/// Populated by [`Session::login`] or [`Session::restore`], emptied by
/// [`Session::logout`]. Nothing reads the user from global state.
#[derive(Debug, Default, Clone)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_user(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub async fn login(
        &mut self,
        auth: &dyn AuthApi,
        username: &str,
        password: &str,
    ) -> Result<&User, AppError> {
        let response = auth.login(username, password).await?;
        Ok(self.user.insert(response.user))
    }

    /// Rebuild the session from tokens the client already holds.
    pub async fn restore(&mut self, auth: &dyn AuthApi) -> Result<&User, AppError> {
        let user = auth.get_profile().await?;
        info!("restored session for {}", user.username);
        Ok(self.user.insert(user))
    }

    pub async fn logout(&mut self, auth: &dyn AuthApi) {
        auth.logout().await;
        if let Some(user) = self.user.take() {
            info!("logged out {}", user.username);
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn require_user(&self) -> Result<&User, AppError> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))
    }

    pub fn require_role(&self, role: Role) -> Result<&User, AppError> {
        let user = self.require_user()?;
        if user.role != role {
            return Err(AppError::Unauthorized(format!(
                "This action requires the {role:?} role"
            )));
        }
        Ok(user)
    }

    pub fn require_student(&self) -> Result<&User, AppError> {
        self.require_role(Role::Student)
    }
}
