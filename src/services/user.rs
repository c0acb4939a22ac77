//! User service implementation
//!
//! Profile reads and account updates. After a change the session user is
//! re-synchronized, or the session is ended when the change invalidates
//! the current token.

use std::path::Path;
use tracing::{debug, info};

use super::{image_part, AuthService, ServiceResponse};
use crate::api::{ApiClient, Endpoint, Params};
use crate::models::{ApiResponse, User, UserPatch};
use crate::utils::errors::{ErrorCategory, EventSphereError, Result};
use crate::utils::validators::{
    is_valid_email, validate_only_letters, validate_strong_password, MAX_USERNAME_LENGTH, MIN_USERNAME_LENGTH,
};

/// User service for managing the current account
#[derive(Clone)]
pub struct UserService {
    client: ApiClient,
    auth: AuthService,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(client: ApiClient, auth: AuthService) -> Self {
        Self { client, auth }
    }

    /// Profile of the authenticated user
    pub async fn profile(&self) -> ServiceResponse<User> {
        ServiceResponse::from_result(self.fetch_profile().await.map(ServiceResponse::success), "profile")
    }

    async fn fetch_profile(&self) -> Result<User> {
        let response = self.client.get(Endpoint::UserProfile, &Params::new()).await?;
        if !response.success() {
            return Err(EventSphereError::InvalidResponse(
                response.message_or("Could not load the user profile"),
            ));
        }
        response.user()
    }

    /// Fetch the profile and merge it into the session user, without the photo
    pub async fn fetch_profile_and_sync(&self) -> ServiceResponse<User> {
        let profile = match self.fetch_profile().await {
            Ok(profile) => profile,
            Err(e) => return ServiceResponse::from_error(&e, "fetch_profile_and_sync"),
        };

        let store = self.client.guard().store();
        let base = store.user().await.unwrap_or_default();
        let merged = base.merge(&UserPatch::from(profile));
        if let Err(e) = store.set_user(&merged.to_stored()).await {
            return ServiceResponse::from_error(&e, "fetch_profile_and_sync");
        }
        debug!(username = ?merged.username, "Session user synchronized");
        ServiceResponse::success(merged)
    }

    pub async fn update_name(&self, new_name: &str) -> ServiceResponse<()> {
        let new_name = new_name.trim();
        if let Some(error) = validate_only_letters(new_name) {
            return ServiceResponse::invalid(error);
        }

        let params = Params::new().with("newName", new_name);
        match self.client.put_empty(Endpoint::UserUpdateName, &params).await {
            Ok(response) => {
                let patch = UserPatch {
                    name: Some(new_name.to_string()),
                    ..Default::default()
                };
                self.auth.update_current_user(&patch).await;
                ServiceResponse::with_message((), response.message_or("Name updated"))
            }
            Err(e) => ServiceResponse::from_error(&e, "update_name"),
        }
    }

    /// Change the email, then re-read the profile
    pub async fn update_email(&self, new_email: &str) -> ServiceResponse<()> {
        let new_email = new_email.trim();
        if !is_valid_email(new_email) {
            return ServiceResponse::invalid("Invalid email address");
        }

        let params = Params::new().with("newEmail", new_email);
        let response = match self.client.put_empty(Endpoint::UserUpdateEmail, &params).await {
            Ok(response) => response,
            Err(e) => return ServiceResponse::from_error(&e, "update_email"),
        };

        match self.fetch_profile_and_sync().await {
            ServiceResponse::Success { .. } => ServiceResponse::with_message((), response.message_or("Email updated")),
            ServiceResponse::Failure(_) => {
                ServiceResponse::failure(ErrorCategory::Server, "Email updated but the profile could not be refreshed")
            }
        }
    }

    /// Change the username; the session ends because the token names the old one
    pub async fn update_username(&self, new_username: &str) -> ServiceResponse<()> {
        let new_username = new_username.trim();
        let length = new_username.chars().count();
        if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&length) {
            return ServiceResponse::invalid(format!(
                "Username must have between {} and {} characters",
                MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
            ));
        }

        let params = Params::new().with("newUsername", new_username);
        let result = self.client.put_empty(Endpoint::UserUpdateUsername, &params).await;
        self.then_logout(result, "update_username", "Username updated. Please log in again")
            .await
    }

    /// Change the password; the session ends afterwards
    pub async fn update_password(&self, current_password: &str, new_password: &str) -> ServiceResponse<()> {
        if current_password.is_empty() {
            return ServiceResponse::invalid("Current password is required");
        }
        if let Some(error) = validate_strong_password(new_password) {
            return ServiceResponse::invalid(error);
        }

        let params = Params::new()
            .with("currentPassword", current_password)
            .with("newPassword", new_password);
        let result = self.client.put_empty(Endpoint::UserUpdatePassword, &params).await;
        self.then_logout(result, "update_password", "Password updated. Please log in again")
            .await
    }

    /// Delete the account; a 204 without body counts as success
    pub async fn delete_account(&self, password: &str) -> ServiceResponse<()> {
        if password.is_empty() {
            return ServiceResponse::invalid("Password is required");
        }

        let params = Params::new().with("password", password);
        let result = self.client.delete(Endpoint::UserDelete, &params).await;
        let result = result.and_then(|response| {
            if response.status == 204 || response.success() {
                Ok(response)
            } else {
                Err(EventSphereError::Api {
                    status: response.status,
                    message: response.message_or("Could not delete the account"),
                })
            }
        });
        if result.is_ok() {
            info!("Account deleted");
        }
        self.then_logout(result, "delete_account", "Account deleted").await
    }

    /// Upload a new profile photo; the photo is returned but never persisted
    pub async fn upload_user_photo(&self, path: &Path) -> ServiceResponse<Option<String>> {
        let result = async {
            let form = reqwest::multipart::Form::new().part("photo", image_part(path).await?);
            self.client.upload(Endpoint::UserPhoto, &Params::new(), form).await
        };

        match result.await {
            Ok(response) => {
                let photo = response.photo_base64();
                let patch = UserPatch {
                    photo: photo.clone(),
                    ..Default::default()
                };
                self.auth.update_current_user(&patch).await;
                ServiceResponse::with_message(photo, response.message_or("Photo updated"))
            }
            Err(e) => ServiceResponse::from_error(&e, "upload_user_photo"),
        }
    }

    pub async fn remove_user_photo(&self) -> ServiceResponse<()> {
        match self.client.delete(Endpoint::UserPhotoRemove, &Params::new()).await {
            Ok(response) => ServiceResponse::with_message((), response.message_or("Photo removed")),
            Err(e) => ServiceResponse::from_error(&e, "remove_user_photo"),
        }
    }

    async fn then_logout(&self, result: Result<ApiResponse>, context: &str, default_message: &str) -> ServiceResponse<()> {
        match result {
            Ok(response) => {
                let message = response.message_or(default_message);
                self.auth.logout().await;
                ServiceResponse::with_message((), message)
            }
            Err(e) => ServiceResponse::from_error(&e, context),
        }
    }
}
