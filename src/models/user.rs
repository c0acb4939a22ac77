//! User model

use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// Account as returned by the profile endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: Option<UserId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    /// Base64 image or URL; never persisted
    #[serde(alias = "photoBase64")]
    pub photo: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("user")
    }

    /// Persistable copy without the photo
    pub fn to_stored(&self) -> StoredUser {
        StoredUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
        }
    }
}

/// User kept in the session store.
///
/// There is no photo field: images are large and must not reach
/// persistent storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredUser {
    pub id: Option<UserId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
}

impl StoredUser {
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Default::default()
        }
    }

    /// Merge a patch into this user; fields absent from the patch are kept
    pub fn merge(&self, patch: &UserPatch) -> User {
        User {
            id: patch.id.or(self.id),
            name: patch.name.clone().or_else(|| self.name.clone()),
            email: patch.email.clone().or_else(|| self.email.clone()),
            username: patch.username.clone().or_else(|| self.username.clone()),
            photo: patch.photo.clone(),
        }
    }
}

impl From<User> for StoredUser {
    fn from(user: User) -> Self {
        user.to_stored()
    }
}

/// Partial user data to merge into the session
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPatch {
    pub id: Option<UserId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    #[serde(alias = "photoBase64")]
    pub photo: Option<String>,
}

impl From<User> for UserPatch {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            username: user.username,
            photo: user.photo,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login response; the token may be nested under `data`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    pub token: Option<String>,
    pub data: Option<TokenData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenData {
    pub token: Option<String>,
}

impl TokenResponse {
    pub fn into_token(self) -> Option<String> {
        self.token
            .or_else(|| self.data.and_then(|d| d.token))
            .filter(|t| !t.trim().is_empty())
    }
}
