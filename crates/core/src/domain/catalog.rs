// Account & Media (owned by collaborators, read-only to the publish pipeline)

use crate::domain::secret::mask_secret;
use serde::{Deserialize, Serialize};

/// Platform account a post is published to
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub platform_user_id: String,
    pub access_token: String,
    pub token_expires_at: Option<i64>, // epoch ms
    pub created_at: i64,
}

impl Account {
    /// Immutable credential snapshot handed to the publisher
    pub fn credentials(&self) -> AccountCredentials {
        AccountCredentials {
            platform_user_id: self.platform_user_id.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("platform_user_id", &self.platform_user_id)
            .field("access_token", &mask_secret(&self.access_token))
            .field("token_expires_at", &self.token_expires_at)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Credentials for one publish attempt
#[derive(Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    pub platform_user_id: String,
    pub access_token: String,
}

impl std::fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("platform_user_id", &self.platform_user_id)
            .field("access_token", &mask_secret(&self.access_token))
            .finish()
    }
}

/// Stored media asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    pub account_id: String,
    pub storage_key: String,
    pub filename: String,
    pub mime: String,
    pub size_bytes: i64,
    pub created_at: i64,
}
