// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use std::fmt;

/// Integration token for the Notion API.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new API key with validation
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into().trim().to_string();

        if key.is_empty() {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key cannot be empty".to_string(),
            });
        }

        if !key.starts_with("secret_") && !key.starts_with("ntn_") {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key must start with 'secret_' or 'ntn_'".to_string(),
            });
        }

        if key.len() < 20 {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key is too short".to_string(),
            });
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}...", &self.0[..10])
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self)
    }
}

/// Account and token pair for the Cloudflare Images API.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudflareCredentials {
    account_id: String,
    api_token: String,
}

impl CloudflareCredentials {
    pub fn new(
        account_id: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let account_id = account_id.into().trim().to_string();
        let api_token = api_token.into().trim().to_string();

        if account_id.is_empty() {
            return Err(ValidationError::EmptyField("CLOUDFLARE_IMAGES_ACCOUNT_ID"));
        }
        if api_token.is_empty() {
            return Err(ValidationError::EmptyField("CLOUDFLARE_IMAGES_API_TOKEN"));
        }

        Ok(Self {
            account_id,
            api_token,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }
}

impl fmt::Debug for CloudflareCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareCredentials")
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .finish()
    }
}
