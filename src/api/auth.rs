//! Authentication handling for the label service.
//!
//! The service authenticates with a bearer-style token header
//! (`Authorization: Token <token>`). Tokens live in the OS keyring, with an
//! environment variable fallback for headless environments and CI.

use super::error::{ApiError, Result};

/// The keyring service name for labelpick tokens.
const KEYRING_SERVICE: &str = "labelpick";

/// Environment variable consulted when the keyring has no token.
const TOKEN_ENV_VAR: &str = "LABELPICK_TOKEN";

/// Authentication credentials for the label service.
#[derive(Debug, Clone)]
pub struct Auth {
    /// The complete authorization header value.
    auth_header: String,
}

impl Auth {
    /// Create new authentication credentials from a raw token.
    pub fn new(token: &str) -> Self {
        Self {
            auth_header: format!("Token {}", token),
        }
    }

    /// Create authentication from the OS keyring, falling back to the
    /// `LABELPICK_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if neither source yields a token.
    pub fn load(account: &str) -> Result<Self> {
        match get_token(account) {
            Ok(token) => Ok(Self::new(&token)),
            Err(keyring_err) => match std::env::var(TOKEN_ENV_VAR) {
                Ok(token) if !token.is_empty() => Ok(Self::new(&token)),
                _ => Err(keyring_err),
            },
        }
    }

    /// Get the authorization header value for HTTP requests.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }
}

/// Store an API token in the OS keyring.
///
/// # Arguments
///
/// * `account` - The account name to use as the keyring username
/// * `token` - The API token to store
///
/// # Errors
///
/// Returns an error if the token cannot be stored in the keyring.
pub fn store_token(account: &str, token: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, account)
        .map_err(|e| ApiError::Keyring(format!("failed to create keyring entry: {}", e)))?;

    entry
        .set_password(token)
        .map_err(|e| ApiError::Keyring(format!("failed to store token: {}", e)))?;

    Ok(())
}

/// Retrieve an API token from the OS keyring.
///
/// # Errors
///
/// Returns an error if no token is stored for the account.
pub fn get_token(account: &str) -> Result<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, account)
        .map_err(|e| ApiError::Keyring(format!("failed to create keyring entry: {}", e)))?;

    entry
        .get_password()
        .map_err(|e| ApiError::Keyring(format!("failed to retrieve token: {}", e)))
}
