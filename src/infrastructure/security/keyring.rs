use crate::domain::error::{AppError, Result};
use keyring::Entry;

/// API keys stored in the OS credential store under one service name.
pub struct KeyringManager {
    service: String,
}

impl KeyringManager {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, account: &str) -> Result<Entry> {
        Entry::new(&self.service, account)
            .map_err(|e| AppError::SecurityError(format!("Failed to open keyring entry: {}", e)))
    }

    pub fn set_secret(&self, account: &str, secret: &str) -> Result<()> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(AppError::ValidationError("API key must not be empty".to_string()));
        }
        self.entry(account)?
            .set_password(secret)
            .map_err(|e| AppError::SecurityError(format!("Failed to store API key: {}", e)))
    }

    /// `Ok(None)` when nothing is stored for the account.
    pub fn get_secret(&self, account: &str) -> Result<Option<String>> {
        match self.entry(account)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AppError::SecurityError(format!(
                "Failed to read API key: {}",
                e
            ))),
        }
    }

    /// Deleting a missing entry is not an error.
    pub fn delete_secret(&self, account: &str) -> Result<()> {
        match self.entry(account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AppError::SecurityError(format!(
                "Failed to delete API key: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_secret_is_rejected_before_touching_the_store() {
        let keyring = KeyringManager::new("survey-insight-test");
        assert!(matches!(
            keyring.set_secret("gemini", "   "),
            Err(AppError::ValidationError(_))
        ));
    }
}
