use crate::error::{DatasourceError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_ENCRYPTION_SALT: &str = "!@#$%^&*";

/// Turns datasource passwords into their stored form and back.
pub trait PasswordEncoder: Send + Sync {
    fn encode(&self, plaintext: &str) -> Result<String>;

    fn decode(&self, encoded: &str) -> Result<String>;
}

/// Encryption settings as configured for the platform.
#[derive(Debug, Clone)]
pub struct EncryptionSettings {
    pub enable: bool,
    pub salt: String,
}

impl Default for EncryptionSettings {
    fn default() -> Self {
        Self {
            enable: false,
            salt: DEFAULT_ENCRYPTION_SALT.to_string(),
        }
    }
}

/// Pick the encoder matching the settings.
pub fn encoder_from_settings(settings: &EncryptionSettings) -> Arc<dyn PasswordEncoder> {
    if settings.enable {
        Arc::new(SaltedBase64Encoder::new(settings.salt.clone()))
    } else {
        Arc::new(PlainPasswordEncoder)
    }
}

/// Used when encryption is disabled: passwords are stored as given.
#[derive(Debug, Default)]
pub struct PlainPasswordEncoder;

impl PasswordEncoder for PlainPasswordEncoder {
    fn encode(&self, plaintext: &str) -> Result<String> {
        Ok(plaintext.to_string())
    }

    fn decode(&self, encoded: &str) -> Result<String> {
        Ok(encoded.to_string())
    }
}

/// `base64(salt + base64(password))`
#[derive(Debug)]
pub struct SaltedBase64Encoder {
    salt: String,
}

impl SaltedBase64Encoder {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }
}

impl PasswordEncoder for SaltedBase64Encoder {
    fn encode(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        let salted = format!("{}{}", self.salt, STANDARD.encode(plaintext));
        Ok(STANDARD.encode(salted))
    }

    fn decode(&self, encoded: &str) -> Result<String> {
        if encoded.is_empty() {
            return Ok(String::new());
        }

        let salted = decode_utf8(encoded)?;
        let Some(inner) = salted.strip_prefix(self.salt.as_str()) else {
            // Stored before encryption was switched on.
            warn!("password and salt mismatch, using stored value as is");
            return Ok(encoded.to_string());
        };

        decode_utf8(inner)
    }
}

fn decode_utf8(input: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(input)
        .map_err(|e| DatasourceError::PasswordDecode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DatasourceError::PasswordDecode(e.to_string()))
}
