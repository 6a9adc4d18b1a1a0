use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// User-supplied settings for one datasource.
///
/// `other` keeps insertion order so the generated JDBC URL is stable.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user_name: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(default)]
    pub other: IndexMap<String, String>,
}

impl fmt::Debug for ConnectionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRequest")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user_name", &self.user_name)
            .field("password", &"***")
            .field("other", &self.other)
            .finish()
    }
}

/// Fully assembled connection settings as stored by the platform.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDescriptor {
    pub user: String,
    /// Encoded form, never the plaintext.
    pub password: String,
    pub address: String,
    pub database: String,
    pub jdbc_url: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub other: IndexMap<String, String>,
}

impl ConnectionDescriptor {
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
