use serde::{Deserialize, Serialize};

/// Key of the config entry holding the bcrypt hash of the admin password.
pub const ADMIN_PASSWORD_KEY: &str = "admin_password";

/// A process-wide configuration entry, keyed by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfigEntry {
    #[serde(rename = "_id")]
    pub key: String,
    pub value: String,
}
