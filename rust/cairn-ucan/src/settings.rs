//! Protocol constants a deployment may need to pin.

use serde::{Deserialize, Serialize};

/// UCAN version stamped into issued tokens.
pub const UCAN_VERSION: &str = "0.9.1";

/// Root key of an agent message.
pub const MESSAGE_VERSION: &str = "ucanto/message@7.0.0";

/// Seconds an issued token stays valid when no expiration is given.
pub const DEFAULT_LIFETIME: u64 = 30;

/// Versions and defaults used when issuing tokens and assembling messages.
///
/// Every field falls back to its default, so a partial document is enough:
///
/// ```
/// # use cairn_ucan::Settings;
/// let settings: Settings = serde_json::from_str(r#"{"default_lifetime": 3600}"#)?;
/// assert_eq!(settings.ucan_version, "0.9.1");
/// assert_eq!(settings.default_lifetime, 3600);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Value of the `ucv` header and `v` field.
    pub ucan_version: String,
    /// Root key of assembled agent messages.
    pub message_version: String,
    /// Lifetime in seconds of tokens issued without an explicit expiration.
    pub default_lifetime: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ucan_version: UCAN_VERSION.into(),
            message_version: MESSAGE_VERSION.into(),
            default_lifetime: DEFAULT_LIFETIME,
        }
    }
}
