use crate::error::Result;
use crate::Encoding;
use serde::{Deserialize, Serialize};

/// Default encodings for streams that do not name their own.
///
/// ```toml
/// default_external = "ISO-8859-1"
/// default_internal = "UTF-8"
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// Encoding assumed for data read from a stream.
    pub default_external: Encoding,
    /// Encoding data is transcoded to after reading, if any.
    pub default_internal: Option<Encoding>,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        EncodingConfig {
            default_external: Encoding::UTF_8,
            default_internal: None,
        }
    }
}

impl EncodingConfig {
    /// Parses a TOML document. Missing keys keep their defaults; unknown
    /// keys and unknown encoding names are rejected.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
