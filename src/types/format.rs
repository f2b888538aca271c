//! Response format negotiation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Desired response format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Format {
    /// JSON body.
    #[default]
    Json,
    /// XML body.
    Xml,
    /// Raw body, returned as text.
    Raw,
}

impl Format {
    /// Wire name sent in the `Format` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Xml => "XML",
            Format::Raw => "RAW",
        }
    }

    /// Value of the `Accept` header for this format.
    pub fn accept(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Xml => "text/xml",
            Format::Raw => "*/*",
        }
    }
}

impl FromStr for Format {
    type Err = std::convert::Infallible;

    /// Unrecognized names map to [`Format::Raw`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "JSON" => Format::Json,
            "XML" => Format::Xml,
            _ => Format::Raw,
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
