//! Site origins used as per-site consent keys

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::PermissionError;
use crate::Result;

/// `host` or `host:port`, kept verbatim as the allow-list key.
///
/// The port is only present when the URL names a non-default one, so
/// `https://foo.com:8443` and `https://foo.com` are different sites.
///
/// Deserialization goes through `from_key`, so imported data can never hold
/// a key the store would refuse to read back.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteOrigin(String);

impl SiteOrigin {
    pub fn from_url(url: &Url) -> Result<Self> {
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| PermissionError::InvalidOrigin(url.to_string()))?;

        match url.port() {
            Some(port) => Ok(Self(format!("{}:{}", host, port))),
            None => Ok(Self(host.to_string())),
        }
    }

    pub fn parse(url: &str) -> Result<Self> {
        let parsed =
            Url::parse(url).map_err(|_| PermissionError::InvalidOrigin(url.to_string()))?;
        Self::from_url(&parsed)
    }

    /// Rebuild an origin from a stored key
    pub fn from_key(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() || key.contains('/') || key.chars().any(char::is_whitespace) {
            return Err(PermissionError::InvalidOrigin(key));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SiteOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SiteOrigin {
    type Error = PermissionError;

    fn try_from(key: String) -> Result<Self> {
        SiteOrigin::from_key(key)
    }
}

impl From<SiteOrigin> for String {
    fn from(origin: SiteOrigin) -> Self {
        origin.0
    }
}

impl std::str::FromStr for SiteOrigin {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self> {
        SiteOrigin::parse(s)
    }
}
