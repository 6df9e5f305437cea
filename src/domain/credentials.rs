use serde::{Deserialize, Serialize};

/// Marketplace session: the `hash` query token plus the session cookies.
///
/// Cookies are kept in insertion order because the header is rebuilt
/// verbatim as `k1=v1; k2=v2`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub hash: String,
    #[serde(default)]
    pub cookies: Vec<(String, String)>,
}

impl Credentials {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            cookies: Vec::new(),
        }
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// Value for the `Cookie` request header.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
