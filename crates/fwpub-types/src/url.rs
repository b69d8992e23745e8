use std::fmt;

use serde::{Deserialize, Serialize};

/// A download reference returned by the publisher.
///
/// `Verified` means an automated backend completed the upload. `Unverified`
/// comes from the manual fallback: the operator asserted (or accepted) the
/// URL and nothing checked that the file is actually there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadUrl {
    Verified(String),
    Unverified(String),
}

impl DownloadUrl {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Verified(url) | Self::Unverified(url) => url,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Verified(url) | Self::Unverified(url) => url,
        }
    }
}

impl fmt::Display for DownloadUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verified_and_unverified_share_text() {
        let v = DownloadUrl::Verified("https://x/a.bin".into());
        let u = DownloadUrl::Unverified("https://x/a.bin".into());
        assert_eq!(v.as_str(), u.as_str());
        assert!(v.is_verified());
        assert!(!u.is_verified());
        assert_ne!(v, u);
        assert_eq!(u.into_string(), "https://x/a.bin");
    }
}
