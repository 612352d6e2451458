use serde::{Deserialize, Serialize};

/// A search destination the user can be redirected to.
///
/// Variant order is significant: it is the tie-break order for usage
/// rankings and the order unused platforms appear in the platform picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Reddit,
    Instagram,
    Facebook,
    X,
    Google,
    Bing,
}

impl Platform {
    /// Get the string ID used for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Reddit => "reddit",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::X => "x",
            Self::Google => "google",
            Self::Bing => "bing",
        }
    }

    /// Parse from a stored string ID (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "youtube" => Some(Self::Youtube),
            "reddit" => Some(Self::Reddit),
            "instagram" => Some(Self::Instagram),
            "facebook" => Some(Self::Facebook),
            "x" | "twitter" => Some(Self::X),
            "google" => Some(Self::Google),
            "bing" => Some(Self::Bing),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Youtube => "YouTube",
            Self::Reddit => "Reddit",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::X => "X",
            Self::Google => "Google",
            Self::Bing => "Bing",
        }
    }

    /// All platforms in declaration order
    pub fn all() -> &'static [Platform] {
        &[
            Self::Youtube,
            Self::Reddit,
            Self::Instagram,
            Self::Facebook,
            Self::X,
            Self::Google,
            Self::Bing,
        ]
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_string_ids_roundtrip() {
        for platform in Platform::all() {
            assert_eq!(Platform::from_str(platform.as_str()), Some(*platform));
        }
        assert_eq!(Platform::from_str("Twitter"), Some(Platform::X));
        assert_eq!(Platform::from_str("myspace"), None);
    }

    #[test]
    fn test_declaration_order_drives_ord() {
        let mut shuffled = vec![Platform::Bing, Platform::Youtube, Platform::X, Platform::Reddit];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Platform::Youtube, Platform::Reddit, Platform::X, Platform::Bing]
        );
    }
}
