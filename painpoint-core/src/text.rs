use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercase text holding only ASCII letters, digits and whitespace, trimmed
/// at both ends.
///
/// The only constructor is [`NormalizedText::normalize`], so every value of
/// this type satisfies [`is_normalized`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn normalize(text: &str) -> Self {
        let kept: String = text
            .chars()
            .flat_map(char::to_lowercase)
            .filter(|c| is_kept(*c))
            .collect();
        Self(kept.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for NormalizedText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if is_normalized(&raw) {
            Ok(Self(raw))
        } else {
            Err(serde::de::Error::custom(format!(
                "text is not normalized: {raw:?}"
            )))
        }
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_kept(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace()
}

/// True when `text` could have been produced by [`NormalizedText::normalize`].
pub fn is_normalized(text: &str) -> bool {
    text.chars().all(is_kept) && text.trim() == text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        let text = NormalizedText::normalize("  This is a BUG!!! (again?)  ");
        assert_eq!(text.as_str(), "this is a bug again");
    }

    #[test]
    fn test_keeps_inner_whitespace() {
        let text = NormalizedText::normalize("Pain point:\n\tfeature-request");
        assert_eq!(text.as_str(), "pain point\n\tfeaturerequest");
    }

    #[test]
    fn test_drops_non_ascii_letters() {
        let text = NormalizedText::normalize("Café naïve 42€");
        assert_eq!(text.as_str(), "caf nave 42");
        assert!(is_normalized(text.as_str()));
    }

    #[test]
    fn test_empty_and_symbol_only_input() {
        assert!(NormalizedText::normalize("").is_empty());
        assert!(NormalizedText::normalize("?!@#$%^&*()").is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = NormalizedText::normalize("Need HELP: my app is broken...");
        let twice = NormalizedText::normalize(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_is_normalized() {
        assert!(is_normalized("need help 2"));
        assert!(!is_normalized("Need help"));
        assert!(!is_normalized(" leading"));
        assert!(!is_normalized("dash-ed"));
    }

    #[test]
    fn test_deserialize_rejects_unnormalized() {
        let ok: Result<NormalizedText, _> = serde_json::from_str("\"a bug\"");
        assert!(ok.is_ok());

        let bad: Result<NormalizedText, _> = serde_json::from_str("\"A Bug!\"");
        assert!(bad.is_err());
    }
}
