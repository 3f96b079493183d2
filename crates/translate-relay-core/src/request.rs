//! Request and result records passed through the orchestrator.

use serde::{Deserialize, Serialize};

use crate::config::Lang;
use crate::error::{Error, Result};

/// Learner proficiency the translation should be pitched at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    A1,
    A2,
    #[default]
    B1,
    B2,
    C1,
    C2,
    /// Plain-language register (selkokieli / Selkosuomi)
    Simplified,
}

impl Level {
    pub const ALL: [Self; 7] = [
        Self::A1,
        Self::A2,
        Self::B1,
        Self::B2,
        Self::C1,
        Self::C2,
        Self::Simplified,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
            Self::Simplified => "Simplified",
        }
    }

    pub const fn is_cefr(self) -> bool {
        !matches!(self, Self::Simplified)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        if ["selkosuomi", "selko", "plain"]
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(needle))
        {
            return Ok(Self::Simplified);
        }
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Unknown level '{needle}' (expected A1-C2 or Simplified)"
                ))
            })
    }
}

impl TryFrom<String> for Level {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_string()
    }
}

/// A validated translation request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    text: String,
    level: Level,
    target_language: Lang,
}

impl TranslationRequest {
    /// Build a request, rejecting missing or blank text.
    pub fn new(text: impl Into<String>, level: Level, target_language: Lang) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("Valid text required".to_string()));
        }
        if target_language.as_str().trim().is_empty() {
            return Err(Error::InvalidInput("Target language must not be empty".to_string()));
        }
        Ok(Self {
            text,
            level,
            target_language,
        })
    }

    /// Build a request from optional caller fields, filling in defaults.
    pub fn with_defaults(
        text: Option<&str>,
        level: Option<&str>,
        target_language: Option<&str>,
        default_level: Level,
        default_target: &Lang,
    ) -> Result<Self> {
        let text = text.ok_or_else(|| Error::InvalidInput("Valid text required".to_string()))?;
        let level = match level.map(str::trim).filter(|l| !l.is_empty()) {
            Some(l) => l.parse()?,
            None => default_level,
        };
        let target = target_language
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map_or_else(|| default_target.clone(), Lang::from);
        Self::new(text, level, target)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn level(&self) -> Level {
        self.level
    }

    pub const fn target_language(&self) -> &Lang {
        &self.target_language
    }
}

/// The normalized outcome of one successful provider invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderResult {
    pub translated_text: String,
    pub back_translation: Option<String>,
    /// Adapter that produced the result
    pub provider_name: String,
    /// Concrete model, or the provider's display name for non-generative APIs
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!("a1".parse::<Level>().ok(), Some(Level::A1));
        assert_eq!(" C2 ".parse::<Level>().ok(), Some(Level::C2));
        assert_eq!("Selkosuomi".parse::<Level>().ok(), Some(Level::Simplified));
        assert_eq!("simplified".parse::<Level>().ok(), Some(Level::Simplified));
        assert!(matches!("D4".parse::<Level>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_level_serde() {
        let json = serde_json::to_string(&Level::Simplified).unwrap();
        assert_eq!(json, "\"Simplified\"");
        let back: Level = serde_json::from_str("\"b2\"").unwrap();
        assert_eq!(back, Level::B2);
    }

    #[test]
    fn test_blank_text_rejected() {
        let err = TranslationRequest::new("   \n", Level::A1, Lang::new("Finnish")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_defaults_applied() {
        let default_target = Lang::new("Finnish");
        let req = TranslationRequest::with_defaults(Some("Hello"), None, Some(""), Level::A2, &default_target)
            .unwrap();
        assert_eq!(req.level(), Level::A2);
        assert_eq!(req.target_language().as_str(), "Finnish");
    }

    #[test]
    fn test_missing_text_rejected() {
        let default_target = Lang::new("Finnish");
        let err = TranslationRequest::with_defaults(None, Some("A1"), None, Level::B1, &default_target)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
