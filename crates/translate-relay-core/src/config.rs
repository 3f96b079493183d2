use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::request::Level;

/// A target or source language as the caller spelled it.
///
/// Accepts either a display name ("Finnish") or an ISO 639-1 code ("fi").
/// Prompt-based providers want the name, code-based providers want the code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn lookup(&self) -> Option<&'static LanguageOption> {
        let needle = self.0.trim();
        LANGUAGES
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(needle) || l.name.eq_ignore_ascii_case(needle))
    }

    /// Human-readable name for prompts. Unknown languages pass through.
    pub fn display_name(&self) -> String {
        self.lookup()
            .map_or_else(|| self.0.trim().to_string(), |l| l.name.to_string())
    }

    /// ISO code for code-based APIs. Unknown languages pass through lowercased.
    pub fn code(&self) -> String {
        self.lookup()
            .map_or_else(|| self.0.trim().to_lowercase(), |l| l.code.to_string())
    }

    pub fn is_english(&self) -> bool {
        self.code() == "en"
    }
}

fn default_target_lang() -> Lang {
    Lang::new(DEFAULT_TARGET_LANG)
}

fn default_source_lang() -> Lang {
    Lang::new(DEFAULT_SOURCE_LANG)
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A language known to the name/code table
#[derive(Debug, Clone, Serialize)]
pub struct LanguageOption {
    /// ISO 639-1 code (e.g., "fi")
    pub code: &'static str,
    /// English display name (e.g., "Finnish")
    pub name: &'static str,
}

const LANGUAGES: &[LanguageOption] = &[
    LanguageOption { code: "fi", name: "Finnish" },
    LanguageOption { code: "en", name: "English" },
    LanguageOption { code: "sv", name: "Swedish" },
    LanguageOption { code: "et", name: "Estonian" },
    LanguageOption { code: "es", name: "Spanish" },
    LanguageOption { code: "fr", name: "French" },
    LanguageOption { code: "de", name: "German" },
    LanguageOption { code: "it", name: "Italian" },
    LanguageOption { code: "pt", name: "Portuguese" },
    LanguageOption { code: "nl", name: "Dutch" },
    LanguageOption { code: "ru", name: "Russian" },
    LanguageOption { code: "pl", name: "Polish" },
    LanguageOption { code: "ja", name: "Japanese" },
    LanguageOption { code: "zh", name: "Chinese" },
];

/// Languages with a known name/code mapping.
pub fn known_languages() -> &'static [LanguageOption] {
    LANGUAGES
}

/// Default target language
pub const DEFAULT_TARGET_LANG: &str = "Finnish";
/// Default source language for code-based providers
pub const DEFAULT_SOURCE_LANG: &str = "en";
/// Default time budget for one provider invocation
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// External providers the relay knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Mistral,
    DeepL,
    LibreTranslate,
    MyMemory,
}

impl ProviderKind {
    pub const ALL: [Self; 5] = [
        Self::Gemini,
        Self::Mistral,
        Self::DeepL,
        Self::LibreTranslate,
        Self::MyMemory,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Mistral => "mistral",
            Self::DeepL => "deepl",
            Self::LibreTranslate => "libretranslate",
            Self::MyMemory => "mymemory",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::ConfigInvalid {
                field: "providers".to_string(),
                reason: format!("unknown provider '{needle}'"),
            })
    }
}

/// Gemini (Google Generative Language API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,
    /// Models tried in order before the adapter gives up
    #[serde(default = "default_gemini_models")]
    pub models: Vec<String>,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_models() -> Vec<String> {
    vec!["gemini-2.0-flash".to_string(), "gemini-1.5-flash".to_string()]
}

const fn default_max_output_tokens() -> u32 {
    8192
}

const fn default_temperature() -> f32 {
    0.3
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_gemini_api_base(),
            models: default_gemini_models(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Mistral chat completions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_mistral_api_base")]
    pub api_base: String,
    #[serde(default = "default_mistral_models")]
    pub models: Vec<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_mistral_api_base() -> String {
    "https://api.mistral.ai/v1".to_string()
}

fn default_mistral_models() -> Vec<String> {
    vec![
        "mistral-large-latest".to_string(),
        "mistral-small-latest".to_string(),
    ]
}

impl Default for MistralConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_mistral_api_base(),
            models: default_mistral_models(),
            temperature: default_temperature(),
        }
    }
}

/// DeepL REST API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeepLConfig {
    pub api_key: Option<String>,
    /// Overrides the host picked from the key type
    pub api_base: Option<String>,
}

impl DeepLConfig {
    /// Free-plan keys end in `:fx` and live on a separate host.
    pub fn resolved_api_base(&self) -> String {
        if let Some(base) = &self.api_base {
            return base.clone();
        }
        let free = self
            .api_key
            .as_deref()
            .is_some_and(|k| k.trim_end().ends_with(":fx"));
        if free {
            "https://api-free.deepl.com".to_string()
        } else {
            "https://api.deepl.com".to_string()
        }
    }
}

/// LibreTranslate (public or self-hosted)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibreTranslateConfig {
    /// Required by libretranslate.com, optional for self-hosted instances
    pub api_key: Option<String>,
    /// The adapter is disabled until a base URL is configured
    pub api_base: Option<String>,
}

/// MyMemory (keyless)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyMemoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_mymemory_api_base")]
    pub api_base: String,
    /// Contact address sent as `de`, raises the daily quota
    pub email: Option<String>,
}

const fn default_true() -> bool {
    true
}

fn default_mymemory_api_base() -> String {
    "https://api.mymemory.translated.net".to_string()
}

impl Default for MyMemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: default_mymemory_api_base(),
            email: None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Target language when the request names none
    #[serde(default = "default_target_lang")]
    pub default_target_lang: Lang,

    /// Proficiency level when the request names none
    #[serde(default)]
    pub default_level: Level,

    /// Source language sent to code-based providers
    #[serde(default = "default_source_lang")]
    pub source_lang: Lang,

    /// Time budget for one provider invocation, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Provider chain for `/api/translate`, in priority order
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderKind>,

    /// Provider chain for selection translation, in priority order
    #[serde(default = "default_selection_providers")]
    pub selection_providers: Vec<ProviderKind>,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub mistral: MistralConfig,

    #[serde(default)]
    pub deepl: DeepLConfig,

    #[serde(default)]
    pub libretranslate: LibreTranslateConfig,

    #[serde(default)]
    pub mymemory: MyMemoryConfig,
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_providers() -> Vec<ProviderKind> {
    vec![
        ProviderKind::Gemini,
        ProviderKind::Mistral,
        ProviderKind::DeepL,
        ProviderKind::LibreTranslate,
        ProviderKind::MyMemory,
    ]
}

fn default_selection_providers() -> Vec<ProviderKind> {
    vec![
        ProviderKind::MyMemory,
        ProviderKind::LibreTranslate,
        ProviderKind::DeepL,
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_target_lang: default_target_lang(),
            default_level: Level::default(),
            source_lang: default_source_lang(),
            request_timeout_secs: default_request_timeout_secs(),
            providers: default_providers(),
            selection_providers: default_selection_providers(),
            gemini: GeminiConfig::default(),
            mistral: MistralConfig::default(),
            deepl: DeepLConfig::default(),
            libretranslate: LibreTranslateConfig::default(),
            mymemory: MyMemoryConfig::default(),
        }
    }
}

/// Environment prefix for layered overrides, e.g. `TRANSLATE_RELAY__GEMINI__API_KEY`
pub const ENV_PREFIX: &str = "TRANSLATE_RELAY";

impl AppConfig {
    /// Load configuration from a single TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the layered configuration.
    ///
    /// Layers, lowest priority first: built-in defaults, the user config
    /// file, `./config.toml` (or `explicit`, which must exist), variables
    /// prefixed with [`ENV_PREFIX`], and finally the conventional provider
    /// variables such as `GEMINI_API_KEY`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_layered(
            explicit,
            crate::util::user_config_path(),
            None,
            |key| std::env::var(key).ok(),
        )
    }

    /// Layered load with every outside input passed in.
    ///
    /// `env` replaces the process environment for the prefixed layer when
    /// set; `lookup` resolves the conventional provider variables.
    pub(crate) fn load_layered(
        explicit: Option<&Path>,
        user_config: Option<PathBuf>,
        env: Option<config::Map<String, String>>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| Error::ConfigLoad(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(user_config) = user_config {
            tracing::debug!("Looking for user config at {}", user_config.display());
            builder = builder.add_source(config::File::from(user_config).required(false));
        }

        builder = match explicit {
            Some(path) => builder.add_source(config::File::from(path.to_path_buf()).required(true)),
            None => builder.add_source(config::File::from(PathBuf::from("config.toml")).required(false)),
        };

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("providers")
                .with_list_parse_key("selection_providers")
                .with_list_parse_key("gemini.models")
                .with_list_parse_key("mistral.models")
                .try_parsing(true)
                .source(env),
        );

        let mut loaded: Self = builder
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| Error::ConfigLoad(e.to_string()))?;

        loaded.apply_env_overrides(lookup);
        loaded.validate()?;
        Ok(loaded)
    }

    /// Apply the conventional provider environment variables.
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a key set in a file.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Some(key) = get("MISTRAL_API_KEY") {
            self.mistral.api_key = Some(key);
        }
        if let Some(key) = get("DEEPL_API_KEY") {
            self.deepl.api_key = Some(key);
        }
        if let Some(key) = get("LIBRETRANSLATE_API_KEY") {
            self.libretranslate.api_key = Some(key);
        }
        if let Some(url) = get("LIBRETRANSLATE_URL") {
            self.libretranslate.api_base = Some(url);
        }
        if let Some(email) = get("MYMEMORY_EMAIL") {
            self.mymemory.email = Some(email);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(Error::ConfigInvalid {
                field: "request_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.gemini.models.is_empty() {
            return Err(Error::ConfigInvalid {
                field: "gemini.models".to_string(),
                reason: "at least one model is required".to_string(),
            });
        }
        if self.mistral.models.is_empty() {
            return Err(Error::ConfigInvalid {
                field: "mistral.models".to_string(),
                reason: "at least one model is required".to_string(),
            });
        }
        for (field, chain) in [
            ("providers", &self.providers),
            ("selection_providers", &self.selection_providers),
        ] {
            for (i, kind) in chain.iter().enumerate() {
                if chain[..i].contains(kind) {
                    return Err(Error::ConfigInvalid {
                        field: field.to_string(),
                        reason: format!("provider '{kind}' listed twice"),
                    });
                }
            }
        }
        Ok(())
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.default_target_lang.as_str(), "Finnish");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.providers[0], ProviderKind::Gemini);
        assert_eq!(config.providers[1], ProviderKind::Mistral);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lang_name_and_code() {
        assert_eq!(Lang::new("fi").display_name(), "Finnish");
        assert_eq!(Lang::new("finnish").code(), "fi");
        assert_eq!(Lang::new("Klingon").display_name(), "Klingon");
        assert_eq!(Lang::new("Klingon").code(), "klingon");
        assert!(Lang::new("English").is_english());
        assert!(!Lang::new("Swedish").is_english());
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("DeepL".parse::<ProviderKind>().ok(), Some(ProviderKind::DeepL));
        assert_eq!(" mymemory ".parse::<ProviderKind>().ok(), Some(ProviderKind::MyMemory));
        assert!("babelfish".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config = AppConfig::from_toml_str(
            r#"
            default_target_lang = "Swedish"
            default_level = "a2"
            request_timeout_secs = 5
            providers = ["mistral", "mymemory"]

            [mistral]
            api_key = "m-key"
            models = ["open-mistral-nemo"]
            "#,
        )
        .unwrap();

        assert_eq!(config.default_target_lang.as_str(), "Swedish");
        assert_eq!(config.default_level, Level::A2);
        assert_eq!(config.providers, vec![ProviderKind::Mistral, ProviderKind::MyMemory]);
        assert_eq!(config.mistral.models, vec!["open-mistral-nemo".to_string()]);
        assert_eq!(config.mistral.api_base, "https://api.mistral.ai/v1");
        assert_eq!(config.gemini.models.len(), 2);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = AppConfig::from_toml_str(r#"providers = ["babelfish"]"#).unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }

    #[test]
    fn test_duplicate_provider_rejected() {
        let err = AppConfig::from_toml_str(r#"providers = ["gemini", "gemini"]"#).unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { ref field, .. } if field == "providers"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(AppConfig::from_toml_str("request_timeout_secs = 0").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[deepl]\napi_key = \"abc:fx\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.deepl.resolved_api_base(), "https://api-free.deepl.com");
        assert!(AppConfig::from_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GEMINI_API_KEY", "g-key"),
            ("MISTRAL_API_KEY", "   "),
            ("LIBRETRANSLATE_URL", "http://localhost:5000"),
        ]);
        let mut config = AppConfig::default();
        config.mistral.api_key = Some("from-file".to_string());

        config.apply_env_overrides(|k| env.get(k).map(ToString::to_string));

        assert_eq!(config.gemini.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.mistral.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.libretranslate.api_base.as_deref(), Some("http://localhost:5000"));
    }

    #[test]
    fn test_layered_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(
            &path,
            "request_timeout_secs = 12\ndefault_target_lang = \"Swedish\"\n\n[mistral]\nmodels = [\"open-mistral-nemo\"]\n",
        )
        .unwrap();

        let env = config::Map::from([
            ("TRANSLATE_RELAY__PROVIDERS".to_string(), "mistral,mymemory".to_string()),
            ("TRANSLATE_RELAY__DEFAULT_LEVEL".to_string(), "a2".to_string()),
        ]);
        let keys: HashMap<&str, &str> = HashMap::from([("MISTRAL_API_KEY", "m-key")]);

        let config = AppConfig::load_layered(Some(&path), None, Some(env), |k| {
            keys.get(k).map(ToString::to_string)
        })
        .unwrap();

        // File over defaults, nested sections merged
        assert_eq!(config.request_timeout_secs, 12);
        assert_eq!(config.default_target_lang.as_str(), "Swedish");
        assert_eq!(config.mistral.models, vec!["open-mistral-nemo".to_string()]);
        assert_eq!(config.gemini.models, default_gemini_models());

        // Prefixed environment over the file
        assert_eq!(config.providers, vec![ProviderKind::Mistral, ProviderKind::MyMemory]);
        assert_eq!(config.default_level, Level::A2);
        assert_eq!(config.selection_providers, default_selection_providers());

        assert_eq!(config.mistral.api_key.as_deref(), Some("m-key"));
    }

    #[test]
    fn test_layered_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load_layered(
            Some(&dir.path().join("missing.toml")),
            None,
            Some(config::Map::new()),
            |_| None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }

    #[test]
    fn test_deepl_paid_host() {
        let config = DeepLConfig {
            api_key: Some("paid-key".to_string()),
            api_base: None,
        };
        assert_eq!(config.resolved_api_base(), "https://api.deepl.com");
    }
}
