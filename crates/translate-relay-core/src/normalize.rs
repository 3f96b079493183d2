//! Normalization of generative-model output into translation text.
//!
//! Models asked for `{"translated": ...}` answer in many shapes: bare JSON,
//! JSON inside a markdown fence, JSON whose value is itself encoded JSON,
//! or plain prose. Everything funnels through [`normalize`].

use serde_json::{Map, Value};

use crate::config::Lang;

/// Maximum number of nested decode steps before a string is taken as-is.
pub const MAX_UNWRAP_DEPTH: usize = 4;

/// Top-level keys that hold the translation, in priority order.
const TRANSLATED_KEYS: &[&str] = &[
    "translated",
    "translation",
    "translatedText",
    "translated_text",
    "text",
    "content",
];

/// Top-level keys that hold the English back-translation.
const BACK_TRANSLATION_KEYS: &[&str] = &[
    "englishBackTranslation",
    "backTranslation",
    "back_translation",
    "english",
];

/// Keys looked up inside a nested object value.
const NESTED_KEYS: &[&str] = &["text", "translated", "content"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub translated: String,
    pub back_translation: Option<String>,
}

impl Normalized {
    fn verbatim(cleaned: &str) -> Self {
        Self {
            translated: cleaned.to_string(),
            back_translation: None,
        }
    }
}

/// Strip a surrounding markdown code fence, if any.
///
/// The opening fence may carry a language tag (```` ```json ````), either on
/// its own line or directly in front of a single-line body.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    let (tag, after) = rest.split_at(tag_len);

    let rest = if tag.is_empty() {
        rest
    } else if after.starts_with('\n') || after.starts_with("\r\n") {
        after
    } else {
        // Same line: only drop the word when it is clearly a tag, so a
        // fenced one-word translation survives.
        let body = after.trim_start();
        if tag.eq_ignore_ascii_case("json") || body.is_empty() || body.starts_with(['{', '[', '"']) {
            body
        } else {
            rest
        }
    };

    let rest = rest.trim_end();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Normalize a raw model payload.
///
/// `target` lets a reply keyed by the language name (`{"finnish": ...}`)
/// be recognised.
pub fn normalize(raw: &str, target: &Lang) -> Normalized {
    let cleaned = strip_code_fence(raw);

    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(map)) => {
            let language_key = target.display_name().to_lowercase();
            let Some(value) = find_key(&map, TRANSLATED_KEYS.iter().copied())
                .or_else(|| find_key(&map, std::iter::once(language_key.as_str())))
            else {
                return Normalized::verbatim(cleaned);
            };

            let back_translation = if target.is_english() {
                None
            } else {
                find_key(&map, BACK_TRANSLATION_KEYS.iter().copied())
                    .map(|v| extract_text(v, 0).trim().to_string())
                    .filter(|s| !s.is_empty())
            };

            Normalized {
                translated: extract_text(value, 0).trim().to_string(),
                back_translation,
            }
        }
        Ok(Value::String(s)) => Normalized {
            translated: unwrap_string(&s, 1).trim().to_string(),
            back_translation: None,
        },
        _ => Normalized::verbatim(cleaned),
    }
}

fn find_key<'a, 'k>(
    map: &'a Map<String, Value>,
    keys: impl IntoIterator<Item = &'k str>,
) -> Option<&'a Value> {
    keys.into_iter().find_map(|wanted| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(wanted))
            .map(|(_, v)| v)
    })
}

fn extract_text(value: &Value, depth: usize) -> String {
    match value {
        Value::String(s) => unwrap_string(s, depth),
        Value::Object(map) if depth < MAX_UNWRAP_DEPTH => {
            find_key(map, NESTED_KEYS.iter().copied())
                .map_or_else(|| value.to_string(), |inner| extract_text(inner, depth + 1))
        }
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A string that itself decodes to a JSON string or object is unwrapped again.
fn unwrap_string(s: &str, depth: usize) -> String {
    if depth >= MAX_UNWRAP_DEPTH {
        return s.to_string();
    }
    match serde_json::from_str::<Value>(strip_code_fence(s)) {
        Ok(inner @ (Value::String(_) | Value::Object(_))) => extract_text(&inner, depth + 1),
        _ => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fi() -> Lang {
        Lang::new("Finnish")
    }

    #[test]
    fn test_fenced_json() {
        let out = normalize("```json\n{\"translated\":\"Hei\"}\n```", &fi());
        assert_eq!(out.translated, "Hei");
        assert_eq!(out.back_translation, None);
    }

    #[test]
    fn test_fence_without_tag() {
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```Hei```"), "Hei");
        assert_eq!(strip_code_fence("  plain  "), "plain");
    }

    #[test]
    fn test_single_line_fence_with_tag() {
        let out = normalize("```json {\"translated\":\"Hei\"}```", &fi());
        assert_eq!(out.translated, "Hei");
        assert_eq!(strip_code_fence("```JSON{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```Hei maailma```"), "Hei maailma");
    }

    #[test]
    fn test_fence_with_only_tag_is_empty() {
        assert_eq!(strip_code_fence("```json"), "");
        assert_eq!(strip_code_fence("```json\n```"), "");
        assert_eq!(normalize("```json", &fi()).translated, "");
    }

    #[test]
    fn test_recursive_unwrap() {
        let out = normalize(r#"{"translated": "{\"text\":\"Hei\"}"}"#, &fi());
        assert_eq!(out.translated, "Hei");
    }

    #[test]
    fn test_nested_object_value() {
        let out = normalize(r#"{"translated": {"content": "Moi"}}"#, &fi());
        assert_eq!(out.translated, "Moi");
    }

    #[test]
    fn test_plain_text_verbatim() {
        let out = normalize("  Hyvää huomenta!  ", &fi());
        assert_eq!(out.translated, "Hyvää huomenta!");
    }

    #[test]
    fn test_object_without_known_key_is_verbatim() {
        let raw = r#"{"foo": "bar"}"#;
        assert_eq!(normalize(raw, &fi()).translated, raw);
    }

    #[test]
    fn test_language_named_key() {
        let out = normalize(r#"{"Finnish": "Kiitos"}"#, &fi());
        assert_eq!(out.translated, "Kiitos");
    }

    #[test]
    fn test_back_translation() {
        let out = normalize(
            r#"{"translated": "Kiitos", "englishBackTranslation": "Thank you"}"#,
            &fi(),
        );
        assert_eq!(out.translated, "Kiitos");
        assert_eq!(out.back_translation.as_deref(), Some("Thank you"));
    }

    #[test]
    fn test_no_back_translation_for_english_target() {
        let out = normalize(r#"{"english": "Thanks"}"#, &Lang::new("en"));
        assert_eq!(out.translated, "Thanks");
        assert_eq!(out.back_translation, None);
    }

    #[test]
    fn test_json_string_payload() {
        assert_eq!(normalize(r#""Hei""#, &fi()).translated, "Hei");
    }

    #[test]
    fn test_numeric_looking_text_kept() {
        assert_eq!(normalize(r#"{"translated": "1e2"}"#, &fi()).translated, "1e2");
    }

    #[test]
    fn test_null_translation_is_empty() {
        assert!(normalize(r#"{"translated": null}"#, &fi()).translated.is_empty());
    }

    #[test]
    fn test_recursion_is_bounded() {
        // Each level wraps the previous one as an encoded JSON string.
        let mut payload = Value::String("Hei".to_string());
        for _ in 0..10 {
            payload = Value::String(serde_json::json!({ "text": payload }).to_string());
        }
        let raw = serde_json::json!({ "translated": payload }).to_string();

        let out = normalize(&raw, &fi());
        assert_ne!(out.translated, "Hei");
        assert!(out.translated.contains("text"));
    }
}
