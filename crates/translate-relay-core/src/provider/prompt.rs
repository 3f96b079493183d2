use crate::request::{Level, TranslationRequest};

/// Prompt shared by the generative adapters.
///
/// Asks for JSON so [`crate::normalize::normalize`] can pull the fields out.
pub fn build_prompt(request: &TranslationRequest) -> String {
    let target = request.target_language();
    let language = target.display_name();
    let level = request.level();

    let register = if level.is_cefr() {
        format!("at CEFR {level} level")
    } else {
        "in simplified, plain-language form".to_string()
    };

    let output_shape = if target.is_english() {
        r#"{"translated": "translation text"}"#
    } else {
        r#"{"translated": "translation text", "englishBackTranslation": "English rendering of your translation"}"#
    };

    format!(
        "Translate to {language} {register}:\n\n\"{text}\"\n\n{guidance}\n\nOutput ONLY valid JSON:\n{output_shape}",
        text = request.text(),
        guidance = level_guidance(level),
    )
}

fn level_guidance(level: Level) -> &'static str {
    match level {
        Level::A1 => "Use very simple words and short sentences.",
        Level::A2 => "Use simple everyday vocabulary and short sentences.",
        Level::B1 | Level::B2 => "Use more complex vocabulary where natural.",
        Level::C1 | Level::C2 => "Use natural, idiomatic language with a full vocabulary.",
        Level::Simplified => "Use simplified vocabulary with short, clear sentences.",
    }
}
