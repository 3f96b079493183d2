//! Translate Relay CLI - translate learner text from the command line.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use translate_relay_core::{AppConfig, ProviderResult, TranslationOrchestrator, TranslationRequest};

#[derive(Parser, Debug)]
#[command(name = "translate-relay")]
#[command(author, version, about = "Translate text through a chain of providers", long_about = None)]
struct Args {
    /// Text to translate
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    text: Option<String>,

    /// Translate each non-empty line of a file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Target language (default from config)
    #[arg(short, long)]
    target: Option<String>,

    /// Proficiency level: A1-C2 or simplified (default from config)
    #[arg(short, long)]
    level: Option<String>,

    /// Use the quick selection chain instead of the main chain
    #[arg(long)]
    selection: bool,

    /// Print results as JSON lines
    #[arg(long)]
    json: bool,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Non-empty, trimmed lines of a batch input file.
fn read_texts(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect())
}

fn render(request: &TranslationRequest, result: &ProviderResult, json: bool) -> String {
    if json {
        serde_json::json!({
            "original": request.text(),
            "translated": result.translated_text,
            "englishBackTranslation": result.back_translation,
            "model": result.model,
            "provider": result.provider_name,
            "targetLanguage": request.target_language().as_str(),
            "level": request.level().as_str(),
        })
        .to_string()
    } else {
        match &result.back_translation {
            Some(back) => format!("{}\n  ({})", result.translated_text, back),
            None => result.translated_text.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let orchestrator = if args.selection {
        TranslationOrchestrator::selection_from_config(&config)
    } else {
        TranslationOrchestrator::from_config(&config)
    }
    .context("Failed to build provider chain")?;

    let texts = match (&args.text, &args.file) {
        (Some(text), _) => vec![text.clone()],
        (None, Some(path)) => read_texts(path)?,
        (None, None) => anyhow::bail!("Provide text or --file"),
    };

    if texts.is_empty() {
        anyhow::bail!("Nothing to translate");
    }

    let requests = texts
        .iter()
        .map(|text| {
            TranslationRequest::with_defaults(
                Some(text),
                args.level.as_deref(),
                args.target.as_deref(),
                config.default_level,
                &config.default_target_lang,
            )
        })
        .collect::<translate_relay_core::Result<Vec<_>>>()
        .context("Invalid input")?;

    // Single texts print directly; batches get a progress bar
    if requests.len() == 1 {
        let result = orchestrator.translate(&requests[0]).await?;
        #[allow(clippy::print_stdout)]
        {
            println!("{}", render(&requests[0], &result, args.json));
        }
        return Ok(());
    }

    info!("Translating {} texts", requests.len());

    #[allow(clippy::cast_possible_truncation)]
    let pb = ProgressBar::new(requests.len() as u64);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut failed = 0usize;
    for (index, request) in requests.iter().enumerate() {
        pb.set_message(format!("Line {}", index + 1));

        match orchestrator.translate(request).await {
            Ok(result) => pb.println(render(request, &result, args.json)),
            Err(e) => {
                failed += 1;
                pb.println(format!("Line {}: {}", index + 1, e));
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Translation complete");

    if failed > 0 {
        anyhow::bail!("{} of {} texts failed to translate", failed, requests.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use translate_relay_core::{Lang, Level};

    #[test]
    fn test_read_texts_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Hello\n\n   \n  Good morning  ").unwrap();

        let texts = read_texts(file.path()).unwrap();
        assert_eq!(texts, vec!["Hello", "Good morning"]);
    }

    #[test]
    fn test_read_texts_missing_file() {
        assert!(read_texts(Path::new("/nonexistent/input.txt")).is_err());
    }

    #[test]
    fn test_render_plain_and_json() {
        let request = TranslationRequest::new("Hello", Level::A2, Lang::new("Finnish")).unwrap();
        let result = ProviderResult {
            translated_text: "Hei".to_string(),
            back_translation: Some("Hi".to_string()),
            provider_name: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
        };

        assert_eq!(render(&request, &result, false), "Hei\n  (Hi)");

        let json: serde_json::Value = serde_json::from_str(&render(&request, &result, true)).unwrap();
        assert_eq!(json["translated"], "Hei");
        assert_eq!(json["provider"], "gemini");
        assert_eq!(json["level"], "A2");
        assert_eq!(json["targetLanguage"], "Finnish");
    }
}
