use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, warn};

use voice_scribe_lib::{
    ClassifyServiceClient, Config, LocalClassifier, NoteFields, RemoteClassifier, ReviewSession,
    UtteranceClassifier,
};

/// Classify a clinical transcript into complaints and advice
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transcript file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Language code sent with the analysis (e.g., "en", "hi")
    #[arg(short, long)]
    language: Option<String>,

    /// Classification service base URL (local rules when omitted)
    #[arg(long)]
    service_url: Option<String>,

    /// Bearer token for the classification service
    #[arg(long, env = "VOICE_SCRIBE_API_KEY")]
    api_key: Option<String>,

    /// Relabel unrecognized service labels from instruction signals
    #[arg(long)]
    refine: bool,

    /// Minimum model confidence (0.0 - 1.0)
    #[arg(long)]
    threshold: Option<f64>,

    /// Attach concept candidates to complaints
    #[arg(long)]
    concepts: bool,

    /// Submit results and print the merged note fields
    #[arg(long)]
    submit: bool,

    /// Existing follow-up text to merge advice into (with --submit)
    #[arg(long)]
    follow_up: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Persist the effective settings to the config file
    #[arg(long)]
    save_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr keeps stdout clean for --json)
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = effective_config(&args);
    if args.save_config {
        config.save()?;
        info!("Settings saved");
    }

    let transcript = read_transcript(args.input.as_ref())?;
    let classifier = build_classifier(&config)?;
    info!("Using {} classifier", classifier.name());

    let mut session = ReviewSession::new(config.session_options());
    session.set_transcript(transcript);
    session.analyze(classifier.as_ref()).await?;

    let results = session.results().unwrap_or_default();
    if args.json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        for item in results {
            let negated = if item.negated { " (negated)" } else { "" };
            println!("{:<9} {}{}", item.class.as_str(), item.text, negated);
            for concept in &item.concepts {
                println!("          {} {} [{}]", concept.code, concept.display, concept.match_text);
            }
        }
    }

    if args.submit {
        if !session.can_submit() {
            warn!("Nothing to submit");
            eprintln!("No complaint or advice items to submit.");
            return Ok(());
        }
        let payload = session.submit()?;
        let mut note = NoteFields::default();
        if let Some(path) = &args.follow_up {
            note.follow_up_text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
        }
        let summary = note.apply_submission(&payload);
        info!("{} rows added", summary.rows_added);

        if args.json {
            println!("{}", serde_json::to_string_pretty(&note)?);
        } else {
            println!("\nChief complaints:");
            for row in &note.chief_complaint_rows {
                println!("  {}", row.symptom);
            }
            println!("\nFollow-up:\n{}", note.follow_up_text);
        }
    }

    Ok(())
}

fn effective_config(args: &Args) -> Config {
    let mut config = Config::load_or_default();
    if let Some(language) = &args.language {
        config.language = language.clone();
    }
    if let Some(url) = &args.service_url {
        config.classifier_url = Some(url.clone());
    }
    if let Some(key) = &args.api_key {
        config.classifier_api_key = key.clone();
    }
    if let Some(threshold) = args.threshold {
        config.confidence_threshold = threshold;
    }
    config.refine_service_labels |= args.refine;
    config.with_concepts |= args.concepts;
    config
}

fn read_transcript(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read transcript from stdin")?;
            Ok(buf)
        }
    }
}

fn build_classifier(config: &Config) -> Result<Box<dyn UtteranceClassifier>> {
    match &config.classifier_url {
        Some(url) => {
            let client = ClassifyServiceClient::new(url, &config.classifier_api_key)?;
            Ok(Box::new(RemoteClassifier::new(
                client,
                config.refine_service_labels,
                config.with_concepts,
            )))
        }
        None => Ok(Box::new(LocalClassifier::rules(config.hybrid_options()))),
    }
}
