use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use viseme_rs::{
    AudioSource, GenerationResponse, TieBreakStrategy, VisemeConfig, VisemeGenerator,
    VisemeGeneratorBuilder,
};

#[path = "viseme_report/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TieBreakChoice {
    Random,
    Seeded,
    RoundRobin,
}

impl TieBreakChoice {
    fn strategy(self, seed: u64) -> TieBreakStrategy {
        match self {
            Self::Random => TieBreakStrategy::Random,
            Self::Seeded => TieBreakStrategy::Seeded(seed),
            Self::RoundRobin => TieBreakStrategy::RoundRobin,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Seeded => "seeded",
            Self::RoundRobin => "round-robin",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "viseme_report")]
#[command(about = "Generate Spanish lip-sync viseme sequences from audio and text")]
struct Args {
    /// Audio file path or http(s) URL for a single clip.
    #[arg(long, env = "VISEME_AUDIO", conflicts_with = "cases_file")]
    audio: Option<String>,
    #[arg(long, env = "VISEME_TEXT", default_value = "")]
    text: String,
    /// JSON lines of `{"id", "audio", "text"}`; relative paths resolve
    /// against the file's directory.
    #[arg(long, env = "VISEME_CASES_FILE")]
    cases_file: Option<PathBuf>,
    #[arg(long, env = "VISEME_CONFIG")]
    config: Option<PathBuf>,
    #[arg(
        long,
        env = "VISEME_TIE_BREAK",
        value_enum,
        default_value_t = TieBreakChoice::Random
    )]
    tie_break: TieBreakChoice,
    #[arg(long, env = "VISEME_SEED", default_value_t = 0)]
    seed: u64,
    #[arg(long, env = "VISEME_OUT")]
    out: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Case {
    id: String,
    audio: String,
    #[serde(default)]
    text: String,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        println!("{}", serde_json::json!({ "error": err }));
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), String> {
    let args = Args::parse();

    let config = match args.config.as_deref() {
        Some(path) => VisemeConfig::load(path).map_err(|err| err.to_string())?,
        None => VisemeConfig::default(),
    };
    let sample_rate_hz = config.sample_rate_hz;
    let generator = VisemeGeneratorBuilder::new(config)
        .with_tie_break(args.tie_break.strategy(args.seed))
        .build()
        .map_err(|err| err.to_string())?;

    match (&args.audio, &args.cases_file) {
        (Some(audio), None) => {
            let source = AudioSource::parse(audio).map_err(|err| err.to_string())?;
            let sequence = generator
                .generate_from_source(&source, &args.text)
                .map_err(|err| err.to_string())?;
            json_report_formatter::emit(args.out.as_deref(), &sequence)
        }
        (None, Some(cases_file)) => {
            let report = run_cases(&generator, cases_file, sample_rate_hz, args.tie_break)?;
            json_report_formatter::emit(args.out.as_deref(), &report)
        }
        _ => Err("Provide either --audio or --cases-file.".to_string()),
    }
}

fn run_cases(
    generator: &VisemeGenerator,
    cases_file: &Path,
    sample_rate_hz: u32,
    tie_break: TieBreakChoice,
) -> Result<json_report_formatter::Report, String> {
    let cases = load_cases(cases_file)?;
    if cases.is_empty() {
        return Err(format!("No cases found in '{}'.", cases_file.display()));
    }
    let base_dir = cases_file.parent().unwrap_or_else(|| Path::new("."));

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let mut reports = Vec::with_capacity(cases.len());
    for case in cases {
        progress.set_message(case.id.clone());
        let result = resolve_source(base_dir, &case.audio)
            .and_then(|source| generator.generate_from_source(&source, &case.text));
        if let Err(err) = &result {
            tracing::warn!(case = %case.id, error = %err, "case failed");
        }
        let result = GenerationResponse::from(result);
        let event_count = match &result {
            GenerationResponse::Visemes(sequence) => sequence.events.len(),
            GenerationResponse::Error(_) => 0,
        };
        reports.push(json_report_formatter::CaseReport {
            id: case.id,
            audio: case.audio,
            event_count,
            result,
        });
        progress.inc(1);
    }
    progress.finish_with_message("viseme pass complete");

    let failed_count = reports
        .iter()
        .filter(|r| matches!(r.result, GenerationResponse::Error(_)))
        .count();
    Ok(json_report_formatter::Report {
        schema_version: 1,
        meta: json_report_formatter::Meta {
            generated_at: Utc::now().to_rfc3339(),
            cases_file: cases_file.display().to_string(),
            sample_rate_hz,
            tie_break: tie_break.as_str().to_string(),
            case_count: reports.len(),
            failed_count,
        },
        cases: reports,
    })
}

fn resolve_source(base_dir: &Path, location: &str) -> Result<AudioSource, viseme_rs::VisemeError> {
    match AudioSource::parse(location)? {
        AudioSource::Path(path) if path.is_relative() => Ok(AudioSource::Path(base_dir.join(path))),
        source => Ok(source),
    }
}

fn load_cases(path: &Path) -> Result<Vec<Case>, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read cases file '{}': {err}", path.display()))?;
    data.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<Case>(line).map_err(|err| {
                format!(
                    "Failed to parse case on line {} of '{}': {err}",
                    idx + 1,
                    path.display()
                )
            })
        })
        .collect()
}
