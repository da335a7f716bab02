use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use viseme_rs::GenerationResponse;

#[derive(Debug, Serialize)]
pub struct Meta {
    pub generated_at: String,
    pub cases_file: String,
    pub sample_rate_hz: u32,
    pub tie_break: String,
    pub case_count: usize,
    pub failed_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CaseReport {
    pub id: String,
    pub audio: String,
    pub event_count: usize,
    pub result: GenerationResponse,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub schema_version: u32,
    pub meta: Meta,
    pub cases: Vec<CaseReport>,
}

/// Pretty JSON to `path`, or compact JSON on stdout without one.
pub fn emit<T: Serialize>(path: Option<&Path>, value: &T) -> Result<(), String> {
    match path {
        Some(path) => write_json(path, value),
        None => {
            let json = serde_json::to_string(value)
                .map_err(|err| format!("Failed to serialize output JSON: {err}"))?;
            println!("{json}");
            Ok(())
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create report output directory '{}': {err}",
                parent.display()
            )
        })?;
    }

    let mut file = File::create(path)
        .map_err(|err| format!("Failed to create report file '{}': {err}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, value)
        .map_err(|err| format!("Failed to serialize report JSON '{}': {err}", path.display()))?;
    file.write_all(b"\n")
        .map_err(|err| format!("Failed to finalize report file '{}': {err}", path.display()))?;
    Ok(())
}
