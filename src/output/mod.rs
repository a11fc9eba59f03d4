mod csv;
mod json;
mod text;

use chrono::Utc;
use rolling_stats::Stats;
use serde::Serialize;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Summary statistics of the output sample values
#[derive(Debug, Clone, Serialize)]
pub struct LevelSummary {
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
}

impl LevelSummary {
    pub fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

/// Outcome of running one input through a stream processor
#[derive(Debug, Clone, Serialize)]
pub struct StreamReport {
    pub ts: String,
    pub input: String,
    pub stage: String,
    pub decimation_factor: u32,
    pub input_rate: u32,
    pub output_rate: u32,
    pub blocks: u64,
    pub samples_in: u64,
    pub samples_out: u64,
    pub elapsed_ms: f64,
    pub level: Option<LevelSummary>,
}

pub trait Formatter: Send {
    fn format(&self, report: &StreamReport) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
pub(crate) fn sample_report() -> StreamReport {
    StreamReport {
        ts: "2024-01-01T00:00:00.000Z".to_string(),
        input: "capture.wav".to_string(),
        stage: "fir_12_19".to_string(),
        decimation_factor: 6,
        input_rate: 12_000_000,
        output_rate: 2_000_000,
        blocks: 3,
        samples_in: 600,
        samples_out: 100,
        elapsed_ms: 1.5,
        level: Some(LevelSummary {
            mean: 12.5,
            std_dev: 2.0,
            min: 3.0,
            max: 40.0,
        }),
    }
}
