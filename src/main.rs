use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use rolling_stats::Stats;

use magfir::config::StreamConfig;
use magfir::decimate::DecimationMethod;
use magfir::fir::FilterRegistry;
use magfir::output::{LevelSummary, OutputFormat, StreamReport, create_formatter, iso8601_timestamp};
use magfir::source::{RawSampleSource, SampleSource, ThreadedSource, WavSampleSource};
use magfir::{StreamProcessor, save_wav};

#[derive(Parser, Debug)]
#[command(name = "magfir")]
#[command(
    about = "Rectifying FIR filter and decimator for 16-bit sample streams",
    long_about = None
)]
struct Args {
    /// Input files (16-bit WAV, or raw little-endian i16 with --raw)
    #[arg(required_unless_present = "list_filters")]
    files: Vec<PathBuf>,

    /// TOML stream configuration; command-line flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Filter template name
    #[arg(short = 'F', long)]
    filter: Option<String>,

    /// Keep 1 of every N samples (0 = no decimation)
    #[arg(short, long)]
    decimation: Option<u32>,

    /// Use a standalone decimator instead of the filter
    #[arg(short, long, value_enum)]
    method: Option<DecimationMethod>,

    /// Magnitude threshold for `--method average-magnitude`. Filter templates
    /// with built-in average decimation use their own threshold.
    #[arg(long, allow_hyphen_values = true)]
    threshold: Option<i16>,

    /// Samples per processing block
    #[arg(short, long)]
    buffer_size: Option<usize>,

    /// Treat inputs as raw little-endian i16
    #[arg(long)]
    raw: bool,

    /// Sample rate of raw inputs in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Write processed samples to this WAV file (single input only)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format: text, json, csv
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// List available filter templates and exit
    #[arg(short, long)]
    list_filters: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let registry = FilterRegistry::builtin();

    if args.list_filters {
        print_filters(registry);
        return Ok(());
    }

    let config = build_config(&args)?;
    config
        .validate(registry)
        .context("invalid stream configuration")?;

    if args.output.is_some() && args.files.len() > 1 {
        anyhow::bail!("--output needs exactly one input file");
    }

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    for path in &args.files {
        let report = run_file(path, &config, &args)
            .with_context(|| format!("failed to process {}", path.display()))?;
        println!("{}", formatter.format(&report));
    }

    Ok(())
}

fn build_config(args: &Args) -> anyhow::Result<StreamConfig> {
    let mut config = match &args.config {
        Some(path) => StreamConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => StreamConfig::default(),
    };

    if let Some(filter) = &args.filter {
        config.filter = filter.clone();
    }
    if let Some(factor) = args.decimation {
        config.decimation_factor = factor;
    }
    if args.method.is_some() {
        config.method = args.method;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(size) = args.buffer_size {
        config.buffer_size = size;
    }
    if let Some(rate) = args.sample_rate {
        config.sample_rate = rate;
    }

    Ok(config)
}

fn open_source(
    path: &Path,
    config: &StreamConfig,
    raw: bool,
) -> anyhow::Result<(Box<dyn SampleSource>, u16)> {
    if raw {
        let source = RawSampleSource::open(path, config.buffer_size, config.sample_rate)?;
        Ok((Box::new(source), 1))
    } else {
        let source = WavSampleSource::open(path, config.buffer_size)?;
        let channels = source.channels();
        Ok((Box::new(source), channels))
    }
}

fn run_file(path: &Path, base: &StreamConfig, args: &Args) -> anyhow::Result<StreamReport> {
    let (source, channels) = open_source(path, base, args.raw)?;

    let mut config = base.clone();
    config.sample_rate = source.sample_rate();
    let mut processor = StreamProcessor::new(&config)?;
    let mut source = ThreadedSource::spawn(source, 4);

    let mut level: Stats<f32> = Stats::new();
    let mut kept = Vec::new();
    let started = Instant::now();

    while let Some(mut block) = source.next_buffer()? {
        processor.process_block(&mut block);
        for &sample in &block {
            level.update(sample as f32);
        }
        if args.output.is_some() {
            kept.extend_from_slice(&block);
        }
    }

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    log::info!(
        "{}: {} blocks in {:.2} ms",
        path.display(),
        processor.blocks(),
        elapsed_ms
    );

    if let Some(out_path) = &args.output {
        // Interleaved IQ pairs survive only when no samples are dropped.
        let lossless = processor.samples_in() == processor.samples_out();
        let out_channels = if channels == 2 && lossless { 2 } else { 1 };
        save_wav(out_path, &kept, config.output_sample_rate(), out_channels)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        log::info!("Wrote {} samples to {}", kept.len(), out_path.display());
    }

    Ok(StreamReport {
        ts: iso8601_timestamp(),
        input: path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
        stage: processor.stage_name(),
        decimation_factor: config.decimation_factor,
        input_rate: config.sample_rate,
        output_rate: config.output_sample_rate(),
        blocks: processor.blocks(),
        samples_in: processor.samples_in(),
        samples_out: processor.samples_out(),
        elapsed_ms,
        level: LevelSummary::from_stats(&level),
    })
}

fn print_filters(registry: &FilterRegistry) {
    println!(
        "{:<18} {:>4} {:>5}  {:<8} {:<16} description",
        "name", "taps", "shift", "kernel", "buffer"
    );
    for template in registry.templates() {
        println!(
            "{:<18} {:>4} {:>5}  {:<8} {:<16} {}",
            template.name(),
            template.tap_count(),
            template.shift_count(),
            format!("{:?}", template.algorithm()),
            format!("{:?}", template.buffer_variant()),
            template.description()
        );
    }
}
