use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use magfir::save_wav;
use magfir::simulation::{NoiseConfig, apply_noise, generate_message_iq};

#[derive(Parser, Debug)]
#[command(name = "generate_samples")]
#[command(about = "Generate synthetic 16-bit IQ pulse bursts for filter testing")]
struct Args {
    /// Output WAV file (stereo, I = left, Q = right)
    #[arg(short, long, default_value = "synth_iq.wav")]
    output: PathBuf,

    /// TOML noise configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Message payload as hex bytes
    #[arg(short, long, default_value = "8d4840d6202cc371c32ce0576098")]
    payload: String,

    /// Number of messages
    #[arg(short, long, default_value_t = 10)]
    messages: u32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 12_000_000)]
    sample_rate: u32,

    /// Pulse amplitude in LSB
    #[arg(short, long, default_value_t = 8000.0)]
    amplitude: f32,

    /// Carrier offset from centre in Hz
    #[arg(long, default_value_t = 250_000.0)]
    offset_hz: f32,

    /// Silence before and after each message in microseconds
    #[arg(long, default_value_t = 50.0)]
    gap_us: f32,

    /// Gaussian noise standard deviation in LSB (CLI override)
    #[arg(long)]
    noise: Option<f32>,

    /// Seed for reproducibility (CLI override)
    #[arg(short, long)]
    seed: Option<u64>,
}

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        anyhow::bail!("payload must have an even number of hex digits");
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            let pair = s.get(i..i + 2).context("payload must be ASCII hex")?;
            u8::from_str_radix(pair, 16).with_context(|| format!("invalid hex byte '{}'", pair))
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut noise = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str::<NoiseConfig>(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => NoiseConfig::default(),
    };
    if let Some(std_dev) = args.noise {
        noise.awgn_std = Some(std_dev);
    }
    if let Some(seed) = args.seed {
        noise.seed = Some(seed);
    }

    let payload = parse_hex(&args.payload)?;
    let mut samples = Vec::new();
    for _ in 0..args.messages {
        samples.extend(generate_message_iq(
            args.sample_rate,
            &payload,
            args.amplitude,
            args.offset_hz,
            args.gap_us,
        ));
    }
    apply_noise(&mut samples, &noise);

    save_wav(&args.output, &samples, args.sample_rate, 2)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "Wrote {} IQ samples ({} messages) to {}",
        samples.len() / 2,
        args.messages,
        args.output.display()
    );
    Ok(())
}
