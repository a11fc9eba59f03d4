use std::path::Path;

use hound::{WavSpec, WavWriter};

/// Write 16-bit PCM samples. `channels` = 2 stores IQ pairs interleaved.
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;

    for &sample in samples {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    Ok(())
}
