use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    /// Gaussian noise standard deviation in LSB
    pub awgn_std: Option<f32>,
    /// Constant offset added to every sample
    pub dc_offset: Option<i16>,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_awgn(mut self, std_dev: f32) -> Self {
        self.awgn_std = Some(std_dev);
        self
    }

    pub fn with_dc_offset(mut self, offset: i16) -> Self {
        self.dc_offset = Some(offset);
        self
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Mean square sample value
pub fn signal_power(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / samples.len() as f64
}

/// Add impairments in place, saturating at the 16-bit range.
pub fn apply_noise(samples: &mut [i16], config: &NoiseConfig) {
    let mut rng = create_rng(config.seed);

    if let Some(std_dev) = config.awgn_std.filter(|s| *s > 0.0) {
        let normal = match Normal::new(0.0, std_dev as f64) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("Skipping AWGN: {}", e);
                return;
            }
        };
        for sample in samples.iter_mut() {
            let noisy = *sample as f64 + normal.sample(&mut rng);
            *sample = noisy.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        }
    }

    if let Some(offset) = config.dc_offset {
        for sample in samples.iter_mut() {
            *sample = sample.saturating_add(offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_seeded_noise_reproducible() {
        let config = NoiseConfig::default().with_seed(7).with_awgn(100.0);
        let mut a = vec![0i16; 256];
        let mut b = vec![0i16; 256];
        apply_noise(&mut a, &config);
        apply_noise(&mut b, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_noise_power_close_to_variance() {
        let config = NoiseConfig::default().with_seed(1).with_awgn(100.0);
        let mut samples = vec![0i16; 20000];
        apply_noise(&mut samples, &config);
        let power = signal_power(&samples);
        assert_relative_eq!(power, 10000.0, max_relative = 0.1);
    }

    #[test]
    fn test_dc_offset_saturates() {
        let config = NoiseConfig::default().with_dc_offset(10);
        let mut samples = vec![i16::MAX, 0, -5];
        apply_noise(&mut samples, &config);
        assert_eq!(samples, vec![i16::MAX, 10, 5]);
    }

    #[test]
    fn test_no_config_no_change() {
        let mut samples = vec![1, -2, 3];
        apply_noise(&mut samples, &NoiseConfig::default());
        assert_eq!(samples, vec![1, -2, 3]);
    }
}
