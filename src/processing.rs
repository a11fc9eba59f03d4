use crate::bits::format_bits;
use crate::config::StreamConfig;
use crate::decimate::{DecimationMethod, decimate};
use crate::error::Result;
use crate::fir::{FilterContext, FilterRegistry};

enum Stage {
    Filter(FilterContext),
    Decimate {
        method: DecimationMethod,
        factor: usize,
        threshold: i16,
    },
}

/// Runs a configured filter or decimator over successive sample blocks.
pub struct StreamProcessor {
    stage: Stage,
    buffer_size: usize,
    samples_in: u64,
    samples_out: u64,
    blocks: u64,
}

impl StreamProcessor {
    pub fn new(config: &StreamConfig) -> Result<Self> {
        Self::with_registry(config, FilterRegistry::builtin())
    }

    pub fn with_registry(config: &StreamConfig, registry: &FilterRegistry) -> Result<Self> {
        config.validate(registry)?;

        let stage = match config.method {
            Some(method) => Stage::Decimate {
                method,
                factor: config.decimation_factor as usize,
                threshold: config.threshold,
            },
            None => Stage::Filter(FilterContext::with_registry(
                registry,
                &config.filter,
                config.decimation_factor,
            )?),
        };

        Ok(Self {
            stage,
            buffer_size: config.buffer_size,
            samples_in: 0,
            samples_out: 0,
            blocks: 0,
        })
    }

    /// Process one block in place and truncate it to the output length.
    pub fn process_block(&mut self, block: &mut Vec<i16>) {
        let input_len = block.len();
        let output_len = match &mut self.stage {
            Stage::Filter(ctx) => ctx.process_buffer(block),
            Stage::Decimate {
                method,
                factor,
                threshold,
            } => decimate(*method, block, *factor, *threshold),
        };
        block.truncate(output_len);

        self.samples_in += input_len as u64;
        self.samples_out += output_len as u64;
        self.blocks += 1;

        if log::log_enabled!(log::Level::Trace) {
            if let Some(&first) = block.first() {
                log::trace!(
                    "Block {}: {} -> {} samples, first output {} ({})",
                    self.blocks,
                    input_len,
                    output_len,
                    first,
                    format_bits(first)
                );
            }
        }
    }

    /// Process a whole signal in `buffer_size` chunks.
    ///
    /// Chunks should be multiples of the decimation factor; otherwise every
    /// chunk restarts the keep-first phase.
    pub fn process_signal(&mut self, samples: &[i16]) -> Vec<i16> {
        let mut output = Vec::with_capacity(samples.len());
        for chunk in samples.chunks(self.buffer_size) {
            let mut block = chunk.to_vec();
            self.process_block(&mut block);
            output.extend_from_slice(&block);
        }
        output
    }

    /// Clear filter history and counters.
    pub fn reset(&mut self) {
        if let Stage::Filter(ctx) = &mut self.stage {
            ctx.reset();
        }
        self.samples_in = 0;
        self.samples_out = 0;
        self.blocks = 0;
    }

    /// Filter template name, or the decimation method when running standalone
    pub fn stage_name(&self) -> String {
        match &self.stage {
            Stage::Filter(ctx) => ctx.template().name().to_string(),
            Stage::Decimate { method, .. } => format!("{:?}", method),
        }
    }

    pub fn filter_context(&self) -> Option<&FilterContext> {
        match &self.stage {
            Stage::Filter(ctx) => Some(ctx),
            Stage::Decimate { .. } => None,
        }
    }

    pub fn samples_in(&self) -> u64 {
        self.samples_in
    }

    pub fn samples_out(&self) -> u64 {
        self.samples_out
    }

    pub fn blocks(&self) -> u64 {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_stage_counts() {
        let config = StreamConfig {
            filter: "box_4".to_string(),
            decimation_factor: 2,
            buffer_size: 8,
            ..Default::default()
        };
        let mut processor = StreamProcessor::new(&config).unwrap();
        let signal = vec![100i16; 20];
        let output = processor.process_signal(&signal);

        assert_eq!(output.len(), 10);
        assert_eq!(processor.samples_in(), 20);
        assert_eq!(processor.samples_out(), 10);
        assert_eq!(processor.blocks(), 3);
        assert_eq!(*output.last().unwrap(), 100);
        assert_eq!(processor.stage_name(), "box_4");
    }

    #[test]
    fn test_chunking_matches_single_pass() {
        let config = StreamConfig {
            filter: "fir_12_19".to_string(),
            decimation_factor: 4,
            buffer_size: 64,
            ..Default::default()
        };
        let signal: Vec<i16> = (0..1000).map(|i| ((i * 7919) % 20001 - 10000) as i16).collect();

        let mut chunked = StreamProcessor::new(&config).unwrap();
        let chunked_out = chunked.process_signal(&signal);

        let mut ctx = FilterContext::new("fir_12_19", 4).unwrap();
        let mut whole = signal.clone();
        let len = ctx.process_buffer(&mut whole);
        whole.truncate(len);

        assert_eq!(chunked_out, whole);
    }

    #[test]
    fn test_decimate_stage() {
        let config = StreamConfig {
            method: Some(DecimationMethod::MaxMagnitude),
            decimation_factor: 3,
            ..Default::default()
        };
        let mut processor = StreamProcessor::new(&config).unwrap();
        assert!(processor.filter_context().is_none());
        let mut block = vec![1, -5, 3, 2, -9, 0];
        processor.process_block(&mut block);
        assert_eq!(block, vec![5, 9]);
    }

    #[test]
    fn test_average_template_uses_its_own_threshold() {
        let config = StreamConfig {
            filter: "avg_mag".to_string(),
            decimation_factor: 2,
            threshold: 1000,
            ..Default::default()
        };
        let mut processor = StreamProcessor::new(&config).unwrap();
        let mut block = vec![5, -7, 100, 300];
        processor.process_block(&mut block);
        assert_eq!(block, vec![6, 200]);
    }

    #[test]
    fn test_reset() {
        let config = StreamConfig {
            filter: "box_4".to_string(),
            ..Default::default()
        };
        let mut processor = StreamProcessor::new(&config).unwrap();
        let mut block = vec![400; 4];
        processor.process_block(&mut block);
        processor.reset();
        assert_eq!(processor.samples_in(), 0);

        let mut block = vec![400];
        processor.process_block(&mut block);
        assert_eq!(block, vec![100]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = StreamConfig {
            filter: "missing".to_string(),
            ..Default::default()
        };
        assert!(StreamProcessor::new(&config).is_err());
    }
}
