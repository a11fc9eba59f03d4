use std::sync::Arc;

use crate::decimate::decimate_average_magnitude_above_threshold;
use crate::error::{FirError, Result};

use super::history::History;
use super::kernel::{self, Kernel};
use super::registry::FilterRegistry;
use super::template::{BufferVariant, FilterTemplate};

/// Buffer-level strategy, resolved from the template's buffer variant and
/// the context's decimation factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferStrategy {
    /// Filter every sample in place, 1:1
    Filter,
    /// Filter every sample, keep the first of every `factor`
    FilterDecimate(usize),
    /// No filtering; mean magnitude above `threshold` per group of `factor`
    AverageDecimate { factor: usize, threshold: i16 },
    /// Average template without decimation: samples are left untouched
    Passthrough,
}

impl BufferStrategy {
    pub fn resolve(variant: BufferVariant, decimation_factor: u32, threshold: i16) -> Self {
        match (variant, decimation_factor as usize) {
            (BufferVariant::AverageDecimate, 0) => Self::Passthrough,
            (BufferVariant::AverageDecimate, factor) => Self::AverageDecimate { factor, threshold },
            (_, 0) => Self::Filter,
            (_, factor) => Self::FilterDecimate(factor),
        }
    }
}

/// Mutable filtering state for one sample stream.
///
/// A context owns its history and shares its template. It is `Send` but
/// meant for one caller at a time; concurrent streams each need their own.
///
/// # Example
/// ```
/// use magfir::fir::FilterContext;
///
/// let mut ctx = FilterContext::new("box_4", 2).unwrap();
/// let mut buffer = vec![4, -4, 4, -4, 4, -4];
/// let len = ctx.process_buffer(&mut buffer);
/// assert_eq!(len, 3);
/// assert_eq!(&buffer[..len], &[1, 3, 4]);
/// ```
#[derive(Debug, Clone)]
pub struct FilterContext {
    template: Arc<FilterTemplate>,
    history: History,
    decimation_factor: u32,
    kernel: Kernel,
    strategy: BufferStrategy,
}

impl FilterContext {
    /// Create a context bound to a built-in template.
    pub fn new(name: &str, decimation_factor: u32) -> Result<Self> {
        Self::with_registry(FilterRegistry::builtin(), name, decimation_factor)
    }

    /// Create a context bound to a template looked up in `registry`.
    pub fn with_registry(
        registry: &FilterRegistry,
        name: &str,
        decimation_factor: u32,
    ) -> Result<Self> {
        let template = registry
            .get(name)
            .ok_or_else(|| FirError::UnknownFilter(name.to_string()))?;
        Ok(Self::from_template(template, decimation_factor))
    }

    /// Create a context bound to an already validated template.
    pub fn from_template(template: Arc<FilterTemplate>, decimation_factor: u32) -> Self {
        let kernel = Kernel::for_template(&template);
        let strategy = BufferStrategy::resolve(
            template.buffer_variant(),
            decimation_factor,
            template.threshold(),
        );
        log::debug!(
            "Filter context '{}': {} taps, {:?} kernel, {:?}",
            template.name(),
            template.tap_count(),
            kernel,
            strategy
        );

        Self {
            history: History::new(template.tap_count()),
            template,
            decimation_factor,
            kernel,
            strategy,
        }
    }

    pub fn template(&self) -> &FilterTemplate {
        &self.template
    }

    pub fn decimation_factor(&self) -> u32 {
        self.decimation_factor
    }

    pub fn strategy(&self) -> BufferStrategy {
        self.strategy
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Zero the history and rewind the cursor. Template and decimation
    /// factor are kept. Resetting between buffers reintroduces the
    /// warm-up transient.
    pub fn reset(&mut self) {
        self.history.reset();
    }

    /// Number of samples [`process_buffer`](Self::process_buffer) leaves for
    /// an input of `input_len` samples.
    pub fn output_len(&self, input_len: usize) -> usize {
        match self.strategy {
            BufferStrategy::Filter | BufferStrategy::Passthrough => input_len,
            BufferStrategy::FilterDecimate(factor)
            | BufferStrategy::AverageDecimate { factor, .. } => input_len.div_ceil(factor),
        }
    }

    /// Run one sample through the per-sample kernel.
    pub fn process_sample(&mut self, sample: i16) -> i16 {
        let template = &*self.template;
        let history = &mut self.history;
        let shift = template.shift_count();
        match self.kernel {
            Kernel::SlowInt => kernel::slow(history, template.taps().ints(), shift, sample),
            Kernel::SlowFloat => kernel::slow(history, template.taps().floats(), shift, sample),
            Kernel::FastInt => kernel::fast(
                history,
                template.taps().ints(),
                template.index_mask(),
                shift,
                sample,
            ),
            Kernel::FastFloat => kernel::fast(
                history,
                template.taps().floats(),
                template.index_mask(),
                shift,
                sample,
            ),
            Kernel::Shifter => kernel::shifter(
                history,
                template.taps().ints(),
                template.shift_indexes(),
                shift,
                sample,
            ),
        }
    }

    /// Process a buffer in place and return how many leading samples hold
    /// output. Everything past that length is stale input.
    pub fn process_buffer(&mut self, buffer: &mut [i16]) -> usize {
        match self.strategy {
            BufferStrategy::Passthrough => buffer.len(),
            BufferStrategy::AverageDecimate { factor, threshold } => {
                decimate_average_magnitude_above_threshold(buffer, factor, threshold)
            }
            BufferStrategy::Filter => self.filter_buffer(buffer, 1),
            BufferStrategy::FilterDecimate(factor) => self.filter_buffer(buffer, factor),
        }
    }

    // Dispatches on the kernel once per buffer so the sample loop is
    // monomorphised per kernel.
    fn filter_buffer(&mut self, buffer: &mut [i16], factor: usize) -> usize {
        let template = &*self.template;
        let history = &mut self.history;
        let shift = template.shift_count();
        let mask = template.index_mask();
        let taps = template.taps();

        match self.kernel {
            Kernel::SlowInt => keep_first_filtered(buffer, factor, |s| {
                kernel::slow(history, taps.ints(), shift, s)
            }),
            Kernel::SlowFloat => keep_first_filtered(buffer, factor, |s| {
                kernel::slow(history, taps.floats(), shift, s)
            }),
            Kernel::FastInt => keep_first_filtered(buffer, factor, |s| {
                kernel::fast(history, taps.ints(), mask, shift, s)
            }),
            Kernel::FastFloat => keep_first_filtered(buffer, factor, |s| {
                kernel::fast(history, taps.floats(), mask, shift, s)
            }),
            Kernel::Shifter => {
                let lags = template.shift_indexes();
                keep_first_filtered(buffer, factor, |s| {
                    kernel::shifter(history, taps.ints(), lags, shift, s)
                })
            }
        }
    }
}

/// Filter every sample and compact the first of every `factor` outputs to
/// the front of `buffer`. The write cursor never passes the read cursor, so
/// each input is read before its slot can be overwritten.
fn keep_first_filtered<F>(buffer: &mut [i16], factor: usize, mut filter: F) -> usize
where
    F: FnMut(i16) -> i16,
{
    let mut write = 0;
    let mut phase = 0;
    for read in 0..buffer.len() {
        let filtered = filter(buffer[read]);
        if phase == 0 {
            buffer[write] = filtered;
            write += 1;
        }
        phase += 1;
        if phase == factor {
            phase = 0;
        }
    }
    write
}
