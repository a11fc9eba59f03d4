use crate::constants::{MAX_NAME_LEN, MAX_SHIFT_COUNT, MAX_TAP_SHIFT, MAX_TAPS};
use crate::error::{FirError, Result};

/// Per-sample convolution algorithm a template asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Generic multiply-accumulate with a conditional cursor wrap
    Slow,
    /// Multiply-accumulate with a bit-masked cursor (power-of-two tap counts)
    Fast,
    /// Multiply-free sum of left-shifted history samples
    Shifter,
}

/// Buffer-level strategy a template asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferVariant {
    /// Filter every sample in place
    NoDecimation,
    /// Filter every sample, keep the first of every N
    Decimate,
    /// No filtering; keep the mean magnitude above a threshold per group of N
    AverageDecimate,
}

/// Coefficient representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapType {
    Integer,
    Float,
}

/// Filter coefficients. For shifter templates the integer values are bit
/// counts rather than multipliers.
#[derive(Debug, Clone, PartialEq)]
pub enum Taps {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl Taps {
    pub fn len(&self) -> usize {
        match self {
            Self::Int(taps) => taps.len(),
            Self::Float(taps) => taps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tap_type(&self) -> TapType {
        match self {
            Self::Int(_) => TapType::Integer,
            Self::Float(_) => TapType::Float,
        }
    }

    /// Integer coefficients, or an empty slice for float templates.
    pub fn ints(&self) -> &[i32] {
        match self {
            Self::Int(taps) => taps,
            Self::Float(_) => &[],
        }
    }

    /// Float coefficients, or an empty slice for integer templates.
    pub fn floats(&self) -> &[f32] {
        match self {
            Self::Int(_) => &[],
            Self::Float(taps) => taps,
        }
    }
}

/// Unvalidated description of a filter, turned into a [`FilterTemplate`]
/// by [`FilterTemplate::new`].
///
/// # Example
/// ```
/// use magfir::fir::{Algorithm, FilterTemplate, Taps, TemplateSpec};
///
/// let spec = TemplateSpec::new("box_4", Taps::Int(vec![1, 1, 1, 1]), 2)
///     .with_algorithm(Algorithm::Fast);
/// let template = FilterTemplate::new(spec).unwrap();
/// assert_eq!(template.index_mask(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    pub name: String,
    pub description: String,
    pub sample_rate_hz: u64,
    /// Passband edges `(start, end)` in Hz, when the design has one
    pub passband_hz: Option<(u64, u64)>,
    pub taps: Taps,
    pub shift_count: u32,
    /// Derived as `tap_count - 1` when absent
    pub index_mask: Option<usize>,
    /// History lag (0 = newest sample) read by each shifter tap
    pub shift_indexes: Vec<usize>,
    pub algorithm: Algorithm,
    pub buffer_variant: BufferVariant,
    /// Magnitude threshold for [`BufferVariant::AverageDecimate`]
    pub threshold: i16,
}

impl TemplateSpec {
    pub fn new(name: &str, taps: Taps, shift_count: u32) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            sample_rate_hz: 0,
            passband_hz: None,
            taps,
            shift_count,
            index_mask: None,
            shift_indexes: Vec::new(),
            algorithm: Algorithm::Slow,
            buffer_variant: BufferVariant::NoDecimation,
            threshold: crate::constants::DEFAULT_AVERAGE_THRESHOLD,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_design(mut self, sample_rate_hz: u64, passband_hz: Option<(u64, u64)>) -> Self {
        self.sample_rate_hz = sample_rate_hz;
        self.passband_hz = passband_hz;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_buffer_variant(mut self, buffer_variant: BufferVariant) -> Self {
        self.buffer_variant = buffer_variant;
        self
    }

    pub fn with_index_mask(mut self, index_mask: usize) -> Self {
        self.index_mask = Some(index_mask);
        self
    }

    /// Switch to the shifter algorithm with the given per-tap history lags.
    pub fn with_shift_indexes(mut self, shift_indexes: Vec<usize>) -> Self {
        self.algorithm = Algorithm::Shifter;
        self.shift_indexes = shift_indexes;
        self
    }

    pub fn with_threshold(mut self, threshold: i16) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Immutable, validated filter description shared by any number of
/// [`FilterContext`](super::FilterContext)s.
#[derive(Debug, Clone)]
pub struct FilterTemplate {
    name: String,
    description: String,
    sample_rate_hz: u64,
    passband_hz: Option<(u64, u64)>,
    taps: Taps,
    shift_count: u32,
    index_mask: usize,
    shift_indexes: Vec<usize>,
    algorithm: Algorithm,
    buffer_variant: BufferVariant,
    threshold: i16,
}

impl FilterTemplate {
    /// Validate a spec. Every check happens here so nothing has to be
    /// re-checked per sample.
    pub fn new(spec: TemplateSpec) -> Result<Self> {
        let name = spec.name.as_str();
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(FirError::invalid(
                name,
                format!("name must be 1..={} characters", MAX_NAME_LEN),
            ));
        }

        let tap_count = spec.taps.len();
        if tap_count == 0 || tap_count > MAX_TAPS {
            return Err(FirError::invalid(
                name,
                format!("tap count {} outside 1..={}", tap_count, MAX_TAPS),
            ));
        }

        if let Taps::Float(taps) = &spec.taps {
            // Worst case: every tap weighs a full-scale magnitude. Half of
            // i64::MAX leaves room for f32 product rounding.
            let limit = (i64::MAX / 2) as f64;
            let full_scale = 32768.0 * tap_count as f64;
            if let Some(bad) = taps
                .iter()
                .find(|t| !t.is_finite() || t.abs() as f64 * full_scale > limit)
            {
                return Err(FirError::invalid(
                    name,
                    format!("float tap {} is not finite or overflows the accumulator", bad),
                ));
            }
        }

        if spec.shift_count > MAX_SHIFT_COUNT {
            return Err(FirError::invalid(
                name,
                format!("shift count {} exceeds {}", spec.shift_count, MAX_SHIFT_COUNT),
            ));
        }

        let index_mask = spec.index_mask.unwrap_or(tap_count - 1);

        match spec.algorithm {
            Algorithm::Slow => {}
            Algorithm::Fast => {
                if !tap_count.is_power_of_two() {
                    return Err(FirError::invalid(
                        name,
                        format!("fast algorithm needs a power-of-two tap count, got {}", tap_count),
                    ));
                }
                if index_mask != tap_count - 1 {
                    return Err(FirError::invalid(
                        name,
                        format!("index mask {} must equal {}", index_mask, tap_count - 1),
                    ));
                }
            }
            Algorithm::Shifter => {
                let Taps::Int(shifts) = &spec.taps else {
                    return Err(FirError::invalid(name, "shifter taps must be integer bit counts"));
                };
                if let Some(bad) = shifts.iter().find(|s| !(0..=MAX_TAP_SHIFT).contains(*s)) {
                    return Err(FirError::invalid(
                        name,
                        format!("tap shift {} outside 0..={}", bad, MAX_TAP_SHIFT),
                    ));
                }
                if spec.shift_indexes.len() != tap_count {
                    return Err(FirError::invalid(
                        name,
                        format!(
                            "{} shift indexes for {} taps",
                            spec.shift_indexes.len(),
                            tap_count
                        ),
                    ));
                }
                if let Some(bad) = spec.shift_indexes.iter().find(|&&lag| lag >= tap_count) {
                    return Err(FirError::invalid(
                        name,
                        format!("shift index {} outside history of {}", bad, tap_count),
                    ));
                }
            }
        }

        Ok(Self {
            name: spec.name,
            description: spec.description,
            sample_rate_hz: spec.sample_rate_hz,
            passband_hz: spec.passband_hz,
            taps: spec.taps,
            shift_count: spec.shift_count,
            index_mask,
            shift_indexes: spec.shift_indexes,
            algorithm: spec.algorithm,
            buffer_variant: spec.buffer_variant,
            threshold: spec.threshold,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Design sample rate in Hz (0 when the template is rate-agnostic)
    pub fn sample_rate_hz(&self) -> u64 {
        self.sample_rate_hz
    }

    pub fn passband_hz(&self) -> Option<(u64, u64)> {
        self.passband_hz
    }

    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }

    pub fn tap_type(&self) -> TapType {
        self.taps.tap_type()
    }

    pub fn taps(&self) -> &Taps {
        &self.taps
    }

    pub fn shift_count(&self) -> u32 {
        self.shift_count
    }

    pub fn index_mask(&self) -> usize {
        self.index_mask
    }

    pub fn shift_indexes(&self) -> &[usize] {
        &self.shift_indexes
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn buffer_variant(&self) -> BufferVariant {
        self.buffer_variant
    }

    pub fn threshold(&self) -> i16 {
        self.threshold
    }
}
