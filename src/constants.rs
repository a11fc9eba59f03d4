//! Fixed limits shared by templates, contexts and decimators.

/// Maximum number of taps a filter template may carry.
pub const MAX_TAPS: usize = 32;

/// Maximum length of a template name.
pub const MAX_NAME_LEN: usize = 32;

/// Largest final right-shift a template may request on its 64-bit accumulator.
pub const MAX_SHIFT_COUNT: u32 = 63;

/// Largest per-tap left shift for shifter templates.
/// History magnitudes fit in 16 bits, so 32 taps shifted by 30 stay well inside i64.
pub const MAX_TAP_SHIFT: i32 = 30;

/// Default magnitude threshold for average-above-threshold decimation.
/// Below every possible magnitude, so every sample qualifies.
pub const DEFAULT_AVERAGE_THRESHOLD: i16 = -1;

/// Default processing block size in samples.
pub const DEFAULT_BUFFER_SIZE: usize = 16384;

/// Default input sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 12_000_000;
