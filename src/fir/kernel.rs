//! Per-sample convolution kernels.
//!
//! Every kernel rectifies its input, writes the magnitude at the history
//! cursor, accumulates into an `i64`, advances the cursor and returns the
//! sum shifted right by the template's shift count, truncated to 16 bits.
//!
//! Tap alignment: the walk starts one slot behind the sample just written,
//! so `taps[0]` weighs the sample one step older than the newest and the
//! last tap wraps around onto the newest sample.

use super::history::History;
use super::template::{Algorithm, FilterTemplate, TapType};

/// Kernel selected once per context from the template's algorithm and tap type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    SlowInt,
    SlowFloat,
    FastInt,
    FastFloat,
    Shifter,
}

impl Kernel {
    pub fn for_template(template: &FilterTemplate) -> Self {
        match (template.algorithm(), template.tap_type()) {
            (Algorithm::Slow, TapType::Integer) => Self::SlowInt,
            (Algorithm::Slow, TapType::Float) => Self::SlowFloat,
            (Algorithm::Fast, TapType::Integer) => Self::FastInt,
            (Algorithm::Fast, TapType::Float) => Self::FastFloat,
            // Template validation guarantees integer shift taps.
            (Algorithm::Shifter, _) => Self::Shifter,
        }
    }
}

/// A coefficient that can weigh one history magnitude.
pub trait Coefficient: Copy {
    fn weigh(self, magnitude: i32) -> i64;
}

impl Coefficient for i32 {
    #[inline]
    fn weigh(self, magnitude: i32) -> i64 {
        magnitude as i64 * self as i64
    }
}

impl Coefficient for f32 {
    #[inline]
    fn weigh(self, magnitude: i32) -> i64 {
        (magnitude as f32 * self) as i64
    }
}

#[inline]
fn rectify(sample: i16) -> i32 {
    (sample as i32).abs()
}

/// Generic kernel: any tap count, conditional cursor wrap.
#[inline]
pub fn slow<C: Coefficient>(history: &mut History, taps: &[C], shift: u32, sample: i16) -> i16 {
    let len = history.samples.len();
    let mut index = history.write_index;
    history.samples[index] = rectify(sample);

    let mut sum = 0i64;
    for &tap in taps {
        index = if index != 0 { index - 1 } else { len - 1 };
        sum += tap.weigh(history.samples[index]);
    }

    history.write_index += 1;
    if history.write_index == len {
        history.write_index = 0;
    }

    (sum >> shift) as i16
}

/// Power-of-two kernel: the cursor is wrapped with `mask` instead of a branch.
/// Bit-identical to [`slow`] for the same taps and shift.
#[inline]
pub fn fast<C: Coefficient>(
    history: &mut History,
    taps: &[C],
    mask: usize,
    shift: u32,
    sample: i16,
) -> i16 {
    let mut index = history.write_index;
    history.samples[index] = rectify(sample);
    history.write_index = (index + 1) & mask;

    let mut sum = 0i64;
    for &tap in taps {
        index = index.wrapping_sub(1) & mask;
        sum += tap.weigh(history.samples[index]);
    }

    (sum >> shift) as i16
}

/// Multiply-free kernel: tap `i` adds the sample `lags[i]` steps older than
/// the newest one, shifted left by `shifts[i]` bits.
///
/// Lags are validated against the history length when the template is built
/// and are not checked again here.
#[inline]
pub fn shifter(
    history: &mut History,
    shifts: &[i32],
    lags: &[usize],
    shift: u32,
    sample: i16,
) -> i16 {
    let len = history.samples.len();
    let newest = history.write_index;
    history.samples[newest] = rectify(sample);

    let mut sum = 0i64;
    for (&bits, &lag) in shifts.iter().zip(lags) {
        let slot = if lag <= newest {
            newest - lag
        } else {
            newest + len - lag
        };
        sum += (history.samples[slot] as i64) << bits;
    }

    history.write_index += 1;
    if history.write_index == len {
        history.write_index = 0;
    }

    (sum >> shift) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_tap_alignment() {
        // taps[0] weighs the previous sample, taps[2] wraps onto the newest
        let mut history = History::new(3);
        let taps = [1, 10, 100];
        assert_eq!(slow(&mut history, &taps, 0, 1), 100);
        assert_eq!(slow(&mut history, &taps, 0, 2), 1 + 200);
        assert_eq!(slow(&mut history, &taps, 0, 3), 2 + 10 + 300);
        assert_eq!(slow(&mut history, &taps, 0, 4), 3 + 20 + 400);
    }

    #[test]
    fn test_slow_rectifies_input() {
        let mut positive = History::new(2);
        let mut negative = History::new(2);
        let taps = [3, 5];
        for sample in [100, 200, 300] {
            assert_eq!(
                slow(&mut positive, &taps, 1, sample),
                slow(&mut negative, &taps, 1, -sample)
            );
        }
    }

    #[test]
    fn test_slow_shift_truncates() {
        let mut history = History::new(1);
        assert_eq!(slow(&mut history, &[1], 2, 7), 1);
        assert_eq!(slow(&mut history, &[1], 2, 3), 0);
    }

    #[test]
    fn test_slow_narrowing_wraps() {
        // Fixed-point narrowing is a truncating cast, not a saturation
        let mut history = History::new(1);
        assert_eq!(slow(&mut history, &[2], 0, 20000), (40000i64 as i16));
    }

    #[test]
    fn test_min_sample_magnitude_is_exact() {
        let mut history = History::new(1);
        assert_eq!(slow(&mut history, &[1], 1, i16::MIN), 16384);
    }

    #[test]
    fn test_float_taps_truncate_per_tap() {
        let mut history = History::new(2);
        let taps = [0.5f32, 0.25];
        // first sample lands under taps[1]: 7 * 0.25 = 1.75 -> 1
        assert_eq!(slow(&mut history, &taps, 0, 7), 1);
        // 7 * 0.5 = 3.5 -> 3, 9 * 0.25 = 2.25 -> 2
        assert_eq!(slow(&mut history, &taps, 0, 9), 5);
    }

    #[test]
    fn test_fast_matches_slow() {
        let taps = [3, -1, 7, 2];
        let mut slow_history = History::new(4);
        let mut fast_history = History::new(4);
        for (i, sample) in [5i16, -12, 300, 0, -7, 1024, -32768, 32767, 9, -1]
            .into_iter()
            .enumerate()
        {
            let a = slow(&mut slow_history, &taps, 2, sample);
            let b = fast(&mut fast_history, &taps, 3, 2, sample);
            assert_eq!(a, b, "mismatch at sample {}", i);
            assert_eq!(slow_history.write_index(), fast_history.write_index());
        }
    }

    #[test]
    fn test_shifter_exact_decomposition() {
        // 10 * x[lag 1] expressed as (x << 3) + (x << 1)
        let mut history = History::new(3);
        let shifts = [0, 3, 1];
        let lags = [0, 1, 1];
        assert_eq!(shifter(&mut history, &shifts, &lags, 0, 2), 2);
        assert_eq!(shifter(&mut history, &shifts, &lags, 0, -5), 5 + 20);
        assert_eq!(shifter(&mut history, &shifts, &lags, 0, 1), 1 + 50);
        assert_eq!(shifter(&mut history, &shifts, &lags, 0, 0), 10);
    }

    #[test]
    fn test_shifter_applies_final_shift() {
        let mut history = History::new(1);
        assert_eq!(shifter(&mut history, &[4], &[0], 3, 5), 10);
    }
}
