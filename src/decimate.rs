//! Standalone decimators.
//!
//! Each function compacts its result to the front of the buffer it reads and
//! returns the number of output samples, `ceil(len / factor)`. Output `i`
//! comes from the group of input samples starting at `i * factor`; a short
//! trailing group is reduced over the samples it has.
//!
//! # Panics
//! Every function panics if `factor` is zero.

use serde::{Deserialize, Serialize};

use crate::iq::IqSample;

/// Decimation method selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DecimationMethod {
    /// Keep the first sample of each group
    First,
    /// Keep the magnitude of the first sample of each group
    FirstMagnitude,
    /// Keep the largest magnitude in each group
    MaxMagnitude,
    /// Keep the mean magnitude of samples above the threshold
    AverageMagnitude,
}

/// Apply `method` to `buffer` and return the new length.
pub fn decimate(
    method: DecimationMethod,
    buffer: &mut [i16],
    factor: usize,
    threshold: i16,
) -> usize {
    match method {
        DecimationMethod::First => decimate_first(buffer, factor),
        DecimationMethod::FirstMagnitude => decimate_first_magnitude(buffer, factor),
        DecimationMethod::MaxMagnitude => decimate_max_magnitude(buffer, factor),
        DecimationMethod::AverageMagnitude => {
            decimate_average_magnitude_above_threshold(buffer, factor, threshold)
        }
    }
}

/// Magnitude of a sample; `i16::MIN` saturates to `i16::MAX`.
#[inline]
pub fn magnitude(sample: i16) -> i16 {
    sample.saturating_abs()
}

fn keep_first<T: Copy>(buffer: &mut [T], factor: usize, map: impl Fn(T) -> T) -> usize {
    assert!(factor > 0, "decimation factor must be non-zero");
    let out_len = buffer.len().div_ceil(factor);
    for out in 0..out_len {
        let value = map(buffer[out * factor]);
        buffer[out] = value;
    }
    out_len
}

// Group `out` starts at `out * factor >= out`, so writing slot `out` never
// clobbers a group that has not been read yet.
fn reduce_groups(buffer: &mut [i16], factor: usize, reduce: impl Fn(&[i16]) -> i16) -> usize {
    assert!(factor > 0, "decimation factor must be non-zero");
    let len = buffer.len();
    let out_len = len.div_ceil(factor);
    for out in 0..out_len {
        let start = out * factor;
        let end = (start + factor).min(len);
        let value = reduce(&buffer[start..end]);
        buffer[out] = value;
    }
    out_len
}

/// `out[i] = in[i * factor]`
pub fn decimate_first(buffer: &mut [i16], factor: usize) -> usize {
    keep_first(buffer, factor, |s| s)
}

/// `out[i] = |in[i * factor]|`
pub fn decimate_first_magnitude(buffer: &mut [i16], factor: usize) -> usize {
    keep_first(buffer, factor, magnitude)
}

/// `out[i]` = largest magnitude in group `i`.
pub fn decimate_max_magnitude(buffer: &mut [i16], factor: usize) -> usize {
    reduce_groups(buffer, factor, |group| {
        group.iter().copied().map(magnitude).max().unwrap_or(0)
    })
}

/// `out[i]` = mean magnitude of the samples in group `i` whose magnitude is
/// strictly above `threshold`, or 0 when none are. The mean truncates.
pub fn decimate_average_magnitude_above_threshold(
    buffer: &mut [i16],
    factor: usize,
    threshold: i16,
) -> usize {
    reduce_groups(buffer, factor, |group| {
        let (sum, count) = group
            .iter()
            .copied()
            .map(magnitude)
            .filter(|&m| m > threshold)
            .fold((0i64, 0i64), |(sum, count), m| (sum + m as i64, count + 1));
        if count == 0 { 0 } else { (sum / count) as i16 }
    })
}

/// `out[i] = in[i * factor]` over IQ pairs.
pub fn decimate_iq_pairs_first(buffer: &mut [IqSample], factor: usize) -> usize {
    keep_first(buffer, factor, |s| s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first() {
        let mut buffer = vec![10, 20, 30, 40];
        let len = decimate_first(&mut buffer, 2);
        assert_eq!(&buffer[..len], &[10, 30]);
    }

    #[test]
    fn test_first_partial_group() {
        let mut buffer = vec![1, 2, 3, 4, 5];
        let len = decimate_first(&mut buffer, 2);
        assert_eq!(&buffer[..len], &[1, 3, 5]);
    }

    #[test]
    fn test_first_factor_one_is_identity() {
        let mut buffer = vec![3, -1, 4];
        assert_eq!(decimate_first(&mut buffer, 1), 3);
        assert_eq!(buffer, vec![3, -1, 4]);
    }

    #[test]
    fn test_first_magnitude() {
        let mut buffer = vec![-10, 20, -30, 40, i16::MIN];
        let len = decimate_first_magnitude(&mut buffer, 2);
        assert_eq!(&buffer[..len], &[10, 30, i16::MAX]);
    }

    #[test]
    fn test_max_magnitude() {
        let mut buffer = vec![1, -5, 3, 2, -9, 0];
        let len = decimate_max_magnitude(&mut buffer, 3);
        assert_eq!(&buffer[..len], &[5, 9]);
    }

    #[test]
    fn test_max_magnitude_partial_group() {
        let mut buffer = vec![1, -5, 3, 2, -9];
        let len = decimate_max_magnitude(&mut buffer, 3);
        assert_eq!(&buffer[..len], &[5, 9]);
    }

    #[test]
    fn test_average_all_qualify() {
        let mut buffer = vec![1, -2, 3, -4, 5, -7];
        let len = decimate_average_magnitude_above_threshold(&mut buffer, 3, -1);
        assert_eq!(&buffer[..len], &[2, 5]);
    }

    #[test]
    fn test_average_threshold_filters() {
        let mut buffer = vec![1, -2, 30, -40, 2, 0];
        let len = decimate_average_magnitude_above_threshold(&mut buffer, 3, 4);
        assert_eq!(&buffer[..len], &[30, 40]);
    }

    #[test]
    fn test_average_none_qualify() {
        let mut buffer = vec![1, -2, 3, 10, 10, 10];
        let len = decimate_average_magnitude_above_threshold(&mut buffer, 3, 3);
        assert_eq!(&buffer[..len], &[0, 10]);
    }

    #[test]
    fn test_average_does_not_overflow() {
        let mut buffer = vec![i16::MAX; 8];
        let len = decimate_average_magnitude_above_threshold(&mut buffer, 8, -1);
        assert_eq!(&buffer[..len], &[i16::MAX]);
    }

    #[test]
    fn test_average_large_group_does_not_overflow() {
        let mut buffer = vec![i16::MAX; 70_000];
        let len = decimate_average_magnitude_above_threshold(&mut buffer, 70_000, -1);
        assert_eq!(&buffer[..len], &[i16::MAX]);

        let mut buffer = vec![i16::MIN; 140_001];
        let len = decimate_average_magnitude_above_threshold(&mut buffer, 70_000, -1);
        assert_eq!(&buffer[..len], &[i16::MAX, i16::MAX, i16::MAX]);
    }

    #[test]
    fn test_iq_pairs_first() {
        let mut buffer: Vec<IqSample> = (0..5).map(|n| IqSample::new(n, -n)).collect();
        let len = decimate_iq_pairs_first(&mut buffer, 2);
        assert_eq!(
            &buffer[..len],
            &[IqSample::new(0, 0), IqSample::new(2, -2), IqSample::new(4, -4)]
        );
    }

    #[test]
    fn test_empty_buffer() {
        let mut buffer: Vec<i16> = Vec::new();
        assert_eq!(decimate_max_magnitude(&mut buffer, 4), 0);
        assert_eq!(decimate_first(&mut buffer, 4), 0);
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn test_zero_factor_panics() {
        let mut buffer = vec![1, 2];
        decimate_first(&mut buffer, 0);
    }

    #[test]
    fn test_dispatch() {
        let input = vec![1, -5, 3, 2, -9, 0];
        let mut buffer = input.clone();
        let len = decimate(DecimationMethod::MaxMagnitude, &mut buffer, 3, 0);
        assert_eq!(&buffer[..len], &[5, 9]);

        let mut buffer = input;
        let len = decimate(DecimationMethod::First, &mut buffer, 3, 0);
        assert_eq!(&buffer[..len], &[1, 2]);
    }
}
