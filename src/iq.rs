use num_complex::Complex;

/// One complex baseband sample as delivered by 16-bit IQ receivers.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IqSample {
    pub i: i16,
    pub q: i16,
}

impl IqSample {
    pub fn new(i: i16, q: i16) -> Self {
        Self { i, q }
    }
}

impl From<Complex<i16>> for IqSample {
    fn from(c: Complex<i16>) -> Self {
        Self { i: c.re, q: c.im }
    }
}

impl From<IqSample> for Complex<i16> {
    fn from(s: IqSample) -> Self {
        Complex::new(s.i, s.q)
    }
}

/// Pair up interleaved `[I, Q, I, Q, ...]` samples.
///
/// A trailing unpaired value is ignored.
pub fn from_interleaved(data: &[i16]) -> Vec<IqSample> {
    data.chunks_exact(2)
        .map(|pair| IqSample::new(pair[0], pair[1]))
        .collect()
}

/// Flatten IQ pairs back to interleaved `[I, Q, I, Q, ...]` order.
pub fn to_interleaved(samples: &[IqSample]) -> Vec<i16> {
    samples.iter().flat_map(|s| [s.i, s.q]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_interleaved_drops_odd_tail() {
        let pairs = from_interleaved(&[1, 2, 3, 4, 5]);
        assert_eq!(pairs, vec![IqSample::new(1, 2), IqSample::new(3, 4)]);
    }

    #[test]
    fn test_interleave_round_trip() {
        let data = vec![10, -10, 20, -20, i16::MIN, i16::MAX];
        assert_eq!(to_interleaved(&from_interleaved(&data)), data);
    }

    #[test]
    fn test_complex_conversion() {
        let c = Complex::new(7i16, -3i16);
        let s: IqSample = c.into();
        assert_eq!(s, IqSample::new(7, -3));
        let back: Complex<i16> = s.into();
        assert_eq!(back, c);
    }
}
