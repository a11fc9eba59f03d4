use std::f32::consts::PI;

/// Pulse width of the 1090 MHz pulse-position format
pub const PULSE_WIDTH_US: f32 = 0.5;
/// Data bit period
pub const BIT_PERIOD_US: f32 = 1.0;
/// Preamble length before the first data bit
pub const PREAMBLE_US: f32 = 8.0;
/// Preamble pulse start times
pub const PREAMBLE_PULSES_US: [f32; 4] = [0.0, 1.0, 3.5, 4.5];

/// On/off pulse envelope for a preamble followed by `payload`, MSB first.
/// A 1 bit pulses in the first half of its period, a 0 bit in the second.
pub fn pulse_envelope(sample_rate: u32, payload: &[u8]) -> Vec<bool> {
    let samples_per_us = sample_rate as f32 / 1e6;
    let total_us = PREAMBLE_US + payload.len() as f32 * 8.0 * BIT_PERIOD_US;
    let num_samples = (total_us * samples_per_us).round() as usize;

    let mut pulse_starts: Vec<f32> = PREAMBLE_PULSES_US.to_vec();
    for (byte_index, byte) in payload.iter().enumerate() {
        for bit in 0..8 {
            let start = PREAMBLE_US + (byte_index * 8 + bit) as f32 * BIT_PERIOD_US;
            let set = *byte & (0x80u8 >> bit) != 0;
            pulse_starts.push(if set { start } else { start + PULSE_WIDTH_US });
        }
    }

    let mut envelope = vec![false; num_samples];
    for start in pulse_starts {
        let first = (start * samples_per_us).round() as usize;
        let last = ((start + PULSE_WIDTH_US) * samples_per_us).round() as usize;
        for slot in envelope.iter_mut().take(last).skip(first) {
            *slot = true;
        }
    }
    envelope
}

/// Interleaved 16-bit IQ for one message: `lead_us` of silence, the pulse
/// train on a carrier `offset_hz` from centre, then `lead_us` of silence.
pub fn generate_message_iq(
    sample_rate: u32,
    payload: &[u8],
    amplitude: f32,
    offset_hz: f32,
    lead_us: f32,
) -> Vec<i16> {
    let lead = (lead_us * sample_rate as f32 / 1e6).round() as usize;
    let envelope = pulse_envelope(sample_rate, payload);
    let total = lead * 2 + envelope.len();
    let amplitude = amplitude.clamp(0.0, i16::MAX as f32);

    let mut samples = Vec::with_capacity(total * 2);
    for n in 0..total {
        let on = n >= lead && envelope.get(n - lead).copied().unwrap_or(false);
        if on {
            let phase = 2.0 * PI * offset_hz * n as f32 / sample_rate as f32;
            samples.push((amplitude * phase.cos()) as i16);
            samples.push((amplitude * phase.sin()) as i16);
        } else {
            samples.push(0);
            samples.push(0);
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble_pulses() {
        let envelope = pulse_envelope(2_000_000, &[]);
        assert_eq!(envelope.len(), 16);
        let on: Vec<usize> = (0..16).filter(|&i| envelope[i]).collect();
        assert_eq!(on, vec![0, 2, 7, 9]);
    }

    #[test]
    fn test_bit_positions() {
        // 0b1000_0000: first bit pulses early, the rest late
        let envelope = pulse_envelope(2_000_000, &[0x80]);
        assert_eq!(envelope.len(), 32);
        assert!(envelope[16] && !envelope[17]);
        assert!(!envelope[18] && envelope[19]);
    }

    #[test]
    fn test_message_iq_layout() {
        let iq = generate_message_iq(12_000_000, &[0xff], 1000.0, 0.0, 2.0);
        let lead = 24;
        let envelope_len = 16 * 12;
        assert_eq!(iq.len(), (lead * 2 + envelope_len) * 2);
        assert!(iq[..lead * 2].iter().all(|&s| s == 0));
        assert_eq!(iq[lead * 2], 1000);
        assert_eq!(iq[lead * 2 + 1], 0);
    }
}
