mod noise;
mod signal;

pub use noise::{NoiseConfig, apply_noise, signal_power};
pub use signal::{
    BIT_PERIOD_US, PREAMBLE_PULSES_US, PREAMBLE_US, PULSE_WIDTH_US, generate_message_iq,
    pulse_envelope,
};
