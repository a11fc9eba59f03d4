pub mod bits;
pub mod config;
pub mod constants;
pub mod decimate;
pub mod error;
pub mod fir;
pub mod iq;
pub mod output;
pub mod processing;
pub mod source;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::StreamConfig;
pub use error::{FirError, Result};
pub use fir::{FilterContext, FilterRegistry, FilterTemplate};
pub use processing::StreamProcessor;
pub use wav::save_wav;
