//! Rectifying fixed-point FIR filters.
//!
//! A [`FilterTemplate`] is immutable coefficient data looked up by name in a
//! [`FilterRegistry`]; a [`FilterContext`] binds one template to one sample
//! stream and carries the history and decimation setup.

pub mod context;
pub mod history;
pub(crate) mod kernel;
pub mod registry;
pub mod template;

pub use context::{BufferStrategy, FilterContext};
pub use history::History;
pub use registry::FilterRegistry;
pub use template::{Algorithm, BufferVariant, FilterTemplate, TapType, Taps, TemplateSpec};
