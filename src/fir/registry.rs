use std::sync::{Arc, OnceLock};

use crate::error::{FirError, Result};

use super::template::{Algorithm, BufferVariant, FilterTemplate, Taps, TemplateSpec};

/// Named collection of filter templates.
///
/// Templates are validated on registration and never change afterwards, so
/// handles returned by [`get`](Self::get) can be shared freely across threads.
#[derive(Debug, Default)]
pub struct FilterRegistry {
    templates: Vec<Arc<FilterTemplate>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in templates.
    pub fn builtin() -> &'static FilterRegistry {
        static BUILTIN: OnceLock<FilterRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut registry = FilterRegistry::new();
            for spec in builtin_specs() {
                let name = spec.name.clone();
                if let Err(e) = registry.register(spec) {
                    log::error!("Skipping built-in filter '{}': {}", name, e);
                }
            }
            registry
        })
    }

    /// Validate and add a template. Names must be unique.
    pub fn register(&mut self, spec: TemplateSpec) -> Result<Arc<FilterTemplate>> {
        if self.get(&spec.name).is_some() {
            return Err(FirError::DuplicateFilter(spec.name));
        }
        let template = Arc::new(FilterTemplate::new(spec)?);
        self.templates.push(Arc::clone(&template));
        Ok(template)
    }

    pub fn get(&self, name: &str) -> Option<Arc<FilterTemplate>> {
        self.templates.iter().find(|t| t.name() == name).cloned()
    }

    /// Template names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.name())
    }

    pub fn templates(&self) -> impl Iterator<Item = &FilterTemplate> {
        self.templates.iter().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

// Equiripple low-pass for a 12 MHz stream, 1.1-1.2 MHz transition band.
const FIR_12_19: [i32; 19] = [
    -341, -830, -1250, -965, 750, 4296, 9359, 14805, 19030, 20625, 19030, 14805, 9359, 4296, 750,
    -965, -1250, -830, -341,
];

// Least-squares design for the same band edges.
const FIR_12_19_ML1: [i32; 19] = [
    -52, -943, -1409, -1203, -251, 1324, 3213, 5005, 6284, 6747, 6284, 5005, 3213, 1324, -251,
    -1203, -1409, -943, -52,
];

const HANN_8: [i32; 8] = [2, 3, 5, 6, 6, 5, 3, 2];

// [1, 4, 6, 4, 1] as shifts: lag 2 carries 6 = 4 + 2.
const BINOMIAL_5_SHIFTS: [i32; 6] = [0, 2, 2, 1, 2, 0];
const BINOMIAL_5_LAGS: [usize; 6] = [0, 1, 2, 2, 3, 4];

// Approximates [1025, 3072, 7169, 9216, 7169, 3072, 1025] / 2^15 with
// power-of-two terms: 1025 -> 1024 and 7169 -> 7168.
const TRI_7_SHIFTS: [i32; 14] = [10, 11, 10, 12, 11, 10, 13, 10, 12, 11, 10, 11, 10, 10];
const TRI_7_LAGS: [usize; 14] = [0, 1, 1, 2, 2, 2, 3, 3, 4, 4, 4, 5, 5, 6];

fn builtin_specs() -> Vec<TemplateSpec> {
    vec![
        TemplateSpec::new("fir_12_19", Taps::Int(FIR_12_19.to_vec()), 16)
            .with_description("Equiripple low-pass, 19 taps")
            .with_design(12_000_000, Some((1_100_000, 1_200_000)))
            .with_buffer_variant(BufferVariant::Decimate),
        TemplateSpec::new("fir_12_19_ml1", Taps::Int(FIR_12_19_ML1.to_vec()), 15)
            .with_description("Least-squares low-pass, 19 taps")
            .with_design(12_000_000, Some((1_100_000, 1_200_000)))
            .with_buffer_variant(BufferVariant::Decimate),
        TemplateSpec::new("box_4", Taps::Int(vec![1; 4]), 2)
            .with_description("4-sample moving sum"),
        TemplateSpec::new("box_4_fast", Taps::Int(vec![1; 4]), 2)
            .with_description("4-sample moving sum, masked cursor")
            .with_algorithm(Algorithm::Fast),
        TemplateSpec::new("hann_8", Taps::Int(HANN_8.to_vec()), 5)
            .with_description("8-tap Hann-like window")
            .with_buffer_variant(BufferVariant::Decimate),
        TemplateSpec::new("hann_8_fast", Taps::Int(HANN_8.to_vec()), 5)
            .with_description("8-tap Hann-like window, masked cursor")
            .with_algorithm(Algorithm::Fast)
            .with_buffer_variant(BufferVariant::Decimate),
        TemplateSpec::new("binomial_5_shift", Taps::Int(BINOMIAL_5_SHIFTS.to_vec()), 4)
            .with_description("Binomial [1 4 6 4 1] from shifts only")
            .with_shift_indexes(BINOMIAL_5_LAGS.to_vec()),
        TemplateSpec::new("tri_7_shift", Taps::Int(TRI_7_SHIFTS.to_vec()), 15)
            .with_description("7-tap triangle approximated with shifts")
            .with_shift_indexes(TRI_7_LAGS.to_vec())
            .with_buffer_variant(BufferVariant::Decimate),
        TemplateSpec::new("float_5", Taps::Float(vec![0.1, 0.2, 0.4, 0.2, 0.1]), 0)
            .with_description("5-tap smoother, float coefficients"),
        TemplateSpec::new("avg_mag", Taps::Int(vec![1]), 0)
            .with_description("Mean magnitude per decimation group")
            .with_buffer_variant(BufferVariant::AverageDecimate),
    ]
}
