use serde::{Deserialize, Serialize};

/// The specification for the `Model` evaluator, carrying its coefficients.
///
/// Coefficients are applied in descending power order, `a` always multiplies
/// the highest power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSpec {
    Cubic {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    },
    Quintic {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
        f: f64,
    },
    Transcendental {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
        f: f64,
    },
}

impl ModelSpec {
    /// Returns the name of this model variant.
    pub fn name(&self) -> &'static str {
        match self {
            ModelSpec::Cubic { .. } => "cubic",
            ModelSpec::Quintic { .. } => "quintic",
            ModelSpec::Transcendental { .. } => "transcendental",
        }
    }
}
