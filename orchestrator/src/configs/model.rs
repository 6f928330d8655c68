use std::{fmt, fs, path::Path, str::FromStr};

use comms::specs::ModelSpec;
use serde::{Deserialize, Serialize};

use crate::{OrchestratorError, Result};

/// The family of the model points are checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    Cubic,
    Quintic,
    Transcendental,
}

impl ModelKind {
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Cubic => "cubic",
            ModelKind::Quintic => "quintic",
            ModelKind::Transcendental => "transcendental",
        }
    }

    /// Builds the model of this kind out of the loaded coefficients.
    ///
    /// # Errors
    /// `InvalidConfig` if a coefficient this kind needs is missing.
    pub fn spec(self, coeffs: &Coefficients) -> Result<ModelSpec> {
        let Coefficients { a, b, c, d, e, f } = *coeffs;

        let Some((e, f)) = e.zip(f) else {
            return match self {
                ModelKind::Cubic => Ok(ModelSpec::Cubic { a, b, c, d }),
                kind => Err(OrchestratorError::InvalidConfig(format!(
                    "the {kind} model needs six coefficients, e and f are missing"
                ))),
            };
        };

        Ok(match self {
            ModelKind::Cubic => ModelSpec::Cubic { a, b, c, d },
            ModelKind::Quintic => ModelSpec::Quintic { a, b, c, d, e, f },
            ModelKind::Transcendental => ModelSpec::Transcendental { a, b, c, d, e, f },
        })
    }

    /// The coefficients generated datasets use when none are given.
    pub fn default_coefficients(self) -> Coefficients {
        match self {
            ModelKind::Cubic => Coefficients {
                a: 1.0,
                b: -2.0,
                c: 3.0,
                d: -4.0,
                e: None,
                f: None,
            },
            ModelKind::Quintic | ModelKind::Transcendental => Coefficients {
                a: 10.0,
                b: -2.0,
                c: 17.0,
                d: -4.0,
                e: Some(5.0),
                f: Some(1634534.0),
            },
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cubic" => Ok(ModelKind::Cubic),
            "quintic" => Ok(ModelKind::Quintic),
            "transcendental" => Ok(ModelKind::Transcendental),
            other => Err(format!(
                "unknown model {other}, expected cubic, quintic or transcendental"
            )),
        }
    }
}

/// The contents of a coefficients file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f: Option<f64>,
}

impl Coefficients {
    /// Reads the coefficients from a json file.
    ///
    /// # Errors
    /// `InvalidConfig` if the file can't be read or isn't a valid coefficients object.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let invalid = |e: &dyn fmt::Display| {
            OrchestratorError::InvalidConfig(format!(
                "couldn't read coefficients from {}: {e}",
                path.display()
            ))
        };

        let text = fs::read_to_string(path).map_err(|e| invalid(&e))?;
        serde_json::from_str(&text).map_err(|e| invalid(&e))
    }
}

impl From<ModelSpec> for Coefficients {
    fn from(spec: ModelSpec) -> Self {
        match spec {
            ModelSpec::Cubic { a, b, c, d } => Self {
                a,
                b,
                c,
                d,
                e: None,
                f: None,
            },
            ModelSpec::Quintic { a, b, c, d, e, f }
            | ModelSpec::Transcendental { a, b, c, d, e, f } => Self {
                a,
                b,
                c,
                d,
                e: Some(e),
                f: Some(f),
            },
        }
    }
}
