//! The models a point is checked against.
//!
//! Every evaluator is a pure function of `x` and its coefficients, so a single
//! instance can be shared by any amount of threads without synchronization.

use comms::specs::{ModelSpec, Schedule};

/// Maximum absolute difference between `f(x)` and `y` for a point to match.
pub const TOLERANCE: f64 = 1e-3;

/// A model `f` that predicts `y` given `x`.
pub trait Evaluator: Sync {
    /// Evaluates the model at `x`.
    fn evaluate(&self, x: f64) -> f64;

    /// Returns whether the point `(x, y)` satisfies `|f(x) - y| < TOLERANCE`.
    #[inline]
    fn matches(&self, x: f64, y: f64) -> bool {
        (self.evaluate(x) - y).abs() < TOLERANCE
    }
}

/// `f(x) = ax^3 + bx^2 + cx + d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cubic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Evaluator for Cubic {
    #[inline]
    fn evaluate(&self, x: f64) -> f64 {
        let Self { a, b, c, d } = *self;
        a * x * x * x + b * x * x + c * x + d
    }
}

/// `f(x) = ax^5 + bx^4 + cx^3 + dx^2 + ex + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quintic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Evaluator for Quintic {
    #[inline]
    fn evaluate(&self, x: f64) -> f64 {
        let Self { a, b, c, d, e, f } = *self;
        a * x * x * x * x * x + b * x * x * x * x + c * x * x * x + d * x * x + e * x + f
    }
}

/// A deliberately expensive model mixing even powers with trigonometric, hyperbolic,
/// exponential and logarithmic terms plus a 1000 term summation scaled by `x`.
///
/// Used to study compute bound scaling, the cost of a single evaluation dwarfs
/// the cost of moving the point around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transcendental {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Transcendental {
    const LAYERS: usize = 5;
    const ROOTS: usize = 10;
    const NOISE_TERMS: usize = 1000;

    /// The sign dependent term, never leaves the domain of `sqrt` nor `acos`.
    ///
    /// `tanh(|x|)` lies in `[0, 1)` for every finite `x`.
    #[inline]
    pub fn guard(x: f64) -> f64 {
        if x > 0.0 {
            (x + 1.0).sqrt().atan()
        } else {
            x.abs().tanh().acos()
        }
    }

    fn layers(abs_x: f64) -> f64 {
        let mut acc = 0.0;

        for i in 0..Self::LAYERS {
            let inner = (abs_x + i as f64).powf(1.0 + (i % 3) as f64 / 5.0);
            acc += inner.powf(3.0).sin() * inner.powf(2.0).cos() * inner.tan()
                + inner.ln_1p()
                + (inner + 1.0).sqrt()
                + (inner / 1000.0).exp()
                + (inner / 1000.0).sinh()
                + (inner / 1000.0).tanh();
        }

        acc
    }

    fn noise(x: f64) -> f64 {
        let mut noise = 0.0;

        for i in 0..Self::NOISE_TERMS {
            let i = i as f64;
            noise += (i * x * 0.0001).sin() * (i * x * 0.0002).cos();
        }

        noise
    }
}

impl Evaluator for Transcendental {
    fn evaluate(&self, x: f64) -> f64 {
        let Self { a, b, c, d, e, f } = *self;
        let abs_x = x.abs();
        let mut result = 0.0;

        result += a * x.powf(12.0) + x.powf(5.0).sin();
        result += b * x.powf(10.0) + x.powf(3.0).cos();
        result += c * x.powf(8.0) + x.powf(2.0).tan();
        result += d * x.powf(6.0);
        result += e * x.powf(4.0);
        result += f;

        result += Self::layers(abs_x);
        result += Self::guard(x);

        for i in 1..Self::ROOTS {
            result += (abs_x + i as f64).powf(1.0 / (2.0 * i as f64 + 1.0));
        }

        result += Self::noise(x) / 100.0;
        result
    }
}

/// Any of the supported models, built from a `ModelSpec`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Model {
    Cubic(Cubic),
    Quintic(Quintic),
    Transcendental(Transcendental),
}

impl Model {
    /// The schedule that suits the cost profile of this model.
    ///
    /// Polynomials cost the same for every point so a static split is enough,
    /// the transcendental model varies with `x` and benefits from work-stealing.
    pub fn default_schedule(&self) -> Schedule {
        match self {
            Model::Cubic(_) | Model::Quintic(_) => Schedule::Static,
            Model::Transcendental(_) => Schedule::Dynamic,
        }
    }
}

impl Evaluator for Model {
    #[inline]
    fn evaluate(&self, x: f64) -> f64 {
        match self {
            Model::Cubic(m) => m.evaluate(x),
            Model::Quintic(m) => m.evaluate(x),
            Model::Transcendental(m) => m.evaluate(x),
        }
    }
}

impl From<ModelSpec> for Model {
    fn from(spec: ModelSpec) -> Self {
        match spec {
            ModelSpec::Cubic { a, b, c, d } => Model::Cubic(Cubic { a, b, c, d }),
            ModelSpec::Quintic { a, b, c, d, e, f } => {
                Model::Quintic(Quintic { a, b, c, d, e, f })
            }
            ModelSpec::Transcendental { a, b, c, d, e, f } => {
                Model::Transcendental(Transcendental { a, b, c, d, e, f })
            }
        }
    }
}
