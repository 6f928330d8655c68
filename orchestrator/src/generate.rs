//! Synthetic datasets for benchmarking runs.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use comms::specs::ModelSpec;
use kernel::{Evaluator, Model};
use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Result,
    configs::{Coefficients, dataset_path},
};

/// Produces points where about half lie exactly on the model's curve.
pub struct DatasetGenerator {
    model: Model,
    rng: StdRng,
}

impl DatasetGenerator {
    /// Range of the generated `x` values.
    const X_RANGE: f64 = 1000.;
    /// Largest shift applied to the points that don't lie on the curve.
    const NOISE: f64 = 50.;

    /// Creates a new `DatasetGenerator`.
    ///
    /// # Arguments
    /// * `model` - The model the points are generated from.
    /// * `seed` - Makes the datasets reproducible, random if `None`.
    pub fn new(model: ModelSpec, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            model: Model::from(model),
            rng,
        }
    }

    /// Writes `size` points, one `x,y` pair per line.
    pub fn write_points<W: Write>(&mut self, size: u64, out: &mut W) -> io::Result<()> {
        for _ in 0..size {
            let x = self.rng.random_range(-Self::X_RANGE..Self::X_RANGE);
            let mut y = self.model.evaluate(x);

            if self.rng.random_bool(0.5) {
                y += self.rng.random_range(-Self::NOISE..Self::NOISE);
            }

            writeln!(out, "{x},{y}")?;
        }

        Ok(())
    }
}

/// Writes the coefficients, the size list and one dataset per size into `dir`.
///
/// # Arguments
/// * `dir` - The data directory of later runs, created if missing.
/// * `model` - The model the points are generated from.
/// * `sizes` - The amount of points of every dataset.
/// * `seed` - Makes the datasets reproducible, random if `None`.
pub fn generate(dir: &Path, model: ModelSpec, sizes: &[u64], seed: Option<u64>) -> Result<()> {
    fs::create_dir_all(dir)?;

    let coeffs = File::create(dir.join("coeffs.json"))?;
    serde_json::to_writer_pretty(coeffs, &Coefficients::from(model)).map_err(io::Error::from)?;

    let list: String = sizes.iter().map(|size| format!("{size}\n")).collect();
    fs::write(dir.join("sizes.txt"), list)?;

    let mut generator = DatasetGenerator::new(model, seed);
    for &size in sizes {
        let path = dataset_path(dir, size);
        let mut out = BufWriter::new(File::create(&path)?);

        generator.write_points(size, &mut out)?;
        out.flush()?;

        info!(points = size; "wrote {}", path.display());
    }

    Ok(())
}
