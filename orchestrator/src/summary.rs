//! Scaling summary of a results file.
//!
//! Repeated rows of the same size and parallelism are averaged, then every
//! configuration is compared against the single unit run of its size.

use std::{collections::BTreeMap, fmt::Write, io::BufRead};

use crate::{OrchestratorError, Result};

/// One row of a results file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Threads, processes, or processes times threads for hybrid rows.
    pub units: usize,
    pub size: u64,
    pub secs: f64,
}

/// The scaling of one configuration against its baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub size: u64,
    pub units: usize,
    pub secs: f64,
    pub speedup: f64,
    pub efficiency: f64,
}

/// Reads the rows of a results file of any mode.
///
/// Three columns are `units,size,time`, four are `procs,threads,size,time`.
///
/// # Errors
/// `InvalidConfig` on a malformed row.
pub fn read_samples<R: BufRead>(reader: R) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let sample = parse_row(line).ok_or_else(|| {
            OrchestratorError::InvalidConfig(format!("malformed result row {}: {line}", i + 1))
        })?;
        samples.push(sample);
    }

    Ok(samples)
}

fn parse_row(line: &str) -> Option<Sample> {
    let fields: Vec<_> = line.split(',').map(str::trim).collect();

    let (units, size, secs) = match fields[..] {
        [units, size, secs] => (units.parse().ok()?, size, secs),
        [procs, threads, size, secs] => {
            let procs: usize = procs.parse().ok()?;
            let threads: usize = threads.parse().ok()?;
            (procs * threads, size, secs)
        }
        _ => return None,
    };

    Some(Sample {
        units,
        size: size.parse().ok()?,
        secs: secs.parse().ok()?,
    })
}

/// Computes the speedup `T(1) / T(p)` and efficiency `S(p) / p` of every configuration.
///
/// Sizes without a single unit run have no baseline and are skipped.
pub fn summarize(samples: &[Sample]) -> Vec<Scaling> {
    let mut means: BTreeMap<(u64, usize), (f64, usize)> = BTreeMap::new();
    for sample in samples {
        let (sum, n) = means.entry((sample.size, sample.units)).or_default();
        *sum += sample.secs;
        *n += 1;
    }

    let mean = |key: (u64, usize)| means.get(&key).map(|&(sum, n)| sum / n as f64);

    means
        .keys()
        .filter_map(|&(size, units)| {
            let base = mean((size, 1))?;
            let secs = mean((size, units))?;
            let speedup = base / secs;

            Some(Scaling {
                size,
                units,
                secs,
                speedup,
                efficiency: speedup / units as f64,
            })
        })
        .collect()
}

/// Renders the scaling rows as a table, one block per size.
pub fn render(rows: &[Scaling]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:>12} {:>6} {:>12} {:>9} {:>11}",
        "Size", "Units", "Time (s)", "Speedup", "Efficiency"
    );
    let _ = writeln!(out, "  {}", "-".repeat(54));

    let mut last = None;
    for row in rows {
        if last.is_some_and(|size| size != row.size) {
            out.push('\n');
        }
        last = Some(row.size);

        let _ = writeln!(
            out,
            "  {:>12} {:>6} {:>12.6} {:>8.2}x {:>10.1}%",
            row.size,
            row.units,
            row.secs,
            row.speedup,
            row.efficiency * 100.,
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_of_every_mode_are_read() {
        let text = "1,1000,2.0\n\n4,1000,0.5\n2,3,1000,0.25\n";
        let samples = read_samples(text.as_bytes()).unwrap();

        let units: Vec<_> = samples.iter().map(|s| s.units).collect();
        assert_eq!(units, [1, 4, 6]);
        assert!(samples.iter().all(|s| s.size == 1000));
    }

    #[test]
    fn malformed_rows_are_rejected() {
        assert!(read_samples("1,1000\n".as_bytes()).is_err());
        assert!(read_samples("one,1000,2.0\n".as_bytes()).is_err());
    }

    #[test]
    fn duplicates_are_averaged_before_comparing() {
        let samples = read_samples("1,10,1.0\n1,10,3.0\n4,10,0.5\n4,10,0.5\n".as_bytes()).unwrap();
        let rows = summarize(&samples);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].secs, 2.0);
        assert_eq!(rows[0].speedup, 1.0);
        assert_eq!(rows[1].speedup, 4.0);
        assert_eq!(rows[1].efficiency, 1.0);
    }

    #[test]
    fn sizes_without_baseline_are_skipped() {
        let samples = read_samples("2,10,1.0\n1,20,1.0\n2,20,0.8\n".as_bytes()).unwrap();
        let rows = summarize(&samples);

        assert!(rows.iter().all(|row| row.size == 20));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn table_lists_every_row() {
        let rows = summarize(&read_samples("1,10,1.0\n2,10,0.5\n".as_bytes()).unwrap());
        let table = render(&rows);

        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("2.00x"));
        assert!(table.contains("100.0%"));
    }
}
