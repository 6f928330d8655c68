use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    ops::Range,
    path::Path,
};

/// A set of `(x, y)` points stored as two parallel sequences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl PointSet {
    /// Creates a new `PointSet` from owned buffers.
    ///
    /// # Panics
    /// If `xs.len() != ys.len()`.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Self {
        assert_eq!(xs.len(), ys.len(), "xs and ys must have same length");
        Self { xs, ys }
    }

    /// Opens and parses the dataset at `path`.
    ///
    /// # Errors
    /// Returns an `io::Error` if the file can't be opened or read, a malformed
    /// line is not an error (see `PointSet::parse`).
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::parse(BufReader::new(file))
    }

    /// Parses `<float>,<float>` lines from `reader`.
    ///
    /// Parsing stops at the first malformed line, every point read before it is
    /// kept and the rest of the input is ignored. Blank lines are skipped.
    ///
    /// # Errors
    /// Only read failures of the underlying reader.
    pub fn parse<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut points = Self::default();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            let Some((x, y)) = parse_pair(line) else {
                break;
            };

            points.xs.push(x);
            points.ys.push(y);
        }

        Ok(points)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    #[inline]
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    #[inline]
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Copies the points inside `range` into a new `PointSet`.
    ///
    /// # Panics
    /// If `range` is out of bounds.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            xs: self.xs[range.clone()].to_vec(),
            ys: self.ys[range].to_vec(),
        }
    }

    /// Consumes the set returning both sequences.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.xs, self.ys)
    }
}

fn parse_pair(line: &str) -> Option<(f64, f64)> {
    let (x, y) = line.split_once(',')?;
    let x = x.trim().parse().ok()?;
    let y = y.trim().parse().ok()?;
    Some((x, y))
}
