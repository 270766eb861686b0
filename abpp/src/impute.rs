//! Missing value imputation for left-censored log2 abundances
use super::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// A policy for filling the missing entries of a [`GroupMatrix`]
///
/// Implementations must return a matrix of identical shape, with the same
/// row ids, and record per row how many entries they filled.
pub trait Imputer {
    fn impute(&self, matrix: &GroupMatrix, rng: &mut dyn RngCore) -> Result<ImputedMatrix>;
}

/// Deterministic random stream for one pipeline run
///
/// Every (dataset, comparison) pair gets its own ChaCha stream under the
/// same seed, so results do not depend on the order runs are scheduled in.
pub fn seeded_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

/// Minimum probability imputation
///
/// Missing values are assumed to sit below the detection limit. Each
/// missing entry of column `j` is drawn from a normal distribution centred
/// on a low quantile of the observed values of that column. The spread is
/// the median standard deviation of proteins observed in more than half of
/// the columns, scaled by `tune_sigma`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MinProb {
    /// Quantile of each column used as the centre of the draw
    pub quantile: f64,
    pub tune_sigma: f64,
}

impl Default for MinProb {
    fn default() -> MinProb {
        MinProb {
            quantile: 0.01,
            tune_sigma: 1.0,
        }
    }
}

impl MinProb {
    /// Low-tail centre of every column
    fn floors(&self, matrix: &GroupMatrix) -> Result<Vec<f64>> {
        (0..matrix.ncols())
            .map(|j| {
                stats::quantile(&matrix.observed_in_column(j), self.quantile).ok_or_else(|| {
                    Error::Imputation(format!(
                        "column '{}' has no observed values",
                        matrix.names[j]
                    ))
                })
            })
            .collect()
    }

    /// Median per-protein standard deviation over well-observed proteins
    fn sigma(&self, matrix: &GroupMatrix) -> Result<f64> {
        let sds = (0..matrix.nrows())
            .map(|i| matrix.observed_in_row(i))
            .filter(|obs| obs.len() * 2 > matrix.ncols() && obs.len() >= 2)
            .map(|obs| stats::stddev(&obs))
            .collect::<Vec<f64>>();

        stats::median(&sds)
            .map(|sd| sd * self.tune_sigma)
            .ok_or_else(|| {
                Error::Imputation(format!(
                    "no protein is observed in more than half of the {} columns ({}) \
                     with at least two values, cannot estimate the spread",
                    matrix.ncols(),
                    matrix.names.join(", ")
                ))
            })
    }
}

impl Imputer for MinProb {
    fn impute(&self, matrix: &GroupMatrix, rng: &mut dyn RngCore) -> Result<ImputedMatrix> {
        let missing = matrix.missing_per_row();
        let total = missing.iter().sum::<usize>();
        if total == 0 {
            return Ok(ImputedMatrix {
                rows: matrix.rows.clone(),
                names: matrix.names.clone(),
                values: matrix.values.map(|v| v.unwrap_or(f64::NAN)),
                missing,
            });
        }

        let floors = self.floors(matrix)?;
        let sigma = self.sigma(matrix)?;
        debug!(
            "imputing {} of {} values ({} columns), sigma = {:.4}",
            total,
            matrix.values.len(),
            matrix.ncols(),
            sigma
        );

        let mut values = matrix.values.map(|v| v.unwrap_or(f64::NAN));
        for (j, &floor) in floors.iter().enumerate() {
            if matrix.values.column(j).iter().all(Option::is_some) {
                continue;
            }
            let normal = Normal::new(floor, sigma).map_err(|e| {
                Error::Imputation(format!(
                    "column '{}': cannot draw from N({}, {}): {}",
                    matrix.names[j], floor, sigma, e
                ))
            })?;
            for i in 0..matrix.nrows() {
                if matrix.values[[i, j]].is_none() {
                    values[[i, j]] = normal.sample(rng);
                }
            }
        }

        Ok(ImputedMatrix {
            rows: matrix.rows.clone(),
            names: matrix.names.clone(),
            values,
            missing,
        })
    }
}
