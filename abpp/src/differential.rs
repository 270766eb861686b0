use super::*;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Per-protein statistics of one comparison
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Differential {
    pub row: RowId,
    pub log2_fold_change: f64,
    pub p_value: f64,
}

/// Arithmetic mean of a row of log2 differences
#[inline]
pub fn row_mean(values: &[f64]) -> f64 {
    stats::mean(values)
}

/// Two-tailed one-sample t-test of `values` against a mean of 0, using
/// Student's t with n - 1 degrees of freedom
///
/// A row without spread has an infinite t statistic unless its mean is
/// exactly 0. Such a row gets p = 0, the limit of the test as the spread
/// shrinks, even though no finite t reaches it. A row of zeros gets p = 1.
pub fn row_t_test(values: &[f64]) -> Result<f64> {
    let n = values.len();
    if n < 2 {
        return Err(Error::Statistical(format!(
            "t-test needs at least 2 values, got {}",
            n
        )));
    }
    if let Some(x) = values.iter().find(|x| !x.is_finite()) {
        return Err(Error::Statistical(format!(
            "t-test on non-finite value {}",
            x
        )));
    }

    let mean = stats::mean(values);
    let sd = stats::stddev(values);
    if sd == 0.0 {
        return Ok(if mean == 0.0 { 1.0 } else { 0.0 });
    }

    let t = mean / (sd / (n as f64).sqrt());
    let dist = StudentsT::new(0.0, 1.0, (n - 1) as f64)
        .map_err(|e| Error::Statistical(format!("Student's t with {} df: {}", n - 1, e)))?;
    Ok((2.0 * dist.cdf(-t.abs())).min(1.0))
}

/// Compare two imputed groups row by row
///
/// Both groups must describe the same proteins in the same order and carry
/// the same number of replicates: the difference matrix `a - b` is paired
/// by column position.
pub fn compute_differential(a: &ImputedMatrix, b: &ImputedMatrix) -> Result<Vec<Differential>> {
    if a.rows != b.rows {
        return Err(Error::Alignment(format!(
            "groups cover different proteins ({} vs {} rows)",
            a.nrows(),
            b.nrows()
        )));
    }
    if a.ncols() != b.ncols() {
        return Err(Error::Alignment(format!(
            "replicate count mismatch: {} columns ({}) vs {} columns ({})",
            a.ncols(),
            a.names.join(", "),
            b.ncols(),
            b.names.join(", ")
        )));
    }

    let diff = &a.values - &b.values;
    let mut zero_variance = 0;
    let out = diff
        .outer_iter()
        .zip(&a.rows)
        .map(|(lane, &row)| {
            let values = lane.to_vec();
            let log2_fold_change = row_mean(&values);
            let p_value = row_t_test(&values)
                .map_err(|e| Error::Statistical(format!("row {}: {}", row, e)))?;
            if stats::stddev(&values) == 0.0 {
                zero_variance += 1;
            }
            Ok(Differential {
                row,
                log2_fold_change,
                p_value,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if zero_variance > 0 {
        warn!(
            "{} rows have identical differences across replicates",
            zero_variance
        );
    }
    Ok(out)
}
