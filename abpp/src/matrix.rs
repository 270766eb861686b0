use super::*;
use ndarray::{Array2, ArrayView1, Axis};

/// log2 abundances of one condition: rows are proteins, columns replicates
///
/// `None` is "no value", never zero or NaN.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupMatrix {
    pub rows: Vec<RowId>,
    pub names: Vec<String>,
    pub values: Array2<Option<f64>>,
}

impl GroupMatrix {
    /// log2-transform every column of `table`. Cells that are missing or
    /// cannot be log-transformed (zero, negative) become `None`
    pub fn log2(table: &Table) -> GroupMatrix {
        let mut values = Array2::from_elem((table.len(), table.columns.len()), None);
        for (j, column) in table.columns.iter().enumerate() {
            for (i, v) in column.values.iter().enumerate() {
                if is_observed(*v) {
                    values[[i, j]] = v.map(f64::log2);
                }
            }
        }
        GroupMatrix {
            rows: table.rows.clone(),
            names: table.headers().map(String::from).collect(),
            values,
        }
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    /// Total number of missing entries
    pub fn missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Missing entries per row
    pub fn missing_per_row(&self) -> Vec<usize> {
        self.values
            .axis_iter(Axis(0))
            .map(|row| row.iter().filter(|v| v.is_none()).count())
            .collect()
    }

    /// Observed values of column `j`
    pub fn observed_in_column(&self, j: usize) -> Vec<f64> {
        observed(self.values.column(j))
    }

    /// Observed values of row `i`
    pub fn observed_in_row(&self, i: usize) -> Vec<f64> {
        observed(self.values.row(i))
    }
}

fn observed(lane: ArrayView1<Option<f64>>) -> Vec<f64> {
    lane.iter().filter_map(|v| *v).collect()
}

/// A [`GroupMatrix`] with every missing entry filled in
#[derive(Clone, Debug, PartialEq)]
pub struct ImputedMatrix {
    pub rows: Vec<RowId>,
    pub names: Vec<String>,
    pub values: Array2<f64>,
    /// How many entries of each row were imputed
    pub missing: Vec<usize>,
}

impl ImputedMatrix {
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }
}
