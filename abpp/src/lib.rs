//! Differential analysis of competitive activity-based protein profiling
//! (ABPP) experiments quantified by the search engine's protein export.
//!
//! This library's API is based around several types that form
//! a data analysis pipeline.
//!
//! A tab-delimited protein export is loaded into a [`Table`], whose column
//! conventions are described by a [`Schema`]:
//!
//! ```rust,ignore
//! # use abpp::*;
//! let schema = Schema::default();
//! let table = Table::load("./data/exp1_Proteins.txt", &schema).unwrap();
//! schema.validate(&table, &Comparison::ALL).unwrap();
//! ```
//!
//! [`run_pipeline`] drops proteins without probe signal, log2 transforms
//! the probe group and the group it is compared against into
//! [`GroupMatrix`]es, fills missing values through an [`Imputer`] (by
//! default [`MinProb`]), and tests the paired log2 differences of every
//! protein with a one-sample t-test:
//!
//! ```rust,ignore
//! # use abpp::*;
//! # let schema = Schema::default();
//! # let table = Table::load("./data/exp1_Proteins.txt", &schema).unwrap();
//! let mut rng = seeded_rng(42, Comparison::Control.index());
//! let results = run_pipeline(
//!     &table,
//!     &schema,
//!     Comparison::Control,
//!     &MinProb::default(),
//!     &mut rng,
//! ).unwrap();
//!
//! results.write("exp1_control.tsv").unwrap();
//! ```
//!
//! Every intermediate carries the [`RowId`]s of its proteins, so results can
//! always be traced back to the line of the input file they came from.

use log::{debug, info, warn};

mod differential;
mod error;
mod filter;
mod impute;
mod matrix;
mod parser;
mod pipeline;
mod schema;
mod select;
mod stats;
mod table;

pub use differential::{compute_differential, row_mean, row_t_test, Differential};
pub use error::{Error, Result};
pub use filter::filter_rows_with_any_probe_signal;
pub use impute::{seeded_rng, Imputer, MinProb};
pub use matrix::{GroupMatrix, ImputedMatrix};
pub use pipeline::{run_pipeline, ResultRow, ResultTable, VolcanoPoint};
pub use schema::{Comparison, Schema};
pub use select::{select_abundance_columns, select_group};
pub use table::{is_observed, Column, Table};

/// Position of a protein row in the input file, counted from the first
/// line after the header
pub type RowId = usize;
