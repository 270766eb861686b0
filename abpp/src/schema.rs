//! Column naming conventions of the search engine's protein export
use super::*;
use std::fmt;

/// Which condition the probe channel is compared against
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// Probe vs. vehicle control
    Control,
    /// Probe vs. competitor + probe
    Competitor,
}

impl Comparison {
    pub const ALL: [Comparison; 2] = [Comparison::Control, Comparison::Competitor];

    /// Stable index, used to derive a per-comparison random stream
    pub fn index(self) -> u64 {
        match self {
            Comparison::Control => 0,
            Comparison::Competitor => 1,
        }
    }

    /// Human readable label, e.g. for plot titles
    pub fn label(self) -> &'static str {
        match self {
            Comparison::Control => "probe vs. control",
            Comparison::Competitor => "probe vs. competitor + probe",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Control => write!(f, "control"),
            Comparison::Competitor => write!(f, "competitor"),
        }
    }
}

/// Explicit description of the columns a protein table must provide
///
/// Group membership is encoded in the abundance column headers, e.g.
/// `Abundance: F1: 127N, Sample, Competitor + Probe`. The probe marker is
/// contained in the competitor marker, so whether a plain probe selection
/// also picks up competitor columns is controlled by `exclusive_probe`.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    /// Header of the gene symbol column
    pub identifier: String,
    /// Header of the protein accession column, used for gene symbol rescue
    pub accession: String,
    /// Prefix shared by every abundance column
    pub abundance_prefix: String,
    pub control_marker: String,
    pub probe_marker: String,
    pub competitor_marker: String,
    /// Exclude columns matching `competitor_marker` from the probe group
    pub exclusive_probe: bool,
}

impl Default for Schema {
    fn default() -> Schema {
        Schema {
            identifier: "Gene Symbol".into(),
            accession: "Accession".into(),
            abundance_prefix: "Abundance: F".into(),
            control_marker: "Control".into(),
            probe_marker: "Probe".into(),
            competitor_marker: "Competitor + Probe".into(),
            exclusive_probe: true,
        }
    }
}

impl Schema {
    /// Marker of the group the probe is compared against
    pub fn marker(&self, comparison: Comparison) -> &str {
        match comparison {
            Comparison::Control => &self.control_marker,
            Comparison::Competitor => &self.competitor_marker,
        }
    }

    pub fn is_abundance(&self, header: &str) -> bool {
        header.starts_with(&self.abundance_prefix)
    }

    pub fn is_probe(&self, header: &str) -> bool {
        header.contains(&self.probe_marker)
            && !(self.exclusive_probe && header.contains(&self.competitor_marker))
    }

    /// Probe columns of an abundance table
    pub fn select_probe(&self, abundance: &Table) -> Result<Table> {
        let table = abundance.select_columns(|h| self.is_probe(h));
        if table.columns.is_empty() {
            return Err(Error::Schema(format!(
                "probe marker '{}' matched no abundance columns in {}{}",
                self.probe_marker,
                abundance.path,
                if self.exclusive_probe {
                    format!(" (excluding '{}')", self.competitor_marker)
                } else {
                    String::new()
                }
            )));
        }
        Ok(table)
    }

    /// Columns of the group the probe is compared against
    pub fn select_comparison(&self, abundance: &Table, comparison: Comparison) -> Result<Table> {
        select_group(abundance, self.marker(comparison))
    }

    /// Check up front that `table` carries every column the requested
    /// comparisons need, so a misnamed export fails before any work is done
    pub fn validate(&self, table: &Table, comparisons: &[Comparison]) -> Result<()> {
        let abundance = select_abundance_columns(table, self)?;
        let probe = self.select_probe(&abundance)?;
        debug!(
            "{}: {} abundance columns, {} probe columns",
            table.path,
            abundance.columns.len(),
            probe.columns.len()
        );
        for &comparison in comparisons {
            let group = self.select_comparison(&abundance, comparison)?;
            if group.columns.len() != probe.columns.len() {
                warn!(
                    "{}: {} probe columns but {} {} columns; this comparison will fail",
                    table.path,
                    probe.columns.len(),
                    group.columns.len(),
                    comparison
                );
            }
        }
        Ok(())
    }
}
