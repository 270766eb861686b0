use super::*;
use uniprot::fasta::Fasta;

/// A numeric column of a protein table. `None` marks a cell with no value
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new<S: Into<String>>(name: S, values: Vec<Option<f64>>) -> Column {
        Column {
            name: name.into(),
            values,
        }
    }

    /// Number of cells that hold no usable abundance
    pub fn missing(&self) -> usize {
        self.values.iter().filter(|v| !is_observed(**v)).count()
    }
}

/// An abundance only counts as observed if it can be log-transformed
#[inline]
pub fn is_observed(value: Option<f64>) -> bool {
    match value {
        Some(x) => x.is_finite() && x > 0.0,
        None => false,
    }
}

/// Protein-level quantification table, one row per protein group
///
/// INVARIANT: `rows`, `identifiers`, `accessions` and the `values` of every
/// column all have the same length, and `rows` is strictly increasing.
/// Stages never reorder rows, they only drop them, so a [`RowId`] always
/// points back at the same line of the input file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<RowId>,
    /// Gene symbols, `None` if the cell was empty
    pub identifiers: Vec<Option<String>>,
    pub accessions: Vec<Option<String>>,
    pub columns: Vec<Column>,
    pub path: String,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Return a new table holding only the columns whose header passes
    /// `keep`. Row ids, identifiers and accessions are carried over as-is
    pub fn select_columns<F: Fn(&str) -> bool>(&self, keep: F) -> Table {
        Table {
            rows: self.rows.clone(),
            identifiers: self.identifiers.clone(),
            accessions: self.accessions.clone(),
            columns: self
                .columns
                .iter()
                .filter(|c| keep(&c.name))
                .cloned()
                .collect(),
            path: self.path.clone(),
        }
    }

    /// Return a new table containing only the rows where `mask` is true
    pub fn retain_rows(&self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.len() {
            return Err(Error::Alignment(format!(
                "row mask has {} entries but {} has {} rows",
                mask.len(),
                self.path,
                self.len()
            )));
        }

        fn keep<T: Clone>(v: &[T], mask: &[bool]) -> Vec<T> {
            v.iter()
                .zip(mask)
                .filter(|(_, m)| **m)
                .map(|(x, _)| x.clone())
                .collect()
        }

        Ok(Table {
            rows: keep(&self.rows, mask),
            identifiers: keep(&self.identifiers, mask),
            accessions: keep(&self.accessions, mask),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), keep(&c.values, mask)))
                .collect(),
            path: self.path.clone(),
        })
    }

    /// Gene symbol of the row with id `row`. Empty symbols count as missing
    pub fn identifier(&self, row: RowId) -> Option<&str> {
        let idx = self.rows.binary_search(&row).ok()?;
        self.identifiers[idx]
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Fill in missing gene symbols from a UniProt FASTA database
    ///
    /// Protein groups list several accessions separated by `;`, the
    /// first (master) accession is the one looked up.
    pub fn rescue_identifiers(mut self, fasta: &Fasta) -> Table {
        let mut rescued = 0;
        for (symbol, acc) in self.identifiers.iter_mut().zip(&self.accessions) {
            let empty = symbol.as_deref().map_or(true, |s| s.trim().is_empty());
            if !empty {
                continue;
            }
            let master = acc
                .as_deref()
                .and_then(|a| a.split(';').next())
                .map(str::trim);
            if let Some(gene) = master.and_then(|a| fasta.gene_name(a)) {
                *symbol = Some(gene.to_string());
                rescued += 1;
            }
        }
        debug!("{}: rescued {} gene symbols from FASTA", self.path, rescued);
        self
    }
}
