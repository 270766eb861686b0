//! Loading of tab-delimited protein tables exported by the search engine
use super::*;
use memchr::{memchr_iter, Memchr};
use std::fs;
use std::io::prelude::*;
use std::path::Path;

/// Generalized wrapper around [`Memchr`] iterator for splitting `&[u8]` slices
/// by a byte.
struct Pitchfork<'a> {
    pos: usize,
    haystack: &'a [u8],
    inner: Memchr<'a>,
}

impl<'a> Pitchfork<'a> {
    pub fn new(needle: u8, haystack: &'a [u8]) -> Self {
        Self {
            pos: 0,
            haystack,
            inner: memchr_iter(needle, haystack),
        }
    }
}

impl<'a> Iterator for Pitchfork<'a> {
    type Item = &'a [u8];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let end = match self.inner.next() {
            Some(e) => e,
            None => {
                if self.pos < self.haystack.len() {
                    self.haystack.len()
                } else {
                    return None;
                }
            }
        };
        let slice = &self.haystack[self.pos..end];
        self.pos = end + 1;
        Some(slice)
    }
}

/// Strip line endings, whitespace and the quotes spreadsheet exports put
/// around fields
fn clean(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
        .trim()
}

fn cell(field: &str) -> Option<String> {
    let field = clean(field);
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

/// Blank and non-numeric cells are missing
fn numeric(field: &str) -> Option<f64> {
    clean(field).parse::<f64>().ok()
}

impl Table {
    /// Load a tab-delimited protein table. The first line holds the headers
    ///
    /// Only the gene symbol column is required at this point; every other
    /// column is read as numeric, so text metadata simply ends up as
    /// columns of missing values.
    pub fn load<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<Table> {
        let mut buffer = Vec::new();
        fs::File::open(path.as_ref())?.read_to_end(&mut buffer)?;
        let name = path.as_ref().display().to_string();
        Table::parse(&buffer, &name, schema)
    }

    /// Parse an in-memory protein table, `name` is used for error messages
    pub fn parse(buffer: &[u8], name: &str, schema: &Schema) -> Result<Table> {
        let text = |line: usize, bytes: &[u8]| -> Result<String> {
            String::from_utf8(bytes.to_vec()).map_err(|e| Error::Parse {
                path: name.into(),
                line,
                reason: e.to_string(),
            })
        };

        let mut lines = Pitchfork::new(b'\n', buffer).enumerate();
        let headers = match lines.next() {
            Some((_, line)) => text(1, line)?
                .split('\t')
                .map(|h| clean(h).to_string())
                .collect::<Vec<String>>(),
            None => {
                return Err(Error::Schema(format!("{} is empty", name)));
            }
        };

        let id_idx = headers
            .iter()
            .position(|h| h == &schema.identifier)
            .ok_or_else(|| {
                Error::Schema(format!(
                    "{} has no '{}' column",
                    name, schema.identifier
                ))
            })?;
        let acc_idx = headers.iter().position(|h| h == &schema.accession);
        if acc_idx.is_none() {
            debug!("{} has no '{}' column", name, schema.accession);
        }

        let mut table = Table {
            path: name.into(),
            columns: headers
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != id_idx && Some(*idx) != acc_idx)
                .map(|(_, h)| Column::new(h.clone(), Vec::new()))
                .collect(),
            ..Table::default()
        };

        for (idx, line) in lines {
            let line_no = idx + 1;
            let line = text(line_no, line)?;
            if line.trim().is_empty() {
                continue;
            }
            let fields = line.split('\t').collect::<Vec<&str>>();
            if fields.len() > headers.len() {
                return Err(Error::Parse {
                    path: name.into(),
                    line: line_no,
                    reason: format!(
                        "{} fields but only {} headers",
                        fields.len(),
                        headers.len()
                    ),
                });
            }
            let field = |i: usize| fields.get(i).copied().unwrap_or_default();

            table.rows.push(line_no - 2);
            table.identifiers.push(cell(field(id_idx)));
            table.accessions.push(acc_idx.and_then(|i| cell(field(i))));

            let mut column = table.columns.iter_mut();
            for i in (0..headers.len()).filter(|&i| i != id_idx && Some(i) != acc_idx) {
                if let Some(c) = column.next() {
                    c.values.push(numeric(field(i)));
                }
            }
        }

        debug!(
            "{}: loaded {} proteins x {} columns",
            name,
            table.len(),
            table.columns.len()
        );
        Ok(table)
    }
}
