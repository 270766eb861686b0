use super::*;
use rand::RngCore;
use std::fs;
use std::io::{self, prelude::*};
use std::path::Path;

/// Final per-protein result of one comparison
#[derive(Clone, Debug, PartialEq)]
pub struct ResultRow {
    pub gene_symbol: String,
    pub row: RowId,
    pub log2_fold_change: f64,
    pub p_value: f64,
    /// Number of imputed probe values
    pub imputed_probe: usize,
    /// Number of imputed values in the comparison group
    pub imputed_comparison: usize,
    /// log2 probe values after imputation, kept for auditing
    pub probe_values: Vec<f64>,
    pub comparison_values: Vec<f64>,
}

impl ResultRow {
    pub fn any_imputed(&self) -> bool {
        self.imputed_probe + self.imputed_comparison > 0
    }
}

/// A point of a volcano plot
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VolcanoPoint<'a> {
    pub gene_symbol: &'a str,
    /// log2 fold change
    pub x: f64,
    /// -log10(p)
    pub y: f64,
    pub imputed: bool,
}

/// Output of a pipeline run, rows in input file order
#[derive(Clone, Debug, PartialEq)]
pub struct ResultTable {
    pub comparison: Comparison,
    pub probe_columns: Vec<String>,
    pub comparison_columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    pub path: String,
}

impl ResultTable {
    pub fn write<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut f = io::BufWriter::new(
            fs::OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(path)?,
        );

        writeln!(
            f,
            "gene_symbol\tlog2_fold_change\tp_value\timputed_probe\timputed_{}\t{}\t{}",
            self.comparison,
            self.probe_columns.join("\t"),
            self.comparison_columns.join("\t")
        )?;

        let join = |v: &[f64]| {
            v.iter()
                .map(|x| x.to_string())
                .collect::<Vec<String>>()
                .join("\t")
        };

        for row in &self.rows {
            writeln!(
                f,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.gene_symbol,
                row.log2_fold_change,
                row.p_value,
                row.imputed_probe,
                row.imputed_comparison,
                join(&row.probe_values),
                join(&row.comparison_values)
            )?;
        }
        f.flush()
    }

    /// Coordinates for a volcano plot. A p-value of exactly 0 is clamped to
    /// the smallest positive double so every point stays finite
    pub fn volcano_points(&self) -> Vec<VolcanoPoint<'_>> {
        self.rows
            .iter()
            .map(|r| VolcanoPoint {
                gene_symbol: &r.gene_symbol,
                x: r.log2_fold_change,
                y: -r.p_value.max(f64::MIN_POSITIVE).log10(),
                imputed: r.any_imputed(),
            })
            .collect()
    }
}

/// Run the full analysis of `table` for one comparison
///
/// Proteins without probe signal are dropped first. After that no stage
/// drops or reorders rows: the probe and comparison groups are log2
/// transformed, imputed independently (probe first, both drawing from
/// `rng`) and tested row by row. Gene symbols are attached by [`RowId`],
/// and rows whose symbol is missing are left out of the result.
pub fn run_pipeline(
    table: &Table,
    schema: &Schema,
    comparison: Comparison,
    imputer: &dyn Imputer,
    rng: &mut dyn RngCore,
) -> Result<ResultTable> {
    let filtered = filter_rows_with_any_probe_signal(table, schema)?;
    let abundance = select_abundance_columns(&filtered, schema)?;

    let probe = GroupMatrix::log2(&schema.select_probe(&abundance)?);
    let other = GroupMatrix::log2(&schema.select_comparison(&abundance, comparison)?);
    if probe.ncols() != other.ncols() {
        return Err(Error::Alignment(format!(
            "{}: {} probe replicates but {} {} replicates",
            table.path,
            probe.ncols(),
            other.ncols(),
            comparison
        )));
    }
    debug!(
        "{} ({}): {} proteins, {} replicates, {} + {} missing values",
        table.path,
        comparison,
        filtered.len(),
        probe.ncols(),
        probe.missing(),
        other.missing()
    );

    let probe = imputer.impute(&probe, rng)?;
    let other = imputer.impute(&other, rng)?;
    if probe.rows != filtered.rows || other.rows != filtered.rows {
        return Err(Error::Alignment(format!(
            "{}: imputation changed the row set ({} rows in, {}/{} out)",
            table.path,
            filtered.len(),
            probe.nrows(),
            other.nrows()
        )));
    }

    let stats = compute_differential(&probe, &other)?;

    let mut rows = Vec::with_capacity(stats.len());
    let mut unnamed = 0;
    for (i, d) in stats.iter().enumerate() {
        let gene_symbol = match filtered.identifier(d.row) {
            Some(s) => s.to_string(),
            None => {
                unnamed += 1;
                continue;
            }
        };
        rows.push(ResultRow {
            gene_symbol,
            row: d.row,
            log2_fold_change: d.log2_fold_change,
            p_value: d.p_value,
            imputed_probe: probe.missing[i],
            imputed_comparison: other.missing[i],
            probe_values: probe.values.row(i).to_vec(),
            comparison_values: other.values.row(i).to_vec(),
        });
    }
    if unnamed > 0 {
        warn!(
            "{} ({}): dropped {} proteins without a gene symbol",
            table.path, comparison, unnamed
        );
    }
    info!(
        "{} ({}): {} proteins tested",
        table.path,
        comparison,
        rows.len()
    );

    Ok(ResultTable {
        comparison,
        probe_columns: probe.names,
        comparison_columns: other.names,
        rows,
        path: table.path.clone(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;

    macro_rules! col {
        ($name:expr, $($v:expr),* $(,)?) => {
            Column::new($name, vec![$($v),*])
        };
    }

    fn table(symbols: Vec<Option<&str>>, columns: Vec<Column>) -> Table {
        Table {
            rows: (0..symbols.len()).collect(),
            identifiers: symbols.iter().map(|s| s.map(String::from)).collect(),
            accessions: vec![None; symbols.len()],
            columns,
            path: "test.txt".into(),
        }
    }

    /// Three proteins: probe up 2x, unchanged, and probe down 2x
    fn scenario() -> Table {
        let control = [[1000.0, 1500.0, 1200.0], [800.0, 900.0, 850.0], [4000.0, 3000.0, 3500.0]];
        let jitter = [1.02, 0.98, 1.0];
        let fold = [2.0, 1.0, 0.5];

        let mut columns = Vec::new();
        for r in 0..3 {
            columns.push(Column::new(
                format!("Abundance: F1: 12{}, Sample, Control", r),
                (0..3).map(|i| Some(control[i][r])).collect(),
            ));
        }
        for r in 0..3 {
            columns.push(Column::new(
                format!("Abundance: F1: 13{}, Sample, Probe", r),
                (0..3)
                    .map(|i| Some(control[i][r] * fold[i] * jitter[r]))
                    .collect(),
            ));
        }
        table(vec![Some("UP"), Some("FLAT"), Some("DOWN")], columns)
    }

    #[test]
    fn end_to_end_directions() {
        let mut rng = seeded_rng(0, 0);
        let res = run_pipeline(
            &scenario(),
            &Schema::default(),
            Comparison::Control,
            &MinProb::default(),
            &mut rng,
        )
        .unwrap();

        let symbols = res.rows.iter().map(|r| r.gene_symbol.as_str()).collect::<Vec<_>>();
        assert_eq!(symbols, vec!["UP", "FLAT", "DOWN"]);

        let up = &res.rows[0];
        let flat = &res.rows[1];
        let down = &res.rows[2];
        assert!((up.log2_fold_change - 1.0).abs() < 0.01);
        assert!(flat.log2_fold_change.abs() < 0.01);
        assert!((down.log2_fold_change + 1.0).abs() < 0.01);
        assert!(up.p_value < 0.01);
        assert!(down.p_value < 0.01);
        assert!(flat.p_value > 0.5);
        assert!(res.rows.iter().all(|r| !r.any_imputed()));
        assert_eq!(res.probe_columns.len(), 3);
        assert_eq!(res.comparison_columns.len(), 3);
    }

    #[test]
    fn identifiers_stay_aligned() {
        let t = table(
            vec![Some("A"), Some("B"), None, Some("D"), Some("E")],
            vec![
                col!(
                    "Abundance: F1: 126, Control",
                    Some(10.0),
                    Some(20.0),
                    Some(30.0),
                    Some(40.0),
                    Some(50.0),
                ),
                col!(
                    "Abundance: F1: 127, Control",
                    Some(11.0),
                    Some(21.0),
                    Some(31.0),
                    Some(41.0),
                    Some(51.0),
                ),
                col!(
                    "Abundance: F1: 128, Probe",
                    Some(12.0),
                    None,
                    Some(32.0),
                    Some(42.0),
                    Some(52.0),
                ),
                col!("Abundance: F1: 129, Probe", Some(13.0), None, Some(33.0), Some(43.0), None),
            ],
        );
        let res = run_pipeline(
            &t,
            &Schema::default(),
            Comparison::Control,
            &MinProb::default(),
            &mut seeded_rng(3, 0),
        )
        .unwrap();

        // B has no probe signal, the third row has no gene symbol
        let ids = res.rows.iter().map(|r| (r.row, r.gene_symbol.as_str())).collect::<Vec<_>>();
        assert_eq!(ids, vec![(0, "A"), (3, "D"), (4, "E")]);

        // values of D come from the fourth input row
        let d = &res.rows[1];
        assert_eq!(d.probe_values, vec![42f64.log2(), 43f64.log2()]);
        assert_eq!(d.comparison_values, vec![40f64.log2(), 41f64.log2()]);

        let e = &res.rows[2];
        assert_eq!(e.imputed_probe, 1);
        assert_eq!(e.imputed_comparison, 0);
        assert!(e.probe_values.iter().all(|v| v.is_finite()));
    }

    struct Spy<'a> {
        seen: &'a RefCell<Vec<Vec<RowId>>>,
    }

    impl<'a> Imputer for Spy<'a> {
        fn impute(&self, matrix: &GroupMatrix, rng: &mut dyn RngCore) -> Result<ImputedMatrix> {
            self.seen.borrow_mut().push(matrix.rows.clone());
            MinProb::default().impute(matrix, rng)
        }
    }

    #[test]
    fn missing_probe_rows_never_reach_the_imputer() {
        let t = table(
            vec![Some("A"), Some("B"), Some("C")],
            vec![
                col!("Abundance: F1: 126, Control", Some(10.0), Some(20.0), Some(30.0)),
                col!("Abundance: F1: 127, Control", Some(11.0), Some(21.0), Some(31.0)),
                col!("Abundance: F1: 128, Probe", Some(12.0), None, Some(32.0)),
                col!("Abundance: F1: 129, Probe", Some(13.0), None, Some(33.0))
            ],
        );
        let seen = RefCell::new(Vec::new());
        run_pipeline(
            &t,
            &Schema::default(),
            Comparison::Control,
            &Spy { seen: &seen },
            &mut seeded_rng(0, 0),
        )
        .unwrap();
        assert_eq!(seen.into_inner(), vec![vec![0, 2], vec![0, 2]]);
    }

    #[test]
    fn competitor_comparison() {
        let t = table(
            vec![Some("A"), Some("B")],
            vec![
                col!("Abundance: F1: 126, Control", Some(10.0), Some(20.0)),
                col!("Abundance: F1: 127, Probe", Some(40.0), Some(20.0)),
                col!("Abundance: F1: 128, Probe", Some(42.0), Some(21.0)),
                col!("Abundance: F1: 129, Competitor + Probe", Some(10.0), Some(20.0)),
                col!("Abundance: F1: 130, Competitor + Probe", Some(11.0), Some(20.0))
            ],
        );
        let res = run_pipeline(
            &t,
            &Schema::default(),
            Comparison::Competitor,
            &MinProb::default(),
            &mut seeded_rng(0, 1),
        )
        .unwrap();
        assert_eq!(res.comparison, Comparison::Competitor);
        assert_eq!(res.probe_columns.len(), 2);
        assert!(res.comparison_columns.iter().all(|c| c.contains("Competitor")));
        assert!(res.rows[0].log2_fold_change > 1.5);

        // one control column against two probe columns
        assert!(matches!(
            run_pipeline(
                &t,
                &Schema::default(),
                Comparison::Control,
                &MinProb::default(),
                &mut seeded_rng(0, 0),
            ),
            Err(Error::Alignment(_))
        ));
    }

    #[test]
    fn volcano_points() {
        let row = |p: f64, imputed: usize| ResultRow {
            gene_symbol: "X".into(),
            row: 0,
            log2_fold_change: 1.5,
            p_value: p,
            imputed_probe: imputed,
            imputed_comparison: 0,
            probe_values: vec![],
            comparison_values: vec![],
        };
        let res = ResultTable {
            comparison: Comparison::Control,
            probe_columns: vec![],
            comparison_columns: vec![],
            rows: vec![row(0.01, 0), row(0.0, 2)],
            path: "test.txt".into(),
        };
        let pts = res.volcano_points();
        assert!((pts[0].y - 2.0).abs() < 1e-12);
        assert!(!pts[0].imputed);
        assert!(pts[1].y.is_finite() && pts[1].y > 300.0);
        assert!(pts[1].imputed);
        assert_eq!(pts[1].x, 1.5);
    }

    #[test]
    fn write_tsv() {
        let res = run_pipeline(
            &scenario(),
            &Schema::default(),
            Comparison::Control,
            &MinProb::default(),
            &mut seeded_rng(0, 0),
        )
        .unwrap();
        let path = std::env::temp_dir().join(format!("abpp_write_{}.tsv", std::process::id()));
        res.write(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        let header = lines[0].split('\t').collect::<Vec<_>>();
        assert_eq!(
            &header[..5],
            &["gene_symbol", "log2_fold_change", "p_value", "imputed_probe", "imputed_control"]
        );
        assert_eq!(header.len(), 11);
        assert!(lines[1].starts_with("UP\t"));
        assert_eq!(lines[3].split('\t').count(), 11);
    }
}
