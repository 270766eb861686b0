use abpp::*;
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use log::{debug, error, info};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uniprot::fasta::Fasta;

mod plot;

mod cli {
    use clap::{Parser, ValueEnum};
    use std::path::PathBuf;

    #[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
    pub enum ComparisonArg {
        Control,
        Competitor,
        Both,
    }

    #[derive(Parser, Debug)]
    #[command(
        author,
        version,
        about = "Volcano analysis of competitive ABPP protein exports.",
        long_about = None
    )]
    pub struct Args {
        /// Protein exports (tab-delimited), or directories containing them
        #[arg(required = true)]
        pub inputs: Vec<PathBuf>,

        #[arg(short, long = "out", default_value = ".")]
        pub out_dir: PathBuf,

        #[arg(short, long, value_enum, default_value_t = ComparisonArg::Both)]
        pub comparison: ComparisonArg,

        /// Seed for the imputation draws; a random seed is logged if absent
        #[arg(long)]
        pub seed: Option<u64>,

        /// Column quantile used as the centre of imputed values
        #[arg(long, default_value_t = 0.01)]
        pub quantile: f64,

        /// Scale factor on the spread of imputed values
        #[arg(long, default_value_t = 1.0)]
        pub tune_sigma: f64,

        #[arg(long, default_value = "Gene Symbol")]
        pub identifier: String,

        #[arg(long, default_value = "Accession")]
        pub accession: String,

        #[arg(long, default_value = "Abundance: F")]
        pub abundance_prefix: String,

        #[arg(long, default_value = "Control")]
        pub control_marker: String,

        #[arg(long, default_value = "Probe")]
        pub probe_marker: String,

        #[arg(long, default_value = "Competitor + Probe")]
        pub competitor_marker: String,

        /// Let the probe group include columns that also match the
        /// competitor marker
        #[arg(long)]
        pub inclusive_probe: bool,

        /// UniProt FASTA used to fill in missing gene symbols
        #[arg(long)]
        pub fasta: Option<PathBuf>,

        #[arg(long)]
        pub no_plot: bool,

        #[arg(short = 't', long)]
        pub threads: Option<usize>,

        #[arg(long, default_value = "Info")]
        pub log_level: String,
    }
}

impl cli::Args {
    fn schema(&self) -> Schema {
        Schema {
            identifier: self.identifier.clone(),
            accession: self.accession.clone(),
            abundance_prefix: self.abundance_prefix.clone(),
            control_marker: self.control_marker.clone(),
            probe_marker: self.probe_marker.clone(),
            competitor_marker: self.competitor_marker.clone(),
            exclusive_probe: !self.inclusive_probe,
        }
    }

    fn imputer(&self) -> Result<MinProb> {
        if !(0.0..=1.0).contains(&self.quantile) {
            bail!("--quantile must lie in [0, 1], got {}", self.quantile);
        }
        if !(self.tune_sigma >= 0.0 && self.tune_sigma.is_finite()) {
            bail!("--tune-sigma must be finite and >= 0, got {}", self.tune_sigma);
        }
        Ok(MinProb {
            quantile: self.quantile,
            tune_sigma: self.tune_sigma,
        })
    }

    fn comparisons(&self) -> Vec<Comparison> {
        match self.comparison {
            cli::ComparisonArg::Control => vec![Comparison::Control],
            cli::ComparisonArg::Competitor => vec![Comparison::Competitor],
            cli::ComparisonArg::Both => Comparison::ALL.to_vec(),
        }
    }
}

/// Expand directories into the protein exports they contain
///
/// Result tables written by an earlier run are skipped, and two inputs
/// sharing a file stem are refused since their outputs would collide.
fn scan_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut v = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in fs::read_dir(input)
                .with_context(|| format!("failed to read directory {}", input.display()))?
            {
                let path = entry?.path();
                if path.is_file() && !is_result_table(&path) {
                    if let Some(ext) = path.extension() {
                        if ext == "txt" || ext == "tsv" {
                            v.push(path);
                        }
                    }
                }
            }
        } else {
            v.push(input.clone());
        }
    }
    v.sort();
    v.dedup();

    let mut stems: HashMap<String, &PathBuf> = HashMap::new();
    for path in &v {
        if let Some(other) = stems.insert(stem(path), path) {
            bail!(
                "{} and {} would write to the same output files, rename one of them",
                other.display(),
                path.display()
            );
        }
    }
    Ok(v)
}

/// `<stem>_<comparison>.tsv`, as written by [`Run::process`]
fn is_result_table(path: &Path) -> bool {
    let name = stem(path);
    path.extension().map_or(false, |ext| ext == "tsv")
        && Comparison::ALL
            .iter()
            .any(|c| name.ends_with(&format!("_{}", c)))
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("results"))
}

/// Settings shared by every dataset of a batch
struct Run<'a> {
    schema: Schema,
    imputer: MinProb,
    comparisons: Vec<Comparison>,
    fasta: Option<&'a Fasta>,
    seed: u64,
    out_dir: &'a Path,
    plot: bool,
}

impl<'a> Run<'a> {
    /// Analyze one protein export. `idx` is the position of the file in the
    /// sorted input list and selects its random streams
    fn process(&self, idx: usize, path: &Path) -> Result<()> {
        let start = Instant::now();
        let table = Table::load(path, &self.schema)
            .with_context(|| format!("failed to load {}", path.display()))?;
        let table = match self.fasta {
            Some(fasta) => table.rescue_identifiers(fasta),
            None => table,
        };
        self.schema.validate(&table, &self.comparisons)?;

        let name = stem(path);
        for &comparison in &self.comparisons {
            let stream = idx as u64 * Comparison::ALL.len() as u64 + comparison.index();
            let mut rng = seeded_rng(self.seed, stream);
            let results = run_pipeline(&table, &self.schema, comparison, &self.imputer, &mut rng)
                .with_context(|| format!("{} ({})", path.display(), comparison))?;

            let tsv = self.out_dir.join(format!("{}_{}.tsv", name, comparison));
            results
                .write(&tsv)
                .with_context(|| format!("failed to write {}", tsv.display()))?;
            debug!("wrote {}", tsv.display());

            if self.plot {
                let svg = self.out_dir.join(format!("{}_{}.svg", name, comparison));
                let label = format!("{}: {}", name, comparison.label());
                plot::volcano(&results, &label, &svg)
                    .with_context(|| format!("failed to plot {}", svg.display()))?;
                debug!("wrote {}", svg.display());
            }
        }
        info!("{} finished in {:.2?}", path.display(), start.elapsed());
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let log_level = args
        .log_level
        .parse::<log::LevelFilter>()
        .unwrap_or_else(|_| {
            eprintln!(
                "Warning: Invalid log level '{}' provided. Defaulting to Info.",
                args.log_level
            );
            log::LevelFilter::Info
        });
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_micros()
        .init();
    debug!("{:?}", args);

    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new().num_threads(n).build_global()?;
    }

    let inputs = scan_inputs(&args.inputs)?;
    if inputs.is_empty() {
        bail!("no protein exports (.txt or .tsv) found in {:?}", args.inputs);
    }
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let fasta = match &args.fasta {
        Some(path) => {
            let db = Fasta::open(path)
                .with_context(|| format!("failed to load FASTA {}", path.display()))?;
            info!("loaded {} gene names from {}", db.len(), path.display());
            Some(db)
        }
        None => None,
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(
        "analyzing {} file(s), imputation seed {}",
        inputs.len(),
        seed
    );

    let run = Run {
        schema: args.schema(),
        imputer: args.imputer()?,
        comparisons: args.comparisons(),
        fasta: fasta.as_ref(),
        seed,
        out_dir: &args.out_dir,
        plot: !args.no_plot,
    };

    let failures = inputs
        .par_iter()
        .enumerate()
        .filter_map(|(idx, path)| run.process(idx, path).err())
        .collect::<Vec<anyhow::Error>>();

    for e in &failures {
        error!("{:#}", e);
    }
    if !failures.is_empty() {
        return Err(anyhow!(
            "{} of {} file(s) failed, see errors above",
            failures.len(),
            inputs.len()
        ));
    }
    Ok(())
}
