//! Gene name lookup from UniProtKB FASTA headers
use super::Pitchfork;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, prelude::*};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct Fasta {
    /// Accession -> gene name
    pub map: HashMap<String, String>,
}

/// Split a header like `>sp|Q13526|PIN1_HUMAN ... GN=PIN1 PE=1 SV=1` into
/// accession and gene name
fn parse_header(line: &str) -> Option<(String, String)> {
    let acc = line.split('|').nth(1)?.trim();
    let gene = line
        .split_whitespace()
        .find_map(|field| field.strip_prefix("GN="))?;
    if acc.is_empty() || gene.is_empty() {
        return None;
    }
    Some((acc.into(), gene.into()))
}

impl Fasta {
    /// Build a gene name database from a FASTA file
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Fasta> {
        let mut buf = Vec::new();
        File::open(path)?.read_to_end(&mut buf)?;
        Ok(Fasta::parse(&String::from_utf8_lossy(&buf)))
    }

    /// Build a gene name database from FASTA text. Decoy (`Reverse`)
    /// entries and entries without a `GN=` field are skipped
    pub fn parse(text: &str) -> Fasta {
        let map = Pitchfork::new(b'\n', text.as_bytes())
            .filter(|line| line.first() == Some(&b'>'))
            .map(String::from_utf8_lossy)
            .filter(|id| !id.contains("Reverse"))
            .filter_map(|id| parse_header(&id))
            .collect();
        Fasta { map }
    }

    pub fn gene_name(&self, acc: &str) -> Option<&str> {
        self.map.get(acc).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const DB: &str = ">sp|Q13526|PIN1_HUMAN Peptidyl-prolyl cis-trans isomerase NIMA-interacting 1 OS=Homo sapiens OX=9606 GN=PIN1 PE=1 SV=1
MADEEKLPPGWEKRMSRSSGRVYYFNHITNASQWERPSGNSSSGGKNGQGEPARVRCSHLLVKHSQSRRPSSWRQEKITR
TKEEALELINGYIQKIKSGEEDFESLASQFSDCSSAKARGDLGAFSRGQMQKPFEDASFALRTGEMSGPVFTDSGIHIILRTE
>Reverse_sp|Q13526|PIN1_HUMAN decoy GN=NIP1
ETRLIIHIGSDTFVPGSMEGTRLAFSADEFPKQMQGRSFAGLDGRAKASSCDSFQSALSEFDEEGSKIKQIYGNILELAEEKT
>sp|P0DTC2|SPIKE_SARS2 Spike glycoprotein OS=Severe acute respiratory syndrome coronavirus 2 OX=2697049 PE=1 SV=1
MFVFLVLLPLVSSQCVNLTTRTQLPPAYTNSFTRGVYYPDKVFRSSVLHSTQDLFLPFFSNVTWFHAIHVSGTNGTKRFDN
>tr|A0A024R161|A0A024R161_HUMAN Guanine nucleotide-binding protein subunit gamma OS=Homo sapiens OX=9606 GN=DNAJC25-GNG10 PE=3 SV=1
MGAPLLSPGWGAGAAGRRWWMLLAPLLPALLLVRPAGALVEGLYCGTRDCYEVLGVSRSAGKAEIARAYRQLARRYHPDRYRPQPGDEGPGRTPQSAEEAFLLVATAYETLKVSQAAAELQQYCMQNACKDALLVGVPAGSNPFREPRSCALL";

    #[test]
    fn gene_names() {
        let db = Fasta::parse(DB);
        assert_eq!(db.len(), 2);
        assert_eq!(db.gene_name("Q13526"), Some("PIN1"));
        assert_eq!(db.gene_name("A0A024R161"), Some("DNAJC25-GNG10"));
        // no GN= field
        assert_eq!(db.gene_name("P0DTC2"), None);
    }

    #[test]
    fn header() {
        assert_eq!(
            parse_header(">sp|P04637|P53_HUMAN Cellular tumor antigen p53 GN=TP53 PE=1"),
            Some(("P04637".into(), "TP53".into()))
        );
        assert_eq!(parse_header(">P04637 GN=TP53"), None);
    }

    #[test]
    fn empty() {
        assert!(Fasta::parse("").is_empty());
    }
}
