//! Retrieve basic data about a protein from a local UniProtKB FASTA file
//!
//! # File format
//!
//! Standard UniProtKB FASTA, where the gene name is carried by the `GN=`
//! field of each header line:
//!
//! ```text
//! $ head -n 2 uniprot.fasta
//! >sp|Q13526|PIN1_HUMAN Peptidyl-prolyl cis-trans isomerase NIMA-interacting 1 OS=Homo sapiens OX=9606 GN=PIN1 PE=1 SV=1
//! MADEEKLPPGWEKRMSRSSGRVYYFNHITNASQWERPSGNSSSGGKNGQGEPARVRCSHLLVKHSQSRRPSSWRQEKITR
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! # use uniprot::fasta::Fasta;
//! let db: Fasta = match Fasta::open("uniprot.fasta") {
//!     Ok(db) => db,
//!     Err(e) => panic!("Error loading local Uniprot database: {}", e),
//! };
//! assert_eq!(db.gene_name("Q13526"), Some("PIN1"));
//! ```

use memchr::{memchr_iter, Memchr};

pub mod fasta;

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
