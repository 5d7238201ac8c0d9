// src/lib.rs
pub mod types;
pub mod error;
pub mod input;
pub mod taxdb;
pub mod lineage;
pub mod classify;
pub mod classifications_stats;

use std::path::Path;

use crate::classifications_stats::{build_abundance_report, report_line, REPORT_HEADER};
use crate::classify::{aggregate, aggregate_parallel, ClassificationReader, TaxonCounts};
use crate::error::Result;
use crate::taxdb::{NameTable, TaxonomyTree};
use crate::types::{AbundanceRecord, ClassifiedRead};

pub use crate::error::TaxError;

/// Knobs for one summarisation run.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// Rank every read is resolved to.
    pub target_rank: String,
    /// Value of the seqID column that marks a read as unclassified.
    pub unclassified_label: String,
    /// Worker threads; 1 keeps everything on the calling thread.
    pub threads: usize,
    /// Reads buffered per parallel batch.
    pub chunk_size: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            target_rank: "species".to_string(),
            unclassified_label: "unclassified".to_string(),
            threads: 1,
            chunk_size: 100_000,
        }
    }
}

/// Output of a run: the report rows plus the totals they were computed from.
#[derive(Debug, Clone)]
pub struct SummaryResults {
    pub records: Vec<AbundanceRecord>,
    /// Denominator of every relab value.
    pub total_classified: u64,
    /// Reads that resolved to `target_rank`.
    pub resolved: u64,
    pub target_rank: String,
}

impl SummaryResults {
    /// Generate the tab-delimited report text on demand
    pub fn get_report(&self) -> String {
        let mut output = String::from(REPORT_HEADER);
        output.push('\n');
        for row in &self.records {
            output.push_str(&report_line(row));
            output.push('\n');
        }
        output
    }

    pub fn unresolved(&self) -> u64 {
        self.total_classified - self.resolved
    }
}

/// Aggregate a stream of reads, optionally spreading fixed-size batches
/// across a rayon pool. Batches are merged in input order, and a failing
/// run reports the same error as a single-threaded one.
pub fn aggregate_reads<I>(reads: I, tree: &TaxonomyTree, options: &SummaryOptions) -> Result<TaxonCounts>
where
    I: IntoIterator<Item = Result<ClassifiedRead>>,
{
    if options.threads <= 1 {
        return aggregate(reads, tree, &options.target_rank, &options.unclassified_label);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .build()?;
    let chunk_size = options.chunk_size.max(1);

    let mut counts = TaxonCounts::new();
    let mut batch: Vec<ClassifiedRead> = Vec::with_capacity(chunk_size);
    let mut reads = reads.into_iter();
    let mut batches = 0usize;

    loop {
        batch.clear();
        let mut read_error = None;
        for read in reads.by_ref().take(chunk_size) {
            match read {
                Ok(read) => batch.push(read),
                Err(e) => {
                    read_error = Some(e);
                    break;
                }
            }
        }
        if batch.is_empty() && read_error.is_none() {
            break;
        }
        // Reads ahead of a bad line are resolved first, as a sequential pass would.
        let partial = pool.install(|| {
            aggregate_parallel(&batch, tree, &options.target_rank, &options.unclassified_label)
        })?;
        if let Some(e) = read_error {
            return Err(e);
        }
        counts.merge(partial);
        batches += 1;
        log::debug!("Processed batch {} ({} reads so far)", batches, counts.total_classified);
    }
    Ok(counts)
}

/// Load the taxonomy, stream the classification table and build the
/// abundance report.
///
/// The node and name tables are fully loaded (and validated) before the
/// first read is looked at. Any unknown taxon or taxonomy cycle met while
/// resolving reads aborts the run without a partial report.
pub fn summarise_reads<P, Q, R>(
    nodes_path: P,
    names_path: Q,
    classifications_path: R,
    options: &SummaryOptions,
) -> Result<SummaryResults>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    // 1. Taxonomy
    let names = NameTable::from_names_dmp(names_path)?;
    let tree = TaxonomyTree::from_nodes_dmp(nodes_path)?;

    // 2. Reads
    let reads = ClassificationReader::from_path(classifications_path)?;
    let counts = aggregate_reads(reads, &tree, options)?;

    log::info!(
        "{} classified reads, {} resolved to rank '{}' across {} taxa",
        counts.total_classified,
        counts.resolved,
        options.target_rank,
        counts.len()
    );
    if counts.unresolved() > 0 {
        log::warn!(
            "{} classified reads have no '{}' ancestor and are left out of the counts",
            counts.unresolved(),
            options.target_rank
        );
    }

    // 3. Report
    let records = build_abundance_report(&counts, &names)?;

    Ok(SummaryResults {
        records,
        total_classified: counts.total_classified,
        resolved: counts.resolved,
        target_rank: options.target_rank.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const NODES: &str = "1\t|\t1\t|\tno rank\t|\n\
                         2\t|\t1\t|\tspecies\t|\n\
                         3\t|\t2\t|\tsubspecies\t|\n\
                         4\t|\t1\t|\tgenus\t|\n\
                         5\t|\t4\t|\tspecies\t|\n";

    const NAMES: &str = "1\t|\troot\t|\t\t|\tscientific name\t|\n\
                         2\t|\tE. coli\t|\t\t|\tscientific name\t|\n\
                         3\t|\tE. coli K12\t|\t\t|\tscientific name\t|\n\
                         4\t|\tBacillus\t|\t\t|\tscientific name\t|\n\
                         5\t|\tB. subtilis\t|\t\t|\tscientific name\t|\n";

    const HEADER: &str = "readID\tseqID\ttaxID\tscore\t2ndBestScore\thitLength\tqueryLength\tnumMatches\n";

    fn write_inputs(reads: &[(&str, &str)]) -> (TempDir, PathBuf, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let nodes = dir.path().join("nodes.dmp");
        let names = dir.path().join("names.dmp");
        let table = dir.path().join("reads.tsv");
        fs::write(&nodes, NODES).unwrap();
        fs::write(&names, NAMES).unwrap();

        let mut text = String::from(HEADER);
        for (i, (seq_id, taxid)) in reads.iter().enumerate() {
            text.push_str(&format!("read{}\t{}\t{}\t100\t0\t50\t150\t1\n", i, seq_id, taxid));
        }
        fs::write(&table, text).unwrap();
        (dir, nodes, names, table)
    }

    #[test]
    fn test_summarise_reads_scenario() {
        let (_dir, nodes, names, table) = write_inputs(&[
            ("seq", "3"),
            ("seq", "3"),
            ("seq", "2"),
            ("unclassified", "0"),
        ]);
        let results = summarise_reads(&nodes, &names, &table, &SummaryOptions::default())
            .expect("summary failed");

        assert_eq!(results.total_classified, 3);
        assert_eq!(results.unresolved(), 0);
        assert_eq!(
            results.get_report(),
            "species\ttaxonomic_id\tcount\trelab\nE. coli\t2\t3\t100.0\n"
        );
    }

    #[test]
    fn test_get_report_matches_written_report() {
        let (_dir, nodes, names, table) = write_inputs(&[
            ("seq", "5"),
            ("seq", "3"),
            ("seq", "4"),
            ("seq", "5"),
            ("seq", "2"),
            ("seq", "5"),
            ("seq", "1"),
            ("seq", "3"),
        ]);
        let results = summarise_reads(&nodes, &names, &table, &SummaryOptions::default()).unwrap();

        let mut written = Vec::new();
        classifications_stats::write_report(&results.records, &mut written).unwrap();
        assert_eq!(results.get_report(), String::from_utf8(written).unwrap());
        assert_eq!(
            results.get_report(),
            "species\ttaxonomic_id\tcount\trelab\nB. subtilis\t5\t3\t37.5\nE. coli\t2\t3\t37.5\n"
        );
    }

    #[test]
    fn test_unknown_taxon_aborts_run() {
        let (_dir, nodes, names, table) = write_inputs(&[("seq", "2"), ("seq", "99")]);
        let err = summarise_reads(&nodes, &names, &table, &SummaryOptions::default()).unwrap_err();
        assert!(matches!(err, TaxError::UnknownTaxon(ref id) if id == "99"));
    }

    #[test]
    fn test_duplicate_node_aborts_before_reads() {
        let (dir, _nodes, names, table) = write_inputs(&[("seq", "2")]);
        let nodes = dir.path().join("dup_nodes.dmp");
        fs::write(&nodes, format!("{}2\t|\t1\t|\tgenus\t|\n", NODES)).unwrap();
        let err = summarise_reads(&nodes, &names, &table, &SummaryOptions::default()).unwrap_err();
        assert!(matches!(err, TaxError::DuplicateTaxon(ref id) if id == "2"));
    }

    #[test]
    fn test_threaded_run_matches_single_threaded() {
        let mut reads = Vec::new();
        for i in 0..2_000 {
            let taxid = ["3", "5", "4", "2", "1"][i % 5];
            let seq_id = if i % 7 == 0 { "unclassified" } else { "seq" };
            reads.push((seq_id, taxid));
        }
        let (_dir, nodes, names, table) = write_inputs(&reads);

        let single = summarise_reads(&nodes, &names, &table, &SummaryOptions::default()).unwrap();
        let threaded = summarise_reads(
            &nodes,
            &names,
            &table,
            &SummaryOptions {
                threads: 4,
                chunk_size: 97,
                ..SummaryOptions::default()
            },
        )
        .unwrap();

        assert_eq!(single.get_report(), threaded.get_report());
        assert_eq!(single.total_classified, threaded.total_classified);
        assert!(single.resolved < single.total_classified);
    }

    #[test]
    fn test_threaded_run_reports_first_error_in_input_order() {
        let (_dir, nodes, names, table) = write_inputs(&[("seq", "2")]);
        let mut text = String::from(HEADER);
        for i in 0..300 {
            let taxid = match i {
                40 => "98",
                250 => "99",
                _ => "3",
            };
            text.push_str(&format!("read{}\tseq\t{}\t100\t0\t50\t150\t1\n", i, taxid));
        }
        text.push_str("broken\tseq\t2\n");
        fs::write(&table, text).unwrap();

        for threads in [1, 4] {
            let options = SummaryOptions {
                threads,
                chunk_size: 1_000,
                ..SummaryOptions::default()
            };
            let err = summarise_reads(&nodes, &names, &table, &options).unwrap_err();
            assert!(
                matches!(err, TaxError::UnknownTaxon(ref id) if id == "98"),
                "threads={threads}: {err}"
            );
        }
    }

    #[test]
    fn test_threaded_run_resolves_batch_before_bad_line() {
        let (_dir, nodes, names, table) = write_inputs(&[("seq", "2")]);
        let text = format!(
            "{}r0\tseq\t3\t1\t0\t50\t150\t1\nr1\tseq\t99\t1\t0\t50\t150\t1\nr2\tseq\t3\n",
            HEADER
        );
        fs::write(&table, text).unwrap();

        let options = SummaryOptions {
            threads: 2,
            chunk_size: 10,
            ..SummaryOptions::default()
        };
        let err = summarise_reads(&nodes, &names, &table, &options).unwrap_err();
        assert!(matches!(err, TaxError::UnknownTaxon(ref id) if id == "99"));
    }

    #[test]
    fn test_genus_rank_option() {
        let (_dir, nodes, names, table) = write_inputs(&[("seq", "5"), ("seq", "2")]);
        let options = SummaryOptions {
            target_rank: "genus".to_string(),
            ..SummaryOptions::default()
        };
        let results = summarise_reads(&nodes, &names, &table, &options).unwrap();
        assert_eq!(results.records.len(), 1);
        assert_eq!(results.records[0].scientific_name, "Bacillus");
        assert_eq!(results.records[0].relative_abundance_percent, 50.0);
    }
}
