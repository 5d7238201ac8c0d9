// src/classifications_stats.rs

use std::io::Write;

use crate::classify::TaxonCounts;
use crate::error::Result;
use crate::taxdb::NameTable;
use crate::types::AbundanceRecord;

pub const REPORT_HEADER: &str = "species\ttaxonomic_id\tcount\trelab";

/// Percentage of `total` that `count` represents, rounded to 2 decimals.
/// Exact half-cent values round to the even neighbour (1/32 -> 3.12).
pub fn relative_abundance(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = count as f64 / total as f64 * 100.0;
    (pct * 100.0).round_ties_even() / 100.0
}

/// One tab-delimited report line, without the trailing newline.
pub fn report_line(row: &AbundanceRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        row.scientific_name,
        row.taxon_id,
        row.read_count,
        format_relab(row.relative_abundance_percent)
    )
}

/// Render a percentage the way a float literal is written: integral
/// values keep one decimal (`100.0`), others use the shortest form.
pub fn format_relab(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Join counts with scientific names. Rows come out in first-seen order.
/// The denominator is every classified read, including the ones that did
/// not resolve to the target rank.
pub fn build_abundance_report(counts: &TaxonCounts, names: &NameTable) -> Result<Vec<AbundanceRecord>> {
    let total = counts.total_classified;
    counts
        .iter()
        .map(|(taxid, count)| -> Result<AbundanceRecord> {
            Ok(AbundanceRecord {
                taxon_id: taxid.clone(),
                scientific_name: names.lookup(taxid)?.to_string(),
                read_count: count,
                relative_abundance_percent: relative_abundance(count, total),
            })
        })
        .collect()
}

/// Write the tab-delimited report, header first.
pub fn write_report<W: Write>(records: &[AbundanceRecord], mut out: W) -> std::io::Result<()> {
    writeln!(out, "{}", REPORT_HEADER)?;
    for row in records {
        writeln!(out, "{}", report_line(row))?;
    }
    out.flush()
}
