pub mod classify_reads;
pub mod classify_stats;

pub use classify_reads::{parse_classification_line, ClassificationReader};
pub use classify_stats::{aggregate, aggregate_parallel, TaxonCounts};
