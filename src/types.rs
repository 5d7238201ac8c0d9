//src/types.rs

/// Taxon ids are kept verbatim as they appear in the dumps.
pub type TaxonId = String;

/// One row of `nodes.dmp`: a taxon, its parent and its rank.
/// The root of the tree is its own parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonNode {
    pub id: TaxonId,
    pub parent_id: TaxonId,
    pub rank: String,
}

impl TaxonNode {
    pub fn new(id: impl Into<String>, parent_id: impl Into<String>, rank: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            rank: rank.into(),
        }
    }

    /// True for the self-parent sentinel at the top of the tree.
    pub fn is_root(&self) -> bool {
        self.id == self.parent_id
    }
}

/// One row of `names.dmp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub tax_id: TaxonId,
    pub name: String,
    pub unique_name: String,
    pub name_class: String,
}

/// A retained scientific name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    pub id: TaxonId,
    pub scientific_name: String,
}

/// One line of the per-read classification table.
///  readID  seqID  taxID  score  2ndBestScore  hitLength  queryLength  numMatches
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRead {
    pub read_id: String,
    pub seq_id: String,    // "unclassified" for reads without a hit
    pub taxon_id: TaxonId,
    pub primary_score: f64,
    pub secondary_score: f64,
    pub aligned_length: u64,
    pub query_length: u64,
    pub match_count: u64,
}

impl ClassifiedRead {
    /// A read carrying only the fields the aggregator looks at.
    pub fn with_taxon(read_id: impl Into<String>, seq_id: impl Into<String>, taxon_id: impl Into<String>) -> Self {
        Self {
            read_id: read_id.into(),
            seq_id: seq_id.into(),
            taxon_id: taxon_id.into(),
            primary_score: 0.0,
            secondary_score: 0.0,
            aligned_length: 0,
            query_length: 0,
            match_count: 1,
        }
    }
}

/// One row of the abundance report.
#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceRecord {
    pub taxon_id: TaxonId,
    pub scientific_name: String,
    pub read_count: u64,
    pub relative_abundance_percent: f64,
}
