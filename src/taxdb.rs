//src/taxdb.rs

use std::collections::hash_map::Entry;
use std::io::BufRead;
use std::path::Path;

use ahash::AHashMap;

use crate::error::{Result, TaxError};
use crate::input::{open_input, split_dmp_line};
use crate::types::{NameEntry, NameRecord, TaxonNode};

/// Name class kept by the [`NameTable`].
pub const SCIENTIFIC_NAME: &str = "scientific name";

/// Parses an NCBI `nodes.dmp` stream:
/// ```text
/// <taxid>\t|\t<parentid>\t|\t<rank>\t|\t...
/// ```
/// Only the first three fields are kept.
pub fn read_nodes<R: BufRead>(reader: R) -> Result<Vec<TaxonNode>> {
    let mut nodes = Vec::new();
    for (i, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }
        let parts = split_dmp_line(&line);
        if parts.len() < 3 {
            return Err(TaxError::parse(
                i + 1,
                format!("expected at least 3 fields in nodes table, found {}", parts.len()),
            ));
        }
        nodes.push(TaxonNode::new(parts[0].trim(), parts[1].trim(), parts[2].trim()));
    }
    Ok(nodes)
}

/// Parses an NCBI `names.dmp` stream:
/// ```text
/// <taxid>\t|\t<name>\t|\t<unique name>\t|\t<name class>\t|
/// ```
pub fn read_names<R: BufRead>(reader: R) -> Result<Vec<NameRecord>> {
    let mut names = Vec::new();
    for (i, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }
        let parts = split_dmp_line(&line);
        if parts.len() < 4 {
            return Err(TaxError::parse(
                i + 1,
                format!("expected at least 4 fields in names table, found {}", parts.len()),
            ));
        }
        names.push(NameRecord {
            tax_id: parts[0].trim().to_string(),
            name: parts[1].to_string(),
            unique_name: parts[2].to_string(),
            name_class: parts[3].to_string(),
        });
    }
    Ok(names)
}

/// Flat id -> node lookup. Parent pointers are only followed, never
/// validated, so a dangling parent surfaces when a traversal reaches it.
#[derive(Debug, Clone, Default)]
pub struct TaxonomyTree {
    nodes: AHashMap<String, TaxonNode>,
}

impl TaxonomyTree {
    /// Build the tree from parsed node records. Every id must be unique.
    pub fn build<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = TaxonNode>,
    {
        let mut nodes: AHashMap<String, TaxonNode> = AHashMap::new();
        for node in records {
            match nodes.entry(node.id.clone()) {
                Entry::Occupied(_) => return Err(TaxError::DuplicateTaxon(node.id)),
                Entry::Vacant(slot) => {
                    slot.insert(node);
                }
            }
        }
        Ok(Self { nodes })
    }

    pub fn from_nodes_dmp<P: AsRef<Path>>(path: P) -> Result<Self> {
        let records = read_nodes(open_input(path)?)?;
        let tree = Self::build(records)?;
        log::info!("Loaded {} taxonomy nodes", tree.len());
        Ok(tree)
    }

    pub fn lookup(&self, id: &str) -> Option<&TaxonNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// taxid -> scientific name.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: AHashMap<String, String>,
}

impl NameTable {
    /// Keep only scientific names; a second scientific name for the same
    /// id means the dump is inconsistent and is rejected.
    pub fn build<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = NameRecord>,
    {
        let mut names: AHashMap<String, String> = AHashMap::new();
        for record in records {
            if record.name_class != SCIENTIFIC_NAME {
                continue;
            }
            match names.entry(record.tax_id) {
                Entry::Occupied(slot) => return Err(TaxError::DuplicateName(slot.key().clone())),
                Entry::Vacant(slot) => {
                    slot.insert(record.name);
                }
            }
        }
        Ok(Self { names })
    }

    pub fn from_names_dmp<P: AsRef<Path>>(path: P) -> Result<Self> {
        let records = read_names(open_input(path)?)?;
        let table = Self::build(records)?;
        log::info!("Loaded {} scientific names", table.len());
        Ok(table)
    }

    /// Scientific name for `id`. A missing name is an error: it means the
    /// reads and the taxonomy come from different snapshots.
    pub fn lookup(&self, id: &str) -> Result<&str> {
        self.get(id)
            .ok_or_else(|| TaxError::MissingName(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn entry(&self, id: &str) -> Option<NameEntry> {
        self.names.get_key_value(id).map(|(k, v)| NameEntry {
            id: k.clone(),
            scientific_name: v.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
