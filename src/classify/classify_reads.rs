// src/classify/classify_reads.rs

use std::io::{BufRead, Lines};
use std::path::Path;

use crate::error::{Result, TaxError};
use crate::input::open_input;
use crate::types::ClassifiedRead;

/// Number of tab-separated columns in a classification line.
const NUM_COLUMNS: usize = 8;

/// Lazy, forward-only reader over a per-read classification table:
/// ```text
/// readID  seqID  taxID  score  2ndBestScore  hitLength  queryLength  numMatches
/// ```
/// The first line is a header and is skipped.
pub struct ClassificationReader<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> ClassificationReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl ClassificationReader<Box<dyn BufRead>> {
    /// Open a (possibly gzipped) classification file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(open_input(path)?))
    }
}

impl<R: BufRead> Iterator for ClassificationReader<R> {
    type Item = Result<ClassifiedRead>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            // header
            if self.line_no == 1 || line.trim().is_empty() {
                continue;
            }
            return Some(parse_classification_line(&line, self.line_no));
        }
    }
}

/// Parse one data line of the classification table.
pub fn parse_classification_line(line: &str, line_no: usize) -> Result<ClassifiedRead> {
    let fields: Vec<&str> = line.trim_end().split('\t').collect();
    if fields.len() != NUM_COLUMNS {
        return Err(TaxError::parse(
            line_no,
            format!("expected {} columns, found {}", NUM_COLUMNS, fields.len()),
        ));
    }

    let float = |idx: usize, what: &str| -> Result<f64> {
        fields[idx]
            .trim()
            .parse::<f64>()
            .map_err(|_| TaxError::parse(line_no, format!("invalid {}: '{}'", what, fields[idx])))
    };
    let int = |idx: usize, what: &str| -> Result<u64> {
        fields[idx]
            .trim()
            .parse::<u64>()
            .map_err(|_| TaxError::parse(line_no, format!("invalid {}: '{}'", what, fields[idx])))
    };

    Ok(ClassifiedRead {
        read_id: fields[0].to_string(),
        seq_id: fields[1].to_string(),
        taxon_id: fields[2].trim().to_string(),
        primary_score: float(3, "score")?,
        secondary_score: float(4, "2ndBestScore")?,
        aligned_length: int(5, "hitLength")?,
        query_length: int(6, "queryLength")?,
        match_count: int(7, "numMatches")?,
    })
}
