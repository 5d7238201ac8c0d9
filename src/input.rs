use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::Result;

/// Open a text input for buffered reading. Files ending in ".gz" are
/// transparently decompressed.
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let f = File::open(path)?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };
    Ok(reader)
}

/// Split one line of an NCBI `.dmp` file into its fields.
/// Lines look like `1\t|\t1\t|\tno rank\t|\n`.
pub(crate) fn split_dmp_line(line: &str) -> Vec<&str> {
    line.trim_end_matches(['\t', '|', '\n', '\r'])
        .split("\t|\t")
        .collect()
}
