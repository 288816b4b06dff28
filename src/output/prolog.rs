//! Prolog fact log
//!
//! Every edge becomes one line of the form `peer('source','target').`, so the
//! file can be consulted directly by a Prolog system and grows safely across
//! runs.

use crate::host::Host;
use crate::output::traits::{FactSink, OutputError, OutputResult};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Escapes a value for use inside a single-quoted Prolog atom
///
/// Backslashes, quotes and line breaks are escaped so a fact always occupies
/// exactly one line.
pub fn escape_atom(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Formats one edge as a Prolog fact line (including the trailing newline)
///
/// # Examples
///
/// ```
/// use peer_ripple::output::format_fact;
/// use peer_ripple::Host;
///
/// let a = Host::parse("a.example").unwrap();
/// let b = Host::parse("b.example").unwrap();
/// assert_eq!(format_fact(&a, &b), "peer('a.example','b.example').\n");
/// ```
pub fn format_fact(source: &Host, target: &Host) -> String {
    format!(
        "peer('{}','{}').\n",
        escape_atom(source.as_str()),
        escape_atom(target.as_str())
    )
}

/// Fact sink appending to a Prolog file
///
/// Each fact goes straight to the file with one unbuffered write; `sync`
/// forces the data to disk.
pub struct PrologFactLog {
    path: PathBuf,
    file: File,
}

impl PrologFactLog {
    /// Opens the fact log for appending, creating it if needed
    ///
    /// Existing content is never truncated.
    pub fn open(path: &Path) -> OutputResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| OutputError::Io {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }
}

impl FactSink for PrologFactLog {
    fn append(&mut self, source: &Host, target: &Host) -> OutputResult<()> {
        let line = format_fact(source, target);
        self.file
            .write_all(line.as_bytes())
            .map_err(|source| OutputError::Io {
                path: self.path.display().to_string(),
                source,
            })
    }

    fn sync(&mut self) -> OutputResult<()> {
        self.file.sync_data().map_err(|source| OutputError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}

/// Counts the facts in a fact log
///
/// A missing file counts as zero facts.
pub fn count_facts(path: &Path) -> OutputResult<u64> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(source) => {
            return Err(OutputError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    let mut count = 0;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| OutputError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if line.starts_with("peer(") {
            count += 1;
        }
    }
    Ok(count)
}
