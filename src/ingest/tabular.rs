//! CSV-backed row source.

use std::collections::VecDeque;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ByteRecordsIntoIter, ReaderBuilder};
use tracing::{debug, warn};

use super::source::{FieldNames, Row, RowIter, RowSource};
use crate::error::IngestionError;

/// Reads rows from one or more CSV files, in order, as a single sequence.
///
/// Files that do not exist are skipped with a warning; if none of them can be
/// opened the pass fails. A column missing from a file's header projects as
/// an absent field for every row of that file. Only the two projected cells
/// are decoded; a projected cell that is not valid UTF-8 is absent, so the row
/// is skipped rather than failing the pass.
#[derive(Debug, Clone)]
pub struct CsvSource {
    paths: Vec<PathBuf>,
    delimiter: u8,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            paths: paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect(),
            delimiter: b',',
        }
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn open_file(&self, path: &Path, fields: &FieldNames) -> Result<Option<OpenFile>, IngestionError> {
        let mut reader = match ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(path)
        {
            Ok(reader) => reader,
            Err(err) if is_not_found(&err) => {
                warn!(path = %path.display(), "input file not found, skipping");
                return Ok(None);
            }
            Err(source) => {
                return Err(IngestionError::Open {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let headers = reader.byte_headers().map_err(|source| IngestionError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let transaction_idx = headers
            .iter()
            .position(|h| h == fields.transaction.as_bytes());
        let item_idx = headers.iter().position(|h| h == fields.item.as_bytes());
        for (name, idx) in [(&fields.transaction, transaction_idx), (&fields.item, item_idx)] {
            if idx.is_none() {
                warn!(path = %path.display(), column = %name, "column not in header, every row will be skipped");
            }
        }
        debug!(path = %path.display(), ?transaction_idx, ?item_idx, "opened input");

        Ok(Some(OpenFile {
            path: path.to_path_buf(),
            records: reader.into_byte_records(),
            transaction_idx,
            item_idx,
            line: 1,
        }))
    }
}

impl RowSource for CsvSource {
    fn open(&self, fields: &FieldNames) -> Result<RowIter<'_>, IngestionError> {
        let mut files = VecDeque::with_capacity(self.paths.len());
        for path in &self.paths {
            if let Some(file) = self.open_file(path, fields)? {
                files.push_back(file);
            }
        }
        if files.is_empty() {
            return Err(IngestionError::NoInput {
                count: self.paths.len(),
            });
        }
        Ok(Box::new(CsvRows { files }))
    }
}

fn is_not_found(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound)
}

struct OpenFile {
    path: PathBuf,
    records: ByteRecordsIntoIter<File>,
    transaction_idx: Option<usize>,
    item_idx: Option<usize>,
    line: u64,
}

struct CsvRows {
    files: VecDeque<OpenFile>,
}

impl Iterator for CsvRows {
    type Item = Result<Row, IngestionError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let file = self.files.front_mut()?;
            match file.records.next() {
                Some(Ok(record)) => {
                    file.line += 1;
                    let field = |idx: Option<usize>| {
                        idx.and_then(|i| record.get(i))
                            .and_then(|raw| std::str::from_utf8(raw).ok())
                            .filter(|value| !value.is_empty())
                            .map(str::to_string)
                    };
                    return Some(Ok(Row {
                        transaction_id: field(file.transaction_idx),
                        item_id: field(file.item_idx),
                    }));
                }
                Some(Err(source)) => {
                    file.line += 1;
                    let err = IngestionError::Read {
                        path: file.path.clone(),
                        line: file.line,
                        source,
                    };
                    self.files.clear();
                    return Some(Err(err));
                }
                None => {
                    self.files.pop_front();
                }
            }
        }
    }
}
