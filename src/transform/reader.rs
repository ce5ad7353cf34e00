//! Raw address CSV reader

use crate::error::{Error, Result};
use crate::types::RawAddressRecord;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::Path;

/// Streams the `Street Address` column out of a raw export.
///
/// Each item is one data row. A malformed row yields [`Error::Csv`] and
/// reading continues with the next row; an I/O failure yields the error and
/// ends iteration.
pub struct AddressReader {
    reader: csv::Reader<File>,
    column: usize,
    row: usize,
    done: bool,
}

impl AddressReader {
    /// Open `path` and locate `column` in its header row
    pub fn open(path: impl AsRef<Path>, column: &str) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let column = find_column(&headers, column).ok_or_else(|| Error::MissingColumn {
            column: column.to_string(),
            path: path.display().to_string(),
        })?;

        Ok(Self {
            reader,
            column,
            row: 0,
            done: false,
        })
    }
}

impl Iterator for AddressReader {
    type Item = Result<RawAddressRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => {
                self.row += 1;
                let street = record.get(self.column).unwrap_or_default();
                Some(Ok(RawAddressRecord::new(self.row, street)))
            }
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.row += 1;
                if e.is_io_error() {
                    self.done = true;
                }
                Some(Err(Error::Csv(e)))
            }
        }
    }
}

/// Index of the header named `name`, ignoring a leading BOM and padding
fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
}

#[cfg(test)]
mod reader_tests {
    use super::*;
    use crate::types::STREET_ADDRESS_COLUMN;
    use tempfile::tempdir;

    fn write_file(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_reads_street_column_in_order() {
        let (_dir, path) = write_file(
            "Timestamp,Street Address,Zip\n\
             t1,2800 Kalmia Ave,80301\n\
             t2,1200 Pearl St,80302\n",
        );

        let rows: Vec<_> = AddressReader::open(&path, STREET_ADDRESS_COLUMN)
            .unwrap()
            .map(Result::unwrap)
            .collect();

        assert_eq!(
            rows,
            vec![
                RawAddressRecord::new(1, "2800 Kalmia Ave"),
                RawAddressRecord::new(2, "1200 Pearl St"),
            ]
        );
    }

    #[test]
    fn test_quoted_fields_with_commas_and_newlines() {
        let (_dir, path) = write_file(
            "Street Address,Notes\n\
             \"100 Broadway, Unit 2\",\"pond\nnear fence\"\n\
             5 Main St,\n",
        );

        let rows: Vec<_> = AddressReader::open(&path, STREET_ADDRESS_COLUMN)
            .unwrap()
            .map(Result::unwrap)
            .collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].street_address, "100 Broadway, Unit 2");
        assert_eq!(rows[1].street_address, "5 Main St");
    }

    #[test]
    fn test_short_row_yields_blank_address() {
        let (_dir, path) = write_file("Timestamp,Street Address\nt1\n");

        let rows: Vec<_> = AddressReader::open(&path, STREET_ADDRESS_COLUMN)
            .unwrap()
            .map(Result::unwrap)
            .collect();

        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_blank());
    }

    #[test]
    fn test_bom_in_header() {
        let (_dir, path) = write_file("\u{feff}Street Address,Zip\n1 Main St,80301\n");

        let rows: Vec<_> = AddressReader::open(&path, STREET_ADDRESS_COLUMN)
            .unwrap()
            .collect();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_missing_column() {
        let (_dir, path) = write_file("Address,Zip\n1 Main St,80301\n");

        let result = AddressReader::open(&path, STREET_ADDRESS_COLUMN);
        assert!(matches!(result, Err(Error::MissingColumn { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = AddressReader::open("/no/such/raw.csv", STREET_ADDRESS_COLUMN);
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_header_only() {
        let (_dir, path) = write_file("Street Address\n");
        let mut reader = AddressReader::open(&path, STREET_ADDRESS_COLUMN).unwrap();
        assert!(reader.next().is_none());
    }
}
