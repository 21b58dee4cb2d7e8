//! Flat-file product records
//!
//! One comma-separated line per record, under a fixed header:
//!
//! ```text
//! Barcode Type,Barcode Number,Product Name,Product Description
//! EAN13,4006381333931,Pencil,HB graphite
//! ```
//!
//! Fields are not quoted, so fields containing a comma or line break are
//! rejected on write. Lines with the wrong field count are skipped on read
//! and counted in [`LoadReport::skipped`]; update and delete write them back
//! untouched.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::models::ProductInfo;

/// Header line of the record file
pub const HEADER: &str = "Barcode Type,Barcode Number,Product Name,Product Description";

const DELIMITER: char = ',';
const FIELD_COUNT: usize = 4;

/// Records read from the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Well-formed records in file order
    pub records: Vec<ProductInfo>,
    /// Non-empty lines skipped for having the wrong field count
    pub skipped: usize,
}

/// Product records keyed by barcode number
#[derive(Debug, Clone)]
pub struct ProductStore {
    path: PathBuf,
}

impl ProductStore {
    /// Store backed by the file at `path` (created on first write)
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Read every record; a missing file reads as empty
    pub fn load(&self) -> Result<LoadReport, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(LoadReport::default()),
            Err(err) => return Err(self.io_error(err)),
        };

        let report = parse_records(&content);
        if report.skipped > 0 {
            log::warn!(
                "{}: skipped {} malformed record(s)",
                self.path.display(),
                report.skipped
            );
        }
        Ok(report)
    }

    /// All well-formed records
    pub fn list(&self) -> Result<Vec<ProductInfo>, StoreError> {
        Ok(self.load()?.records)
    }

    /// Append a record, writing the header first if the file is new
    pub fn create(&mut self, record: &ProductInfo) -> Result<(), StoreError> {
        validate(record)?;
        let write_header = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let mut out = BufWriter::new(file);
        if write_header {
            writeln!(out, "{}", HEADER).map_err(|e| self.io_error(e))?;
        }
        writeln!(out, "{}", format_record(record)).map_err(|e| self.io_error(e))?;
        out.flush().map_err(|e| self.io_error(e))?;

        log::info!("created record for {}", record.barcode_number);
        Ok(())
    }

    /// First record with this barcode number
    pub fn read(&self, barcode_number: &str) -> Result<Option<ProductInfo>, StoreError> {
        Ok(self
            .load()?
            .records
            .into_iter()
            .find(|r| r.barcode_number == barcode_number))
    }

    /// Replace name and description of the first record with this barcode
    /// number. Returns whether a record matched.
    ///
    /// Every other line, malformed ones included, is written back as it was.
    pub fn update(
        &mut self,
        barcode_number: &str,
        product_name: &str,
        product_description: &str,
    ) -> Result<bool, StoreError> {
        check_field("product name", product_name)?;
        check_field("product description", product_description)?;

        let mut lines = self.raw_lines()?;
        let matched = lines.iter_mut().find_map(|line| {
            let record = parse_record(line)?;
            (record.barcode_number == barcode_number).then_some((line, record))
        });
        let Some((line, mut record)) = matched else {
            return Ok(false);
        };
        record.product_name = product_name.to_string();
        record.product_description = product_description.to_string();
        *line = format_record(&record);

        self.rewrite(&lines)?;
        log::info!("updated record for {}", barcode_number);
        Ok(true)
    }

    /// Remove every record with this barcode number. Returns how many were
    /// removed.
    ///
    /// Lines that do not parse as records are kept.
    pub fn delete(&mut self, barcode_number: &str) -> Result<usize, StoreError> {
        let mut lines = self.raw_lines()?;
        let before = lines.len();
        lines.retain(|line| !parse_record(line).is_some_and(|r| r.barcode_number == barcode_number));
        let removed = before - lines.len();

        if removed > 0 {
            self.rewrite(&lines)?;
            log::info!("deleted {} record(s) for {}", removed, barcode_number);
        }
        Ok(removed)
    }

    /// File lines after the header, unparsed; a missing file has none
    fn raw_lines(&self) -> Result<Vec<String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.io_error(err)),
        };
        Ok(content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .enumerate()
            .filter(|&(idx, line)| !(idx == 0 && line == HEADER))
            .map(|(_, line)| line.to_string())
            .collect())
    }

    /// Rewrite the file as the header followed by `lines`
    fn rewrite(&self, lines: &[String]) -> Result<(), StoreError> {
        let file = File::create(&self.path).map_err(|e| self.io_error(e))?;
        let mut out = BufWriter::new(file);
        writeln!(out, "{}", HEADER).map_err(|e| self.io_error(e))?;
        for line in lines {
            writeln!(out, "{}", line).map_err(|e| self.io_error(e))?;
        }
        out.flush().map_err(|e| self.io_error(e))
    }
}

fn check_field(field: &'static str, value: &str) -> Result<(), StoreError> {
    if value.contains([DELIMITER, '\n', '\r']) {
        return Err(StoreError::InvalidField { field });
    }
    Ok(())
}

fn validate(record: &ProductInfo) -> Result<(), StoreError> {
    check_field("barcode type", &record.barcode_type)?;
    check_field("barcode number", &record.barcode_number)?;
    check_field("product name", &record.product_name)?;
    check_field("product description", &record.product_description)
}

fn format_record(record: &ProductInfo) -> String {
    [
        record.barcode_type.as_str(),
        record.barcode_number.as_str(),
        record.product_name.as_str(),
        record.product_description.as_str(),
    ]
    .join(",")
}

fn parse_record(line: &str) -> Option<ProductInfo> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        return None;
    }
    Some(ProductInfo {
        barcode_type: fields[0].to_string(),
        barcode_number: fields[1].to_string(),
        product_name: fields[2].to_string(),
        product_description: fields[3].to_string(),
    })
}

fn parse_records(content: &str) -> LoadReport {
    let mut report = LoadReport::default();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || (idx == 0 && line == HEADER) {
            continue;
        }
        match parse_record(line) {
            Some(record) => report.records.push(record),
            None => report.skipped += 1,
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_header_and_counts_malformed() {
        let content = format!(
            "{}\nEAN13,4006381333931,Pencil,HB\nbroken line\nEAN13,1,2,3,4\n\nEAN13,5901234123457,Ink,\r\n",
            HEADER
        );
        let report = parse_records(&content);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.records[1].product_description, "");
    }

    #[test]
    fn test_format_parse_roundtrip() {
        let record = ProductInfo::ean13("4006381333931", "Pencil", "HB graphite");
        assert_eq!(parse_record(&format_record(&record)), Some(record));
    }

    #[test]
    fn test_rejects_delimiter_in_fields() {
        let record = ProductInfo::ean13("4006381333931", "Pencil, blue", "HB");
        assert!(matches!(
            validate(&record),
            Err(StoreError::InvalidField { field: "product name" })
        ));
        assert!(check_field("product description", "two\nlines").is_err());
        assert!(check_field("product description", "plain").is_ok());
    }
}
