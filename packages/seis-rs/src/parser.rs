use crate::error::{Result, SeisError};
use crate::mmap_utils::mmap_file;
use std::path::Path;

/// Whitespace-separated numeric table stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    pub rows: usize,
    pub cols: usize,
    values: Vec<f64>,
}

impl NumericTable {
    pub fn row(&self, r: usize) -> &[f64] {
        &self.values[r * self.cols..(r + 1) * self.cols]
    }

    /// Copy of one column, or `None` if out of range
    pub fn column(&self, c: usize) -> Option<Vec<f64>> {
        if c >= self.cols {
            return None;
        }
        Some((0..self.rows).map(|r| self.values[r * self.cols + c]).collect())
    }
}

fn parse_f64(bytes: &[u8]) -> Option<f64> {
    std::str::from_utf8(bytes).ok()?.parse::<f64>().ok()
}

/// Split one line into finite values; `None` if any token is not a number
fn parse_line(line: &[u8], out: &mut Vec<f64>) -> Option<()> {
    out.clear();
    let mut val_start = 0;
    let mut in_val = false;

    for (j, &b) in line.iter().enumerate() {
        if b.is_ascii_whitespace() {
            if in_val {
                out.push(parse_f64(&line[val_start..j]).filter(|v| v.is_finite())?);
                in_val = false;
            }
        } else if !in_val {
            val_start = j;
            in_val = true;
        }
    }
    if in_val {
        out.push(parse_f64(&line[val_start..]).filter(|v| v.is_finite())?);
    }
    Some(())
}

/// Parse a numeric table from bytes (e.g. a memory map)
///
/// Blank lines and `#` comments are skipped. The first data row fixes the
/// column count; rows with a different count or a non-numeric token are
/// logged and dropped.
pub fn parse_columns_from_bytes(content: &[u8]) -> Result<NumericTable> {
    let mut values = Vec::new();
    let mut rows = 0;
    let mut cols = 0;
    let mut current = Vec::with_capacity(8);

    for (line_no, line) in content.split(|&b| b == b'\n').enumerate() {
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() || trimmed[0] == b'#' {
            continue;
        }
        if parse_line(trimmed, &mut current).is_none() {
            log::warn!("Line {} has a non-numeric value, skipping", line_no + 1);
            continue;
        }

        if rows == 0 {
            cols = current.len();
        } else if current.len() != cols {
            log::warn!(
                "Line {} has inconsistent column count ({} vs {}), skipping",
                line_no + 1,
                current.len(),
                cols
            );
            continue;
        }
        values.extend_from_slice(&current);
        rows += 1;
    }

    if rows == 0 {
        return Err(SeisError::ParseError(
            "No numeric data found".to_string(),
        ));
    }
    Ok(NumericTable { rows, cols, values })
}

/// Memory-map and parse a numeric text file
pub fn read_columns(path: &Path) -> Result<NumericTable> {
    let mmap = mmap_file(path)?;
    parse_columns_from_bytes(&mmap).map_err(|e| match e {
        SeisError::ParseError(msg) => SeisError::ParseError(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_columns() {
        let content = b"# time value\n\
                        -0.5 1.0e-3\n\
                        \n\
                        0.0   2.5\r\n\
                        0.5\t-4";
        let table = parse_columns_from_bytes(content).unwrap();
        assert_eq!((table.rows, table.cols), (3, 2));
        assert_eq!(table.column(0).unwrap(), vec![-0.5, 0.0, 0.5]);
        assert_eq!(table.column(1).unwrap(), vec![1.0e-3, 2.5, -4.0]);
        assert_eq!(table.row(1), &[0.0, 2.5]);
        assert!(table.column(2).is_none());
    }

    #[test]
    fn test_bad_rows_are_dropped() {
        let content = b"1 2\n3 4 5\n6 x\n7 8\n";
        let table = parse_columns_from_bytes(content).unwrap();
        assert_eq!(table.rows, 2);
        assert_eq!(table.column(0).unwrap(), vec![1.0, 7.0]);
    }

    #[test]
    fn test_parse_empty_content() {
        assert!(parse_columns_from_bytes(b"# only comments\n\n").is_err());
    }
}
