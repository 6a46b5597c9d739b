//! JSON Lines row I/O.
//!
//! Each line is one JSON object representing one source or destination row.

use std::io::{self, BufRead, Write};

use serde_json::{Map, Value};

/// A single row: column name to value.
pub type Row = Map<String, Value>;

/// Error type for JSONL operations.
#[derive(Debug, thiserror::Error)]
pub enum JsonlError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error at line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },

    #[error("line {line} is not a JSON object")]
    NotAnObject { line: usize },

    /// A row could not be serialized for output.
    #[error("failed to write row: {0}")]
    Write(#[source] serde_json::Error),
}

impl JsonlError {
    /// The source line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Json { line, .. } | Self::NotAnObject { line } => Some(*line),
            Self::Io(_) | Self::Write(_) => None,
        }
    }
}

/// Result alias for JSONL operations.
pub type Result<T> = std::result::Result<T, JsonlError>;

/// Writes a single row followed by a newline.
pub fn write_row<W: Write>(writer: &mut W, row: &Row) -> Result<()> {
    serde_json::to_writer(&mut *writer, row).map_err(|e| {
        if e.is_io() {
            JsonlError::Io(e.into())
        } else {
            JsonlError::Write(e)
        }
    })?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Writes rows as JSONL and flushes the writer.
pub fn write_rows<W: Write>(writer: &mut W, rows: &[Row]) -> Result<()> {
    for row in rows {
        write_row(writer, row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Returns an iterator over `(line_number, row)` pairs. Empty lines are skipped.
pub fn read_rows<R: BufRead>(reader: R) -> RowIter<R> {
    RowIter {
        reader,
        line_number: 0,
    }
}

/// Iterator over JSONL rows, yielding the 1-based line each row came from.
pub struct RowIter<R> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> Iterator for RowIter<R> {
    type Item = Result<(usize, Row)>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let parsed = match serde_json::from_str::<Value>(trimmed) {
                        Ok(Value::Object(row)) => Ok((self.line_number, row)),
                        Ok(_) => Err(JsonlError::NotAnObject {
                            line: self.line_number,
                        }),
                        Err(e) => Err(JsonlError::Json {
                            line: self.line_number,
                            source: e,
                        }),
                    };
                    return Some(parsed);
                }
                Err(e) => return Some(Err(JsonlError::Io(e))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn write_and_read_back() {
        let rows = vec![
            row(&[("id", Value::from(1)), ("name", Value::from("Ada"))]),
            row(&[("id", Value::from(2)), ("name", Value::from("Grace"))]),
        ];
        let mut buf = Vec::new();
        write_rows(&mut buf, &rows).unwrap();

        let read_back: Vec<(usize, Row)> = read_rows(BufReader::new(buf.as_slice()))
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(read_back.len(), 2);
        assert_eq!(read_back[1].0, 2);
        assert_eq!(read_back[1].1["name"], "Grace");
    }

    #[test]
    fn line_numbers_count_blank_lines() {
        let data = b"{\"a\":1}\n\n{\"a\":2}\n";
        let rows: Vec<(usize, Row)> = read_rows(BufReader::new(data.as_slice()))
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(rows.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn rejects_non_object_lines() {
        let data = b"{\"a\":1}\n[1,2]\nnope\n";
        let results: Vec<_> = read_rows(BufReader::new(data.as_slice())).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(JsonlError::NotAnObject { line: 2 })));
        assert!(matches!(results[2], Err(JsonlError::Json { line: 3, .. })));
    }

    /// Writer that rejects every write.
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_carry_no_line() {
        let err = write_row(&mut Broken, &row(&[("a", Value::from(1))])).unwrap_err();
        assert!(matches!(err, JsonlError::Io(_)));
        assert_eq!(err.line(), None);

        let err = JsonlError::Write(serde_json::from_str::<Value>("{").unwrap_err());
        assert_eq!(err.line(), None);
        assert!(err.to_string().starts_with("failed to write row"));
    }
}
