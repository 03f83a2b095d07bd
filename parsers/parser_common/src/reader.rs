use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{DecodeError, Result};

/// Line cursor over a text source that remembers the physical line number.
///
/// Lines are returned without their terminator. The underlying file (if any)
/// is closed when the reader is dropped, on every exit path.
pub struct LineReader<R> {
    inner: R,
    line_no: usize,
}

impl LineReader<BufReader<File>> {
    /// Open a file for line-by-line decoding
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, line_no: 0 }
    }

    /// Number of the last line returned (0 before the first read)
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Read the next line, or `None` at end of file
    pub fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .inner
            .read_line(&mut line)
            .map_err(|source| DecodeError::Read {
                line: self.line_no + 1,
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Read the next line; end of file is a structural error naming `what`
    pub fn expect_line(&mut self, what: &str) -> Result<String> {
        match self.next_line()? {
            Some(line) => Ok(line),
            None => Err(DecodeError::structural(
                self.line_no + 1,
                format!("unexpected end of file, expected {}", what),
            )),
        }
    }

    /// Consume one line whose content is not needed
    pub fn skip_line(&mut self, what: &str) -> Result<()> {
        self.expect_line(what).map(|_| ())
    }
}
