use std::io::BufRead;
use std::path::Path;

use log::{debug, trace};
use parser_common::{field, parse_f64, parse_int, DecodeError, LineReader, Result};

use crate::models::MatrixGrid;

const HEADER_SENTINEL: &str = "<MATRIX HEADER>";

/// Decodes a matrix file into a [`MatrixGrid`]
pub struct MatrixDecoder<'m> {
    grid: &'m mut MatrixGrid,
}

impl<'m> MatrixDecoder<'m> {
    pub fn new(grid: &'m mut MatrixGrid) -> Self {
        Self { grid }
    }

    pub fn read(&mut self, path: &Path) -> Result<()> {
        debug!("Reading matrix file {}", path.display());
        let mut reader = LineReader::open(path)?;
        self.decode(&mut reader)
    }

    pub fn read_from<R: BufRead>(&mut self, input: R) -> Result<()> {
        self.decode(&mut LineReader::new(input))
    }

    fn decode<R: BufRead>(&mut self, reader: &mut LineReader<R>) -> Result<()> {
        loop {
            match reader.next_line()? {
                Some(line) if line.starts_with(HEADER_SENTINEL) => break,
                Some(_) => continue,
                None => {
                    return Err(DecodeError::structural(
                        reader.line_no() + 1,
                        format!("no {} before end of file", HEADER_SENTINEL),
                    ))
                }
            }
        }
        trace!("matrix header at line {}", reader.line_no());

        // label: KILL_ID description
        let line = reader.expect_line("kill id")?;
        let line_no = reader.line_no();
        let kill_id = line
            .split_once(':')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .ok_or_else(|| DecodeError::structural(line_no, "can't read kill id"))?;
        self.grid.kill_id = kill_id.to_lowercase();

        skip_section(reader, "<MATRIX DETAILS>")?;
        skip_section(reader, "<MATRIX DIMENSIONS>")?;
        let line = reader.expect_line("matrix dimensions")?;
        let line_no = reader.line_no();
        let tokens: Vec<&str> = line.split(',').collect();
        self.grid.range_cells = parse_int(field(&tokens, 0, line_no, "range cell count")?, line_no, "range cell count")?;
        self.grid.deflection_cells =
            parse_int(field(&tokens, 1, line_no, "deflection cell count")?, line_no, "deflection cell count")?;
        if self.grid.range_cells.checked_mul(self.grid.deflection_cells).is_none() {
            return Err(DecodeError::structural(
                line_no,
                format!(
                    "matrix dimensions {} x {} are too large",
                    self.grid.range_cells, self.grid.deflection_cells
                ),
            ));
        }

        skip_section(reader, "<MATRIX OFFSET>")?;
        let line = reader.expect_line("matrix offset")?;
        let line_no = reader.line_no();
        let tokens: Vec<&str> = line.split(',').collect();
        self.grid.offset = (
            parse_f64(field(&tokens, 0, line_no, "range offset")?, line_no, "range offset")?,
            parse_f64(field(&tokens, 1, line_no, "deflection offset")?, line_no, "deflection offset")?,
        );

        skip_section(reader, "<MATRIX GRIDLINES RANGE>")?;
        self.grid.range_gridlines = read_values(reader, "range gridlines")?;
        skip_section(reader, "<MATRIX GRIDLINES DEFLECTION>")?;
        self.grid.deflection_gridlines = read_values(reader, "deflection gridlines")?;

        skip_section(reader, "<MATRIX PKS>")?;
        let columns = self.grid.deflection_cells;
        // sized by the rows actually read, not the declared count
        self.grid.pks = Vec::new();
        for _ in 0..self.grid.range_cells {
            let row = read_values(reader, "PK row")?;
            if row.len() != columns {
                return Err(DecodeError::structural(
                    reader.line_no(),
                    format!("PK row has {} values, expected {}", row.len(), columns),
                ));
            }
            self.grid.pks.extend(row);
        }

        debug!(
            "matrix for {}: {} x {} cells",
            self.grid.kill_id, self.grid.range_cells, self.grid.deflection_cells
        );
        Ok(())
    }
}

/// Consume a `<…>` section header line
fn skip_section<R: BufRead>(reader: &mut LineReader<R>, what: &str) -> Result<()> {
    let line = reader.expect_line(what)?;
    if line.trim_start().starts_with('<') {
        Ok(())
    } else {
        Err(DecodeError::structural(
            reader.line_no(),
            format!("expected {} section header, found '{}'", what, line.trim()),
        ))
    }
}

fn read_values<R: BufRead>(reader: &mut LineReader<R>, what: &str) -> Result<Vec<f64>> {
    let line = reader.expect_line(what)?;
    let line_no = reader.line_no();
    line.split_whitespace()
        .map(|token| parse_f64(token, line_no, what))
        .collect()
}
