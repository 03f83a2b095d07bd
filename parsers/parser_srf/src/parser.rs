use std::io::BufRead;
use std::path::Path;

use log::debug;
use parser_common::{field, parse_f64, parse_int, split_fields, LineReader, Result};

use crate::models::SurfaceMesh;

/// Decodes a target surface file into a [`SurfaceMesh`]
pub struct SurfaceDecoder<'m> {
    mesh: &'m mut SurfaceMesh,
}

impl<'m> SurfaceDecoder<'m> {
    pub fn new(mesh: &'m mut SurfaceMesh) -> Self {
        Self { mesh }
    }

    pub fn read(&mut self, path: &Path) -> Result<()> {
        debug!("Reading surface file {}", path.display());
        let mut reader = LineReader::open(path)?;
        self.decode(&mut reader)
    }

    pub fn read_from<R: BufRead>(&mut self, input: R) -> Result<()> {
        self.decode(&mut LineReader::new(input))
    }

    fn decode<R: BufRead>(&mut self, reader: &mut LineReader<R>) -> Result<()> {
        reader.skip_line("surface file title")?;

        let line = reader.expect_line("surface count")?;
        let line_no = reader.line_no();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let count: usize = parse_int(field(&tokens, 0, line_no, "surface count")?, line_no, "surface count")?;
        self.mesh.metric = parse_f64(field(&tokens, 1, line_no, "metric flag")?, line_no, "metric flag")?;

        for _ in 0..count {
            let line = reader.expect_line("surface row")?;
            let line_no = reader.line_no();
            // x y z for four vertices, two id columns, then the name
            let fields = split_fields(&line, 14);
            for vertex in 0..4 {
                let mut point = [0.0; 3];
                for (axis, value) in point.iter_mut().enumerate() {
                    *value = parse_f64(field(&fields, vertex * 3 + axis, line_no, "vertex coordinate")?, line_no, "vertex coordinate")?;
                }
                self.mesh.bounds.include(point);
                self.mesh.vertices.push(point);
            }
            self.mesh.names.push(field(&fields, 14, line_no, "surface name")?.to_string());
        }

        debug!("{} surfaces, bounds {:?}", self.mesh.quad_count(), self.mesh.bounds);
        Ok(())
    }
}
