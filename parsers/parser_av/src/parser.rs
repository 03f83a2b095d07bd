use std::io::BufRead;
use std::path::Path;

use log::{debug, trace};
use parser_common::{
    field, parse_f64, parse_int, split_fields, Coordinate, DecodeError, LineReader, Result,
    TableField,
};

use crate::models::{AvData, Component, TableIndex, TableMode, VulnerableAreaTables};

/// Decodes an AV file into an [`AvData`]
pub struct AvDecoder<'m> {
    data: &'m mut AvData,
}

impl<'m> AvDecoder<'m> {
    pub fn new(data: &'m mut AvData) -> Self {
        Self { data }
    }

    pub fn read(&mut self, path: &Path) -> Result<()> {
        debug!("Reading AV file {}", path.display());
        let mut reader = LineReader::open(path)?;
        self.decode(&mut reader)
    }

    pub fn read_from<R: BufRead>(&mut self, input: R) -> Result<()> {
        self.decode(&mut LineReader::new(input))
    }

    fn decode<R: BufRead>(&mut self, reader: &mut LineReader<R>) -> Result<()> {
        let table_count = self.read_header(reader)?;
        self.read_tables(reader, table_count)
    }

    /// Everything up to and including the mass array. Returns the table count.
    fn read_header<R: BufRead>(&mut self, reader: &mut LineReader<R>) -> Result<usize> {
        reader.skip_line("AV file title")?;
        reader.skip_line("AV file title")?;

        let line = reader.expect_line("component count")?;
        let line_no = reader.line_no();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let component_count: usize = parse_int(field(&tokens, 0, line_no, "component count")?, line_no, "component count")?;
        self.data.metric = parse_int(field(&tokens, 1, line_no, "metric flag")?, line_no, "metric flag")?;

        // tire, leak and fire arrays
        for _ in 0..3 {
            reader.skip_line("component array")?;
        }

        let line = reader.expect_line("reference location")?;
        let line_no = reader.line_no();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        for (axis, value) in self.data.reference_location.iter_mut().enumerate() {
            *value = parse_f64(field(&tokens, axis, line_no, "reference location")?, line_no, "reference location")?;
        }

        let mut sum = (0.0, 0.0);
        self.data.components.clear();
        self.data.fragmentation_ids.clear();
        for index in 1..=component_count {
            let line = reader.expect_line("component row")?;
            let line_no = reader.line_no();
            let fields = split_fields(&line, 4);
            let component = Component {
                index,
                id: parse_int(field(&fields, 0, line_no, "component id")?, line_no, "component id")?,
                x: parse_f64(field(&fields, 1, line_no, "component x")?, line_no, "component x")?,
                y: parse_f64(field(&fields, 2, line_no, "component y")?, line_no, "component y")?,
                z: parse_f64(field(&fields, 3, line_no, "component z")?, line_no, "component z")?,
                name: field(&fields, 4, line_no, "component name")?.to_string(),
            };
            if !component.is_dummy() {
                self.data.fragmentation_ids.insert(component.id);
                sum.0 += component.x;
                sum.1 += component.y;
            }
            self.data.components.push(component);
        }
        debug!(
            "{} components, {} fragmentation ids",
            self.data.components.len(),
            self.data.fragmentation_ids.len()
        );

        reader.skip_line("AV table header")?;

        let line = reader.expect_line("table count")?;
        let line_no = reader.line_no();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let table_count: usize = parse_int(field(&tokens, 0, line_no, "table count")?, line_no, "table count")?;
        let flag: i32 = parse_int(field(&tokens, 1, line_no, "averaging flag")?, line_no, "averaging flag")?;
        if table_count == 0 {
            return Err(DecodeError::structural(line_no, "table count is 0"));
        }
        self.data.mode = TableMode::from_flag(flag);
        self.data.average_location = (sum.0 / table_count as f64, sum.1 / table_count as f64);

        let azimuths = read_array(reader, "azimuth")?;
        let elevations = read_array(reader, "elevation")?;
        let velocities = read_array(reader, "velocity")?;
        let masses = read_array(reader, "mass")?;
        self.data.tables = VulnerableAreaTables::new(table_count, azimuths, elevations, velocities, masses)
            .ok_or_else(|| DecodeError::structural(line_no, format!("{} tables overflow the table dimensions", table_count)))?;

        debug!("{:?} tables, shape {:?}", self.data.mode, self.data.tables.shape());
        Ok(table_count)
    }

    fn read_tables<R: BufRead>(&mut self, reader: &mut LineReader<R>, table_count: usize) -> Result<()> {
        let mode = self.data.mode;
        let tables = &mut self.data.tables;
        let shape = tables.shape();

        for table in 0..table_count {
            for elevation in 0..shape.elevations {
                let declared_el = tables.elevations[elevation];
                let polar = declared_el == 90.0 || declared_el == -90.0;

                for azimuth in 0..shape.azimuths {
                    let at = Coordinate::new(table + 1, azimuth + 1, elevation + 1);
                    let line = reader.expect_line("AV table header")?;
                    let line_no = reader.line_no();

                    let (az, el, name) = if mode.has_azimuth_headers() {
                        let fields = split_fields(&line, 2);
                        (
                            parse_f64(field(&fields, 0, line_no, "table azimuth")?, line_no, "table azimuth")?,
                            parse_f64(field(&fields, 1, line_no, "table elevation")?, line_no, "table elevation")?,
                            field(&fields, 2, line_no, "table name")?,
                        )
                    } else {
                        // averaged tables imply the first declared azimuth
                        let fields = split_fields(&line, 1);
                        (
                            tables.azimuths[0],
                            parse_f64(field(&fields, 0, line_no, "table elevation")?, line_no, "table elevation")?,
                            field(&fields, 1, line_no, "table name")?,
                        )
                    };

                    check(line_no, TableField::Azimuth, at, tables.azimuths[azimuth], az)?;
                    check(line_no, TableField::Elevation, at, declared_el, el)?;
                    tables.set_name(table, azimuth, elevation, name);
                    trace!("table {} '{}' at az {} el {}", table + 1, name, az, el);

                    for mass in 0..shape.masses {
                        let at = at.with_mass(mass + 1);
                        let row = reader.expect_line("AV row")?;
                        let line_no = reader.line_no();
                        let tokens: Vec<&str> = row.split_whitespace().collect();
                        let found = parse_f64(field(&tokens, 0, line_no, "fragment mass")?, line_no, "fragment mass")?;
                        check(line_no, TableField::Mass, at, tables.masses[mass], found)?;

                        let mut areas = Vec::with_capacity(shape.velocities);
                        for velocity in 0..shape.velocities {
                            let av = parse_f64(field(&tokens, velocity + 2, line_no, "fragment AV")?, line_no, "fragment AV")?;
                            if av.is_nan() || av < 0.0 {
                                return Err(DecodeError::OutOfRange {
                                    line: line_no,
                                    field: TableField::VulnerableArea,
                                    at: at.with_velocity(velocity + 1),
                                    value: av,
                                });
                            }
                            areas.push(av);
                        }
                        if let Some(cutoff) = tokens.get(shape.velocities + 2) {
                            tables.set_velocity_cutoff(table, azimuth, elevation, mass, cutoff);
                        }

                        let exposures = if mode.has_exposure_rows() {
                            read_exposure_row(reader, at, shape.velocities)?
                        } else {
                            vec![1.0; shape.velocities]
                        };

                        for (velocity, (av, pe)) in areas.into_iter().zip(exposures).enumerate() {
                            tables.set_cell(TableIndex::new(table, azimuth, elevation, mass, velocity), av, pe);
                        }
                    }

                    // only the first azimuth is written at a polar elevation
                    if polar {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

/// `count value_1 … value_count`
fn read_array<R: BufRead>(reader: &mut LineReader<R>, what: &str) -> Result<Vec<f64>> {
    let line = reader.expect_line(&format!("{} array", what))?;
    let line_no = reader.line_no();
    let fields = split_fields(&line, 1);
    let count: i64 = parse_int(field(&fields, 0, line_no, &format!("{} count", what))?, line_no, &format!("{} count", what))?;
    if count <= 0 {
        return Err(DecodeError::structural(
            line_no,
            format!("{} count is {}, expected at least 1", what, count),
        ));
    }

    let values = fields
        .get(1)
        .map(|rest| rest.split_whitespace().collect::<Vec<_>>())
        .unwrap_or_default()
        .into_iter()
        .map(|token| parse_f64(token, line_no, what))
        .collect::<Result<Vec<f64>>>()?;
    if values.len() as i64 != count {
        return Err(DecodeError::structural(
            line_no,
            format!("declared {} {} values but found {}", count, what, values.len()),
        ));
    }
    trace!("{} array: {:?}", what, values);
    Ok(values)
}

/// `mass pe_1 … pe_n`; the leading mass is not checked again
fn read_exposure_row<R: BufRead>(reader: &mut LineReader<R>, at: Coordinate, velocities: usize) -> Result<Vec<f64>> {
    let row = reader.expect_line("PE row")?;
    let line_no = reader.line_no();
    let tokens: Vec<&str> = row.split_whitespace().collect();
    (0..velocities)
        .map(|velocity| {
            let pe = parse_f64(field(&tokens, velocity + 1, line_no, "fragment PE")?, line_no, "fragment PE")?;
            if !(0.0..=1.0).contains(&pe) {
                return Err(DecodeError::OutOfRange {
                    line: line_no,
                    field: TableField::ExposureProbability,
                    at: at.with_velocity(velocity + 1),
                    value: pe,
                });
            }
            Ok(pe)
        })
        .collect()
}

fn check(line: usize, field: TableField, at: Coordinate, expected: f64, found: f64) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(DecodeError::TableMismatch {
            line,
            field,
            at,
            expected,
            found,
        })
    }
}
