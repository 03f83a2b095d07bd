use std::io::BufRead;
use std::path::Path;

use log::{debug, trace};
use parser_common::{
    field, parse_f64, parse_int, ComponentId, ComponentRoles, DecodeError, Flow, LineDispatcher,
    LineReader, PkSource, Result,
};

use crate::models::{BurstKey, BurstRecord, DetailTrace, FragZone};

const FULL_DETAIL_SENTINEL: &str = ":FRAGMENTATION";

/// Decodes a full-detail file into a [`DetailTrace`].
///
/// The role sets decide which PK column applies to each component.
pub struct DetailDecoder<'m> {
    trace: &'m mut DetailTrace,
    roles: ComponentRoles<'m>,
}

struct DetailState<'a> {
    trace: &'a mut DetailTrace,
    roles: ComponentRoles<'a>,
    last_index: Option<u32>,
    current: Option<BurstKey>,
    /// Running component number within the current burst point
    component: ComponentId,
}

impl<'m> DetailDecoder<'m> {
    pub fn new(trace: &'m mut DetailTrace, roles: ComponentRoles<'m>) -> Self {
        Self { trace, roles }
    }

    /// Whether `path` is the full-detail variant
    pub fn is_full_detail(path: &Path) -> Result<bool> {
        Self::validate(LineReader::open(path)?)
    }

    pub fn validate_from<R: BufRead>(input: R) -> Result<bool> {
        Self::validate(LineReader::new(input))
    }

    fn validate<R: BufRead>(mut reader: LineReader<R>) -> Result<bool> {
        while let Some(line) = reader.next_line()? {
            if line.starts_with(FULL_DETAIL_SENTINEL) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Validate, then decode `path`
    pub fn read(&mut self, path: &Path) -> Result<()> {
        if !Self::is_full_detail(path)? {
            return Err(DecodeError::NotFullDetail {
                path: path.to_path_buf(),
            });
        }
        debug!("Reading detail file {}", path.display());
        self.decode(LineReader::open(path)?)
    }

    /// Decode input that has already been validated
    pub fn read_from<R: BufRead>(&mut self, input: R) -> Result<()> {
        self.decode(LineReader::new(input))
    }

    fn decode<R: BufRead>(&mut self, mut reader: LineReader<R>) -> Result<()> {
        let mut state = DetailState {
            trace: &mut *self.trace,
            roles: self.roles,
            last_index: None,
            current: None,
            component: 1,
        };
        let flow = dispatcher().run(&mut state, &mut reader)?;
        if flow == Flow::Stop {
            debug!("remedial burst points skipped from line {}", reader.line_no());
        }
        debug!(
            "{} burst records across {} burst points",
            self.trace.records.len(),
            self.trace.burst_point_count()
        );
        Ok(())
    }
}

fn dispatcher<'a, R: BufRead>() -> LineDispatcher<DetailState<'a>, R> {
    LineDispatcher::new()
        .route("BPNUM", parse_burst_point)
        .route(FULL_DETAIL_SENTINEL, parse_fragmentation)
        .route(":COMPONENT", parse_component)
        .route("RADIUS ID", parse_radius)
        .route("EVALUATION CENTER", parse_evaluation_center)
        .route("DH PKs include fragments?", parse_direct_hit_flag)
}

/// Header line, skipped line, then the colon-delimited record
fn parse_burst_point<R: BufRead>(
    state: &mut DetailState<'_>,
    _line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    reader.skip_line("burst point column header")?;
    let record = reader.expect_line("burst point record")?;
    let line_no = reader.line_no();
    let fields: Vec<&str> = record.splitn(16, ':').collect();

    let index: u32 = parse_int(field(&fields, 0, line_no, "burst point index")?, line_no, "burst point index")?;
    // Remedial points restart the numbering after the main sweep
    if state.last_index.is_some_and(|last| index < last) {
        state.trace.truncated_at_line = Some(line_no);
        return Ok(Flow::Stop);
    }
    state.last_index = Some(index);

    let number = |i: usize, what: &str| -> Result<f64> { parse_f64(field(&fields, i, line_no, what)?, line_no, what) };
    let azimuth = number(14, "burst azimuth")? as i32;
    let burst = BurstRecord {
        sample_location: [number(2, "sample x")?, number(3, "sample y")?, number(4, "sample z")?],
        burst_location: [number(8, "burst x")?, number(9, "burst y")?, number(10, "burst z")?],
        surface_hit: parse_int(field(&fields, 12, line_no, "surface hit")?, line_no, "surface hit")?,
        ..BurstRecord::default()
    };

    let key = BurstKey::new(index, azimuth);
    trace!("burst point {} azimuth {} at line {}", index, azimuth, line_no);
    state.trace.records.insert(key, burst);
    state.current = Some(key);
    state.component = 1;
    Ok(Flow::Continue)
}

/// `:FRAGMENTATION: n`, then `n` zones of a `:FRAG ZONE: number` line and an angle line
fn parse_fragmentation<R: BufRead>(
    state: &mut DetailState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    let line_no = reader.line_no();
    let key = state
        .current
        .ok_or_else(|| DecodeError::structural(line_no, "fragmentation section before any burst point"))?;
    let fields: Vec<&str> = line.split(':').collect();
    let count: usize = parse_int(field(&fields, 2, line_no, "frag zone count")?, line_no, "frag zone count")?;

    let mut zones = Vec::new();
    for _ in 0..count {
        let zone_line = loop {
            let next = reader.expect_line("frag zone")?;
            if next.starts_with(":FRAG ZONE") {
                break next;
            }
        };
        let line_no = reader.line_no();
        let fields: Vec<&str> = zone_line.splitn(4, ':').collect();
        let zone = parse_int(field(&fields, 2, line_no, "frag zone number")?, line_no, "frag zone number")?;

        let angles = reader.expect_line("frag zone angles")?;
        let line_no = reader.line_no();
        let fields: Vec<&str> = angles.splitn(5, ':').collect();
        zones.push(FragZone {
            zone,
            lower_angle: parse_f64(field(&fields, 2, line_no, "lower zone angle")?, line_no, "lower zone angle")?,
            upper_angle: parse_f64(field(&fields, 3, line_no, "upper zone angle")?, line_no, "upper zone angle")?,
        });
    }

    if let Some(record) = state.trace.records.get_mut(&key) {
        record.frag_zones.insert(state.component, zones);
    }
    Ok(Flow::Continue)
}

/// Header line, skipped line, then the record; PK columns are 12 (direct
/// hit), 13 (blast) and 14 (fragmentation)
fn parse_component<R: BufRead>(
    state: &mut DetailState<'_>,
    _line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    let key = state.current.ok_or_else(|| {
        DecodeError::structural(reader.line_no(), "component record before any burst point")
    })?;
    reader.skip_line("component column header")?;
    let record = reader.expect_line("component record")?;
    let line_no = reader.line_no();
    let fields: Vec<&str> = record.splitn(16, ':').collect();

    let column = match state.roles.classify(state.component) {
        Some(PkSource::DirectHit) => Some(12),
        Some(PkSource::Blast) => Some(13),
        Some(PkSource::Fragmentation) => Some(14),
        None => None,
    };
    if let Some(column) = column {
        let pk = parse_f64(field(&fields, column, line_no, "component PK")?, line_no, "component PK")?;
        if let Some(burst) = state.trace.records.get_mut(&key) {
            burst.component_pk.insert(state.component, pk);
        }
    }
    state.component += 1;
    Ok(Flow::Continue)
}

fn parse_radius<R: BufRead>(
    state: &mut DetailState<'_>,
    _line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    let line = reader.expect_line("radius")?;
    let line_no = reader.line_no();
    let fields: Vec<&str> = line.split(':').collect();
    state.trace.radius = Some(parse_f64(field(&fields, 1, line_no, "radius")?, line_no, "radius")?);
    Ok(Flow::Continue)
}

fn parse_evaluation_center<R: BufRead>(
    state: &mut DetailState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    let line_no = reader.line_no();
    let fields: Vec<&str> = line.trim().split(':').collect();
    let mut center = [0.0; 3];
    for (axis, value) in center.iter_mut().enumerate() {
        *value = parse_f64(field(&fields, axis + 1, line_no, "evaluation center")?, line_no, "evaluation center")?;
    }
    state.trace.evaluation_center = Some(center);
    Ok(Flow::Continue)
}

fn parse_direct_hit_flag<R: BufRead>(
    state: &mut DetailState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    let fields: Vec<&str> = line.split(':').collect();
    let flag = field(&fields, 1, reader.line_no(), "direct hit flag")?;
    state.trace.dh_includes_frag_effects = Some(flag.trim_start().starts_with('T'));
    Ok(Flow::Continue)
}
