use std::io::BufRead;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use once_cell::sync::Lazy;
use parser_common::{
    field, parse_f64, parse_int, DecodeError, FileRole, Flow, LineDispatcher, LineReader, Result,
};
use regex::Regex;

use crate::models::{BlastVolume, CaseFiles, CaseMetadata};

/// `(x, y)` with optional parentheses
static TARGET_CENTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\(?\s*([^,()\s]+)\s*,\s*([^,()\s]+)\s*\)?\s*$").unwrap()
});

/// Decodes a JMAE `.out` file into a [`CaseMetadata`]
pub struct OutputDecoder<'m> {
    meta: &'m mut CaseMetadata,
}

struct OutputState<'a> {
    meta: &'a mut CaseMetadata,
    base_dir: PathBuf,
}

impl<'m> OutputDecoder<'m> {
    pub fn new(meta: &'m mut CaseMetadata) -> Self {
        Self { meta }
    }

    /// Decode `path`.
    ///
    /// Returns the companion files when the run completed and `None` for an
    /// incomplete run. The matrix and detail paths share the output file's
    /// stem; AV, surface and kill paths are the ones the file declares.
    pub fn read(&mut self, path: &Path) -> Result<Option<CaseFiles>> {
        debug!("Reading output file {}", path.display());
        let reader = LineReader::open(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        if !self.decode(reader, base_dir)? {
            debug!("{} has no RUN COMPLETE marker", path.display());
            return Ok(None);
        }

        Ok(Some(CaseFiles {
            av: self.meta.av_file.clone(),
            surface: self.meta.surface_file.clone(),
            matrix: path.with_extension("mtx"),
            kill: self.meta.kill_file.clone(),
            detail: path.with_extension("dtl"),
        }))
    }

    /// Decode from any buffered source. Relative file paths are looked up
    /// under `base_dir` first. Returns whether the run completed.
    pub fn read_from<R: BufRead>(&mut self, input: R, base_dir: &Path) -> Result<bool> {
        self.decode(LineReader::new(input), base_dir)
    }

    fn decode<R: BufRead>(&mut self, mut reader: LineReader<R>, base_dir: &Path) -> Result<bool> {
        let mut state = OutputState {
            meta: &mut *self.meta,
            base_dir: base_dir.to_path_buf(),
        };
        dispatcher().run(&mut state, &mut reader)?;

        debug!(
            "Output decoded: {} blast, {} direct hit, {} invulnerable components",
            self.meta.blast_ids.len(),
            self.meta.direct_hit_ids.len(),
            self.meta.invulnerable_ids.len()
        );
        Ok(self.meta.run_complete)
    }
}

fn dispatcher<'a, R: BufRead>() -> LineDispatcher<OutputState<'a>, R> {
    LineDispatcher::new()
        .trim_leading_whitespace(true)
        .route("TARGET AV FILE", parse_av_file)
        .route("TARGET CENTER COORDINATES", parse_target_center)
        .route("TERMINAL VELOCITY", parse_terminal_velocity)
        .route("BURST HEIGHT", parse_burst_height)
        .route("TARGET SURFACE FILE", parse_surface_file)
        .route("ATTACK AZIMUTH - SPECIFIC", parse_specific_azimuth)
        .route("ATTACK AZIMUTH - AVERAGED", parse_averaged_azimuth)
        .route("ANGLE OF FALL", parse_angle_of_fall)
        .route("INVULNERABLE COMPONENTS", parse_invulnerable)
        .route("CMPID", parse_blast_components)
        .route("SRFID", parse_direct_hit_components)
        .route("KILL DEFINITION FILE", parse_kill_file)
        .route("MATRIX REQUESTED FOR", parse_kill_description)
        .route("RUN COMPLETE", parse_run_complete)
}

/// Text after the first ':'
fn value_text(line: &str, line_no: usize) -> Result<&str> {
    line.split_once(':')
        .map(|(_, value)| value)
        .ok_or_else(|| DecodeError::structural(line_no, format!("expected ':' in '{}'", line.trim())))
}

/// First token after the first ':' as a number
fn scalar(line: &str, line_no: usize, what: &str) -> Result<f64> {
    let tokens: Vec<&str> = value_text(line, line_no)?.split_whitespace().collect();
    parse_f64(field(&tokens, 0, line_no, what)?, line_no, what)
}

fn parse_av_file<R: BufRead>(
    state: &mut OutputState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    let path = resolve_path(state, line, reader, FileRole::VulnerableArea)?;
    state.meta.av_file = Some(path);
    Ok(Flow::Continue)
}

fn parse_surface_file<R: BufRead>(
    state: &mut OutputState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    let path = resolve_path(state, line, reader, FileRole::Surface)?;
    state.meta.surface_file = Some(path);
    Ok(Flow::Continue)
}

fn parse_kill_file<R: BufRead>(
    state: &mut OutputState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    let path = resolve_path(state, line, reader, FileRole::KillDefinition)?;
    state.meta.kill_file = Some(path);
    Ok(Flow::Continue)
}

/// The path follows the ':' or, when that is blank, sits on the next non-blank line
fn resolve_path<R: BufRead>(
    state: &OutputState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
    role: FileRole,
) -> Result<PathBuf> {
    let declared = value_text(line, reader.line_no())?.trim();
    let text = if declared.is_empty() {
        loop {
            let next = reader.expect_line(&format!("{} file path", role))?;
            let next = next.trim();
            if !next.is_empty() {
                break next.to_string();
            }
        }
    } else {
        declared.to_string()
    };

    let given = PathBuf::from(&text);
    let beside_output = state.base_dir.join(&given);
    if beside_output.exists() {
        trace!("{} file resolved to {}", role, beside_output.display());
        Ok(beside_output)
    } else if given.exists() {
        Ok(given)
    } else {
        Err(DecodeError::MissingFile { role, path: given })
    }
}

fn parse_target_center<R: BufRead>(
    state: &mut OutputState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    let line_no = reader.line_no();
    let text = value_text(line, line_no)?;
    let captures = TARGET_CENTER.captures(text).ok_or_else(|| {
        DecodeError::structural(line_no, format!("can't read target center from '{}'", text.trim()))
    })?;
    let x = parse_f64(&captures[1], line_no, "target center x")?;
    let y = parse_f64(&captures[2], line_no, "target center y")?;
    state.meta.target_center = Some((x, y));
    Ok(Flow::Continue)
}

fn parse_terminal_velocity<R: BufRead>(
    state: &mut OutputState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    state.meta.terminal_velocity = Some(scalar(line, reader.line_no(), "terminal velocity")?);
    Ok(Flow::Continue)
}

fn parse_burst_height<R: BufRead>(
    state: &mut OutputState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    state.meta.burst_height = Some(scalar(line, reader.line_no(), "burst height")?);
    Ok(Flow::Continue)
}

fn parse_specific_azimuth<R: BufRead>(
    state: &mut OutputState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    state.meta.azimuth_averaging = false;
    state.meta.attack_azimuth = Some(scalar(line, reader.line_no(), "attack azimuth")?);
    Ok(Flow::Continue)
}

fn parse_averaged_azimuth<R: BufRead>(
    state: &mut OutputState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    state.meta.azimuth_averaging = true;
    state.meta.attack_azimuth = Some(scalar(line, reader.line_no(), "attack azimuth")?);
    Ok(Flow::Continue)
}

fn parse_angle_of_fall<R: BufRead>(
    state: &mut OutputState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    state.meta.angle_of_fall = Some(scalar(line, reader.line_no(), "angle of fall")?);
    Ok(Flow::Continue)
}

/// Rows of `label : id` up to a blank line, or `NONE` on the keyword line
fn parse_invulnerable<R: BufRead>(
    state: &mut OutputState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    if line.contains("NONE") {
        return Ok(Flow::Continue);
    }
    while let Some(row) = reader.next_line()? {
        let row = row.trim();
        if row.is_empty() {
            break;
        }
        let line_no = reader.line_no();
        let parts: Vec<&str> = row.split(':').collect();
        if parts.len() != 2 {
            return Err(DecodeError::structural(
                line_no,
                format!("can't read invulnerable component from '{}'", row),
            ));
        }
        let id = parse_int(parts[1], line_no, "invulnerable component id")?;
        state.meta.invulnerable_ids.insert(id);
    }
    Ok(Flow::Continue)
}

/// Rows of `CMPID R1 R2 R3 Z1 Z2` up to a blank line.
///
/// A sphere (R1, R2 and Z1 all zero) is followed by one extra line naming
/// the shape, which is consumed here.
fn parse_blast_components<R: BufRead>(
    state: &mut OutputState<'_>,
    _line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    while let Some(row) = reader.next_line()? {
        if row.trim().is_empty() {
            break;
        }
        let line_no = reader.line_no();
        let tokens: Vec<&str> = row.split_whitespace().collect();
        if tokens.len() != 6 {
            return Err(DecodeError::structural(
                line_no,
                format!("blast component row needs 6 values, found {}", tokens.len()),
            ));
        }

        let id = parse_int(tokens[0], line_no, "blast component id")?;
        let volume = BlastVolume {
            r1: parse_f64(tokens[1], line_no, "R1")?,
            r2: parse_f64(tokens[2], line_no, "R2")?,
            r3: parse_f64(tokens[3], line_no, "R3")?,
            z1: parse_f64(tokens[4], line_no, "Z1")?,
            z2: parse_f64(tokens[5], line_no, "Z2")?,
        };

        if !volume.is_empty() {
            state.meta.blast_ids.insert(id);
            state.meta.blast_volumes.insert(id, volume);
        }
        if volume.is_sphere() {
            match reader.next_line()? {
                Some(extra) if !extra.trim().is_empty() => {}
                _ => break,
            }
        }
    }
    Ok(Flow::Continue)
}

/// Rows up to a blank line; the component id is in the second column
fn parse_direct_hit_components<R: BufRead>(
    state: &mut OutputState<'_>,
    _line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    while let Some(row) = reader.next_line()? {
        if row.trim().is_empty() {
            break;
        }
        let line_no = reader.line_no();
        let tokens: Vec<&str> = row.split_whitespace().collect();
        let id = parse_int(field(&tokens, 1, line_no, "direct hit component id")?, line_no, "direct hit component id")?;
        state.meta.direct_hit_ids.insert(id);
    }
    Ok(Flow::Continue)
}

fn parse_kill_description<R: BufRead>(
    state: &mut OutputState<'_>,
    line: &str,
    reader: &mut LineReader<R>,
) -> Result<Flow> {
    let line_no = reader.line_no();
    let description = value_text(line, line_no)?.trim();
    if let Some(previous) = &state.meta.kill_description {
        return Err(DecodeError::cross_reference(
            line_no,
            format!(
                "second kill description '{}' after '{}': only one matrix per case is supported",
                description, previous
            ),
        ));
    }
    state.meta.kill_description = Some(description.to_string());
    Ok(Flow::Continue)
}

fn parse_run_complete<R: BufRead>(
    state: &mut OutputState<'_>,
    _line: &str,
    _reader: &mut LineReader<R>,
) -> Result<Flow> {
    state.meta.run_complete = true;
    Ok(Flow::Continue)
}
