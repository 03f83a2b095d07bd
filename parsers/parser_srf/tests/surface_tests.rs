use std::fs;
use std::io::Cursor;

use float_eq::assert_float_eq;
use parser_common::{DecodeError, ErrorKind};
use parser_srf::{SurfaceDecoder, SurfaceMesh};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn init() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

const SURFACES: &str = "\
TARGET SURFACES
2 1.0
-2.0 -1.0 0.0  2.0 -1.0 0.0  2.0 1.0 0.0  -2.0 1.0 0.0  1 1 Hull floor
-1.0 -0.5 2.5  1.0 -0.5 2.5  1.0 0.5 2.0  -1.0 0.5 2.0  2 1 Turret   roof
";

#[test]
fn test_quads_and_bounds() -> Result<(), DecodeError> {
    init();
    let mut mesh = SurfaceMesh::default();
    SurfaceDecoder::new(&mut mesh).read_from(Cursor::new(SURFACES))?;

    assert_eq!(mesh.quad_count(), 2);
    assert_eq!(mesh.vertices.len(), 8);
    assert_eq!(mesh.names, vec!["Hull floor", "Turret   roof"]);
    assert_eq!(mesh.vertices[4], [-1.0, -0.5, 2.5]);

    let bounds = mesh.bounds;
    assert_float_eq!(bounds.min_x, -2.0, abs <= 1e-12);
    assert_float_eq!(bounds.max_x, 2.0, abs <= 1e-12);
    assert_float_eq!(bounds.min_y, -1.0, abs <= 1e-12);
    assert_float_eq!(bounds.max_y, 1.0, abs <= 1e-12);
    assert_float_eq!(bounds.max_z, 2.5, abs <= 1e-12);

    let (name, corners) = mesh.quads().nth(1).unwrap();
    assert_eq!(name, "Turret   roof");
    assert_eq!(corners[2], [1.0, 0.5, 2.0]);
    Ok(())
}

#[test]
fn test_read_from_disk() -> Result<(), DecodeError> {
    init();
    let dir = tempdir().unwrap();
    let path = dir.path().join("target.srf");
    fs::write(&path, SURFACES).unwrap();

    let mut mesh = SurfaceMesh::default();
    SurfaceDecoder::new(&mut mesh).read(&path)?;
    assert_eq!(mesh.quad_count(), 2);
    assert_eq!(mesh.metric, 1.0);
    Ok(())
}

#[test]
fn test_malformed_rows() {
    init();
    let test_cases = vec![
        // fewer rows than declared
        (SURFACES.replacen("2 1.0", "3 1.0", 1), 5),
        (SURFACES.replacen("2 1.0", "18446744073709551615 1.0", 1), 5),
        // name missing
        (SURFACES.replacen(" 1 1 Hull floor", "", 1), 3),
        (SURFACES.replacen("2.0 -1.0 0.0", "2.0 -1.0 zero", 1), 3),
    ];

    for (text, line) in test_cases {
        let mut mesh = SurfaceMesh::default();
        let err = SurfaceDecoder::new(&mut mesh).read_from(Cursor::new(text.as_str())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(err.line(), Some(line));
    }
}

#[test]
fn test_missing_file() {
    let mut mesh = SurfaceMesh::default();
    let err = SurfaceDecoder::new(&mut mesh)
        .read(std::path::Path::new("/nonexistent/target.srf"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}
