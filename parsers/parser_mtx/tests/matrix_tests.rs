use std::fs;
use std::io::Cursor;

use float_eq::assert_float_eq;
use parser_common::{DecodeError, ErrorKind};
use parser_mtx::{MatrixDecoder, MatrixGrid};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn init() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

const MATRIX: &str = "\
JMAE MATRIX FILE
RUN 42
<MATRIX HEADER>
KILL ID: K1 Mobility kill
<MATRIX DETAILS>
<MATRIX DIMENSIONS>
2, 3
<MATRIX OFFSET COORDINATE>
-10.0, 15.0
<MATRIX GRIDLINES RANGE>
0.0 5.0 10.0
<MATRIX GRIDLINES DEFLECTION>
0.0 2.5 5.0 7.5
<MATRIX PKS>
0.10 0.20 0.30
0.40 0.50 0.60
";

fn decode(text: &str) -> Result<MatrixGrid, DecodeError> {
    let mut grid = MatrixGrid::default();
    MatrixDecoder::new(&mut grid).read_from(Cursor::new(text))?;
    Ok(grid)
}

#[test]
fn test_matrix_grid() -> Result<(), DecodeError> {
    init();
    let grid = decode(MATRIX)?;

    assert_eq!(grid.kill_id, "k1");
    assert_eq!((grid.range_cells, grid.deflection_cells), (2, 3));
    assert_eq!(grid.offset, (-10.0, 15.0));
    assert_eq!(grid.range_gridlines, vec![0.0, 5.0, 10.0]);
    assert_eq!(grid.deflection_gridlines.len(), 4);

    assert_float_eq!(grid.pk(1, 2).unwrap(), 0.60, abs <= 1e-12);
    assert_float_eq!(grid.pk(0, 1).unwrap(), 0.20, abs <= 1e-12);
    assert_eq!(grid.pk(2, 0), None);
    assert_eq!(grid.pk(0, 3), None);
    assert_eq!(grid.row(1), Some(&[0.40, 0.50, 0.60][..]));
    assert_eq!(grid.max_pk(), Some(0.60));
    Ok(())
}

#[test]
fn test_structural_failures() {
    init();
    let test_cases = vec![
        // no header sentinel at all
        (MATRIX.replace("<MATRIX HEADER>", "MATRIX HEADER"), 17),
        (MATRIX.replace("KILL ID: K1 Mobility kill", "KILL ID K1"), 4),
        (MATRIX.replace("<MATRIX DIMENSIONS>\n", ""), 6),
        (MATRIX.replace("0.40 0.50 0.60", "0.40 0.50"), 16),
        (MATRIX.replace("0.40 0.50 0.60", "0.40 0.50 0.60 0.70"), 16),
        (MATRIX.replace("0.40 0.50 0.60\n", ""), 16),
        (MATRIX.replace("-10.0, 15.0", "-10.0"), 9),
    ];

    for (text, line) in test_cases {
        let err = decode(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural, "{}", err);
        assert_eq!(err.line(), Some(line), "{}", err);
    }
}

#[test]
fn test_oversized_dimensions_are_structural() {
    init();
    let test_cases = vec![
        // product overflows
        ("4294967296, 4294967296", 7),
        ("18446744073709551615, 2", 7),
        // fits, but the rows in the file don't
        ("1000000000, 1000", 15),
    ];

    for (dimensions, line) in test_cases {
        let text = MATRIX.replacen("2, 3", dimensions, 1);
        let err = decode(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural, "{}: {}", dimensions, err);
        assert_eq!(err.line(), Some(line), "{}: {}", dimensions, err);
    }
}

#[test]
fn test_read_from_disk() -> Result<(), DecodeError> {
    init();
    let dir = tempdir().unwrap();
    let path = dir.path().join("case.mtx");
    fs::write(&path, MATRIX).unwrap();

    let mut grid = MatrixGrid::default();
    MatrixDecoder::new(&mut grid).read(&path)?;
    assert_eq!(grid.pks.len(), 6);
    assert_float_eq!(grid.max_pk().unwrap(), 0.60, abs <= 1e-12);

    let err = MatrixDecoder::new(&mut MatrixGrid::default())
        .read(&dir.path().join("missing.mtx"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    Ok(())
}
