use std::fs;
use std::io::Cursor;
use std::path::Path;

use parser_common::{DecodeError, ErrorKind, FileRole};
use parser_out::{BlastShape, CaseMetadata, OutputDecoder};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn init() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), "").unwrap();
}

const COMPLETE_RUN: &str = "\
 JMAE OUTPUT
 TARGET AV FILE: case.av
 TARGET CENTER COORDINATES: (1.5, -2.0)
 TERMINAL VELOCITY: 1000.0 FT/SEC
 BURST HEIGHT: 5.0 FT
 TARGET SURFACE FILE:

     case.srf
 ATTACK AZIMUTH - SPECIFIC: 45.0 DEG
 ANGLE OF FALL: 60.0 DEG
 INVULNERABLE COMPONENTS
   COMPONENT NUMBER : 7
   COMPONENT NUMBER : 9

 CMPID   R1    R2    R3    Z1    Z2
   2    0.0   0.0   4.0   0.0   1.5
                  SPHERE
   3    2.0   3.0   1.0   4.0   6.0
   4    0.0   0.0   0.0   0.0   0.0
   EXTRA LINE
   5    1.0   1.0   1.0   1.0   1.0

 SRFID  CMPID
   1     11
   2     12

 KILL DEFINITION FILE: case.kil
 MATRIX REQUESTED FOR: Mobility kill
 RUN COMPLETE
";

#[test]
fn test_complete_run() -> Result<(), DecodeError> {
    init();
    let dir = tempdir().unwrap();
    touch(dir.path(), "case.av");
    touch(dir.path(), "case.srf");
    touch(dir.path(), "case.kil");

    let mut meta = CaseMetadata::default();
    let complete = OutputDecoder::new(&mut meta).read_from(Cursor::new(COMPLETE_RUN), dir.path())?;

    assert!(complete);
    assert_eq!(meta.av_file, Some(dir.path().join("case.av")));
    assert_eq!(meta.surface_file, Some(dir.path().join("case.srf")));
    assert_eq!(meta.kill_file, Some(dir.path().join("case.kil")));
    assert_eq!(meta.target_center, Some((1.5, -2.0)));
    assert_eq!(meta.terminal_velocity, Some(1000.0));
    assert_eq!(meta.burst_height, Some(5.0));
    assert_eq!(meta.attack_azimuth, Some(45.0));
    assert!(!meta.azimuth_averaging);
    assert_eq!(meta.angle_of_fall, Some(60.0));
    assert_eq!(meta.kill_description.as_deref(), Some("Mobility kill"));

    assert_eq!(meta.invulnerable_ids.iter().copied().collect::<Vec<_>>(), vec![7, 9]);
    assert_eq!(meta.direct_hit_ids.iter().copied().collect::<Vec<_>>(), vec![11, 12]);
    // Component 4 is all zero: no blast volume, but its sphere line is still consumed
    assert_eq!(meta.blast_ids.iter().copied().collect::<Vec<_>>(), vec![2, 3, 5]);
    assert_eq!(meta.blast_volumes[&2].shape(), BlastShape::Sphere { radius: 4.0 });
    assert_eq!(meta.blast_volumes[&3].shape(), BlastShape::DoubleCylinder);
    assert_eq!(meta.blast_volumes[&3].z2, 6.0);
    Ok(())
}

#[test]
fn test_read_synthesizes_companion_paths() -> Result<(), DecodeError> {
    init();
    let dir = tempdir().unwrap();
    touch(dir.path(), "case.av");
    touch(dir.path(), "case.srf");
    touch(dir.path(), "case.kil");
    let out_path = dir.path().join("run42.out");
    fs::write(&out_path, COMPLETE_RUN).unwrap();

    let mut meta = CaseMetadata::default();
    let files = OutputDecoder::new(&mut meta).read(&out_path)?.expect("run is complete");

    assert_eq!(files.matrix, dir.path().join("run42.mtx"));
    assert_eq!(files.detail, dir.path().join("run42.dtl"));
    assert_eq!(files.av, Some(dir.path().join("case.av")));
    assert_eq!(files.surface, Some(dir.path().join("case.srf")));
    assert_eq!(files.kill, Some(dir.path().join("case.kil")));
    Ok(())
}

#[test]
fn test_incomplete_run_is_not_an_error() -> Result<(), DecodeError> {
    init();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("partial.out");
    fs::write(
        &out_path,
        " TERMINAL VELOCITY: 800.0\n ATTACK AZIMUTH - AVERAGED: 30.0\n MATRIX REQUESTED FOR: Firepower kill\n",
    )
    .unwrap();

    let mut meta = CaseMetadata::default();
    let files = OutputDecoder::new(&mut meta).read(&out_path)?;

    assert_eq!(files, None);
    assert!(!meta.run_complete);
    assert!(meta.azimuth_averaging);
    assert_eq!(meta.attack_azimuth, Some(30.0));
    assert_eq!(meta.terminal_velocity, Some(800.0));
    Ok(())
}

#[test]
fn test_missing_files_name_their_role() {
    init();
    let dir = tempdir().unwrap();
    touch(dir.path(), "case.av");

    let test_cases = vec![
        ("TARGET AV FILE: nowhere.av\n", FileRole::VulnerableArea),
        ("TARGET SURFACE FILE: nowhere.srf\n", FileRole::Surface),
        ("TARGET AV FILE: case.av\nKILL DEFINITION FILE:\n\n  nowhere.kil\n", FileRole::KillDefinition),
    ];

    for (input, expected_role) in test_cases {
        let mut meta = CaseMetadata::default();
        let err = OutputDecoder::new(&mut meta)
            .read_from(Cursor::new(input), dir.path())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingResource, "input: {:?}", input);
        match err {
            DecodeError::MissingFile { role, .. } => assert_eq!(role, expected_role),
            other => panic!("unexpected error {:?}", other),
        }
    }
}

#[test]
fn test_second_kill_description_is_rejected() {
    init();
    let input = "MATRIX REQUESTED FOR: Mobility kill\nMATRIX REQUESTED FOR: Firepower kill\n";
    let mut meta = CaseMetadata::default();
    let err = OutputDecoder::new(&mut meta)
        .read_from(Cursor::new(input), Path::new("."))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CrossReference);
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_malformed_blocks() {
    init();
    let test_cases = vec![
        ("CMPID R1 R2 R3 Z1 Z2\n 1 2.0 3.0 4.0 5.0\n", 2),
        ("INVULNERABLE COMPONENTS\n  COMPONENT NUMBER 4\n", 2),
        ("BURST HEIGHT: high\n", 1),
    ];

    for (input, line) in test_cases {
        let mut meta = CaseMetadata::default();
        let err = OutputDecoder::new(&mut meta)
            .read_from(Cursor::new(input), Path::new("."))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural, "input: {:?}", input);
        assert_eq!(err.line(), Some(line), "input: {:?}", input);
    }
}

#[test]
fn test_invulnerable_none() -> Result<(), DecodeError> {
    let input = "INVULNERABLE COMPONENTS: NONE\n  SRFID CMPID\n";
    let mut meta = CaseMetadata::default();
    OutputDecoder::new(&mut meta).read_from(Cursor::new(input), Path::new("."))?;
    assert!(meta.invulnerable_ids.is_empty());
    Ok(())
}
