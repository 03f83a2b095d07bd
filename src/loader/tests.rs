use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use float_eq::assert_float_eq;
use parser_av::TableIndex;
use parser_common::{DecodeError, ErrorKind, FileRole};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use super::CaseLoader;
use crate::types::{CaseLoaderConfig, CaseModel, CaseOutcome};

fn init() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

fn get_test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_data")
}

fn load_complete(loader: &CaseLoader) -> Result<Box<CaseModel>> {
    let out_path = get_test_data_dir().join("ballistic_case").join("sample.out");
    match loader.load(&out_path)? {
        CaseOutcome::Complete(model) => Ok(model),
        CaseOutcome::Incomplete(_) => panic!("sample case should be complete"),
    }
}

#[test]
fn test_load_complete_case() -> Result<()> {
    init();
    let model = load_complete(&CaseLoader::new())?;

    assert_eq!(model.metadata.target_center, Some((1.5, -2.0)));
    assert_eq!(model.attack_azimuths(), vec![0, 90, 180, 270]);
    assert_eq!(model.tracked_component_ids().into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(model.component(3).map(|c| c.name.as_str()), Some("Crew compartment"));
    assert_eq!(model.blast_volume(2).map(|v| v.r3), Some(4.0));

    assert_float_eq!(model.av.average_location.0, 0.5, abs <= 1e-12);
    assert_eq!(model.av.tables.av(TableIndex::new(2, 0, 0, 1, 1)), Some(4.5));
    assert_eq!(model.av.tables.pe(TableIndex::new(0, 0, 1, 0, 0)), Some(1.0));

    let matrix = model.matrix.as_ref().expect("matrix decoded");
    assert_eq!(matrix.kill_id, "k1");
    assert_eq!(model.kill.kill_id.as_deref(), Some("k1"));
    assert!(model.kill_ids_consistent());

    let detail = model.detail.as_ref().expect("detail decoded");
    assert_eq!(detail.records.len(), 3);
    assert_eq!(detail.truncated_at_line, Some(38));
    let first = detail.record(1, 0).expect("burst point 1 at azimuth 0");
    assert_eq!(
        first.component_pk.iter().map(|(id, pk)| (*id, *pk)).collect::<Vec<_>>(),
        vec![(1, 0.75), (2, 0.15), (3, 0.30)]
    );
    assert_eq!(first.frag_zones[&1].len(), 2);

    let summary = model.summary();
    assert_eq!(summary.component_count, 3);
    assert_eq!(summary.av_cells, 24);
    assert_eq!(summary.surface_quads, 2);
    assert_eq!(summary.matrix_cells, Some((2, 3)));
    assert_eq!(summary.kill_nodes, 3);
    assert_eq!(summary.burst_points, Some(2));
    assert!(summary.remedial_points_skipped);
    Ok(())
}

#[test]
fn test_sequential_load_matches_parallel() -> Result<()> {
    init();
    let parallel = load_complete(&CaseLoader::new())?;
    let sequential = load_complete(&CaseLoader::with_config(CaseLoaderConfig {
        parallel: false,
        ..CaseLoaderConfig::default()
    }))?;

    assert_eq!(parallel.summary(), sequential.summary());
    Ok(())
}

#[test]
fn test_skip_detail() -> Result<()> {
    init();
    let model = load_complete(&CaseLoader::with_config(CaseLoaderConfig {
        load_detail: false,
        ..CaseLoaderConfig::default()
    }))?;
    assert!(model.detail.is_none());
    assert_eq!(model.summary().burst_points, None);
    Ok(())
}

#[test]
fn test_incomplete_case() -> Result<()> {
    init();
    let out_path = get_test_data_dir().join("incomplete_case").join("incomplete.out");
    match CaseLoader::new().load(&out_path)? {
        CaseOutcome::Incomplete(metadata) => {
            assert_eq!(metadata.terminal_velocity, Some(800.0));
            assert_eq!(metadata.attack_azimuth, Some(45.0));
            assert!(!metadata.azimuth_averaging);
        }
        CaseOutcome::Complete(_) => panic!("case should be incomplete"),
    }
    Ok(())
}

#[test]
fn test_missing_av_file_keeps_decode_error() {
    init();
    let out_path = get_test_data_dir().join("broken_case").join("broken.out");
    let err = CaseLoader::new().load(&out_path).unwrap_err();

    let decode_error = err.downcast_ref::<DecodeError>().expect("typed decode error");
    assert_eq!(decode_error.kind(), ErrorKind::MissingResource);
    assert!(matches!(
        decode_error,
        DecodeError::MissingFile { role: FileRole::VulnerableArea, .. }
    ));
    assert!(format!("{:#}", err).contains("decoding output file"));
}

#[test]
fn test_optional_companions_are_skipped() -> Result<()> {
    init();
    let source = get_test_data_dir().join("ballistic_case");
    let dir = tempdir()?;
    for name in ["sample.out", "sample.av", "sample.srf", "sample.kil"] {
        fs::copy(source.join(name), dir.path().join(name))?;
    }
    // summary-only detail file: no fragmentation section
    fs::write(dir.path().join("sample.dtl"), "JMAE DETAILED OUTPUT\nBPNUM\n")?;

    match CaseLoader::new().load(&dir.path().join("sample.out"))? {
        CaseOutcome::Complete(model) => {
            assert!(model.matrix.is_none());
            assert!(model.detail.is_none());
            assert!(model.kill_ids_consistent());
        }
        CaseOutcome::Incomplete(_) => panic!("case should be complete"),
    }
    Ok(())
}

#[test]
fn test_kill_id_mismatch() -> Result<()> {
    init();
    let source = get_test_data_dir().join("ballistic_case");
    let dir = tempdir()?;
    for name in ["sample.out", "sample.av", "sample.srf", "sample.kil", "sample.dtl"] {
        fs::copy(source.join(name), dir.path().join(name))?;
    }
    let matrix = fs::read_to_string(source.join("sample.mtx"))?.replace("KILL ID: K1", "KILL ID: K2");
    fs::write(dir.path().join("sample.mtx"), matrix)?;
    let out_path = dir.path().join("sample.out");

    // lenient by default
    match CaseLoader::new().load(&out_path)? {
        CaseOutcome::Complete(model) => assert!(!model.kill_ids_consistent()),
        CaseOutcome::Incomplete(_) => panic!("case should be complete"),
    }

    let strict = CaseLoader::with_config(CaseLoaderConfig {
        strict_kill_check: true,
        ..CaseLoaderConfig::default()
    });
    let err = strict.load(&out_path).unwrap_err();
    assert!(err.to_string().contains("doesn't match"));
    Ok(())
}
