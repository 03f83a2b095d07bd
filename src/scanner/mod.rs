
mod collector;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use tokio::sync::Semaphore;
use tokio::task;

use crate::loader::CaseLoader;
use crate::types::{CaseLoaderConfig, CaseOutcome, CaseScanResult, CaseStatus, ScanConfig};
use crate::utils::{case_name, file_sha256};

pub use collector::{OUTPUT_EXTENSION, collect_output_files, is_output_file};

/// Load every output file under `dir`.
///
/// Cases load on the blocking pool, at most `config.threads` at a time. A
/// case that fails to load is reported as [`CaseStatus::Failed`] and does
/// not stop the scan.
pub async fn scan_cases(dir: &Path, config: &ScanConfig) -> Result<Vec<CaseScanResult>> {
    info!("Scanning for cases in {}", dir.display());
    debug!("Configuration: {:?}", config);

    let out_files = collect_output_files(dir, config.recursive)?;
    if out_files.is_empty() {
        warn!("No output files found in {}", dir.display());
        return Ok(Vec::new());
    }
    info!("Found {} output files", out_files.len());

    let progress = ProgressBar::new(out_files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    progress.set_message("Loading cases");

    let permits = Arc::new(Semaphore::new(config.threads.max(1)));
    let tasks = out_files.into_iter().map(|path| {
        let permits = Arc::clone(&permits);
        let loader_config = config.loader.clone();
        let progress = progress.clone();
        async move {
            let _permit = permits.acquire_owned().await?;
            let result = task::spawn_blocking(move || scan_case(path, loader_config)).await?;
            progress.inc(1);
            Ok::<_, anyhow::Error>(result)
        }
    });

    let mut results = Vec::new();
    for result in join_all(tasks).await {
        results.push(result?);
    }

    let failed = results
        .iter()
        .filter(|r| matches!(r.status, CaseStatus::Failed(_)))
        .count();
    progress.finish_with_message(format!("Loaded {} cases", results.len()));
    info!("Scanned {} cases, {} failed", results.len(), failed);
    Ok(results)
}

/// Load one case and record its status
pub fn scan_case(out_path: PathBuf, config: CaseLoaderConfig) -> CaseScanResult {
    let hash = match file_sha256(&out_path) {
        Ok(hash) => hash,
        Err(e) => {
            warn!("Failed to hash {}: {}", out_path.display(), e);
            String::new()
        }
    };

    let status = match CaseLoader::with_config(config).load(&out_path) {
        Ok(CaseOutcome::Complete(model)) => CaseStatus::Complete(model.summary()),
        Ok(CaseOutcome::Incomplete(_)) => CaseStatus::Incomplete,
        Err(e) => {
            warn!("Failed to load case {}: {:#}", out_path.display(), e);
            CaseStatus::Failed(format!("{:#}", e))
        }
    };

    CaseScanResult {
        case_name: case_name(&out_path),
        out_path,
        hash,
        status,
        scanned_at: Utc::now(),
    }
}
