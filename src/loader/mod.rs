#[cfg(test)]
mod tests;

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use parser_av::AvDecoder;
use parser_dtl::{DetailDecoder, DetailTrace};
use parser_kill::KillDecoder;
use parser_mtx::{MatrixDecoder, MatrixGrid};
use parser_out::{CaseFiles, CaseMetadata, OutputDecoder};
use parser_srf::SurfaceDecoder;

use crate::types::{CaseLoaderConfig, CaseModel, CaseOutcome};

/// Loads every file of a case, starting from its output file
#[derive(Debug, Clone, Default)]
pub struct CaseLoader {
    config: CaseLoaderConfig,
}

impl CaseLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CaseLoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CaseLoaderConfig {
        &self.config
    }

    /// Decode the output file at `out_path` and, if the run completed, the
    /// files it references.
    pub fn load(&self, out_path: &Path) -> Result<CaseOutcome> {
        info!("Loading case {}", out_path.display());

        let mut metadata = CaseMetadata::default();
        let files = OutputDecoder::new(&mut metadata)
            .read(out_path)
            .with_context(|| format!("decoding output file {}", out_path.display()))?;

        let Some(files) = files else {
            info!("Run in {} is incomplete", out_path.display());
            return Ok(CaseOutcome::Incomplete(metadata));
        };
        debug!("Case files: {:?}", files);

        let mut model = CaseModel {
            metadata,
            files: Some(files.clone()),
            ..CaseModel::default()
        };

        self.decode_companions(&mut model, &files)?;
        if self.config.load_detail {
            self.decode_detail(&mut model, &files)?;
        }
        self.check_kill_ids(&model)?;

        info!(
            "Loaded case {}: {} components, {} surfaces",
            out_path.display(),
            model.av.components.len(),
            model.surface.quad_count()
        );
        Ok(CaseOutcome::Complete(Box::new(model)))
    }

    /// AV, surface, matrix and kill files write disjoint parts of the model
    fn decode_companions(&self, model: &mut CaseModel, files: &CaseFiles) -> Result<()> {
        let CaseModel {
            metadata,
            av,
            surface,
            matrix,
            kill,
            ..
        } = model;
        let description = metadata.kill_description.as_deref();

        let mut av_task = move || -> Result<()> {
            if let Some(path) = &files.av {
                AvDecoder::new(av)
                    .read(path)
                    .with_context(|| format!("decoding AV file {}", path.display()))?;
            }
            Ok(())
        };
        let mut surface_task = move || -> Result<()> {
            if let Some(path) = &files.surface {
                SurfaceDecoder::new(surface)
                    .read(path)
                    .with_context(|| format!("decoding surface file {}", path.display()))?;
            }
            Ok(())
        };
        let matrix_task = move || -> Result<Option<MatrixGrid>> {
            let path = &files.matrix;
            if !path.exists() {
                warn!("No matrix file at {}", path.display());
                return Ok(None);
            }
            let mut grid = MatrixGrid::default();
            MatrixDecoder::new(&mut grid)
                .read(path)
                .with_context(|| format!("decoding matrix file {}", path.display()))?;
            Ok(Some(grid))
        };
        let mut kill_task = move || -> Result<()> {
            if let Some(path) = &files.kill {
                KillDecoder::new(kill, description)
                    .read(path)
                    .with_context(|| format!("decoding kill definition file {}", path.display()))?;
            }
            Ok(())
        };

        let ((av_result, surface_result), (matrix_result, kill_result)) = if self.config.parallel {
            rayon::join(
                || rayon::join(av_task, surface_task),
                || rayon::join(matrix_task, kill_task),
            )
        } else {
            ((av_task(), surface_task()), (matrix_task(), kill_task()))
        };

        av_result?;
        surface_result?;
        kill_result?;
        *matrix = matrix_result?;
        Ok(())
    }

    fn decode_detail(&self, model: &mut CaseModel, files: &CaseFiles) -> Result<()> {
        let path = &files.detail;
        if !path.exists() {
            warn!("No detail file at {}", path.display());
            return Ok(());
        }
        let full_detail = DetailDecoder::is_full_detail(path)
            .with_context(|| format!("validating detail file {}", path.display()))?;
        if !full_detail {
            warn!("{} is not a full-detail file, skipping the detail trace", path.display());
            return Ok(());
        }

        let mut trace = DetailTrace::default();
        DetailDecoder::new(&mut trace, model.roles())
            .read(path)
            .with_context(|| format!("decoding detail file {}", path.display()))?;
        if let Some(line) = trace.truncated_at_line {
            debug!("Remedial burst points from line {} were not loaded", line);
        }
        model.detail = Some(trace);
        Ok(())
    }

    fn check_kill_ids(&self, model: &CaseModel) -> Result<()> {
        if model.kill_ids_consistent() {
            return Ok(());
        }
        let message = format!(
            "matrix kill id {:?} doesn't match kill definition id {:?}",
            model.matrix.as_ref().map(|m| m.kill_id.as_str()),
            model.kill.kill_id
        );
        if self.config.strict_kill_check {
            bail!(message);
        }
        warn!("{}", message);
        Ok(())
    }
}
