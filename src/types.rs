use std::path::PathBuf;

use chrono::{DateTime, Utc};
use parser_av::{AvData, Component};
use parser_common::{ComponentId, ComponentRoles, IdSet};
use parser_dtl::DetailTrace;
use parser_kill::KillTree;
use parser_mtx::MatrixGrid;
use parser_out::{BlastVolume, CaseFiles, CaseMetadata};
use parser_srf::{SurfaceBounds, SurfaceMesh};
use serde::Serialize;

/// Configuration for loading a single case
#[derive(Debug, Clone)]
pub struct CaseLoaderConfig {
    /// Decode the AV, surface, matrix and kill files concurrently
    pub parallel: bool,
    /// Decode the detail trace when a full-detail file is present
    pub load_detail: bool,
    /// Fail when the matrix kill id differs from the kill file's active kill
    pub strict_kill_check: bool,
}

impl Default for CaseLoaderConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            load_detail: true,
            strict_kill_check: false,
        }
    }
}

/// Configuration for scanning a directory of cases
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum number of cases loaded at once
    pub threads: usize,
    /// Descend into subdirectories
    pub recursive: bool,
    pub loader: CaseLoaderConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            recursive: true,
            loader: CaseLoaderConfig::default(),
        }
    }
}

/// Every file of a completed case, decoded
#[derive(Debug, Clone, Default)]
pub struct CaseModel {
    pub metadata: CaseMetadata,
    pub files: Option<CaseFiles>,
    pub av: AvData,
    pub surface: SurfaceMesh,
    /// `None` when the run wrote no matrix file
    pub matrix: Option<MatrixGrid>,
    pub kill: KillTree,
    /// `None` when no full-detail file was available or loading it was disabled
    pub detail: Option<DetailTrace>,
}

impl CaseModel {
    pub fn roles(&self) -> ComponentRoles<'_> {
        ComponentRoles {
            direct_hit: &self.metadata.direct_hit_ids,
            blast: &self.metadata.blast_ids,
            fragmentation: &self.av.fragmentation_ids,
        }
    }

    /// Component by 1-based position in the AV file
    pub fn component(&self, index: usize) -> Option<&Component> {
        self.av.component(index)
    }

    /// Sorted union of direct hit, blast and fragmentation ids
    pub fn tracked_component_ids(&self) -> IdSet {
        self.roles().tracked()
    }

    pub fn blast_volume(&self, id: ComponentId) -> Option<&BlastVolume> {
        self.metadata.blast_volumes.get(&id)
    }

    /// Azimuths the case was evaluated at, in whole degrees.
    ///
    /// An averaged case steps from 0 up to (not including) 360 by the
    /// declared attack azimuth.
    pub fn attack_azimuths(&self) -> Vec<i32> {
        let Some(azimuth) = self.metadata.attack_azimuth else {
            return Vec::new();
        };
        if !self.metadata.azimuth_averaging {
            return vec![azimuth as i32];
        }
        let step = azimuth as i32;
        if step <= 0 {
            return vec![0];
        }
        (0..360).step_by(step as usize).collect()
    }

    /// The matrix kill id agrees with the kill file's active kill (or one of them is unknown)
    pub fn kill_ids_consistent(&self) -> bool {
        match (&self.matrix, &self.kill.kill_id) {
            (Some(matrix), Some(kill_id)) => matrix.kill_id == *kill_id,
            _ => true,
        }
    }

    pub fn summary(&self) -> CaseSummary {
        CaseSummary {
            terminal_velocity: self.metadata.terminal_velocity,
            burst_height: self.metadata.burst_height,
            angle_of_fall: self.metadata.angle_of_fall,
            attack_azimuths: self.attack_azimuths(),
            azimuth_averaging: self.metadata.azimuth_averaging,
            kill_description: self.metadata.kill_description.clone(),
            kill_id: self.kill.kill_id.clone(),
            component_count: self.av.components.len(),
            direct_hit_components: self.metadata.direct_hit_ids.len(),
            blast_components: self.metadata.blast_ids.len(),
            fragmentation_components: self.av.fragmentation_ids.len(),
            invulnerable_components: self.metadata.invulnerable_ids.len(),
            av_cells: self.av.tables.shape().cell_count(),
            surface_quads: self.surface.quad_count(),
            surface_bounds: (!self.surface.bounds.is_empty()).then_some(self.surface.bounds),
            matrix_cells: self
                .matrix
                .as_ref()
                .map(|m| (m.range_cells, m.deflection_cells)),
            max_pk: self.matrix.as_ref().and_then(MatrixGrid::max_pk),
            kill_nodes: self.kill.len(),
            burst_points: self.detail.as_ref().map(DetailTrace::burst_point_count),
            burst_records: self.detail.as_ref().map(|d| d.records.len()),
            remedial_points_skipped: self
                .detail
                .as_ref()
                .is_some_and(|d| d.truncated_at_line.is_some()),
        }
    }
}

/// Result of loading one output file
#[derive(Debug, Clone)]
pub enum CaseOutcome {
    Complete(Box<CaseModel>),
    /// The run never reached RUN COMPLETE; only the output file was decoded
    Incomplete(CaseMetadata),
}

/// Counts and scalar parameters of a loaded case, for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseSummary {
    pub terminal_velocity: Option<f64>,
    pub burst_height: Option<f64>,
    pub angle_of_fall: Option<f64>,
    pub attack_azimuths: Vec<i32>,
    pub azimuth_averaging: bool,
    pub kill_description: Option<String>,
    pub kill_id: Option<String>,
    pub component_count: usize,
    pub direct_hit_components: usize,
    pub blast_components: usize,
    pub fragmentation_components: usize,
    pub invulnerable_components: usize,
    pub av_cells: usize,
    pub surface_quads: usize,
    pub surface_bounds: Option<SurfaceBounds>,
    pub matrix_cells: Option<(usize, usize)>,
    pub max_pk: Option<f64>,
    pub kill_nodes: usize,
    pub burst_points: Option<usize>,
    pub burst_records: Option<usize>,
    pub remedial_points_skipped: bool,
}

/// Status of one case in a directory scan
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum CaseStatus {
    Complete(CaseSummary),
    Incomplete,
    Failed(String),
}

/// Result of scanning one output file
#[derive(Debug, Clone, Serialize)]
pub struct CaseScanResult {
    /// Output file stem
    pub case_name: String,
    pub out_path: PathBuf,
    /// SHA-256 of the output file
    pub hash: String,
    pub status: CaseStatus,
    pub scanned_at: DateTime<Utc>,
}
