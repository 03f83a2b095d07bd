use std::collections::BTreeMap;
use std::path::PathBuf;

use parser_common::{ComponentId, IdSet};
use serde::Serialize;

/// Blast volume geometry declared for one component
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlastVolume {
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub z1: f64,
    pub z2: f64,
}

/// Shape a [`BlastVolume`] describes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BlastShape {
    /// Single sphere of radius `r3`
    Sphere { radius: f64 },
    /// Lower cylinder (r1, z1), upper cylinder (r2, z2) and a spherical cap (r3)
    DoubleCylinder,
}

impl BlastVolume {
    /// All five values zero: the component has no blast volume
    pub fn is_empty(&self) -> bool {
        [self.r1, self.r2, self.r3, self.z1, self.z2]
            .iter()
            .all(|v| *v == 0.0)
    }

    pub fn is_sphere(&self) -> bool {
        self.r1 == 0.0 && self.r2 == 0.0 && self.z1 == 0.0
    }

    pub fn shape(&self) -> BlastShape {
        if self.is_sphere() {
            BlastShape::Sphere { radius: self.r3 }
        } else {
            BlastShape::DoubleCylinder
        }
    }
}

/// Scalar case parameters, file references and component roles from a `.out` file
#[derive(Debug, Clone, Default, Serialize)]
pub struct CaseMetadata {
    /// Munition terminal velocity (ft/s)
    pub terminal_velocity: Option<f64>,
    /// Burst height (ft)
    pub burst_height: Option<f64>,
    /// Attack azimuth in degrees; the azimuth step when averaging
    pub attack_azimuth: Option<f64>,
    pub azimuth_averaging: bool,
    pub angle_of_fall: Option<f64>,
    pub target_center: Option<(f64, f64)>,
    pub av_file: Option<PathBuf>,
    pub surface_file: Option<PathBuf>,
    pub kill_file: Option<PathBuf>,
    /// Description of the kill the matrix was requested for
    pub kill_description: Option<String>,
    pub invulnerable_ids: IdSet,
    pub blast_ids: IdSet,
    pub direct_hit_ids: IdSet,
    pub blast_volumes: BTreeMap<ComponentId, BlastVolume>,
    pub run_complete: bool,
}

/// Companion files of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseFiles {
    pub av: Option<PathBuf>,
    pub surface: Option<PathBuf>,
    pub matrix: PathBuf,
    pub kill: Option<PathBuf>,
    pub detail: PathBuf,
}
