use std::collections::BTreeMap;

use parser_common::ComponentId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FragZone {
    pub zone: u32,
    pub lower_angle: f64,
    pub upper_angle: f64,
}

/// (burst point index, azimuth in whole degrees)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BurstKey {
    pub index: u32,
    pub azimuth: i32,
}

impl BurstKey {
    pub fn new(index: u32, azimuth: i32) -> Self {
        Self { index, azimuth }
    }
}

/// What one burst point produced at one azimuth
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BurstRecord {
    pub sample_location: [f64; 3],
    pub burst_location: [f64; 3],
    pub surface_hit: i64,
    /// PK per component, from the column of the component's role
    pub component_pk: BTreeMap<ComponentId, f64>,
    pub frag_zones: BTreeMap<ComponentId, Vec<FragZone>>,
}

#[derive(Debug, Clone, Default)]
pub struct DetailTrace {
    pub radius: Option<f64>,
    pub evaluation_center: Option<[f64; 3]>,
    pub dh_includes_frag_effects: Option<bool>,
    /// Line of the first remedial burst point, when the file had any
    pub truncated_at_line: Option<usize>,
    pub records: BTreeMap<BurstKey, BurstRecord>,
}

impl DetailTrace {
    pub fn record(&self, index: u32, azimuth: i32) -> Option<&BurstRecord> {
        self.records.get(&BurstKey::new(index, azimuth))
    }

    pub fn sample_locations(&self) -> impl Iterator<Item = (BurstKey, [f64; 3])> + '_ {
        self.records.iter().map(|(key, record)| (*key, record.sample_location))
    }

    pub fn burst_locations(&self) -> impl Iterator<Item = (BurstKey, [f64; 3])> + '_ {
        self.records.iter().map(|(key, record)| (*key, record.burst_location))
    }

    /// Distinct burst point indices
    pub fn burst_point_count(&self) -> usize {
        let mut indices: Vec<u32> = self.records.keys().map(|key| key.index).collect();
        indices.dedup();
        indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
