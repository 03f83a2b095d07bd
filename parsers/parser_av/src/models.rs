use parser_common::{ComponentId, IdSet};
use serde::Serialize;

/// One component row of the AV file header
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// 1-based position in the file
    pub index: usize,
    /// Identifier; 0 marks a dummy component
    pub id: ComponentId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub name: String,
}

impl Component {
    pub fn is_dummy(&self) -> bool {
        self.id == 0
    }
}

/// Layout of the AV tables, selected by the averaging flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TableMode {
    /// Flag `1`: one table per declared azimuth, headers `az el name`, PE fixed at 1.0
    #[default]
    PerAzimuth,
    /// Flag below `1`: headers `el name`, every AV row followed by a PE row
    AzimuthAveraged,
    /// Flag above `1`: headers `el name`, PE fixed at 1.0
    AveragedWithoutExposure,
}

impl TableMode {
    pub fn from_flag(flag: i32) -> Self {
        match flag {
            1 => TableMode::PerAzimuth,
            f if f < 1 => TableMode::AzimuthAveraged,
            _ => TableMode::AveragedWithoutExposure,
        }
    }

    /// Table headers carry their own azimuth
    pub fn has_azimuth_headers(self) -> bool {
        self == TableMode::PerAzimuth
    }

    pub fn has_exposure_rows(self) -> bool {
        self == TableMode::AzimuthAveraged
    }
}

/// Extent of each table dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableShape {
    pub tables: usize,
    pub azimuths: usize,
    pub elevations: usize,
    pub masses: usize,
    pub velocities: usize,
}

impl TableShape {
    pub fn cell_count(&self) -> usize {
        self.tables * self.azimuths * self.elevations * self.masses * self.velocities
    }
}

/// 0-based cell address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableIndex {
    pub table: usize,
    pub azimuth: usize,
    pub elevation: usize,
    pub mass: usize,
    pub velocity: usize,
}

impl TableIndex {
    pub fn new(table: usize, azimuth: usize, elevation: usize, mass: usize, velocity: usize) -> Self {
        Self {
            table,
            azimuth,
            elevation,
            mass,
            velocity,
        }
    }
}

/// AV and PE values over table × azimuth × elevation × mass × velocity.
///
/// Values live in two contiguous buffers laid out in file order (table,
/// elevation, azimuth, mass, velocity) and grow as rows are decoded. Cells
/// the file never supplies (the extra azimuths of a polar elevation) read
/// as 0.0.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VulnerableAreaTables {
    pub azimuths: Vec<f64>,
    pub elevations: Vec<f64>,
    pub masses: Vec<f64>,
    pub velocities: Vec<f64>,
    tables: usize,
    av: Vec<f64>,
    pe: Vec<f64>,
    names: Vec<String>,
    velocity_cutoffs: Vec<Option<String>>,
}

impl VulnerableAreaTables {
    /// `None` when the declared dimensions have more cells than can be addressed
    pub fn new(
        tables: usize,
        azimuths: Vec<f64>,
        elevations: Vec<f64>,
        velocities: Vec<f64>,
        masses: Vec<f64>,
    ) -> Option<Self> {
        tables
            .checked_mul(azimuths.len())?
            .checked_mul(elevations.len())?
            .checked_mul(masses.len())?
            .checked_mul(velocities.len())?;
        Some(Self {
            tables,
            azimuths,
            elevations,
            masses,
            velocities,
            ..Self::default()
        })
    }

    pub fn shape(&self) -> TableShape {
        TableShape {
            tables: self.tables,
            azimuths: self.azimuths.len(),
            elevations: self.elevations.len(),
            masses: self.masses.len(),
            velocities: self.velocities.len(),
        }
    }

    pub fn av(&self, index: TableIndex) -> Option<f64> {
        self.cell_offset(index)
            .map(|offset| self.av.get(offset).copied().unwrap_or(0.0))
    }

    pub fn pe(&self, index: TableIndex) -> Option<f64> {
        self.cell_offset(index)
            .map(|offset| self.pe.get(offset).copied().unwrap_or(0.0))
    }

    /// Table name from the header line, empty for rows a polar elevation skipped
    pub fn name(&self, table: usize, azimuth: usize, elevation: usize) -> Option<&str> {
        self.header_offset(table, azimuth, elevation)
            .map(|offset| self.names.get(offset).map_or("", String::as_str))
    }

    /// Trailing velocity-cutoff token of an AV row, if the row had one
    pub fn velocity_cutoff(&self, table: usize, azimuth: usize, elevation: usize, mass: usize) -> Option<&str> {
        let offset = self.row_offset(table, azimuth, elevation, mass)?;
        self.velocity_cutoffs.get(offset)?.as_deref()
    }

    pub(crate) fn set_cell(&mut self, index: TableIndex, av: f64, pe: f64) {
        if let Some(offset) = self.cell_offset(index) {
            if offset >= self.av.len() {
                self.av.resize(offset + 1, 0.0);
                self.pe.resize(offset + 1, 0.0);
            }
            self.av[offset] = av;
            self.pe[offset] = pe;
        }
    }

    pub(crate) fn set_name(&mut self, table: usize, azimuth: usize, elevation: usize, name: &str) {
        if let Some(offset) = self.header_offset(table, azimuth, elevation) {
            if offset >= self.names.len() {
                self.names.resize(offset + 1, String::new());
            }
            self.names[offset] = name.to_string();
        }
    }

    pub(crate) fn set_velocity_cutoff(
        &mut self,
        table: usize,
        azimuth: usize,
        elevation: usize,
        mass: usize,
        cutoff: &str,
    ) {
        if let Some(offset) = self.row_offset(table, azimuth, elevation, mass) {
            if offset >= self.velocity_cutoffs.len() {
                self.velocity_cutoffs.resize(offset + 1, None);
            }
            self.velocity_cutoffs[offset] = Some(cutoff.to_string());
        }
    }

    fn header_offset(&self, table: usize, azimuth: usize, elevation: usize) -> Option<usize> {
        let shape = self.shape();
        if table >= shape.tables || azimuth >= shape.azimuths || elevation >= shape.elevations {
            return None;
        }
        Some((table * shape.elevations + elevation) * shape.azimuths + azimuth)
    }

    fn row_offset(&self, table: usize, azimuth: usize, elevation: usize, mass: usize) -> Option<usize> {
        if mass >= self.masses.len() {
            return None;
        }
        self.header_offset(table, azimuth, elevation)
            .map(|header| header * self.masses.len() + mass)
    }

    fn cell_offset(&self, index: TableIndex) -> Option<usize> {
        if index.velocity >= self.velocities.len() {
            return None;
        }
        self.row_offset(index.table, index.azimuth, index.elevation, index.mass)
            .map(|row| row * self.velocities.len() + index.velocity)
    }
}

/// Everything decoded from an AV file
#[derive(Debug, Clone, Default, Serialize)]
pub struct AvData {
    pub metric: i32,
    pub reference_location: [f64; 3],
    pub components: Vec<Component>,
    /// Ids of every non-dummy component
    pub fragmentation_ids: IdSet,
    /// Mean x/y of the non-dummy components, taken over the table count
    pub average_location: (f64, f64),
    pub mode: TableMode,
    pub tables: VulnerableAreaTables,
}

impl AvData {
    /// Component by 1-based file position
    pub fn component(&self, index: usize) -> Option<&Component> {
        index.checked_sub(1).and_then(|i| self.components.get(i))
    }
}
