use serde::Serialize;

/// PK grid over range (rows) and deflection (columns)
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatrixGrid {
    /// Lower-cased kill identifier the matrix was computed for
    pub kill_id: String,
    pub range_cells: usize,
    pub deflection_cells: usize,
    /// (range, deflection) offset of the grid origin
    pub offset: (f64, f64),
    pub range_gridlines: Vec<f64>,
    pub deflection_gridlines: Vec<f64>,
    /// Row-major, `range_cells * deflection_cells` values
    pub pks: Vec<f64>,
}

impl MatrixGrid {
    pub fn pk(&self, range: usize, deflection: usize) -> Option<f64> {
        if range >= self.range_cells || deflection >= self.deflection_cells {
            return None;
        }
        self.pks.get(range * self.deflection_cells + deflection).copied()
    }

    pub fn row(&self, range: usize) -> Option<&[f64]> {
        if range >= self.range_cells {
            return None;
        }
        let start = range * self.deflection_cells;
        self.pks.get(start..start + self.deflection_cells)
    }

    pub fn max_pk(&self) -> Option<f64> {
        self.pks.iter().copied().reduce(f64::max)
    }
}
