use serde::Serialize;

/// Horizontal extent and top of the target surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub max_z: f64,
}

impl Default for SurfaceBounds {
    fn default() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
            max_z: f64::NEG_INFINITY,
        }
    }
}

impl SurfaceBounds {
    pub fn include(&mut self, [x, y, z]: [f64; 3]) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
        self.max_z = self.max_z.max(z);
    }

    /// No vertex has been included yet
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SurfaceMesh {
    pub metric: f64,
    /// Four consecutive vertices per quad
    pub vertices: Vec<[f64; 3]>,
    pub names: Vec<String>,
    pub bounds: SurfaceBounds,
}

impl SurfaceMesh {
    pub fn quad_count(&self) -> usize {
        self.names.len()
    }

    pub fn quads(&self) -> impl Iterator<Item = (&str, &[[f64; 3]])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.vertices.chunks_exact(4))
    }
}
