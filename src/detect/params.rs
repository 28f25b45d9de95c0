//! Per-class tuning parameters.

use crate::class::ObjectClass;
use crate::util::math::in_open_unit;
use crate::util::{ObjLocError, ObjLocResult};

/// Thresholds used by one class's filtering and scoring stages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassParams {
    /// Lowe ratio threshold in `(0, 1)`.
    pub ratio_threshold: f32,
    /// Radius around the crude centroid, in pixels.
    pub center_radius: f64,
    /// Radius used when counting neighbors, in pixels.
    pub neighbor_radius: f64,
    /// A point is kept when its neighbor count (self included) exceeds this.
    pub min_neighbors: usize,
    /// Minimum points per 100x100 px of tight box area.
    pub min_density: f64,
    /// Minimum number of points in the final cluster.
    pub min_points: usize,
    /// Fraction of the box dimension added to each side.
    pub box_expansion: f64,
}

impl ClassParams {
    /// Defaults tuned for each object.
    pub const fn for_class(class: ObjectClass) -> Self {
        let (min_density, min_points) = match class {
            ObjectClass::SugarBox => (5.0, 30),
            ObjectClass::MustardBottle => (5.0, 25),
            ObjectClass::PowerDrill => (4.0, 30),
        };
        Self {
            ratio_threshold: 0.85,
            center_radius: 160.0,
            neighbor_radius: 50.0,
            min_neighbors: 20,
            min_density,
            min_points,
            box_expansion: 0.05,
        }
    }

    /// Checks every field; returns the params unchanged when valid.
    pub fn validate(self) -> ObjLocResult<Self> {
        if !in_open_unit(self.ratio_threshold) {
            return Err(ObjLocError::InvalidParameter {
                name: "ratio_threshold",
                reason: "must be in (0, 1)",
            });
        }
        if !self.center_radius.is_finite() || self.center_radius < 0.0 {
            return Err(ObjLocError::InvalidParameter {
                name: "center_radius",
                reason: "must be finite and >= 0",
            });
        }
        if !self.neighbor_radius.is_finite() || self.neighbor_radius < 0.0 {
            return Err(ObjLocError::InvalidParameter {
                name: "neighbor_radius",
                reason: "must be finite and >= 0",
            });
        }
        if !self.min_density.is_finite() || self.min_density < 0.0 {
            return Err(ObjLocError::InvalidParameter {
                name: "min_density",
                reason: "must be finite and >= 0",
            });
        }
        if !self.box_expansion.is_finite() || self.box_expansion < 0.0 {
            return Err(ObjLocError::InvalidParameter {
                name: "box_expansion",
                reason: "must be finite and >= 0",
            });
        }
        Ok(self)
    }
}

/// Parameters for every class, indexed by [`ObjectClass::index`].
#[derive(Clone, Debug, PartialEq)]
pub struct ParamTable {
    params: [ClassParams; 3],
}

impl Default for ParamTable {
    fn default() -> Self {
        Self {
            params: ObjectClass::ALL.map(ClassParams::for_class),
        }
    }
}

impl ParamTable {
    pub fn get(&self, class: ObjectClass) -> &ClassParams {
        &self.params[class.index()]
    }

    /// Replaces one class's parameters after validating them.
    pub fn set(&mut self, class: ObjectClass, params: ClassParams) -> ObjLocResult<()> {
        self.params[class.index()] = params.validate()?;
        Ok(())
    }

    /// Validates every entry.
    pub fn validate(&self) -> ObjLocResult<()> {
        for p in &self.params {
            p.validate()?;
        }
        Ok(())
    }
}

/// Largest accepted [`PipelineConfig::max_points`].
pub const MAX_POINT_CAP: usize = 20_000;

/// Largest accepted [`PipelineConfig::knn`].
pub const MAX_KNN: usize = 32;

/// Settings shared by every class.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Cap on distinct scene points entering the neighbor filter, in
    /// `1..=MAX_POINT_CAP`.
    pub max_points: usize,
    /// Neighbors requested per reference descriptor, in `2..=MAX_KNN`.
    pub knn: usize,
    /// Clip accepted boxes to the scene image.
    pub clamp_to_scene: bool,
    pub params: ParamTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_points: 2000,
            knn: 2,
            clamp_to_scene: true,
            params: ParamTable::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> ObjLocResult<()> {
        if self.max_points == 0 || self.max_points > MAX_POINT_CAP {
            return Err(ObjLocError::InvalidParameter {
                name: "max_points",
                reason: "must be in 1..=20000",
            });
        }
        if self.knn < 2 {
            return Err(ObjLocError::InvalidParameter {
                name: "knn",
                reason: "ratio test needs at least 2 neighbors",
            });
        }
        if self.knn > MAX_KNN {
            return Err(ObjLocError::InvalidParameter {
                name: "knn",
                reason: "must be at most 32",
            });
        }
        self.params.validate()
    }
}
