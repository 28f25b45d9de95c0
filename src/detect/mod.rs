//! Localization of one object class from its raw matches.
//!
//! [`locate`] runs the filter chain on the correspondences of a single
//! class: ratio test, scene-point extraction, distance to the crude
//! centroid, neighbor density, then box fitting and density gating.
//! An empty set at any stage ends the run with [`Outcome::NotDetected`]
//! naming the stage; only malformed input is an error.
//!
//! [`SceneDetector`] wraps this with feature extraction and matching
//! against a bank of reference views.

mod params;
mod scene;
mod score;

pub use params::{ClassParams, ParamTable, PipelineConfig, MAX_KNN, MAX_POINT_CAP};
pub use scene::{ReferenceSet, SceneDetector};
pub use score::{density, Score, DENSITY_SCALE};

use std::fmt;

use crate::class::ObjectClass;
use crate::features::Keypoint;
use crate::filter::{neighbor_filter, radius_filter, ratio_filter, scene_points};
use crate::geometry::{centroid, BoundingBox, Point2f, Point2i};
use crate::matching::KnnMatch;
use crate::trace::{trace_event, trace_span};
use crate::util::ObjLocResult;

/// Pipeline stage at which a class was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// No correspondence passed the ratio test.
    Ratio,
    /// No point lies within the center radius.
    CenterRadius,
    /// No point has enough neighbors.
    Neighbors,
    /// The cluster is too sparse or too small.
    Score,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Ratio => "ratio test",
            Stage::CenterRadius => "center radius",
            Stage::Neighbors => "neighbor density",
            Stage::Score => "density score",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An accepted localization.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub class: ObjectClass,
    /// Expanded box written to the label file.
    pub bbox: BoundingBox,
    /// Tight box around the final points, used for the density score.
    pub tight: BoundingBox,
    /// Centroid of the final points.
    pub centroid: Point2f,
    /// Final point cluster.
    pub points: Vec<Point2i>,
    pub score: Score,
}

impl Detection {
    /// Same detection with the label box clipped to the scene.
    pub fn clamped_to(mut self, width: usize, height: usize) -> Self {
        self.bbox = self.bbox.clamp_to(width, height);
        self
    }
}

/// Result of locating one class.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Detected(Detection),
    NotDetected {
        class: ObjectClass,
        stage: Stage,
        /// Score of the rejected cluster, when one was formed.
        score: Option<Score>,
    },
}

impl Outcome {
    pub fn class(&self) -> ObjectClass {
        match self {
            Outcome::Detected(d) => d.class,
            Outcome::NotDetected { class, .. } => *class,
        }
    }

    pub fn detection(&self) -> Option<&Detection> {
        match self {
            Outcome::Detected(d) => Some(d),
            Outcome::NotDetected { .. } => None,
        }
    }

    pub fn into_detection(self) -> Option<Detection> {
        match self {
            Outcome::Detected(d) => Some(d),
            Outcome::NotDetected { .. } => None,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, Outcome::Detected(_))
    }
}

fn rejected(class: ObjectClass, stage: Stage) -> Outcome {
    trace_event!("not_detected", class = class.label_id(), stage = stage.as_str());
    Outcome::NotDetected {
        class,
        stage,
        score: None,
    }
}

/// Localizes `class` from its k-NN matches against the scene keypoints.
///
/// `max_points` caps the distinct scene points entering the neighbor
/// filter (0 disables the cap here; [`PipelineConfig::validate`] rejects it). The returned box is not clipped; see
/// [`Detection::clamped_to`].
pub fn locate(
    class: ObjectClass,
    matches: &[KnnMatch],
    scene_keypoints: &[Keypoint],
    params: &ClassParams,
    max_points: usize,
) -> ObjLocResult<Outcome> {
    let _span = trace_span!("locate", class = class.label_id(), matches = matches.len()).entered();

    let good = ratio_filter(matches, params.ratio_threshold);
    trace_event!("ratio_filter", kept = good.len());
    let points = scene_points(&good, scene_keypoints, max_points)?;

    let Some(crude) = centroid(&points) else {
        return Ok(rejected(class, Stage::Ratio));
    };
    let near = radius_filter(&points, crude, params.center_radius);
    trace_event!("radius_filter", input = points.len(), kept = near.len());
    let Some(refined) = centroid(&near) else {
        return Ok(rejected(class, Stage::CenterRadius));
    };
    trace_event!("refined_centroid", x = refined.x, y = refined.y);

    let dense = neighbor_filter(&near, params.neighbor_radius, params.min_neighbors);
    let (Some(center), Some(tight)) = (centroid(&dense), BoundingBox::from_points(&dense)) else {
        return Ok(rejected(class, Stage::Neighbors));
    };

    let score = Score::new(dense.len(), &tight);
    trace_event!(
        "score",
        class = class.label_id(),
        density = score.density,
        count = score.count
    );
    if !score.passes(params.min_density, params.min_points) {
        trace_event!("not_detected", class = class.label_id(), stage = Stage::Score.as_str());
        return Ok(Outcome::NotDetected {
            class,
            stage: Stage::Score,
            score: Some(score),
        });
    }

    Ok(Outcome::Detected(Detection {
        class,
        bbox: tight.expand(params.box_expansion),
        tight,
        centroid: center,
        points: dense,
        score,
    }))
}

#[cfg(test)]
mod tests {
    use super::{locate, ClassParams, Outcome, Stage};
    use crate::class::ObjectClass;
    use crate::features::Keypoint;
    use crate::geometry::Point2i;
    use crate::matching::{Correspondence, KnnMatch};

    fn params() -> ClassParams {
        ClassParams {
            ratio_threshold: 0.8,
            center_radius: 100.0,
            neighbor_radius: 30.0,
            min_neighbors: 3,
            min_density: 1.0,
            min_points: 5,
            box_expansion: 0.1,
        }
    }

    fn matches_for(keypoints: &[Keypoint]) -> Vec<KnnMatch> {
        (0..keypoints.len())
            .map(|i| {
                KnnMatch::new(
                    0,
                    vec![
                        Correspondence {
                            reference_idx: i,
                            scene_idx: i,
                            distance: 1.0,
                        },
                        Correspondence {
                            reference_idx: i,
                            scene_idx: (i + 1) % keypoints.len(),
                            distance: 5.0,
                        },
                    ],
                )
            })
            .collect()
    }

    #[test]
    fn dense_cluster_is_detected() {
        let mut kps = Vec::new();
        for dy in 0..5 {
            for dx in 0..5 {
                kps.push(Keypoint::at(200.0 + dx as f32 * 5.0, 300.0 + dy as f32 * 5.0));
            }
        }
        kps.push(Keypoint::at(260.0, 300.0));
        let outcome = locate(ObjectClass::SugarBox, &matches_for(&kps), &kps, &params(), 0).unwrap();
        let det = outcome.detection().expect("detected");
        assert_eq!(det.points.len(), 25);
        assert_eq!(det.tight.min(), Point2i::new(200, 300));
        assert_eq!(det.tight.max(), Point2i::new(220, 320));
        assert_eq!(det.bbox.min(), Point2i::new(198, 298));
        assert_eq!(det.bbox.max(), Point2i::new(222, 322));
        assert_eq!(det.centroid.x, 210.0);
    }

    #[test]
    fn ambiguous_matches_stop_at_ratio_stage() {
        let kps = [Keypoint::at(1.0, 1.0), Keypoint::at(2.0, 2.0)];
        let matches = vec![KnnMatch::new(
            0,
            vec![
                Correspondence {
                    reference_idx: 0,
                    scene_idx: 0,
                    distance: 1.0,
                },
                Correspondence {
                    reference_idx: 0,
                    scene_idx: 1,
                    distance: 1.1,
                },
            ],
        )];
        let outcome = locate(ObjectClass::PowerDrill, &matches, &kps, &params(), 0).unwrap();
        assert_eq!(
            outcome,
            Outcome::NotDetected {
                class: ObjectClass::PowerDrill,
                stage: Stage::Ratio,
                score: None
            }
        );
    }

    #[test]
    fn sparse_points_stop_at_neighbor_stage() {
        let kps: Vec<Keypoint> = (0..6).map(|i| Keypoint::at(i as f32 * 40.0, 0.0)).collect();
        let outcome = locate(ObjectClass::MustardBottle, &matches_for(&kps), &kps, &params(), 0).unwrap();
        assert!(matches!(
            outcome,
            Outcome::NotDetected {
                stage: Stage::Neighbors,
                ..
            }
        ));
    }
}
