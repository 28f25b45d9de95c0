//! Scene-side point extraction.

use std::collections::HashMap;

use crate::features::Keypoint;
use crate::geometry::Point2i;
use crate::matching::Correspondence;
use crate::trace::trace_warn;
use crate::util::{ObjLocError, ObjLocResult};

/// Rounds the scene keypoint of every correspondence to a pixel and removes
/// duplicates, keeping first-seen order.
///
/// When more than `max_points` distinct pixels survive, only the
/// `max_points` with the smallest best match distance are kept (ties go to
/// the earlier point), still in first-seen order. `max_points == 0` disables
/// the cap.
pub fn scene_points(
    matches: &[Correspondence],
    scene_keypoints: &[Keypoint],
    max_points: usize,
) -> ObjLocResult<Vec<Point2i>> {
    let mut order: Vec<(Point2i, f32)> = Vec::with_capacity(matches.len());
    let mut seen: HashMap<Point2i, usize> = HashMap::with_capacity(matches.len());

    for m in matches {
        let kp = scene_keypoints
            .get(m.scene_idx)
            .ok_or(ObjLocError::InvalidInput(
                "correspondence refers to a missing scene keypoint",
            ))?;
        let p = Point2i::from_subpixel(kp.x, kp.y);
        match seen.get(&p) {
            Some(&slot) => {
                let best = &mut order[slot].1;
                if m.distance < *best {
                    *best = m.distance;
                }
            }
            None => {
                seen.insert(p, order.len());
                order.push((p, m.distance));
            }
        }
    }

    if max_points == 0 || order.len() <= max_points {
        return Ok(order.into_iter().map(|(p, _)| p).collect());
    }

    trace_warn!(
        "point_cap",
        points = order.len(),
        max_points = max_points
    );
    let mut ranked: Vec<usize> = (0..order.len()).collect();
    ranked.sort_by(|&a, &b| order[a].1.total_cmp(&order[b].1).then(a.cmp(&b)));
    let mut keep = vec![false; order.len()];
    for &idx in &ranked[..max_points] {
        keep[idx] = true;
    }
    Ok(order
        .into_iter()
        .zip(keep)
        .filter_map(|((p, _), k)| k.then_some(p))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::scene_points;
    use crate::features::Keypoint;
    use crate::geometry::Point2i;
    use crate::matching::Correspondence;

    fn corr(scene_idx: usize, distance: f32) -> Correspondence {
        Correspondence {
            reference_idx: 0,
            scene_idx,
            distance,
        }
    }

    #[test]
    fn rounds_and_deduplicates() {
        let kps = [
            Keypoint::at(10.4, 20.6),
            Keypoint::at(9.6, 21.2),
            Keypoint::at(30.0, 40.0),
        ];
        let pts = scene_points(&[corr(2, 1.0), corr(0, 1.0), corr(1, 1.0)], &kps, 0).unwrap();
        assert_eq!(pts, vec![Point2i::new(30, 40), Point2i::new(10, 21)]);
    }

    #[test]
    fn cap_keeps_best_matches_in_order() {
        let kps: Vec<Keypoint> = (0..4).map(|i| Keypoint::at(i as f32 * 10.0, 0.0)).collect();
        let matches = [corr(0, 4.0), corr(1, 1.0), corr(2, 3.0), corr(3, 2.0)];
        let pts = scene_points(&matches, &kps, 2).unwrap();
        assert_eq!(pts, vec![Point2i::new(10, 0), Point2i::new(30, 0)]);
    }

    #[test]
    fn missing_keypoint_is_an_error() {
        assert!(scene_points(&[corr(5, 1.0)], &[Keypoint::at(0.0, 0.0)], 0).is_err());
    }
}
