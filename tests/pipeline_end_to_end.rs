//! End-to-end detection on a synthetic scene described by a JSON fixture.
//!
//! Feature extraction is replaced by a lookup keyed on image width, so the
//! test controls exactly which scene keypoints each reference view matches.

use objloc::label::{append_label, truncate, write_labels};
use objloc::{
    BoundingBox, BruteForceMatcher, Descriptors, Evaluation, FeatureExtractor, FeatureSet,
    ImageView, Keypoint, Label, LabelSet, ObjLocResult, ObjectClass, Outcome, PipelineConfig,
    Point2i, SceneDetector, Stage,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SceneSize {
    width: usize,
    height: usize,
}

#[derive(Debug, Deserialize)]
struct ObjectCase {
    class: String,
    origin: [i32; 2],
    grid: [usize; 2],
    step: i32,
    truth: [i32; 4],
    expected_box: Option<[i32; 4]>,
}

#[derive(Debug, Deserialize)]
struct Outliers {
    class: String,
    points: Vec<[i32; 2]>,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    scene: SceneSize,
    objects: Vec<ObjectCase>,
    outliers: Outliers,
}

fn load_fixture() -> Fixture {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/scene_clusters.json");
    let text = fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn class_of(token: &str) -> ObjectClass {
    ObjectClass::from_label_id(token).unwrap()
}

fn bbox(c: [i32; 4]) -> BoundingBox {
    BoundingBox::new(Point2i::new(c[0], c[1]), Point2i::new(c[2], c[3])).unwrap()
}

/// Returns a prepared feature set for each image width.
struct LookupExtractor {
    by_width: HashMap<usize, FeatureSet>,
}

impl FeatureExtractor for LookupExtractor {
    fn extract(&self, image: ImageView<'_, u8>) -> ObjLocResult<FeatureSet> {
        Ok(self
            .by_width
            .get(&image.width())
            .cloned()
            .unwrap_or_else(|| FeatureSet::new(Vec::new(), Descriptors::empty(2)).unwrap()))
    }
}

/// Reference view widths: one per class plus one for the outlier view.
fn view_width(class: ObjectClass) -> usize {
    10 + class.index()
}
const OUTLIER_VIEW_WIDTH: usize = 20;

struct Scenario {
    extractor: LookupExtractor,
    views: HashMap<ObjectClass, Vec<usize>>,
}

fn build_scenario(fixture: &Fixture) -> Scenario {
    let mut scene_kps = Vec::new();
    let mut scene_rows = Vec::new();
    let mut by_width = HashMap::new();
    let mut views: HashMap<ObjectClass, Vec<usize>> = HashMap::new();
    let mut next_id = 0.0f32;

    for case in &fixture.objects {
        let class = class_of(&case.class);
        let mut ref_rows = Vec::new();
        for gy in 0..case.grid[1] {
            for gx in 0..case.grid[0] {
                let x = case.origin[0] + gx as i32 * case.step;
                let y = case.origin[1] + gy as i32 * case.step;
                scene_kps.push(Keypoint::at(x as f32, y as f32));
                scene_rows.push([next_id, 0.0]);
                ref_rows.push([next_id, 0.0]);
                next_id += 1.0;
            }
        }
        let kps = vec![Keypoint::at(0.0, 0.0); ref_rows.len()];
        let set = FeatureSet::new(kps, Descriptors::from_rows(&ref_rows, 2).unwrap()).unwrap();
        by_width.insert(view_width(class), set);
        views.entry(class).or_default().push(view_width(class));
    }

    let mut outlier_rows = Vec::new();
    for p in &fixture.outliers.points {
        scene_kps.push(Keypoint::at(p[0] as f32, p[1] as f32));
        scene_rows.push([next_id, 0.0]);
        outlier_rows.push([next_id, 0.0]);
        next_id += 1.0;
    }
    let kps = vec![Keypoint::at(0.0, 0.0); outlier_rows.len()];
    let set = FeatureSet::new(kps, Descriptors::from_rows(&outlier_rows, 2).unwrap()).unwrap();
    by_width.insert(OUTLIER_VIEW_WIDTH, set);
    views
        .entry(class_of(&fixture.outliers.class))
        .or_default()
        .push(OUTLIER_VIEW_WIDTH);

    let scene = FeatureSet::new(scene_kps, Descriptors::from_rows(&scene_rows, 2).unwrap()).unwrap();
    by_width.insert(fixture.scene.width, scene);

    Scenario {
        extractor: LookupExtractor { by_width },
        views,
    }
}

#[test]
fn synthetic_scene_detects_dense_objects_and_scores_them() {
    let fixture = load_fixture();
    let scenario = build_scenario(&fixture);
    let detector = SceneDetector::new(
        scenario.extractor,
        BruteForceMatcher::new(),
        PipelineConfig::default(),
    )
    .unwrap();

    let scene_pixels = vec![0u8; fixture.scene.width * fixture.scene.height];
    let scene_view =
        ImageView::from_slice(&scene_pixels, fixture.scene.width, fixture.scene.height).unwrap();
    let scene = detector.extract_scene(scene_view).unwrap();

    let blank = vec![0u8; OUTLIER_VIEW_WIDTH];
    let mut refs = Vec::new();
    for class in ObjectClass::ALL {
        let images: Vec<ImageView<'_, u8>> = scenario.views[&class]
            .iter()
            .map(|&w| ImageView::from_slice(&blank[..w], w, 1).unwrap())
            .collect();
        refs.push(detector.extract_references(class, &images).unwrap());
    }
    assert_eq!(refs[0].views().len(), 2);

    let size = (fixture.scene.width, fixture.scene.height);
    let outcomes = detector.detect_all(&refs, &scene, size).unwrap();
    assert_eq!(outcomes.len(), 3);

    for (outcome, case) in outcomes.iter().zip(&fixture.objects) {
        assert_eq!(outcome.class(), class_of(&case.class));
        match (outcome, case.expected_box) {
            (Outcome::Detected(det), Some(expected)) => {
                assert_eq!(det.bbox, bbox(expected));
                assert_eq!(det.points.len(), case.grid[0] * case.grid[1]);
                assert!(!det.points.iter().any(|p| p.x == 600 || p.x == 20));
            }
            (Outcome::NotDetected { stage, .. }, None) => assert_eq!(*stage, Stage::Neighbors),
            (other, expected) => panic!("unexpected outcome {other:?} for {expected:?}"),
        }
    }

    let dir = std::env::temp_dir().join(format!("objloc-e2e-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let pred_path = dir.join("output_label.txt");
    let truth_path = dir.join("truth.txt");

    let truth: LabelSet = fixture
        .objects
        .iter()
        .map(|c| Label::new(class_of(&c.class), bbox(c.truth)))
        .collect();
    write_labels(&truth_path, &truth).unwrap();

    fs::write(&pred_path, "stale contents\n").unwrap();
    truncate(&pred_path).unwrap();
    for det in outcomes.iter().filter_map(Outcome::detection) {
        append_label(&pred_path, &Label::new(det.class, det.bbox)).unwrap();
    }

    let report = Evaluation::from_files(&pred_path, &truth_path)
        .unwrap()
        .score()
        .report();
    assert!(report.get(ObjectClass::SugarBox).is_true_positive());
    assert!(report.get(ObjectClass::MustardBottle).is_true_positive());
    assert_eq!(report.get(ObjectClass::PowerDrill).iou, Some(0.0));
    assert_eq!(report.true_positives(), 2);

    let expected_mean = (1564.0 / 1900.0 + 1053.0 / 1230.0) / 3.0;
    let mean = report.mean_iou().unwrap();
    assert!((mean - expected_mean).abs() < 1e-12, "mIoU {mean}");

    fs::remove_dir_all(dir).ok();
}
