use objloc::lowlevel::ratio_filter;
use objloc::{
    BruteForceMatcher, CornerConfig, CornerExtractor, Descriptors, FeatureExtractor, ImageView,
    KnnMatcher, Point2i,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Zero background with a block of random 4x4 cells at `(x0, y0)`.
fn textured_canvas(width: usize, height: usize, x0: usize, y0: usize, cells: &[u8]) -> Vec<u8> {
    let side = 16;
    let mut data = vec![0u8; width * height];
    for cy in 0..side {
        for cx in 0..side {
            let value = cells[cy * side + cx];
            for y in 0..4 {
                for x in 0..4 {
                    data[(y0 + cy * 4 + y) * width + x0 + cx * 4 + x] = value;
                }
            }
        }
    }
    data
}

#[test]
fn brute_force_agrees_with_naive_search() {
    let mut rng = StdRng::seed_from_u64(1);
    let dim = 16;
    let rows = |rng: &mut StdRng, n: usize| -> Descriptors {
        let data = (0..n * dim).map(|_| rng.random_range(0.0f32..1.0)).collect();
        Descriptors::new(data, dim).unwrap()
    };
    let query = rows(&mut rng, 40);
    let train = rows(&mut rng, 90);
    let matches = BruteForceMatcher::new().knn_match(&query, &train, 2).unwrap();

    for (qi, m) in matches.iter().enumerate() {
        let q = query.row(qi).unwrap();
        let mut dists: Vec<(f32, usize)> = train
            .rows()
            .enumerate()
            .map(|(ti, t)| {
                let d: f32 = q.iter().zip(t).map(|(a, b)| (a - b) * (a - b)).sum();
                (d.sqrt(), ti)
            })
            .collect();
        dists.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let (best, second) = m.best_pair().unwrap();
        assert_eq!(best.reference_idx, qi);
        assert_eq!(best.scene_idx, dists[0].1);
        assert_eq!(second.scene_idx, dists[1].1);
        assert!((best.distance - dists[0].0).abs() < 1e-4);
    }
}

#[test]
fn corner_features_match_across_a_translation() {
    let mut rng = StdRng::seed_from_u64(2024);
    let cells: Vec<u8> = (0..256).map(|_| rng.random_range(0..=255u8)).collect();
    let reference = textured_canvas(96, 96, 16, 16, &cells);
    let (dx, dy) = (7, 5);
    let scene = textured_canvas(128, 128, 16 + dx, 16 + dy, &cells);

    let extractor = CornerExtractor::new(CornerConfig {
        max_levels: 1,
        ..CornerConfig::default()
    })
    .unwrap();
    let ref_features = extractor
        .extract(ImageView::from_slice(&reference, 96, 96).unwrap())
        .unwrap();
    let scene_features = extractor
        .extract(ImageView::from_slice(&scene, 128, 128).unwrap())
        .unwrap();
    assert!(!ref_features.is_empty());

    let matches = BruteForceMatcher::new()
        .knn_match(ref_features.descriptors(), scene_features.descriptors(), 2)
        .unwrap();
    let good = ratio_filter(&matches, 0.85);
    assert!(good.len() >= 10, "only {} matches survived", good.len());

    let consistent = good
        .iter()
        .filter(|c| {
            let r = ref_features.keypoints()[c.reference_idx];
            let s = scene_features.keypoints()[c.scene_idx];
            Point2i::from_subpixel(s.x - r.x, s.y - r.y) == Point2i::new(dx as i32, dy as i32)
        })
        .count();
    assert!(consistent * 10 >= good.len() * 9, "{consistent} of {}", good.len());
}
