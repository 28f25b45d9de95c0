//! Scene-level detection against banks of reference views.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::class::ObjectClass;
use crate::detect::{locate, Outcome, PipelineConfig};
use crate::features::{FeatureExtractor, FeatureSet};
use crate::image::ImageView;
use crate::matching::{KnnMatch, KnnMatcher};
use crate::trace::{trace_event, trace_span};
use crate::util::{ObjLocError, ObjLocResult};

/// Extracted features of every reference view of one class.
#[derive(Clone, Debug)]
pub struct ReferenceSet {
    class: ObjectClass,
    views: Vec<FeatureSet>,
}

impl ReferenceSet {
    /// Fails with [`ObjLocError::EmptyReferenceSet`] when `views` is empty.
    pub fn new(class: ObjectClass, views: Vec<FeatureSet>) -> ObjLocResult<Self> {
        if views.is_empty() {
            return Err(ObjLocError::EmptyReferenceSet {
                class: class.label_id(),
            });
        }
        Ok(Self { class, views })
    }

    pub fn class(&self) -> ObjectClass {
        self.class
    }

    pub fn views(&self) -> &[FeatureSet] {
        &self.views
    }

    /// Total keypoints over all views.
    pub fn num_keypoints(&self) -> usize {
        self.views.iter().map(FeatureSet::len).sum()
    }
}

/// Runs extraction, matching and [`locate`] for each class.
pub struct SceneDetector<E, M> {
    extractor: E,
    matcher: M,
    config: PipelineConfig,
}

impl<E: FeatureExtractor, M: KnnMatcher> SceneDetector<E, M> {
    /// Validates `config` and builds a detector.
    pub fn new(extractor: E, matcher: M, config: PipelineConfig) -> ObjLocResult<Self> {
        config.validate()?;
        Ok(Self {
            extractor,
            matcher,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extracts features from the scene image.
    pub fn extract_scene(&self, image: ImageView<'_, u8>) -> ObjLocResult<FeatureSet> {
        let _span = trace_span!("extract_scene", width = image.width(), height = image.height()).entered();
        let features = self.extractor.extract(image)?;
        trace_event!("scene_features", keypoints = features.len());
        Ok(features)
    }

    /// Extracts features from every reference view of `class`.
    pub fn extract_references(
        &self,
        class: ObjectClass,
        views: &[ImageView<'_, u8>],
    ) -> ObjLocResult<ReferenceSet> {
        let _span = trace_span!("extract_references", class = class.label_id(), views = views.len()).entered();
        let sets = views
            .iter()
            .map(|&view| self.extractor.extract(view))
            .collect::<ObjLocResult<Vec<_>>>()?;
        let refs = ReferenceSet::new(class, sets)?;
        trace_event!("reference_features", class = class.label_id(), keypoints = refs.num_keypoints());
        Ok(refs)
    }

    /// k-NN matches of every reference descriptor against the scene, tagged
    /// with the view they came from.
    pub fn match_class(&self, refs: &ReferenceSet, scene: &FeatureSet) -> ObjLocResult<Vec<KnnMatch>> {
        let mut all = Vec::new();
        for (view_idx, view) in refs.views().iter().enumerate() {
            if view.is_empty() {
                continue;
            }
            let mut matches = self
                .matcher
                .knn_match(view.descriptors(), scene.descriptors(), self.config.knn)?;
            for m in &mut matches {
                m.view = view_idx;
            }
            all.append(&mut matches);
        }
        Ok(all)
    }

    /// Locates the class of `refs` in the scene.
    ///
    /// `scene_size` is the scene image's `(width, height)`, used to clip the
    /// label box when [`PipelineConfig::clamp_to_scene`] is set.
    pub fn detect_class(
        &self,
        refs: &ReferenceSet,
        scene: &FeatureSet,
        scene_size: (usize, usize),
    ) -> ObjLocResult<Outcome> {
        let class = refs.class();
        let matches = self.match_class(refs, scene)?;
        let params = self.config.params.get(class);
        let outcome = locate(class, &matches, scene.keypoints(), params, self.config.max_points)?;
        Ok(match outcome {
            Outcome::Detected(d) if self.config.clamp_to_scene => {
                Outcome::Detected(d.clamped_to(scene_size.0, scene_size.1))
            }
            other => other,
        })
    }

    /// Detects every class in order; outcomes follow the order of `refs`.
    pub fn detect_all(
        &self,
        refs: &[ReferenceSet],
        scene: &FeatureSet,
        scene_size: (usize, usize),
    ) -> ObjLocResult<Vec<Outcome>> {
        refs.iter()
            .map(|r| self.detect_class(r, scene, scene_size))
            .collect()
    }
}

#[cfg(feature = "rayon")]
impl<E, M> SceneDetector<E, M>
where
    E: FeatureExtractor + Sync,
    M: KnnMatcher + Sync,
{
    /// Parallel [`detect_all`](Self::detect_all); one task per class, same
    /// output order.
    pub fn detect_all_par(
        &self,
        refs: &[ReferenceSet],
        scene: &FeatureSet,
        scene_size: (usize, usize),
    ) -> ObjLocResult<Vec<Outcome>> {
        refs.par_iter()
            .map(|r| self.detect_class(r, scene, scene_size))
            .collect()
    }
}
