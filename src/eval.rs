//! IoU evaluation of predicted labels against ground truth.
//!
//! Evaluation is a chain of states, each produced from the previous one:
//! [`Evaluation`] (file paths) → [`Parsed`] (both label sets) → [`Scored`]
//! (IoU per class) → [`Report`] (true-positive verdicts and mean IoU).
//!
//! A class missing from the ground truth is excluded from the mean. A class
//! present in the ground truth but not predicted scores 0.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::class::ObjectClass;
use crate::label::LabelSet;
use crate::trace::trace_event;
use crate::util::{ObjLocError, ObjLocResult};

/// IoU strictly above this counts as a true positive.
pub const TRUE_POSITIVE_IOU: f64 = 0.5;

/// Paths of a prediction/ground-truth pair, not yet read.
#[derive(Clone, Debug)]
pub struct Evaluation {
    predicted: PathBuf,
    truth: PathBuf,
}

impl Evaluation {
    pub fn new(predicted: impl Into<PathBuf>, truth: impl Into<PathBuf>) -> Self {
        Self {
            predicted: predicted.into(),
            truth: truth.into(),
        }
    }

    /// Reads and parses both files.
    pub fn parse(self) -> ObjLocResult<Parsed> {
        let predicted = LabelSet::read(&self.predicted)?;
        let truth = LabelSet::read(&self.truth)?;
        Ok(Parsed::from_label_sets(predicted, truth))
    }

    /// Shorthand for `Evaluation::new(..).parse()`.
    pub fn from_files(predicted: impl AsRef<Path>, truth: impl AsRef<Path>) -> ObjLocResult<Parsed> {
        Self::new(predicted.as_ref(), truth.as_ref()).parse()
    }
}

/// Both label sets in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct Parsed {
    predicted: LabelSet,
    truth: LabelSet,
}

impl Parsed {
    pub fn from_label_sets(predicted: LabelSet, truth: LabelSet) -> Self {
        Self { predicted, truth }
    }

    pub fn predicted(&self) -> &LabelSet {
        &self.predicted
    }

    pub fn truth(&self) -> &LabelSet {
        &self.truth
    }

    /// Computes the IoU of every class.
    pub fn score(self) -> Scored {
        let results = ObjectClass::ALL.map(|class| {
            let iou = self.truth.get(class).map(|gt| {
                self.predicted
                    .get(class)
                    .map_or(0.0, |pred| pred.iou(&gt))
            });
            IouResult { class, iou }
        });
        Scored { results }
    }
}

/// IoU of one class; `None` when the class is absent from ground truth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IouResult {
    pub class: ObjectClass,
    pub iou: Option<f64>,
}

impl IouResult {
    pub fn is_missing(&self) -> bool {
        self.iou.is_none()
    }

    pub fn is_true_positive(&self) -> bool {
        self.iou.is_some_and(|iou| iou > TRUE_POSITIVE_IOU)
    }
}

/// IoU per class in [`ObjectClass::ALL`] order.
#[derive(Clone, Debug, PartialEq)]
pub struct Scored {
    results: [IouResult; 3],
}

impl Scored {
    pub fn results(&self) -> &[IouResult] {
        &self.results
    }

    pub fn report(self) -> Report {
        let report = Report {
            results: self.results,
        };
        trace_event!(
            "evaluation",
            scored = report.scored().count(),
            true_positives = report.true_positives()
        );
        report
    }
}

/// Final evaluation, rendered as the metrics block.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    results: [IouResult; 3],
}

impl Report {
    pub fn results(&self) -> &[IouResult] {
        &self.results
    }

    /// Results of classes present in ground truth.
    pub fn scored(&self) -> impl Iterator<Item = &IouResult> {
        self.results.iter().filter(|r| !r.is_missing())
    }

    pub fn get(&self, class: ObjectClass) -> &IouResult {
        &self.results[class.index()]
    }

    pub fn true_positives(&self) -> usize {
        self.scored().filter(|r| r.is_true_positive()).count()
    }

    /// Mean IoU over non-missing classes; `None` when all are missing.
    pub fn mean_iou(&self) -> Option<f64> {
        let ious: Vec<f64> = self.scored().filter_map(|r| r.iou).collect();
        if ious.is_empty() {
            return None;
        }
        Some(ious.iter().sum::<f64>() / ious.len() as f64)
    }

    /// Appends the metrics block to `path`, creating it if needed.
    pub fn append_to<P: AsRef<Path>>(&self, path: P) -> ObjLocResult<()> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ObjLocError::io(path, e))?;
        write!(file, "{self}").map_err(|e| ObjLocError::io(path, e))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy:")?;
        for r in self.scored() {
            let verdict = if r.is_true_positive() {
                "is true positive"
            } else {
                "is NOT a true positive"
            };
            writeln!(
                f,
                "IoU of {} = {:.4} {verdict}",
                r.class.display_name(),
                r.iou.unwrap_or(0.0)
            )?;
        }
        writeln!(f)
    }
}
