//! Label files: one `<class_token> <xmin> <ymin> <xmax> <ymax>` line per
//! object.
//!
//! Predicted and ground-truth labels share the format. Lines whose first
//! token is not a known class are ignored, as are blank lines. A known class
//! with malformed coordinates is an error. When a class appears more than
//! once the last line wins.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::class::ObjectClass;
use crate::geometry::{BoundingBox, Point2i};
use crate::util::{ObjLocError, ObjLocResult};

/// A class and its box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Label {
    pub class: ObjectClass,
    pub bbox: BoundingBox,
}

impl Label {
    pub fn new(class: ObjectClass, bbox: BoundingBox) -> Self {
        Self { class, bbox }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (min, max) = (self.bbox.min(), self.bbox.max());
        write!(f, "{} {} {} {} {}", self.class, min.x, min.y, max.x, max.y)
    }
}

/// Parses one line; `line_no` is 1-based and only used in errors.
///
/// Returns `Ok(None)` for blank lines and unknown class tokens.
pub fn parse_label_line(line: &str, line_no: usize) -> ObjLocResult<Option<Label>> {
    let mut tokens = line.split_whitespace();
    let Some(class) = tokens.next().and_then(ObjectClass::from_label_id) else {
        return Ok(None);
    };
    let err = |reason| ObjLocError::LabelParse {
        line: line_no,
        reason,
    };

    let mut coords = [0i32; 4];
    for c in &mut coords {
        let token = tokens.next().ok_or(err("missing coordinate"))?;
        *c = token.parse().map_err(|_| err("coordinate is not an integer"))?;
    }
    if tokens.next().is_some() {
        return Err(err("unexpected trailing token"));
    }
    let [xmin, ymin, xmax, ymax] = coords;
    let bbox = BoundingBox::new(Point2i::new(xmin, ymin), Point2i::new(xmax, ymax))
        .map_err(|_| err("inverted box corners"))?;
    Ok(Some(Label { class, bbox }))
}

/// At most one box per class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSet {
    boxes: [Option<BoundingBox>; 3],
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses label-file text.
    pub fn parse(text: &str) -> ObjLocResult<Self> {
        let mut set = Self::new();
        for (idx, line) in text.lines().enumerate() {
            if let Some(label) = parse_label_line(line, idx + 1)? {
                set.insert(label);
            }
        }
        Ok(set)
    }

    /// Reads and parses a label file.
    pub fn read<P: AsRef<Path>>(path: P) -> ObjLocResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ObjLocError::io(path, e))?;
        Self::parse(&text)
    }

    pub fn get(&self, class: ObjectClass) -> Option<BoundingBox> {
        self.boxes[class.index()]
    }

    /// Sets the box for the label's class, replacing any previous one.
    pub fn insert(&mut self, label: Label) {
        self.boxes[label.class.index()] = Some(label.bbox);
    }

    /// Present labels in class order.
    pub fn iter(&self) -> impl Iterator<Item = Label> + '_ {
        ObjectClass::ALL
            .into_iter()
            .filter_map(|class| self.get(class).map(|bbox| Label { class, bbox }))
    }

    pub fn len(&self) -> usize {
        self.boxes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

/// Creates `path` or empties it.
pub fn truncate<P: AsRef<Path>>(path: P) -> ObjLocResult<()> {
    let path = path.as_ref();
    File::create(path).map_err(|e| ObjLocError::io(path, e))?;
    Ok(())
}

/// Appends one line to `path`, creating the file if needed.
pub fn append_label<P: AsRef<Path>>(path: P, label: &Label) -> ObjLocResult<()> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ObjLocError::io(path, e))?;
    writeln!(file, "{label}").map_err(|e| ObjLocError::io(path, e))
}

/// Replaces the contents of `path` with every label of `labels`.
pub fn write_labels<P: AsRef<Path>>(path: P, labels: &LabelSet) -> ObjLocResult<()> {
    let path = path.as_ref();
    let mut text = String::new();
    for label in labels.iter() {
        text.push_str(&label.to_string());
        text.push('\n');
    }
    fs::write(path, text).map_err(|e| ObjLocError::io(path, e))
}
