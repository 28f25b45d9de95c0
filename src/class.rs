//! The fixed set of object classes the pipeline looks for.

use std::fmt;

/// Known rigid objects, identified by their dataset label token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectClass {
    SugarBox,
    MustardBottle,
    PowerDrill,
}

impl ObjectClass {
    /// All classes in label-file order.
    pub const ALL: [ObjectClass; 3] = [
        ObjectClass::SugarBox,
        ObjectClass::MustardBottle,
        ObjectClass::PowerDrill,
    ];

    /// Token used in label files, e.g. `004_sugar_box`.
    pub const fn label_id(self) -> &'static str {
        match self {
            ObjectClass::SugarBox => "004_sugar_box",
            ObjectClass::MustardBottle => "006_mustard_bottle",
            ObjectClass::PowerDrill => "035_power_drill",
        }
    }

    /// Human-readable name used in reports.
    pub const fn display_name(self) -> &'static str {
        match self {
            ObjectClass::SugarBox => "Sugar Box",
            ObjectClass::MustardBottle => "Mustard Bottle",
            ObjectClass::PowerDrill => "Power Drill",
        }
    }

    /// Position in [`ObjectClass::ALL`].
    pub const fn index(self) -> usize {
        match self {
            ObjectClass::SugarBox => 0,
            ObjectClass::MustardBottle => 1,
            ObjectClass::PowerDrill => 2,
        }
    }

    /// Parses a label token; unknown tokens yield `None`.
    pub fn from_label_id(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label_id() == token)
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label_id())
    }
}
