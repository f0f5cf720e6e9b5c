//! Project model and the fixed project catalog.
//!
//! # Responsibility
//! - Describe the named, colored categories tasks belong to.
//! - Expose the hard-coded catalog read-only for the whole process.
//!
//! # Invariants
//! - The catalog holds exactly three projects with ids 1, 2 and 3.
//! - A lookup miss is an expected outcome, never an error.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Primary key of a project row.
pub type ProjectId = i64;

/// 32-bit ARGB color, alpha in the most significant byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgbColor(u32);

impl ArgbColor {
    pub const fn from_argb(value: u32) -> Self {
        Self(value)
    }

    pub const fn argb(self) -> u32 {
        self.0
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Formats as `#AARRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:08X}", self.0)
    }
}

/// Named, colored category a task belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub color: ArgbColor,
}

static CATALOG: Lazy<[Project; 3]> = Lazy::new(|| {
    [
        Project::new(1, "Projet Tartampion", ArgbColor::from_argb(0xFFEA_DAD1)),
        Project::new(2, "Projet Lucidia", ArgbColor::from_argb(0xFFB4_CDBA)),
        Project::new(3, "Projet Circus", ArgbColor::from_argb(0xFFA3_CED2)),
    ]
});

impl Project {
    pub fn new(id: ProjectId, name: impl Into<String>, color: ArgbColor) -> Self {
        Self {
            id,
            name: name.into(),
            color,
        }
    }

    /// Returns the fixed project catalog.
    pub fn all() -> &'static [Project] {
        CATALOG.as_slice()
    }

    /// Looks up a catalog project by id.
    ///
    /// Returns `None` for stale or unknown ids; callers render such tasks
    /// without a project.
    pub fn by_id(id: ProjectId) -> Option<&'static Project> {
        Self::all().iter().find(|project| project.id == id)
    }
}

impl Display for Project {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
