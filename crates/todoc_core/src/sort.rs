//! In-memory sort policy for the displayed task list.
//!
//! # Responsibility
//! - Map the user-selected sort method to one key and one direction.
//! - Reorder an already-fetched task list without touching storage.
//!
//! # Invariants
//! - Sorting is stable: tied tasks keep their delivery order.
//! - `SortMethod::None` preserves the store's delivery order.
//! - Timestamps are compared directly, never by subtraction.

use crate::model::task::Task;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Sort method selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMethod {
    /// Keep store delivery order.
    #[default]
    None,
    /// A to Z by name.
    Alphabetical,
    /// Z to A by name.
    AlphabeticalInverted,
    /// Newest creation time first.
    RecentFirst,
    /// Oldest creation time first.
    OldFirst,
}

/// Task field a sort method compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    CreationTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortMethod {
    pub const ALL: [SortMethod; 5] = [
        SortMethod::None,
        SortMethod::Alphabetical,
        SortMethod::AlphabeticalInverted,
        SortMethod::RecentFirst,
        SortMethod::OldFirst,
    ];

    /// Returns the compared key and direction, or `None` for no reordering.
    pub fn ordering(self) -> Option<(SortKey, SortDirection)> {
        match self {
            Self::None => None,
            Self::Alphabetical => Some((SortKey::Name, SortDirection::Ascending)),
            Self::AlphabeticalInverted => Some((SortKey::Name, SortDirection::Descending)),
            Self::RecentFirst => Some((SortKey::CreationTime, SortDirection::Descending)),
            Self::OldFirst => Some((SortKey::CreationTime, SortDirection::Ascending)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Alphabetical => "alphabetical",
            Self::AlphabeticalInverted => "alphabetical-inverted",
            Self::RecentFirst => "recent-first",
            Self::OldFirst => "old-first",
        }
    }
}

impl Display for SortMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized sort method names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSortMethodError(String);

impl Display for ParseSortMethodError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported sort method `{}`; expected none|alphabetical|alphabetical-inverted|recent-first|old-first",
            self.0
        )
    }
}

impl Error for ParseSortMethodError {}

impl FromStr for SortMethod {
    type Err = ParseSortMethodError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == normalized)
            .ok_or_else(|| ParseSortMethodError(value.trim().to_string()))
    }
}

/// Compares two tasks on `key` in the given direction.
pub fn compare_tasks(left: &Task, right: &Task, key: SortKey, direction: SortDirection) -> Ordering {
    let ordering = match key {
        SortKey::Name => left.name.cmp(&right.name),
        SortKey::CreationTime => left.creation_timestamp.cmp(&right.creation_timestamp),
    };
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Stable in-place sort of `tasks` by `method`.
pub fn sort_tasks(tasks: &mut [Task], method: SortMethod) {
    if let Some((key, direction)) = method.ordering() {
        tasks.sort_by(|left, right| compare_tasks(left, right, key, direction));
    }
}

/// Owned variant of [`sort_tasks`].
pub fn sorted_tasks(mut tasks: Vec<Task>, method: SortMethod) -> Vec<Task> {
    sort_tasks(&mut tasks, method);
    tasks
}

#[cfg(test)]
mod tests {
    use super::{sorted_tasks, SortMethod};
    use crate::model::task::Task;

    fn task(id: i64, name: &str, ts: i64) -> Task {
        Task {
            id: Some(id),
            project_id: 1,
            name: name.to_string(),
            creation_timestamp: ts,
        }
    }

    fn ids(tasks: &[Task]) -> Vec<i64> {
        tasks.iter().filter_map(|task| task.id).collect()
    }

    #[test]
    fn none_keeps_delivery_order() {
        let tasks = vec![task(3, "c", 3), task(1, "a", 1), task(2, "b", 2)];
        assert_eq!(ids(&sorted_tasks(tasks, SortMethod::None)), vec![3, 1, 2]);
    }

    #[test]
    fn ties_keep_original_relative_order_in_both_directions() {
        let tasks = vec![task(1, "same", 10), task(2, "other", 10), task(3, "same", 10)];

        assert_eq!(ids(&sorted_tasks(tasks.clone(), SortMethod::Alphabetical)), vec![2, 1, 3]);
        assert_eq!(
            ids(&sorted_tasks(tasks.clone(), SortMethod::AlphabeticalInverted)),
            vec![1, 3, 2]
        );
        assert_eq!(ids(&sorted_tasks(tasks.clone(), SortMethod::RecentFirst)), vec![1, 2, 3]);
        assert_eq!(ids(&sorted_tasks(tasks, SortMethod::OldFirst)), vec![1, 2, 3]);
    }

    #[test]
    fn timestamps_years_apart_do_not_overflow() {
        let five_years_ms = 5 * 365 * 24 * 60 * 60 * 1000_i64;
        let tasks = vec![task(1, "old", 0), task(2, "new", five_years_ms), task(3, "min", i64::MIN)];

        assert_eq!(ids(&sorted_tasks(tasks.clone(), SortMethod::RecentFirst)), vec![2, 1, 3]);
        assert_eq!(ids(&sorted_tasks(tasks, SortMethod::OldFirst)), vec![3, 1, 2]);
    }

    #[test]
    fn name_order_is_codepoint_order() {
        let tasks = vec![task(1, "b", 0), task(2, "B", 0), task(3, "a", 0)];
        assert_eq!(ids(&sorted_tasks(tasks, SortMethod::Alphabetical)), vec![2, 3, 1]);
    }

    #[test]
    fn parse_and_display_agree() {
        for method in SortMethod::ALL {
            assert_eq!(method.to_string().parse::<SortMethod>(), Ok(method));
        }
        assert_eq!(" Recent_First ".parse::<SortMethod>(), Ok(SortMethod::RecentFirst));
        assert!("sideways".parse::<SortMethod>().is_err());
        assert_eq!(SortMethod::default(), SortMethod::None);
    }
}
