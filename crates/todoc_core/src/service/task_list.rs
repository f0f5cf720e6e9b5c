//! Display-ready task rows.
//!
//! Sorting happens first, then each task is paired with its catalog project.
//! A task whose `project_id` is unknown is kept and shown without a project.

use crate::model::project::Project;
use crate::model::task::Task;
use crate::sort::{sorted_tasks, SortMethod};
use serde::Serialize;

/// One row of the visible task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListItem {
    pub task: Task,
    /// `None` when the task references a project outside the catalog.
    pub project: Option<Project>,
}

/// Sorts `tasks` by `method` and resolves each row's project.
pub fn build_task_list(tasks: Vec<Task>, method: SortMethod) -> Vec<TaskListItem> {
    sorted_tasks(tasks, method)
        .into_iter()
        .map(|task| {
            let project = task.project().cloned();
            TaskListItem { task, project }
        })
        .collect()
}
