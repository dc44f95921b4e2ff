//! Today-view grouping of tasks into the foundation block and the rest.

use serde::Serialize;

use super::{Task, TaskType};

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskSections<'a> {
    pub foundation: Vec<&'a Task>,
    pub regular: Vec<&'a Task>,
}

impl<'a> TaskSections<'a> {
    /// Split tasks into sections, keeping input order. When `area` is set
    /// only tasks in that area are kept.
    pub fn split(tasks: &'a [Task], area: Option<&str>) -> Self {
        let mut sections = Self::default();
        for task in tasks {
            if let Some(area) = area {
                if task.area.as_deref() != Some(area) {
                    continue;
                }
            }
            match task.task_type {
                TaskType::Foundation => sections.foundation.push(task),
                TaskType::Routine | TaskType::Standard | TaskType::DeepWork => {
                    sections.regular.push(task)
                }
            }
        }
        sections
    }

    /// Completed and total counts for the foundation block.
    pub fn foundation_progress(&self) -> (usize, usize) {
        let done = self.foundation.iter().filter(|t| t.completed).count();
        (done, self.foundation.len())
    }
}
