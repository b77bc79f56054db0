use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub week_id: String,
}

impl Task {
    pub fn new(title: impl Into<String>, week_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            completed: false,
            week_id: week_id.into(),
        }
    }
}

/// Partial update for a task. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Merge into `task`. A blank title is ignored so persisted titles stay non-empty.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            let trimmed = title.trim();
            if !trimmed.is_empty() {
                task.title = trimmed.to_string();
            }
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

// ---------------------------------------------------------------------------
// Task list operations (operate on a week's Vec<Task>)
// ---------------------------------------------------------------------------

pub fn find_mut<'a>(tasks: &'a mut [Task], id: &str) -> Option<&'a mut Task> {
    tasks.iter_mut().find(|t| t.id == id)
}

/// Remove and return the task with `id`, preserving the order of the rest.
pub fn take(tasks: &mut Vec<Task>, id: &str) -> Option<Task> {
    let idx = tasks.iter().position(|t| t.id == id)?;
    Some(tasks.remove(idx))
}

/// Human-readable summary: "2/5 completed"
pub fn summarize(tasks: &[Task]) -> String {
    let done = tasks.iter().filter(|t| t.completed).count();
    format!("{done}/{} completed", tasks.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_merges_only_present_fields() {
        let mut task = Task::new("Write pitch", "2026-W03");
        TaskPatch::completed(true).apply(&mut task);
        assert!(task.completed);
        assert_eq!(task.title, "Write pitch");

        TaskPatch::title("  Shape the pitch ").apply(&mut task);
        assert_eq!(task.title, "Shape the pitch");
        assert!(task.completed);
    }

    #[test]
    fn blank_title_patch_is_ignored() {
        let mut task = Task::new("Keep me", "2026-W03");
        TaskPatch::title("   ").apply(&mut task);
        assert_eq!(task.title, "Keep me");
    }

    #[test]
    fn take_preserves_remaining_order() {
        let mut tasks = vec![
            Task::new("a", "2026-W01"),
            Task::new("b", "2026-W01"),
            Task::new("c", "2026-W01"),
        ];
        let id = tasks[1].id.clone();
        let taken = take(&mut tasks, &id).unwrap();
        assert_eq!(taken.title, "b");
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["a", "c"]);
        assert!(take(&mut tasks, "missing").is_none());
    }

    #[test]
    fn task_serializes_camel_case() {
        let task = Task::new("x", "2026-W01");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["weekId"], "2026-W01");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn summary_counts_completed() {
        let mut tasks = vec![Task::new("a", "w"), Task::new("b", "w")];
        tasks[0].completed = true;
        assert_eq!(summarize(&tasks), "1/2 completed");
    }
}
