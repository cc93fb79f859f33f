//! Pure aggregation over loaded records. Nothing in here fails: bad
//! references degrade to empty subsets.

use crate::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub blocked: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed + self.blocked
    }
}

pub fn status_counts(tasks: &[Task]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in tasks {
        match task.status {
            TaskStatus::Pending => counts.pending += 1,
            TaskStatus::InProgress => counts.in_progress += 1,
            TaskStatus::Completed => counts.completed += 1,
            TaskStatus::Blocked => counts.blocked += 1,
        }
    }
    counts
}

/// Completed-over-total ratio; 0.0 when there are no tasks.
pub fn completion_ratio(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    done as f64 / total as f64
}

/// All tasks claiming the given epic via their soft epicId reference.
/// Full scan per call; record counts are operator-scale.
pub fn epic_tasks<'a>(tasks: &'a [Task], epic_id: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| task.epic_id.as_deref() == Some(epic_id))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpicProgress {
    pub done: usize,
    pub total: usize,
}

pub fn epic_progress(tasks: &[Task], epic_id: &str) -> EpicProgress {
    let subset = epic_tasks(tasks, epic_id);
    EpicProgress {
        done: subset.iter().filter(|task| task.status.is_done()).count(),
        total: subset.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn task(id: &str, status: TaskStatus, epic_id: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            title: None,
            name: None,
            status,
            assignee: None,
            epic_id: epic_id.map(str::to_string),
            evidence: None,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn counts_split_by_status() {
        let tasks = vec![
            task("a", TaskStatus::Completed, None),
            task("b", TaskStatus::InProgress, None),
            task("c", TaskStatus::Pending, None),
            task("d", TaskStatus::Pending, None),
            task("e", TaskStatus::Blocked, None),
        ];
        let counts = status_counts(&tasks);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.blocked, 1);
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn ratio_is_zero_for_empty_input() {
        assert_eq!(completion_ratio(0, 0), 0.0);
    }

    #[test]
    fn ratio_matches_completed_share() {
        let tasks = vec![
            task("a", TaskStatus::Completed, None),
            task("b", TaskStatus::Pending, None),
            task("c", TaskStatus::Pending, None),
        ];
        let counts = status_counts(&tasks);
        let ratio = completion_ratio(counts.completed, counts.total());
        assert!((ratio - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn epic_join_matches_only_that_epic() {
        let tasks = vec![
            task("a", TaskStatus::Pending, Some("e1")),
            task("b", TaskStatus::Pending, Some("e2")),
            task("c", TaskStatus::Pending, None),
        ];
        let subset = epic_tasks(&tasks, "e1");
        assert_eq!(subset.len(), 1);
        assert_eq!(subset[0].id, "a");
    }

    #[test]
    fn epic_progress_counts_completed_only() {
        let tasks = vec![
            task("a", TaskStatus::Completed, Some("e1")),
            task("b", TaskStatus::InProgress, Some("e1")),
            task("c", TaskStatus::Completed, Some("other")),
        ];
        let progress = epic_progress(&tasks, "e1");
        assert_eq!(progress, EpicProgress { done: 1, total: 2 });
    }

    #[test]
    fn dangling_epic_reference_yields_empty_progress() {
        let tasks = vec![task("a", TaskStatus::Completed, Some("e1"))];
        let progress = epic_progress(&tasks, "nonexistent");
        assert_eq!(progress, EpicProgress::default());
    }
}
