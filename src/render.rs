//! Plain-text rendering of controller state for the terminal

use std::fmt::Write;

use crate::filter::TaskFilter;
use crate::models::{Task, TaskId};
use crate::selection::Selection;
use crate::stats::TaskStats;

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One task per line: checkbox, id, title, then priority/category/due
pub fn task_line(task: &Task, selected: bool) -> String {
    let mark = if task.is_done { "x" } else { " " };
    let pick = if selected { "*" } else { " " };

    let mut line = format!(
        "{}[{}] #{:<4} {}  ({}, {})",
        pick,
        mark,
        task.id.to_string(),
        task.title,
        task.priority,
        task.category
    );
    if let Some(due) = task.due_date {
        let _ = write!(line, " due {}", due.format("%Y-%m-%d %H:%M"));
    }
    line
}

pub fn task_list(tasks: &[Task], selection: &Selection) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    tasks
        .iter()
        .map(|t| task_line(t, selection.is_selected(&t.id)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn stats(stats: Option<&TaskStats>) -> String {
    let Some(stats) = stats else {
        return "Statistics unavailable.".to_string();
    };

    let mut out = format!(
        "Total: {}  Completed: {}  Pending: {}  Completion: {}%",
        stats.total_tasks,
        stats.completed_tasks,
        stats.pending_tasks,
        stats.completion_rate.round()
    );

    if stats.overdue_tasks > 0 {
        let plural = if stats.overdue_tasks == 1 { "" } else { "s" };
        let _ = write!(out, "\n⚠️  {} overdue task{}", stats.overdue_tasks, plural);
    }

    if !stats.priority_stats.is_empty() {
        let parts: Vec<_> = stats
            .priority_stats
            .iter()
            .map(|(p, n)| format!("{} {}", capitalize(p.as_str()), n))
            .collect();
        let _ = write!(out, "\nBy priority: {}", parts.join(", "));
    }

    if !stats.category_stats.is_empty() {
        let parts: Vec<_> = stats
            .category_stats
            .iter()
            .map(|(c, n)| format!("{} {}", capitalize(c.as_str()), n))
            .collect();
        let _ = write!(out, "\nBy category: {}", parts.join(", "));
    }

    out
}

/// Task list, stats panel and the error line, as shown after every command
pub fn screen(
    tasks: &[Task],
    selection: &Selection,
    stats: Option<&TaskStats>,
    error: Option<&str>,
) -> String {
    let mut out = format!("{}\n\n{}", task_list(tasks, selection), self::stats(stats));
    if let Some(message) = error {
        let _ = write!(out, "\n\nError: {}", message);
    }
    out
}

/// Ids a bulk action left out because the fetched list lacks them
pub fn skipped(ids: &[TaskId]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }

    let parts: Vec<_> = ids.iter().map(|id| format!("#{}", id)).collect();
    Some(format!("Skipped, not in the task list: {}", parts.join(", ")))
}

pub fn filter(filter: &TaskFilter) -> String {
    let query = filter.to_query();
    if query.is_empty() {
        return "Filters: none".to_string();
    }

    let parts: Vec<_> = query
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    format!("Filters: {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::task;
    use crate::filter::FilterPatch;
    use crate::models::{Category, Priority};
    use chrono::{TimeZone, Utc};

    #[test]
    fn task_line_shows_state() {
        let mut t = task(12, "Dentist");
        t.is_done = true;
        t.category = Category::Health;
        t.due_date = Some(Utc.with_ymd_and_hms(2026, 11, 2, 9, 30, 0).unwrap());

        assert_eq!(
            task_line(&t, true),
            "*[x] #12   Dentist  (medium, health) due 2026-11-02 09:30"
        );
    }

    #[test]
    fn empty_list_message() {
        assert_eq!(task_list(&[], &Selection::new()), "No tasks found.");
    }

    #[test]
    fn list_marks_selected_tasks() {
        let mut selection = Selection::new();
        selection.set_selected(TaskId::Numeric(1), true);

        let out = task_list(&[task(2, "b"), task(1, "a")], &selection);
        let lines: Vec<_> = out.lines().collect();
        assert!(lines[0].starts_with(" [ ] #2"));
        assert!(lines[1].starts_with("*[ ] #1"));
    }

    #[test]
    fn stats_render_breakdowns() {
        let mut s = TaskStats {
            total_tasks: 4,
            completed_tasks: 1,
            pending_tasks: 3,
            completion_rate: 25.0,
            overdue_tasks: 1,
            ..Default::default()
        };
        s.priority_stats.insert(Priority::High, 3);
        s.category_stats.insert(Category::Work, 4);

        let out = stats(Some(&s));
        assert!(out.starts_with("Total: 4  Completed: 1  Pending: 3  Completion: 25%"));
        assert!(out.contains("1 overdue task\n"));
        assert!(out.contains("By priority: High 3"));
        assert!(out.contains("By category: Work 4"));
        assert_eq!(stats(None), "Statistics unavailable.");
    }

    #[test]
    fn screen_shows_list_stats_and_error() {
        let s = TaskStats {
            total_tasks: 1,
            pending_tasks: 1,
            ..Default::default()
        };

        let out = screen(&[task(1, "Buy milk")], &Selection::new(), Some(&s), None);
        assert_eq!(
            out,
            " [ ] #1    Buy milk  (medium, other)\n\n\
             Total: 1  Completed: 0  Pending: 1  Completion: 0%"
        );

        let out = screen(&[], &Selection::new(), None, Some("Failed to fetch tasks."));
        assert_eq!(
            out,
            "No tasks found.\n\nStatistics unavailable.\n\nError: Failed to fetch tasks."
        );
    }

    #[test]
    fn skipped_ids_are_named() {
        assert_eq!(skipped(&[]), None);
        assert_eq!(
            skipped(&[TaskId::Numeric(5), TaskId::Text("x9".into())]).as_deref(),
            Some("Skipped, not in the task list: #5, #x9")
        );
    }

    #[test]
    fn filter_summary() {
        let mut f = TaskFilter::default();
        assert_eq!(filter(&f), "Filters: none");

        f.set_filter(FilterPatch::default().priority(Some(Priority::High)).is_done(Some(false)));
        assert_eq!(filter(&f), "Filters: priority=high, is_done=false");
    }
}
