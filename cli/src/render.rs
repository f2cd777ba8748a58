//! Plain-text rendering for list and dashboard output.

use chrono::{DateTime, Utc};
use taskdesk_core::views::{days_until_due, display_name, role_badge, DashboardStats};
use taskdesk_core::{Task, User};

pub fn task_line(task: &Task, now: DateTime<Utc>) -> String {
    let mark = if task.is_completed { "x" } else { " " };
    let due = match days_until_due(task.due_date, now) {
        None => String::new(),
        Some(days) if days < 0 => format!("  (overdue {}d)", -days),
        Some(0) => "  (due today)".to_string(),
        Some(days) => format!("  (due in {days}d)"),
    };
    format!(
        "[{mark}] #{:<4} {:<6} {}  owner={}{due}",
        task.id, task.priority, task.title, task.owner_id
    )
}

pub fn user_line(user: &User) -> String {
    let status = if user.is_active { "active" } else { "inactive" };
    format!(
        "#{:<4} {:<5} {} <{}> ({status})",
        user.id,
        role_badge(user),
        display_name(user),
        user.email
    )
}

pub fn dashboard(stats: &DashboardStats) -> String {
    format!(
        "tasks:          {}\ncompleted:      {}\npending:        {}\nhigh priority:  {}\nusers:          {}\n",
        stats.total_tasks, stats.completed_tasks, stats.pending_tasks, stats.high_priority_tasks, stats.total_users
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use taskdesk_core::Priority;

    use super::*;

    fn task(due: Option<DateTime<Utc>>, done: bool) -> Task {
        Task {
            id: 7,
            title: "Write spec".to_string(),
            description: None,
            is_completed: done,
            priority: Priority::High,
            due_date: due,
            owner_id: 1,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn task_line_shows_due_state() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(task_line(&task(None, true), now), "[x] #7    high   Write spec  owner=1");
        assert!(task_line(&task(Some(now + Duration::days(3)), false), now).ends_with("(due in 3d)"));
        assert!(task_line(&task(Some(now - Duration::days(2)), false), now).ends_with("(overdue 2d)"));
    }

    #[test]
    fn dashboard_lists_every_counter() {
        let out = dashboard(&DashboardStats {
            total_tasks: 4,
            completed_tasks: 1,
            pending_tasks: 3,
            high_priority_tasks: 2,
            total_users: 5,
        });
        assert!(out.contains("tasks:          4"));
        assert!(out.contains("users:          5"));
    }
}
