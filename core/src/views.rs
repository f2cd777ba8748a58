//! View-side helpers shared by hosts: list filtering, dashboard numbers,
//! user display strings and form models that turn edited values into DTOs.

use chrono::{DateTime, Utc};

use crate::types::{Id, Priority, Task, TaskCreate, TaskUpdate, User, UserCreate, UserUpdate};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "completed" | "done" => Ok(StatusFilter::Completed),
            "pending" | "open" => Ok(StatusFilter::Pending),
            other => Err(format!("unknown status filter: {other}")),
        }
    }
}

/// Client-side filter over a cached task list. Every criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub priority: Option<Priority>,
    /// Case-insensitive substring of the title or description.
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Completed => task.is_completed,
            StatusFilter::Pending => !task.is_completed,
        };
        if !status_ok {
            return false;
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(term) => {
                let term = term.to_lowercase();
                task.title.to_lowercase().contains(&term)
                    || task
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
        }
    }

    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    /// High priority and not yet completed.
    pub high_priority_tasks: usize,
    pub total_users: usize,
}

impl DashboardStats {
    pub fn compute(tasks: &[Task], users: &[User]) -> Self {
        let completed = tasks.iter().filter(|t| t.is_completed).count();
        Self {
            total_tasks: tasks.len(),
            completed_tasks: completed,
            pending_tasks: tasks.len() - completed,
            high_priority_tasks: tasks
                .iter()
                .filter(|t| t.priority == Priority::High && !t.is_completed)
                .count(),
            total_users: users.len(),
        }
    }
}

/// Full name when set and non-blank, otherwise the username.
pub fn display_name(user: &User) -> &str {
    user.full_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(&user.username)
}

pub fn role_badge(user: &User) -> &'static str {
    if user.is_superuser {
        "Admin"
    } else {
        "User"
    }
}

/// Whole days until `due`, rounded up. Negative when overdue.
pub fn days_until_due(due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
    let diff = (due? - now).num_milliseconds();
    Some(diff.div_euclid(MILLIS_PER_DAY) + i64::from(diff.rem_euclid(MILLIS_PER_DAY) != 0))
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// Editable task fields as a form holds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub owner_id: Option<Id>,
    pub is_completed: bool,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            priority: Priority::Medium,
            due_date: None,
            owner_id: None,
            is_completed: false,
        }
    }
}

impl TaskForm {
    /// Populate the form for editing an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            priority: task.priority,
            due_date: task.due_date,
            owner_id: Some(task.owner_id),
            is_completed: task.is_completed,
        }
    }

    fn description(&self) -> Option<String> {
        let trimmed = self.description.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// A missing owner becomes id 0, which validation rejects.
    pub fn to_create(&self) -> TaskCreate {
        TaskCreate {
            title: self.title.trim().to_string(),
            description: self.description(),
            is_completed: Some(self.is_completed),
            priority: Some(self.priority),
            due_date: self.due_date,
            owner_id: self.owner_id.unwrap_or(0),
        }
    }

    /// Every form field is sent; a blank description or due date clears it.
    pub fn to_update(&self) -> TaskUpdate {
        TaskUpdate {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description()),
            is_completed: Some(self.is_completed),
            priority: Some(self.priority),
            due_date: Some(self.due_date),
        }
    }
}

/// Editable user fields as a form holds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            username: String::new(),
            password: String::new(),
            full_name: String::new(),
            is_active: true,
            is_superuser: false,
        }
    }
}

impl UserForm {
    /// Populate the form for editing. The password is never known.
    pub fn from_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            username: user.username.clone(),
            password: String::new(),
            full_name: user.full_name.clone().unwrap_or_default(),
            is_active: user.is_active,
            is_superuser: user.is_superuser,
        }
    }

    fn full_name(&self) -> Option<String> {
        let trimmed = self.full_name.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn to_create(&self) -> UserCreate {
        UserCreate {
            email: self.email.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            full_name: self.full_name(),
            is_active: Some(self.is_active),
            is_superuser: Some(self.is_superuser),
        }
    }

    /// An empty password means "keep the current one" and is left out.
    pub fn to_update(&self) -> UserUpdate {
        UserUpdate {
            email: Some(self.email.trim().to_string()),
            username: Some(self.username.trim().to_string()),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
            full_name: Some(self.full_name()),
            is_active: Some(self.is_active),
            is_superuser: Some(self.is_superuser),
        }
    }
}
