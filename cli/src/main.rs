use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use taskdesk_core::types::timestamp;
use taskdesk_core::views::{DashboardStats, StatusFilter, TaskFilter, TaskForm, UserForm};
use taskdesk_core::{ApiConfig, ApiError, Id, Priority, ReqwestTransport, Services, TaskUpdate, UserUpdate};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser)]
#[command(author, version, about = "Admin client for the task manager API", long_about = None)]
struct Cli {
    /// Base URL of the API server (overrides TASKDESK_BASE_URL)
    #[arg(long, global = true)]
    url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task and user totals
    Dashboard,
    /// Task commands
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// User commands
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List tasks, optionally filtered
    List {
        /// all, completed or pending
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long)]
        priority: Option<Priority>,
        /// Case-insensitive match on title or description
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = taskdesk_core::DEFAULT_OFFSET)]
        skip: u32,
        #[arg(long, default_value_t = taskdesk_core::DEFAULT_LIMIT)]
        limit: u32,
    },
    /// Show one task
    Get { id: Id },
    /// Create a task
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// RFC 3339 timestamp
        #[arg(long, value_parser = parse_due)]
        due: Option<DateTime<Utc>>,
        /// Owning user id
        #[arg(long)]
        owner: Option<Id>,
        #[arg(long)]
        completed: bool,
    },
    /// Edit a task; unspecified fields keep their current value
    Update {
        id: Id,
        #[arg(long)]
        title: Option<String>,
        /// Pass an empty string to clear
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, value_parser = parse_due, conflicts_with = "clear_due")]
        due: Option<DateTime<Utc>>,
        #[arg(long)]
        clear_due: bool,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Flip a task's completion flag
    Toggle { id: Id },
    /// Delete a task
    Delete { id: Id },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users
    List {
        #[arg(long, default_value_t = taskdesk_core::DEFAULT_OFFSET)]
        skip: u32,
        #[arg(long, default_value_t = taskdesk_core::DEFAULT_LIMIT)]
        limit: u32,
    },
    /// Show one user
    Get { id: Id },
    /// Create a user
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        superuser: bool,
        #[arg(long)]
        inactive: bool,
    },
    /// Edit a user; unspecified fields, including the password, stay unchanged
    Update {
        id: Id,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// Pass an empty string to clear
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        superuser: Option<bool>,
    },
    /// Delete a user
    Delete { id: Id },
}

fn parse_due(raw: &str) -> Result<DateTime<Utc>, String> {
    timestamp::parse(raw).map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
}

/// Only the flags that were given end up in the request. An empty
/// description clears it.
fn task_edits(
    title: Option<String>,
    description: Option<String>,
    priority: Option<Priority>,
    due: Option<DateTime<Utc>>,
    clear_due: bool,
    completed: Option<bool>,
) -> TaskUpdate {
    TaskUpdate {
        title,
        description: description.map(|d| Some(d).filter(|d| !d.trim().is_empty())),
        is_completed: completed,
        priority,
        due_date: if clear_due { Some(None) } else { due.map(Some) },
    }
}

/// Same as `task_edits`; an empty full name clears it.
fn user_edits(
    email: Option<String>,
    username: Option<String>,
    password: Option<String>,
    full_name: Option<String>,
    active: Option<bool>,
    superuser: Option<bool>,
) -> UserUpdate {
    UserUpdate {
        email,
        username,
        password,
        full_name: full_name.map(|n| Some(n).filter(|n| !n.trim().is_empty())),
        is_active: active,
        is_superuser: superuser,
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ApiConfig::from_env();
    if let Some(url) = &cli.url {
        config = config.with_base_url(url);
    }
    debug!(base_url = config.base_url(), api_prefix = config.api_prefix(), "connecting");
    let services = Services::connect(config);

    if let Err(error) = run(&services, cli.command).await {
        report(&error);
        std::process::exit(1);
    }
}

fn report(error: &anyhow::Error) {
    debug!(error = ?error, "command failed");
    if let Some(ApiError::Validation(errors)) = error.downcast_ref::<ApiError>() {
        eprintln!("error: invalid input");
        for field in errors.errors() {
            eprintln!("  {}: {}", field.field, field.message);
        }
        return;
    }
    eprintln!("error: {error:#}");
}

async fn run(services: &Services<ReqwestTransport>, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Dashboard => {
            let (tasks, users) = tokio::join!(services.tasks.list_default(), services.users.list_default());
            tasks.context("loading tasks")?;
            users.context("loading users")?;
            let stats = DashboardStats::compute(&services.tasks.snapshot(), &services.users.snapshot());
            print!("{}", render::dashboard(&stats));
        }
        Commands::Tasks { command } => run_tasks(services, command).await?,
        Commands::Users { command } => run_users(services, command).await?,
    }
    Ok(())
}

async fn run_tasks(services: &Services<ReqwestTransport>, command: TaskCommands) -> anyhow::Result<()> {
    let tasks = &services.tasks;
    match command {
        TaskCommands::List {
            status,
            priority,
            search,
            skip,
            limit,
        } => {
            let all = tasks.list(skip, limit).await?;
            let filter = TaskFilter {
                status,
                priority,
                search,
            };
            let now = Utc::now();
            for task in filter.apply(&all) {
                println!("{}", render::task_line(&task, now));
            }
        }
        TaskCommands::Get { id } => {
            let task = tasks.get(id).await?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskCommands::Create {
            title,
            description,
            priority,
            due,
            owner,
            completed,
        } => {
            let form = TaskForm {
                title,
                description: description.unwrap_or_default(),
                priority,
                due_date: due,
                owner_id: owner,
                is_completed: completed,
            };
            let created = tasks.create(&form.to_create()).await?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        TaskCommands::Update {
            id,
            title,
            description,
            priority,
            due,
            clear_due,
            completed,
        } => {
            let edits = task_edits(title, description, priority, due, clear_due, completed);
            let updated = tasks.update(id, &edits).await?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        TaskCommands::Toggle { id } => {
            let current = tasks.get(id).await?;
            let update = TaskUpdate {
                is_completed: Some(!current.is_completed),
                ..Default::default()
            };
            let updated = tasks.update(id, &update).await?;
            println!("{}", render::task_line(&updated, Utc::now()));
        }
        TaskCommands::Delete { id } => {
            tasks.delete(id).await?;
            println!("deleted task {id}");
        }
    }
    Ok(())
}

async fn run_users(services: &Services<ReqwestTransport>, command: UserCommands) -> anyhow::Result<()> {
    let users = &services.users;
    match command {
        UserCommands::List { skip, limit } => {
            for user in users.list(skip, limit).await? {
                println!("{}", render::user_line(&user));
            }
        }
        UserCommands::Get { id } => {
            let user = users.get(id).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        UserCommands::Create {
            email,
            username,
            password,
            full_name,
            superuser,
            inactive,
        } => {
            let form = UserForm {
                email,
                username,
                password,
                full_name: full_name.unwrap_or_default(),
                is_active: !inactive,
                is_superuser: superuser,
            };
            let created = users.create(&form.to_create()).await?;
            println!("{}", render::user_line(&created));
        }
        UserCommands::Update {
            id,
            email,
            username,
            password,
            full_name,
            active,
            superuser,
        } => {
            let edits = user_edits(email, username, password, full_name, active, superuser);
            let updated = users.update(id, &edits).await?;
            println!("{}", render::user_line(&updated));
        }
        UserCommands::Delete { id } => {
            users.delete(id).await?;
            println!("deleted user {id}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use taskdesk_core::Validate;

    use super::*;

    #[test]
    fn priority_only_task_edit_sends_just_priority() {
        let edits = task_edits(None, None, Some(Priority::Low), None, false, None);
        assert!(edits.validate().is_ok());
        assert_eq!(serde_json::to_value(&edits).unwrap(), serde_json::json!({"priority": "low"}));
    }

    #[test]
    fn task_edit_clears_description_and_due_date() {
        let edits = task_edits(None, Some(String::new()), None, None, true, Some(true));
        assert_eq!(
            serde_json::to_value(&edits).unwrap(),
            serde_json::json!({"description": null, "due_date": null, "is_completed": true})
        );

        let due = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let edits = task_edits(Some("Write spec".to_string()), None, None, Some(due), false, None);
        assert_eq!(edits.due_date, Some(Some(due)));
        assert_eq!(edits.title.as_deref(), Some("Write spec"));
        assert_eq!(edits.description, None);
    }

    #[test]
    fn user_edit_without_password_omits_it() {
        let edits = user_edits(None, None, None, Some("Alice A.".to_string()), Some(false), None);
        assert!(edits.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&edits).unwrap(),
            serde_json::json!({"full_name": "Alice A.", "is_active": false})
        );
    }
}
