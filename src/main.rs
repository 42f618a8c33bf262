//! todo-sync - terminal front end for a REST todo backend
//!
//! Each subcommand runs one controller operation and prints the resulting
//! state.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use todo_sync::{
    Category, Config, DueFilter, FilterPatch, HttpBackend, Priority, Selection, SyncController,
    SyncError, TaskDraft, TaskId, render,
};

#[derive(Parser)]
#[command(name = "todo-sync")]
#[command(about = "Browse and edit tasks on a todo REST backend")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config)
    #[arg(short, long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Status {
    Pending,
    Completed,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks, optionally filtered
    List {
        /// Substring to search for
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long)]
        priority: Option<Priority>,

        #[arg(short = 'k', long)]
        category: Option<Category>,

        #[arg(long, value_enum)]
        status: Option<Status>,

        /// overdue, today or this_week
        #[arg(short, long)]
        due: Option<DueFilter>,
    },

    /// Show aggregate statistics
    Stats,

    /// Create a task
    Add {
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long, default_value = "medium")]
        priority: Priority,

        #[arg(short = 'k', long, default_value = "other")]
        category: Category,

        /// RFC 3339 timestamp, e.g. 2026-10-20T17:00:00Z
        #[arg(long)]
        due: Option<DateTime<Utc>>,
    },

    /// Edit fields of an existing task
    Edit {
        id: TaskId,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        priority: Option<Priority>,

        #[arg(short = 'k', long)]
        category: Option<Category>,

        #[arg(long)]
        due: Option<DateTime<Utc>>,
    },

    /// Flip a task between done and pending
    Toggle { id: TaskId },

    /// Mark a task done
    Done { id: TaskId },

    /// Mark a task pending again
    Undo { id: TaskId },

    /// Delete a task
    Delete { id: TaskId },

    /// Delete several tasks in one request
    BulkDelete {
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },

    /// Mark several tasks done in one request
    BulkDone {
        #[arg(required = true)]
        ids: Vec<TaskId>,
    },

    /// List overdue tasks
    Overdue,

    /// List tasks due today
    DueToday,

    /// Initialize a new config file
    Init {
        /// Output path for config file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("todo_sync=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Init { output } = cli.command {
        return init(output);
    }

    let mut cfg = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = cli.url {
        cfg.server.base_url = url;
    }

    let backend = HttpBackend::from_config(&cfg.server).context("Failed to build HTTP client")?;
    tracing::debug!(base_url = %backend.base_url(), "Using backend");

    run(SyncController::new(backend), cli.command).await
}

async fn run(controller: SyncController<HttpBackend>, command: Commands) -> Result<()> {
    match command {
        Commands::List {
            search,
            priority,
            category,
            status,
            due,
        } => {
            let patch = FilterPatch::default()
                .search(search)
                .priority(priority)
                .category(category)
                .is_done(status.map(|s| matches!(s, Status::Completed)))
                .due(due);
            // Stats are advisory; a failure shows as "Statistics unavailable."
            let (listed, _) = tokio::join!(controller.set_filter(patch), controller.fetch_stats());
            listed.map_err(user_facing)?;

            println!("{}", render::filter(&controller.filter()));
            print_screen(&controller);
        }

        Commands::Stats => {
            controller.fetch_stats().await.map_err(user_facing)?;
            println!("{}", render::stats(controller.stats().as_ref()));
        }

        Commands::Add {
            title,
            description,
            priority,
            category,
            due,
        } => {
            let draft = TaskDraft {
                title,
                description,
                priority,
                category,
                is_done: false,
                due_date: due,
            };

            controller.fetch_tasks().await.map_err(user_facing)?;
            match controller.create_task(&draft).await.map_err(user_facing)? {
                Some(task) => println!("Created task #{}.", task.id),
                None => println!("Title is empty, nothing to add."),
            }
            print_screen(&controller);
        }

        Commands::Edit {
            id,
            title,
            description,
            priority,
            category,
            due,
        } => {
            controller.fetch_tasks().await.map_err(user_facing)?;
            let current = controller.reload_task(&id).await.map_err(user_facing)?;
            let mut draft = TaskDraft::from(&current);
            if let Some(title) = title {
                draft.title = title;
            }
            if description.is_some() {
                draft.description = description;
            }
            if let Some(priority) = priority {
                draft.priority = priority;
            }
            if let Some(category) = category {
                draft.category = category;
            }
            if due.is_some() {
                draft.due_date = due;
            }

            match controller
                .update_task(&id, &draft)
                .await
                .map_err(user_facing)?
            {
                Some(task) => println!("Updated task #{}.", task.id),
                None => println!("Title is empty, task left unchanged."),
            }
            print_screen(&controller);
        }

        Commands::Toggle { id } => {
            controller.fetch_tasks().await.map_err(user_facing)?;
            controller.toggle_task(&id).await.map_err(user_facing)?;
            print_screen(&controller);
        }

        Commands::Done { id } => {
            controller.fetch_tasks().await.map_err(user_facing)?;
            controller
                .set_completion(&id, true)
                .await
                .map_err(user_facing)?;
            print_screen(&controller);
        }

        Commands::Undo { id } => {
            controller.fetch_tasks().await.map_err(user_facing)?;
            controller
                .set_completion(&id, false)
                .await
                .map_err(user_facing)?;
            print_screen(&controller);
        }

        Commands::Delete { id } => {
            controller.fetch_tasks().await.map_err(user_facing)?;
            controller.delete_task(&id).await.map_err(user_facing)?;
            println!("Deleted task #{}.", id);
            print_screen(&controller);
        }

        Commands::BulkDelete { ids } => {
            // Stage through a selection the way an interactive front end would
            let mut selection = Selection::new();
            for id in &ids {
                selection.set_selected(id.clone(), true);
            }
            controller
                .refetch_selection(&mut selection)
                .await
                .map_err(user_facing)?;

            let skipped: Vec<TaskId> = ids
                .into_iter()
                .filter(|id| !selection.is_selected(id))
                .collect();
            if let Some(line) = render::skipped(&skipped) {
                println!("{}", line);
            }

            let removed = controller
                .bulk_delete_selected(&mut selection)
                .await
                .map_err(user_facing)?;
            println!("Deleted {} task(s).", removed);
            print_screen(&controller);
        }

        Commands::BulkDone { ids } => {
            controller
                .bulk_set_completion(&ids, true)
                .await
                .map_err(user_facing)?;
            print_screen(&controller);
        }

        Commands::Overdue => {
            let tasks = controller.fetch_overdue().await.map_err(user_facing)?;
            println!("{}", render::task_list(&tasks, &Selection::new()));
        }

        Commands::DueToday => {
            let tasks = controller.fetch_due_today().await.map_err(user_facing)?;
            println!("{}", render::task_list(&tasks, &Selection::new()));
        }

        Commands::Init { output } => init(output)?,
    }

    Ok(())
}

fn init(output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from("config.toml"));
    Config::default().save_to(&path)?;

    println!("Created config file: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Point [server].base_url at your backend");
    println!("  2. Run: todo-sync --config {} list", path.display());

    Ok(())
}

fn print_screen(controller: &SyncController<HttpBackend>) {
    println!(
        "{}",
        render::screen(
            &controller.tasks(),
            &Selection::new(),
            controller.stats().as_ref(),
            controller.error_message(),
        )
    );
}

/// Surface the fixed user message, keeping transport detail as the cause
fn user_facing(err: SyncError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}
