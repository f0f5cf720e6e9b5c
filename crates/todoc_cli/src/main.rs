//! Command-line front end for `todoc_core`.
//!
//! # Responsibility
//! - Map flags onto `StoreConfig` and logging settings.
//! - List projects and tasks, add and delete tasks.

use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use todoc_core::{
    default_log_level, init_logging, ProjectId, SortMethod, StoreConfig, TaskId, TaskListItem,
    TaskService,
};

#[derive(Debug, Parser)]
#[command(name = "todoc", version, about = "Local task list backed by SQLite")]
struct Cli {
    /// Database file.
    #[arg(long, global = true, default_value = "todoc.db")]
    db: PathBuf,

    /// Use a throwaway in-memory database instead of `--db`.
    #[arg(long, global = true)]
    in_memory: bool,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off without it.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the project catalog.
    Projects,
    /// List tasks.
    List {
        /// none|alphabetical|alphabetical-inverted|recent-first|old-first
        #[arg(long, default_value_t = SortMethod::None)]
        sort: SortMethod,
    },
    /// Add a task stamped with the current time.
    Add {
        #[arg(long)]
        project: ProjectId,
        name: String,
    },
    /// Delete a task by id. Unknown ids are ignored.
    Delete { id: TaskId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let config = if cli.in_memory {
        StoreConfig::in_memory()
    } else {
        StoreConfig::file(&cli.db)
    };
    let mut service = TaskService::open(&config)?;

    match cli.command {
        Command::Projects => {
            let projects = service.projects()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&projects)?);
            } else {
                for project in projects {
                    println!("{}\t{}\t{}", project.id, project.color.to_hex(), project);
                }
            }
        }
        Command::List { sort } => {
            service.set_sort_method(sort);
            let items = service.task_list()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("No tasks.");
            } else {
                for item in &items {
                    println!("{}", format_item(item));
                }
            }
        }
        Command::Add { project, name } => {
            let id = service.create_task(project, name)?.wait()??;
            info!("event=cli_add module=cli status=ok task_id={id}");
            if cli.json {
                println!("{}", serde_json::json!({ "id": id }));
            } else {
                println!("Added task {id}.");
            }
        }
        Command::Delete { id } => {
            let target = service
                .tasks()?
                .into_iter()
                .find(|task| task.id == Some(id));
            let removed = match target {
                Some(task) => service.delete_task(&task)?.wait()??,
                None => false,
            };
            if cli.json {
                println!("{}", serde_json::json!({ "id": id, "removed": removed }));
            } else if removed {
                println!("Deleted task {id}.");
            } else {
                println!("No task {id}; nothing deleted.");
            }
        }
    }

    Ok(())
}

fn format_item(item: &TaskListItem) -> String {
    let project = item
        .project
        .as_ref()
        .map_or_else(|| "-".to_string(), |project| project.name.clone());
    format!(
        "{}\t{}\t{}",
        item.task.id.map_or_else(|| "?".to_string(), |id| id.to_string()),
        project,
        item.task.name
    )
}
