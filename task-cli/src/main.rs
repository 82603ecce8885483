use anyhow::anyhow;
use clap::{Parser, Subcommand};
use task_cli::config::Config;
use task_cli::{JsonFileRepository, ServiceError, StatusFilter, Task, TaskService};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about = "Track personal tasks in a JSON file")]
struct Cli {
    /// Overwrite the default json file where tasks are stored
    #[arg(long, global = true)]
    file: Option<String>,
    /// Overwrite the default log level (DEBUG, INFO, WARN, ERROR)
    #[arg(long, global = true)]
    log: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Add a new task
    Add { description: String },
    /// Change the description of a task
    Update { id: i64, description: String },
    /// Delete a task
    Delete { id: i64 },
    /// Move a task from todo to in-progress
    MarkInProgress { id: i64 },
    /// Move a task from in-progress to done
    MarkDone { id: i64 },
    /// List tasks, optionally filtered by status (all, todo, in-progress, done)
    List {
        #[arg(default_value = "all")]
        filter: String,
    },
    /// Show a single task
    Get { id: i64 },
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let config = Config::load(args.file.as_deref(), args.log.as_deref())?;
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(config.log_level))
        .with_writer(std::io::stderr)
        .init();
    info!(task_file = %config.task_file.display(), log_level = %config.log_level, "configuration resolved");

    let service = TaskService::new(JsonFileRepository::new(&config.task_file));
    run(&service, args.command)
}

fn run(service: &TaskService<JsonFileRepository>, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Add { description } => {
            let task = service.add(&description).map_err(|err| report(err, None))?;
            println!("Task added with ID {}", task.id());
        }
        Commands::Update { id, description } => {
            let task = service
                .update(id, &description)
                .map_err(|err| report(err, Some(id)))?;
            println!("Task {} updated", task.id());
        }
        Commands::Delete { id } => {
            service.delete(id).map_err(|err| report(err, Some(id)))?;
            println!("Task {id} deleted");
        }
        Commands::MarkInProgress { id } => {
            let task = service
                .mark_in_progress(id)
                .map_err(|err| report(err, Some(id)))?;
            println!("Task {} marked {}", task.id(), task.status());
        }
        Commands::MarkDone { id } => {
            let task = service.mark_done(id).map_err(|err| report(err, Some(id)))?;
            println!("Task {} marked {}", task.id(), task.status());
        }
        Commands::List { filter } => {
            let tasks = service
                .list(StatusFilter::parse(&filter))
                .map_err(|err| report(err, None))?;
            if tasks.is_empty() {
                println!("No tasks");
            }
            for task in &tasks {
                println!("{}", format_task(task));
            }
        }
        Commands::Get { id } => {
            let task = service.get_by_id(id).map_err(|err| report(err, Some(id)))?;
            println!("{}", format_task(&task));
        }
    }
    Ok(())
}

fn report(err: ServiceError, id: Option<i64>) -> anyhow::Error {
    match id {
        Some(id) if err.is_not_found() => anyhow!("no such task: {id}"),
        _ => err.into(),
    }
}

fn format_task(task: &Task) -> String {
    format!(
        "{:>4}  {:<11}  {}  (created {}, updated {})",
        task.id(),
        task.status(),
        task.description(),
        task.created_at().format("%Y-%m-%d %H:%M"),
        task.updated_at().format("%Y-%m-%d %H:%M"),
    )
}
