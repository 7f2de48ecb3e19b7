mod cli;
mod output;
mod prompt;
mod resolve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use taskboard_core::db::open_db;
use taskboard_core::{
    init_logging, BackendKind, DashboardConfig, DashboardError, DashboardService, Decision,
    LocalBackend, NewTask, PersistenceBackend, PinPolicy, RemoteBackend, RemovalOutcome,
    RemovalTarget, SqliteDocumentStore, SqliteKeyValueStore, SystemClock, TaskPatch,
};

use cli::{Cli, Command, PersonCommand, TaskCommand};
use prompt::CliPinPrompt;

type Service<'conn> = DashboardService<
    Box<dyn PersistenceBackend + 'conn>,
    PinPolicy<CliPinPrompt>,
    SystemClock,
>;

fn base_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".taskboard"))
}

fn resolve_config_path(cli_config: Option<PathBuf>) -> Result<PathBuf> {
    match cli_config {
        Some(path) => Ok(path),
        None => Ok(base_dir()?.join("taskboard.toml")),
    }
}

fn resolve_db_path(cli_db: Option<PathBuf>, config: &DashboardConfig) -> Result<PathBuf> {
    match cli_db.or_else(|| config.storage.path.clone()) {
        Some(path) => Ok(path),
        None => Ok(base_dir()?.join("taskboard.db")),
    }
}

fn ensure_db_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        config,
        db,
        backend,
        pin,
        person,
        command,
    } = Cli::parse();

    let config_path = resolve_config_path(config)?;
    let config = DashboardConfig::load_from(&config_path)?;
    if let Some(log_dir) = &config.logging.dir {
        init_logging(config.logging.effective_level(), log_dir)?;
    }

    let db_path = resolve_db_path(db, &config)?;
    ensure_db_dir(&db_path)?;
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    let kind = backend.map(BackendKind::from).unwrap_or(config.storage.backend);
    let backend: Box<dyn PersistenceBackend + '_> = match kind {
        BackendKind::Local => Box::new(LocalBackend::new(SqliteKeyValueStore::try_new(&conn)?)),
        BackendKind::Remote => Box::new(RemoteBackend::new(SqliteDocumentStore::try_new(&conn)?)),
    };
    let policy = PinPolicy::new(config.admin.pin.clone(), CliPinPrompt::from_arg(pin));
    let mut service = DashboardService::open(backend, policy, SystemClock)?;

    if let Some(reference) = &person {
        let id = resolve::resolve_person(service.people(), reference)?;
        service.select_person(id)?;
    }

    info!(
        "event=cli_command module=cli status=start backend={} command={}",
        kind.as_str(),
        command_name(&command)
    );
    match command {
        Command::Person { command } => run_person(&mut service, command),
        Command::Task { command } => run_task(&mut service, command),
        Command::Stats { month, json } => {
            service.set_month_filter(month);
            let person = service
                .selected_person()
                .ok_or(DashboardError::NoPersonSelected)?;
            let report = output::stats_report(person, service.month_filter(), service.metrics());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", output::format_stats(&report));
            }
            Ok(())
        }
    }
}

fn run_person(service: &mut Service<'_>, command: PersonCommand) -> Result<()> {
    match command {
        PersonCommand::Add { name } => {
            let id = service.add_person(&name)?;
            eprintln!("Added person '{}' ({id})", name.trim());
        }

        PersonCommand::Rename { person, name } => {
            let id = resolve::resolve_person(service.people(), &person)?;
            service.rename_person(id, &name)?;
            eprintln!("Renamed '{person}' to '{}'", name.trim());
        }

        PersonCommand::Emails { person, emails } => {
            let id = resolve::resolve_person(service.people(), &person)?;
            service.set_person_emails(id, emails.as_slice())?;
            eprintln!("Updated emails for '{person}'");
        }

        PersonCommand::Rm { person, yes } => {
            let id = resolve::resolve_person(service.people(), &person)?;
            let request = service.request_removal(RemovalTarget::Person(id))?;
            let subject = request.subject().to_string();
            match confirm_removal(service, request, yes)? {
                RemovalOutcome::Removed => eprintln!("Removed '{subject}' and their tasks"),
                RemovalOutcome::Cancelled => eprintln!("Cancelled"),
            }
        }

        PersonCommand::List { json } => {
            let selected = service.selected_person().map(|person| person.id);
            let rows = output::person_rows(service.people(), selected);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                eprintln!("No people yet");
            } else {
                print!("{}", output::format_people(&rows));
            }
        }

        PersonCommand::Select { person } => {
            let id = resolve::resolve_person(service.people(), &person)?;
            service.select_person(id)?;
            let metrics = service.metrics();
            let selected = service
                .selected_person()
                .ok_or(DashboardError::PersonNotFound(id))?;
            print!("{}", output::format_person_summary(selected, &metrics));
        }
    }
    Ok(())
}

fn run_task(service: &mut Service<'_>, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::Add {
            name,
            due,
            desc,
            email,
        } => {
            let input = NewTask {
                name,
                description: desc,
                due_date: due,
                email,
            };
            let id = service.add_task(&input)?;
            eprintln!("Added task '{}' ({id})", input.name.trim());
        }

        TaskCommand::List { full, json } => {
            let rows = output::task_rows(service.tasks(), service.now());
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                eprintln!("No tasks");
            } else {
                print!("{}", output::format_task_list(&rows, full));
            }
        }

        TaskCommand::Done { task } => {
            let id = resolve::resolve_task(service.tasks(), &task)?;
            service.complete_task(id)?;
            let late = service.task(id).is_some_and(|task| task.late);
            if late {
                eprintln!("Marked '{task}' as done (late)");
            } else {
                eprintln!("Marked '{task}' as done");
            }
        }

        TaskCommand::Toggle { task } => {
            let id = resolve::resolve_task(service.tasks(), &task)?;
            service.toggle_description(id)?;
            let expanded = service.task(id).is_some_and(|task| task.expanded);
            eprintln!(
                "{} description of '{task}'",
                if expanded { "Expanded" } else { "Collapsed" }
            );
        }

        TaskCommand::Update {
            task,
            name,
            desc,
            clear_desc,
            due,
            email,
            clear_email,
            reopen,
        } => {
            let id = resolve::resolve_task(service.tasks(), &task)?;
            let patch = TaskPatch {
                name,
                description: if clear_desc { Some(None) } else { desc.map(Some) },
                submission_date: due,
                completed: reopen.then_some(false),
                late: None,
                expanded: None,
                email: if clear_email { Some(None) } else { email.map(Some) },
            };
            if patch.is_empty() {
                eprintln!("Nothing to update");
                return Ok(());
            }
            service.update_task(id, &patch)?;
            eprintln!("Updated task '{task}'");
        }

        TaskCommand::Rm { task, yes } => {
            let id = resolve::resolve_task(service.tasks(), &task)?;
            let owner = service
                .selected_person()
                .map(|person| person.id)
                .ok_or(DashboardError::NoPersonSelected)?;
            let request = service.request_removal(RemovalTarget::Task { owner, task: id })?;
            let subject = request.subject().to_string();
            match confirm_removal(service, request, yes)? {
                RemovalOutcome::Removed => eprintln!("Removed task '{subject}'"),
                RemovalOutcome::Cancelled => eprintln!("Cancelled"),
            }
        }
    }
    Ok(())
}

fn confirm_removal(
    service: &mut Service<'_>,
    request: taskboard_core::ConfirmationRequest,
    skip_prompt: bool,
) -> Result<RemovalOutcome> {
    let decision = if skip_prompt {
        Decision::Confirm
    } else {
        prompt::confirm(&request)
    };
    Ok(service.resolve_removal(request, decision)?)
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Person { command } => match command {
            PersonCommand::Add { .. } => "person_add",
            PersonCommand::Rename { .. } => "person_rename",
            PersonCommand::Emails { .. } => "person_emails",
            PersonCommand::Rm { .. } => "person_rm",
            PersonCommand::List { .. } => "person_list",
            PersonCommand::Select { .. } => "person_select",
        },
        Command::Task { command } => match command {
            TaskCommand::Add { .. } => "task_add",
            TaskCommand::List { .. } => "task_list",
            TaskCommand::Done { .. } => "task_done",
            TaskCommand::Toggle { .. } => "task_toggle",
            TaskCommand::Update { .. } => "task_update",
            TaskCommand::Rm { .. } => "task_rm",
        },
        Command::Stats { .. } => "stats",
    }
}
