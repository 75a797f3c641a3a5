//! Command-line front end.
//!
//! Each invocation restores the stored session, runs one command against
//! the backend and prints the resulting view.

use crate::config::{ClientConfig, MetricsConfig};
use crate::models::{LoginForm, RegisterForm, Task, TaskForm, VersionInfo};
use crate::services::{ApiClient, ApiClientMetrics, ApiError, SessionManager, TaskListController};
use crate::storage::FileStore;
use crate::views::{render_list, render_notices};
use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, info};

/// Manage your task list from the terminal
#[derive(Debug, Parser)]
#[command(name = "taskdeck")]
#[command(about = "Manage your task list from the terminal")]
#[command(version)]
pub struct Cli {
    /// Base URL of the task backend
    #[arg(long, env = "TASKDECK_API_URL", global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Directory holding the stored session
    #[arg(long, env = "TASKDECK_STATE_DIR", global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an account and log in
    Register { username: String, email: String },
    /// Log in with an existing account
    Login { email: String },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Show your tasks
    List,
    /// Add a task
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        /// Due date: YYYY-MM-DD, YYYY-MM-DDTHH:MM or RFC 3339
        #[arg(long, value_name = "WHEN")]
        due: Option<String>,
    },
    /// Toggle a task between open and done (list number, id, or id prefix)
    Done { task: String },
    /// Delete a task (list number, id, or id prefix)
    Delete { task: String },
    /// Show build information
    Version,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config = config.with_api_url(url.clone());
        }
        if let Some(dir) = &self.state_dir {
            config = config.with_state_dir(dir.clone());
        }
        config
    }
}

/// Run one command to completion
pub async fn run(cli: Cli) -> Result<()> {
    if let Command::Version = cli.command {
        let info = VersionInfo::current();
        println!(
            "taskdeck {} (commit {}, built {})",
            info.version, info.commit, info.build_time
        );
        return Ok(());
    }

    let config = cli.client_config();
    debug!(api_url = %config.api_url, state_dir = %config.state_dir.display(), "Loaded configuration");

    let metrics = if MetricsConfig::from_env().enabled {
        Some(ApiClientMetrics::new().context("Failed to create metrics")?)
    } else {
        None
    };
    let api = ApiClient::new(&config, metrics).map_err(|e| anyhow!(e.user_message()))?;
    let store = Arc::new(FileStore::new(config.state_dir.clone()));
    let mut session = SessionManager::new(api, store);

    let result = dispatch(cli.command, &mut session).await;

    if let Some(metrics) = session.api().metrics() {
        info!(metrics = %metrics.render().unwrap_or_default(), "Request metrics");
    }
    result
}

/// Run one command against an already restored session
pub async fn dispatch(command: Command, session: &mut SessionManager) -> Result<()> {
    match command {
        Command::Register { username, email } => {
            let password = read_password("Password: ")?;
            let confirm_password = read_password("Confirm password: ")?;
            let form = RegisterForm {
                username,
                email,
                password,
                confirm_password,
            };

            session
                .register_with_form(&form)
                .await
                .map_err(|e| auth_error(session, e))?;
            if let Some(s) = session.current_session() {
                println!("Registered and logged in as {}", s.username);
            }
            Ok(())
        }
        Command::Login { email } => {
            let password = read_password("Password: ")?;
            let form = LoginForm { email, password };

            session
                .login_with_form(&form)
                .await
                .map_err(|e| auth_error(session, e))?;
            if let Some(s) = session.current_session() {
                println!("Logged in as {}", s.username);
            }
            Ok(())
        }
        Command::Logout => {
            session.logout();
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => {
            match session.current_session() {
                Some(s) if s.email.is_empty() => println!("{}", s.username),
                Some(s) => println!("{} <{}>", s.username, s.email),
                None => println!("Not logged in"),
            }
            Ok(())
        }
        Command::List => {
            let mut tasks = open_list(session).await?;
            print_list(session, &mut tasks);
            Ok(())
        }
        Command::Add { title, due } => {
            require_session(session)?;
            let mut tasks = TaskListController::new(session.api().clone());
            let form = TaskForm::new(title.join(" "), due.unwrap_or_default());

            match tasks.submit(&form).await {
                Ok(task) => println!("Added: {}\n", task.title),
                Err(e) => {
                    let message = tasks
                        .form_error()
                        .map(str::to_string)
                        .unwrap_or_else(|| e.user_message());
                    bail!(message);
                }
            }

            // The task exists now; a failed refresh only costs the listing
            let loaded = tasks.load_tasks().await.map(|_| ());
            match loaded {
                Ok(()) => print_list(session, &mut tasks),
                Err(e) => eprintln!("Could not refresh the list: {}", e.user_message()),
            }
            Ok(())
        }
        Command::Done { task } => {
            let mut tasks = open_list(session).await?;
            let (id, completed) = {
                let found = resolve_task(tasks.tasks(), &task)
                    .ok_or_else(|| anyhow!("No task matches '{}'", task))?;
                (found.id.clone(), found.completed)
            };

            let result = tasks.toggle_complete(&id, completed).await;
            print_list(session, &mut tasks);
            result.map_err(|e| anyhow!("Could not update task: {}", e.user_message()))
        }
        Command::Delete { task } => {
            let mut tasks = open_list(session).await?;
            let id = resolve_task(tasks.tasks(), &task)
                .map(|t| t.id.clone())
                .ok_or_else(|| anyhow!("No task matches '{}'", task))?;

            let result = tasks.delete_task(&id).await;
            if result.is_ok() {
                println!("Deleted task {}\n", id);
            }
            print_list(session, &mut tasks);
            result.map_err(|e| anyhow!("Could not delete task: {}", e.user_message()))
        }
        Command::Version => Ok(()),
    }
}

/// Build a controller and load the list, or explain why that is not possible
async fn open_list(session: &SessionManager) -> Result<TaskListController> {
    require_session(session)?;

    let mut tasks = TaskListController::new(session.api().clone());
    let loaded = tasks.load_tasks().await.map(|_| ());
    if let Err(e) = loaded {
        let hint = match e {
            ApiError::Authentication { .. } => {
                "\nYour session may have expired; run `taskdeck login <email>` again"
            }
            _ => "",
        };
        let view = render_list(&tasks, None, Utc::now(), &Local);
        bail!("{} ({}){}", view, e.user_message(), hint);
    }
    Ok(tasks)
}

fn require_session(session: &SessionManager) -> Result<()> {
    if !session.is_authenticated() {
        bail!("Not logged in. Run `taskdeck login <email>` or `taskdeck register <username> <email>` first");
    }
    Ok(())
}

fn print_list(session: &SessionManager, tasks: &mut TaskListController) {
    let username = session.current_session().map(|s| s.username.as_str());
    println!("{}", render_list(tasks, username, Utc::now(), &Local));

    let notices = tasks.take_notices();
    if !notices.is_empty() {
        eprintln!("\n{}", render_notices(&notices));
    }
}

fn auth_error(session: &SessionManager, error: ApiError) -> anyhow::Error {
    anyhow!(
        session
            .last_error()
            .map(str::to_string)
            .unwrap_or_else(|| error.user_message())
    )
}

fn read_password(prompt: &str) -> Result<String> {
    if let Ok(password) = std::env::var("TASKDECK_PASSWORD") {
        return Ok(password);
    }
    rpassword::prompt_password(prompt).context("Failed to read password")
}

/// Find a task by 1-based list number, exact id, or unique id prefix
pub fn resolve_task<'a>(tasks: &'a [Task], selector: &str) -> Option<&'a Task> {
    let selector = selector.trim();
    if selector.is_empty() {
        return None;
    }

    if let Some(task) = tasks.iter().find(|t| t.id == selector) {
        return Some(task);
    }

    if let Ok(index) = selector.parse::<usize>() {
        if index >= 1 && index <= tasks.len() {
            return Some(&tasks[index - 1]);
        }
    }

    let mut matches = tasks.iter().filter(|t| t.id.starts_with(selector));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Some(task),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            completed: false,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            due_date: None,
        }
    }

    #[test]
    fn test_resolve_task() {
        let tasks = vec![task("65f0aa"), task("65f0bb"), task("7c01")];

        assert_eq!(resolve_task(&tasks, "2").map(|t| t.id.as_str()), Some("65f0bb"));
        assert_eq!(resolve_task(&tasks, "7c01").map(|t| t.id.as_str()), Some("7c01"));
        assert_eq!(resolve_task(&tasks, "7c").map(|t| t.id.as_str()), Some("7c01"));
        // Ambiguous prefix
        assert!(resolve_task(&tasks, "65f0").is_none());
        assert!(resolve_task(&tasks, "4").is_none());
        assert!(resolve_task(&tasks, "").is_none());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["taskdeck", "add", "Buy", "milk", "--due", "2026-11-01"]).unwrap();
        match cli.command {
            Command::Add { title, due } => {
                assert_eq!(title.join(" "), "Buy milk");
                assert_eq!(due.as_deref(), Some("2026-11-01"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["taskdeck", "--api-url", "http://x:1", "done", "3"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://x:1"));
        assert!(matches!(cli.command, Command::Done { .. }));

        assert!(Cli::try_parse_from(["taskdeck", "add"]).is_err());
    }
}
