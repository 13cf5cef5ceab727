use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

use watchdesk::api::types::{ApiError, LoginForm, MonitorForm};
use watchdesk::config::{ConfigError, ConsoleConfig};
use watchdesk::error::{ErrorCode, describe};
use watchdesk::guard::LOGIN_PATH;
use watchdesk::router::RouterError;
use watchdesk::{App, CredentialPersistence, FileStorage, Location, MemoryStorage, SessionError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Router(#[from] RouterError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Api(e) => e.error_code(),
            Self::Session(e) => e.error_code(),
            Self::Router(e) => e.error_code(),
            Self::InvalidJson(_) => "E_INVALID_JSON",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "watchdesk", about = "Traffic-monitoring console session CLI")]
struct Cli {
    /// Console API base URL (overrides `CONSOLE_BASE_URL`).
    #[arg(long)]
    base_url: Option<String>,

    /// Directory holding the persisted session (overrides `CONSOLE_STATE_DIR`).
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Keep the session in memory only.
    #[arg(long, default_value_t = false)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in, load the profile and land on the post-login route.
    Login {
        #[arg(long, env = "CONSOLE_USERNAME")]
        username: String,
        #[arg(long, env = "CONSOLE_PASSWORD", hide_env_values = true)]
        password: String,
        /// Location the login was reached from (e.g. `/login?redirect=/user`).
        #[arg(long, default_value = LOGIN_PATH)]
        from: String,
        #[arg(long, default_value_t = false)]
        skip_profile: bool,
    },
    /// Reload roles and permissions for the current session.
    Profile,
    /// Print the current session.
    Whoami,
    Logout,
    /// Resolve a navigation through the guard and route table.
    Navigate { location: String },
    /// List sidebar routes.
    Routes,
    Alarm(AlarmCommand),
    Monitor(MonitorCommand),
}

#[derive(Args, Debug)]
struct AlarmCommand {
    #[command(subcommand)]
    command: AlarmSubcommand,
}

#[derive(Subcommand, Debug)]
enum AlarmSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[derive(Args, Debug)]
struct MonitorCommand {
    #[command(subcommand)]
    command: MonitorSubcommand,
}

#[derive(Subcommand, Debug)]
enum MonitorSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    Submit {
        #[arg(long)]
        data: String,
    },
    Update {
        #[arg(long)]
        data: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!(error = %e, ".env could not be loaded");
        }
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", describe(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ConsoleConfig::from_env()?;
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url)?;
    }
    if let Some(dir) = cli.state_dir {
        config = config.with_state_dir(dir);
    }

    let storage: Arc<dyn CredentialPersistence> = if cli.ephemeral {
        Arc::new(MemoryStorage::new())
    } else {
        Arc::new(FileStorage::new(&config.state_dir))
    };
    let mut app = App::from_config(&config, storage)?;
    app.store.rehydrate()?;

    match cli.command {
        Command::Login { username, password, from, skip_profile } => {
            run_login(&mut app, LoginForm { username, password }, &from, skip_profile).await
        }
        Command::Profile => {
            let info = app.store.fetch_profile().await?;
            print_json(&info)
        }
        Command::Whoami => print_json(&app.store.session().snapshot()),
        Command::Logout => {
            app.store.logout().await?;
            print_json(&app.store.session().snapshot())
        }
        Command::Navigate { location } => {
            let resolved = app.router.navigate(&location)?;
            print_json(&resolved)
        }
        Command::Routes => print_json(&app.router.menu()),
        Command::Alarm(alarm) => match alarm.command {
            AlarmSubcommand::List { page } => print_json(&app.api.alarm_list(page).await?),
        },
        Command::Monitor(monitor) => run_monitor(&app, monitor).await,
    }
}

async fn run_login(app: &mut App, form: LoginForm, from: &str, skip_profile: bool) -> Result<(), CliError> {
    app.store.login(&form).await?;
    if !skip_profile {
        match app.store.fetch_profile().await {
            Ok(_) => {}
            Err(e @ SessionError::ProfileFetchIncomplete { .. }) => {
                warn!(error = %e, "continuing without profile");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let target = Location::parse(from).post_login_target();
    let resolved = app.router.navigate(&target)?;
    print_json(&serde_json::json!({
        "session": app.store.session().snapshot(),
        "landed": resolved,
    }))
}

async fn run_monitor(app: &App, monitor: MonitorCommand) -> Result<(), CliError> {
    match monitor.command {
        MonitorSubcommand::List { page } => print_json(&app.api.monitor_list(page).await?),
        MonitorSubcommand::Submit { data } => {
            let form: MonitorForm = serde_json::from_str(&data)?;
            print_json(&app.api.submit_monitor_form(&form).await?)
        }
        MonitorSubcommand::Update { data } => {
            let form: MonitorForm = serde_json::from_str(&data)?;
            print_json(&app.api.update_monitor_form(&form).await?)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
