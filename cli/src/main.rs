mod views;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use session::config::BASE_URL_VAR;
use session::{AuthApi, FileStorage, HttpAuthApi, SessionConfig, SessionStore, Storage};

use crate::views::View;

type Store = SessionStore<HttpAuthApi, FileStorage>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] session::ConfigError),
    #[error("no token location; pass --token-file or set AUTHDASH_TOKEN_FILE")]
    NoTokenLocation,
    #[error("{0}")]
    Api(#[from] session::ApiError),
    #[error("{}", .0.user_message())]
    Session(#[from] session::SessionError),
    #[error("login accepted but the issued token could not be verified")]
    VerificationFailed,
    #[error("not signed in; run `dashboard login`")]
    NotSignedIn,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "dashboard", about = "Session shell for the dashboard authentication service")]
struct Cli {
    /// Base URL of the authentication service.
    #[arg(long, env = "AUTHDASH_API_URL")]
    api_url: Option<String>,

    /// File holding the persisted session token.
    #[arg(long, env = "AUTHDASH_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Log session activity to stderr.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the issued token.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "AUTHDASH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account. Does not sign in.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "AUTHDASH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the persisted token.
    Logout,
    /// Print the signed-in user as JSON.
    Whoami,
    /// Show the dashboard, or the sign-in prompt when signed out.
    Dashboard,
    /// Check that the authentication service is up.
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut store = build_store(&cli)?;

    match cli.command {
        Command::Login { username, password } => run_login(&mut store, &username, &password).await,
        Command::Register { username, email, password } => {
            run_register(&store, &username, &email, &password).await
        }
        Command::Logout => {
            println!("{}", logout_view(&mut store));
            Ok(())
        }
        Command::Whoami => run_whoami(&mut store).await,
        Command::Dashboard => {
            run_dashboard(&mut store).await;
            Ok(())
        }
        Command::Health => run_health(&store).await,
    }
}

fn build_store(cli: &Cli) -> Result<Store, CliError> {
    let config = SessionConfig::from_lookup(|key| {
        if key == BASE_URL_VAR { cli.api_url.clone() } else { std::env::var(key).ok() }
    })?;
    let token_file = cli
        .token_file
        .clone()
        .or_else(default_token_file)
        .ok_or(CliError::NoTokenLocation)?;
    tracing::debug!(base_url = %config.base_url, token_file = %token_file.display(), "session configured");

    let api = HttpAuthApi::new(&config)?;
    Ok(SessionStore::new(api, FileStorage::new(token_file)))
}

fn default_token_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "authdash").map(|dirs| dirs.data_dir().join("session.json"))
}

async fn run_login(store: &mut Store, username: &str, password: &str) -> Result<(), CliError> {
    let greeting = login_and_confirm(store, username, password).await?;
    println!("{greeting}");
    Ok(())
}

/// Sign in and require that the issued token verified.
async fn login_and_confirm<A: AuthApi, S: Storage>(
    store: &mut SessionStore<A, S>,
    username: &str,
    password: &str,
) -> Result<String, CliError> {
    store.login(username, password).await?;
    let session = store.session();
    let Some(user) = session.user.as_ref().filter(|_| session.is_authenticated) else {
        return Err(CliError::VerificationFailed);
    };
    Ok(format!("Signed in as {}.", user.username))
}

async fn run_register(store: &Store, username: &str, email: &str, password: &str) -> Result<(), CliError> {
    store.register(username, email, password).await?;
    println!("Registered {username}. Run `dashboard login` to sign in.");
    Ok(())
}

fn logout_view<A: AuthApi, S: Storage>(store: &mut SessionStore<A, S>) -> String {
    store.logout();
    View::Login.render()
}

async fn run_whoami(store: &mut Store) -> Result<(), CliError> {
    store.initialize().await;
    let session = store.session();
    let user = session.user.as_ref().filter(|_| session.is_authenticated).ok_or(CliError::NotSignedIn)?;
    print_json(&serde_json::to_value(user)?)
}

async fn run_dashboard(store: &mut Store) {
    store.initialize().await;
    let session = store.session();
    if let Some(view) = View::for_session(&session) {
        println!("{}", view.render());
    }
}

async fn run_health(store: &Store) -> Result<(), CliError> {
    let health = store.api().health().await?;
    println!("{}", health.status);
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
