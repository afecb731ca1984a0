pub mod config;
pub mod entity;
pub mod journal;
pub mod login;
pub mod logout;
pub mod open;
pub mod status;
pub mod tree;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

use crate::api::{ApiClient, ApiRequest, Host, ReqwestTransport};
use crate::error::{DeskError, Result};
use crate::session::Session;
use crate::settings::{load_settings, storage_path, Settings};
use crate::storage::Storage;

#[derive(Parser)]
#[command(
    name = "ledgerdesk",
    version,
    about = "Terminal front-end for a double-entry bookkeeping API."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive terminal UI (the default).
    Open {
        /// Route to start on, e.g. "#tree" or "nav_journal"
        fragment: Option<String>,
    },
    /// Log in and store the access token.
    Login {
        /// Account email address
        #[arg(long)]
        email: String,
    },
    /// Forget the stored access token.
    Logout,
    /// Ask the server to email a password reset link.
    ResetPassword {
        /// Email address associated with the account
        email: String,
    },
    /// Show configuration and login state.
    Status,
    /// List your entities, or select one by id (a unique prefix is enough).
    Entity {
        /// Entity id to make current
        id: Option<String>,
    },
    /// Print one master account type as a tree with balances.
    Tree {
        /// Master type key (ASSET_LONG, ASSET_SHORT, ASSET_OWED, EXPENSE_OPERATING,
        /// EXPENSE_COGR, EQUITY, LIABILITY, INCOME)
        #[arg(long, default_value = "ASSET_LONG")]
        key: String,
    },
    /// List journal entries for the current entity.
    Journal {
        /// Maximum entries returned (1000, 100 or 10)
        #[arg(long = "max-rows", default_value_t = 1000)]
        max_rows: u32,
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
        /// Only entries touching this account name
        #[arg(long)]
        account: Option<String>,
    },
    /// Show or change settings.
    Config {
        /// API base URI, e.g. http://127.0.0.1:8000
        #[arg(long = "base-uri")]
        base_uri: Option<String>,
        /// Log filter used when RUST_LOG is unset (error, warn, info, debug, trace)
        #[arg(long = "log-level")]
        log_level: Option<String>,
    },
    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Alerts go to stderr in red; a 401 means the stored token is no good.
#[derive(Default)]
struct ConsoleHost {
    unauthorized: bool,
}

impl Host for ConsoleHost {
    fn alert(&mut self, message: &str) {
        eprintln!("{}", message.red());
    }

    fn redirect_to_login(&mut self) {
        self.unauthorized = true;
    }
}

/// What every network command needs: settings, storage and a client.
pub(crate) struct Console {
    pub settings: Settings,
    pub storage: Storage,
    pub client: ApiClient,
}

impl Console {
    pub fn open() -> Result<Self> {
        let settings = load_settings();
        let client = ApiClient::new(settings.api_root(), Arc::new(ReqwestTransport::new()?));
        Ok(Self {
            storage: Storage::open(&storage_path()),
            settings,
            client,
        })
    }

    pub fn session(&self) -> Result<Session> {
        Session::load(&self.storage).ok_or(DeskError::NotLoggedIn)
    }

    /// The session plus its selected entity.
    pub fn entity(&self) -> Result<(Session, String)> {
        let session = self.session()?;
        let entity = session.current_entity.clone().ok_or(DeskError::NoEntity)?;
        Ok((session, entity))
    }

    /// Run one request to completion. A failure, a 401 or a call that never
    /// completed all become errors.
    pub fn fetch(&self, token: Option<&str>, request: &ApiRequest) -> Result<Option<Value>> {
        let mut host = ConsoleHost::default();
        let mut fetched = None;
        let mut failed = None;
        self.client.call(
            token,
            request,
            &mut host,
            |body| fetched = Some(body),
            |message| failed = Some(message),
        );
        if host.unauthorized {
            return Err(DeskError::NotLoggedIn);
        }
        match (fetched, failed) {
            (Some(body), _) => Ok(body),
            (None, Some(message)) => Err(DeskError::Api(message)),
            (None, None) => Err(DeskError::Api(format!(
                "no usable response from {} (details in the log)",
                self.client.base_uri()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::api::testing::FakeTransport;

    fn console(transport: &Arc<FakeTransport>) -> Console {
        Console {
            settings: Settings::default(),
            storage: Storage::in_memory(),
            client: ApiClient::new("http://api.test", transport.clone()),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["ledgerdesk"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_fetch_maps_outcomes_to_errors() {
        let transport = FakeTransport::new();
        let console = console(&transport);
        transport.push_json(404, serde_json::json!({"detail": "Entity not found"}));
        let err = console.fetch(Some("tok"), &ApiRequest::get("/entities/me")).unwrap_err();
        assert_eq!(err.to_string(), "error 404, Entity not found");

        transport.push_json(401, serde_json::json!({"detail": "expired"}));
        let err = console.fetch(Some("tok"), &ApiRequest::get("/users/me")).unwrap_err();
        assert!(matches!(err, DeskError::NotLoggedIn));

        transport.push_error("connection refused");
        assert!(console.fetch(None, &ApiRequest::get("/users/me")).is_err());
    }

    #[test]
    fn test_entity_requires_login_then_selection() {
        let transport = FakeTransport::new();
        let mut console = console(&transport);
        assert!(matches!(console.entity(), Err(DeskError::NotLoggedIn)));
        console.storage.set(crate::storage::TOKEN_KEY, "tok").unwrap();
        assert!(matches!(console.entity(), Err(DeskError::NoEntity)));
    }
}
