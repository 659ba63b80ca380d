//! `velithra` command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use velithra_access::GuardDecision;
use velithra_auth::{RouteMatching, SessionState};

use crate::api::RegisterRequest;
use crate::app::AppState;
use crate::config::{ClientConfig, DEFAULT_API_URL, DEFAULT_MODULE_TTL_SECS};

/// Velithra admin client
#[derive(Parser, Debug)]
#[command(name = "velithra", version, about = "Velithra admin client", propagate_version = true)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, default_value = DEFAULT_API_URL, env = "VELITHRA_API_URL", global = true)]
    pub api_url: String,

    /// Directory for persisted session and module state
    #[arg(long, env = "VELITHRA_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Module cache lifetime in seconds
    #[arg(long, default_value_t = DEFAULT_MODULE_TTL_SECS, env = "VELITHRA_MODULE_TTL_SECS", global = true)]
    pub module_ttl_secs: u64,

    /// Route prefix comparison: `segment` (path boundary) or `raw` (plain prefix)
    #[arg(long, default_value = "segment", env = "VELITHRA_ROUTE_MATCHING", global = true)]
    pub route_matching: RouteMatching,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn client_config(&self) -> Result<ClientConfig> {
        let config = ClientConfig::resolve(&self.api_url, self.data_dir.clone(), self.module_ttl_secs)
            .context("invalid client configuration")?;
        Ok(config.with_route_matching(self.route_matching))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Sign in and cache the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "VELITHRA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        user_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "VELITHRA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Drop the cached session and modules
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Navigation entries for the signed-in user
    Nav {
        /// Only entries in this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Module availability as last reported by the backend
    Modules {
        /// Refetch even if the cache is fresh
        #[arg(long)]
        refresh: bool,
    },

    /// Evaluate a UI route against the signed-in roles
    CheckRoute { route: String },

    /// Evaluate an API endpoint against the signed-in roles
    CheckEndpoint { endpoint: String },

    /// GET a backend path and print the JSON body
    Get { path: String },
}

pub async fn run(command: Commands, app: &AppState) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            let session = app.login(&email, &password).await.context("login failed")?;
            println!("signed in as {} ({})", session.user_name, join_roles(&session.roles));
            if let Some(landing) = app.access().landing_route() {
                println!("landing route: {landing}");
            }
        }
        Commands::Register {
            user_name,
            email,
            password,
        } => {
            let request = RegisterRequest {
                user_name,
                email,
                password,
            };
            let session = app.register(&request).await.context("registration failed")?;
            println!("registered and signed in as {}", session.user_name);
        }
        Commands::Logout => {
            app.logout();
            println!("signed out");
        }
        Commands::Whoami => match app.auth().state() {
            SessionState::Authenticated(session) => {
                println!("{} <{}>", session.user_name, session.email);
                println!("roles: {}", join_roles(&session.roles));
            }
            _ => println!("not signed in"),
        },
        Commands::Nav { category } => {
            refresh_quietly(app).await;
            let entries = match category {
                Some(category) => app.access().modules_in_category(&category),
                None => app.access().navigation(),
            };
            for entry in entries {
                println!("{:<16} {:<24} {}", entry.code.as_str(), entry.name, entry.path);
            }
        }
        Commands::Modules { refresh } => {
            let outcome = app.refresh_modules(refresh).await.context("module refresh failed")?;
            tracing::debug!(?outcome, "module refresh");
            let snapshot = app.modules().snapshot();
            println!(
                "{}",
                serde_json::to_string_pretty(&snapshot.modules).context("serialize modules")?
            );
        }
        Commands::CheckRoute { route } => {
            let access = app.access();
            let decision = access.guard(&route, None);
            match (&decision, decision.redirect()) {
                (GuardDecision::Allow, _) => println!("allow {route}"),
                (GuardDecision::Loading, _) => println!("session not loaded"),
                (_, Some(redirect)) => println!("deny {route}: redirect to {redirect}"),
                (_, None) => println!("deny {route}"),
            }
            if let Some(explanation) = access.explain_route(&route) {
                println!("matching: {}", access.role_registry().route_matching());
                println!(
                    "{}",
                    serde_json::to_string_pretty(&explanation).context("serialize explanation")?
                );
            }
        }
        Commands::CheckEndpoint { endpoint } => match app.access().require_endpoint(&endpoint) {
            Ok(()) => println!("allow {endpoint} (advisory; the backend decides)"),
            Err(denied) => println!("deny: {denied}"),
        },
        Commands::Get { path } => {
            let body = app.request(&path).await.with_context(|| format!("GET {path}"))?;
            println!("{}", serde_json::to_string_pretty(&body).context("serialize response")?);
        }
    }
    Ok(())
}

/// Navigation needs module status; a failed refresh falls back to the cache.
async fn refresh_quietly(app: &AppState) {
    if !app.auth().is_authenticated() {
        return;
    }
    if let Err(err) = app.refresh_modules(false).await {
        tracing::warn!(error = %err, "using cached modules");
    }
}

fn join_roles(roles: &[velithra_auth::Role]) -> String {
    roles.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands_with_global_flags() {
        let cli = Cli::try_parse_from([
            "velithra",
            "check-route",
            "/hr/employees",
            "--api-url",
            "http://backend:5000",
            "--module-ttl-secs",
            "60",
        ])
        .unwrap();

        assert_eq!(cli.api_url, "http://backend:5000");
        assert_eq!(cli.module_ttl_secs, 60);
        assert_eq!(cli.route_matching, RouteMatching::Segment);
        assert!(matches!(cli.command, Commands::CheckRoute { ref route } if route == "/hr/employees"));
    }

    #[test]
    fn route_matching_flag_reaches_client_config() {
        let cli = Cli::try_parse_from([
            "velithra",
            "--route-matching",
            "raw",
            "--data-dir",
            "/tmp/velithra",
            "whoami",
        ])
        .unwrap();

        let config = cli.client_config().unwrap();
        assert_eq!(config.route_matching, RouteMatching::Raw);
    }

    #[test]
    fn unknown_route_matching_is_rejected() {
        let err = Cli::try_parse_from(["velithra", "--route-matching", "fuzzy", "whoami"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn login_takes_email_and_password() {
        let cli = Cli::try_parse_from(["velithra", "login", "--email", "a@velithra.io", "--password", "pw"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Login { ref email, .. } if email == "a@velithra.io"));
    }
}
