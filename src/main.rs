//! Shiftdesk - workforce scheduling server
//!
//! Serves the scheduling API and provides a few operator commands for
//! migrations, user provisioning and development tokens.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shiftdesk_api::{ApiServer, ApiServerConfig};
use shiftdesk_auth::{JwtClaims, JwtValidator};
use shiftdesk_core::{users, NewUser};
use std::net::SocketAddr;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Longest lifetime `token` will mint
const MAX_TOKEN_HOURS: i64 = 24 * 366;

/// Shiftdesk - schedule shifts across workspaces
#[derive(Parser, Debug)]
#[command(name = "shiftdesk")]
#[command(about = "Shiftdesk - schedule shifts across workspaces")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ", built ", env!("BUILD_TIME"), ")"))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    #[command(long_about = r#"
Run the HTTP API server. Pending migrations are applied on startup.

EXAMPLES:
  # Local development with SQLite
  shiftdesk serve --database-url "sqlite://shiftdesk.db?mode=rwc" \
    --jwt-secret "$SHIFTDESK_JWT_SECRET"

  # PostgreSQL, CORS disabled
  shiftdesk serve --bind 0.0.0.0:8080 \
    --database-url postgres://shiftdesk@localhost/shiftdesk \
    --jwt-secret "$SHIFTDESK_JWT_SECRET" --no-cors

ENVIRONMENT VARIABLES:
  SHIFTDESK_BIND          Address to bind the API server
  SHIFTDESK_DATABASE_URL  Database connection URL
  SHIFTDESK_JWT_SECRET    HS256 secret for session tokens
    "#)]
    Serve {
        /// Address to bind the API server
        #[arg(long, env = "SHIFTDESK_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Database connection URL (sqlite:// or postgres://)
        #[arg(long, env = "SHIFTDESK_DATABASE_URL")]
        database_url: String,

        /// Secret used to validate session tokens
        #[arg(long, env = "SHIFTDESK_JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,

        /// Disable CORS for browser origins on localhost
        #[arg(long)]
        no_cors: bool,
    },

    /// Apply pending database migrations and exit
    Migrate {
        /// Database connection URL
        #[arg(long, env = "SHIFTDESK_DATABASE_URL")]
        database_url: String,
    },

    /// Manage user profiles
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Mint a session token for an existing user (development only)
    Token {
        /// User to issue the token for
        #[arg(long)]
        user_id: Uuid,

        /// Secret the server validates tokens with
        #[arg(long, env = "SHIFTDESK_JWT_SECRET", hide_env_values = true)]
        jwt_secret: String,

        /// Token lifetime in hours (at most one year)
        #[arg(
            long,
            default_value = "24",
            value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_HOURS)
        )]
        hours: i64,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    /// Add a user profile
    Add {
        /// Database connection URL
        #[arg(long, env = "SHIFTDESK_DATABASE_URL")]
        database_url: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        phone: Option<String>,
    },
}

/// Setup logging with the specified log level
///
/// `RUST_LOG` takes precedence over `--verbose` when set.
fn setup_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

async fn open_database(database_url: &str) -> Result<sea_orm::DatabaseConnection> {
    let db = shiftdesk_db::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database at {}", database_url))?;

    shiftdesk_db::migrate(&db)
        .await
        .context("Failed to run database migrations")?;

    Ok(db)
}

async fn serve(bind: SocketAddr, database_url: &str, jwt_secret: String, cors: bool) -> Result<()> {
    if jwt_secret.is_empty() {
        anyhow::bail!("--jwt-secret must not be empty");
    }
    if !cors {
        info!("CORS disabled");
    }

    let db = open_database(database_url).await?;

    let server = ApiServer::new(
        ApiServerConfig {
            bind_addr: bind,
            enable_cors: cors,
            jwt_secret,
        },
        db,
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let server_task = tokio::spawn(server.start());

    tokio::select! {
        _ = &mut ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        result = server_task => {
            match result {
                Ok(Ok(())) => info!("Server stopped"),
                Ok(Err(e)) => {
                    error!("Server error: {:#}", e);
                    return Err(e);
                }
                Err(e) => {
                    error!("Server task panicked: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Serve {
            bind,
            database_url,
            jwt_secret,
            no_cors,
        } => {
            info!("Shiftdesk {} ({}) starting...", env!("GIT_TAG"), env!("GIT_HASH"));
            serve(bind, &database_url, jwt_secret, !no_cors).await
        }
        Commands::Migrate { database_url } => {
            open_database(&database_url).await?;
            info!("Migrations applied");
            Ok(())
        }
        Commands::User {
            command:
                UserCommands::Add {
                    database_url,
                    email,
                    first_name,
                    last_name,
                    phone,
                },
        } => {
            let db = open_database(&database_url).await?;
            let user = users::create_user(
                &db,
                NewUser {
                    email,
                    first_name,
                    last_name,
                    phone,
                },
            )
            .await
            .context("Failed to create user")?;

            println!("{}", user.id);
            Ok(())
        }
        Commands::Token {
            user_id,
            jwt_secret,
            hours,
        } => {
            warn!("Issuing a development token for user {}", user_id);

            let claims = JwtClaims::session(user_id, chrono::Duration::hours(hours));
            let token = JwtValidator::encode(jwt_secret.as_bytes(), &claims)
                .context("Failed to encode token")?;

            println!("{}", token);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_hours(args: &[&str]) -> Result<i64, clap::Error> {
        let user_id = Uuid::new_v4().to_string();
        let mut argv = vec!["shiftdesk", "token", "--user-id", user_id.as_str(), "--jwt-secret", "s"];
        argv.extend_from_slice(args);

        match Cli::try_parse_from(argv)?.command {
            Commands::Token { hours, .. } => Ok(hours),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_token_hours_default_and_bounds() {
        assert_eq!(token_hours(&[]).unwrap(), 24);
        assert_eq!(token_hours(&["--hours", "8784"]).unwrap(), MAX_TOKEN_HOURS);

        assert!(token_hours(&["--hours", "0"]).is_err());
        assert!(token_hours(&["--hours", "8785"]).is_err());
        assert!(token_hours(&["--hours", "9223372036854775807"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;

        Cli::command().debug_assert();
    }
}
