use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use publish_launcher::config::LauncherConfig;
use publish_launcher::db::Database;
use publish_launcher::launch::LaunchOutcome;
use publish_launcher::pipeline::{launch_with_database, resolve_with_database, LaunchRequest};
use publish_launcher::api;

#[derive(Parser)]
#[command(name = "launchpub")]
#[command(about = "Open published files in their associated application")]
struct Cli {
    /// Config file (defaults to $PUBLISH_LAUNCHER_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a publish or version and open it
    Launch {
        /// PublishedFile, TankPublishedFile or Version
        entity_type: String,
        /// Selected ids; exactly one is supported
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Permission group of the requesting user
        #[arg(long, env = "PUBLISH_LAUNCHER_PERMISSION_GROUP")]
        permission_group: Option<String>,
    },
    /// Print the local path a publish or version resolves to
    Resolve {
        entity_type: String,
        #[arg(required = true)]
        ids: Vec<i64>,
        #[arg(long, env = "PUBLISH_LAUNCHER_PERMISSION_GROUP")]
        permission_group: Option<String>,
    },
    /// Load a JSON snapshot of tracking records into the database
    Import { file: PathBuf },
    /// Serve the launch command over HTTP for browser action menus
    Serve {
        #[arg(short, long, default_value = "9876")]
        port: u16,
    },
    /// Apply database migrations
    Migrate,
}

/// Logs go to stderr so stdout carries only command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "publish_launcher=info,tower_http=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_database() -> anyhow::Result<Database> {
    let db = Database::open_default()?;
    db.migrate()?;
    Ok(db)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let config = LauncherConfig::load(cli.config.as_deref());

    match cli.command {
        Commands::Launch {
            entity_type,
            ids,
            permission_group,
        } => {
            let db = open_database()?;
            let request = LaunchRequest {
                entity_type,
                selected_ids: ids,
                permission_group,
            };
            match launch_with_database(&db, &config, &request) {
                Ok(report) if report.outcome == LaunchOutcome::MissingOnDisk => {
                    return Ok(ExitCode::from(2));
                }
                Ok(report) => {
                    tracing::info!("Opened {} ({})", report.path, report.outcome.as_str());
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Resolve {
            entity_type,
            ids,
            permission_group,
        } => {
            let db = open_database()?;
            let request = LaunchRequest {
                entity_type,
                selected_ids: ids,
                permission_group,
            };
            match resolve_with_database(&db, &config, &request) {
                Ok((_, path)) => println!("{}", path),
                Err(e) => {
                    tracing::error!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Import { file } => {
            let db = open_database()?;
            let json = std::fs::read_to_string(&file)?;
            let summary = db.import_json(&json)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Serve { port } => {
            let db = open_database()?;
            let app = api::create_router(db, config);

            let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
            tracing::info!("Publish launcher listening on http://127.0.0.1:{}", port);

            axum::serve(listener, app).await?;
        }
        Commands::Migrate => {
            open_database()?;
            tracing::info!("Database is up to date");
        }
    }

    Ok(ExitCode::SUCCESS)
}
