use anyhow::Context;
use clap::Parser;
use lyceum::{
    app_state, http::setup_http_server, init_telemetry, services::AuthorizationService,
    settings::config::Settings,
};
use lyceum_core::authorization::CampusId;
use tokio::time::sleep;
use tracing::info;

#[derive(Parser)]
#[command(name = "lyceum")]
#[command(about = "Campus-scoped role based authorization service")]
#[clap(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser)]
enum Commands {
    /// Show current configuration and exit
    Config,
    /// Evaluate a single permission check against the policy and exit
    Check {
        /// User email as used in the policy file
        user: String,
        /// Permission code, e.g. news.edit
        permission: String,
        /// Campus the action targets
        #[arg(long)]
        campus: Option<CampusId>,
    },
    /// Start the lyceum server (default)
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::new()?;

    match cli.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Config => {
            println!("{:#?}", &settings);
            return Ok(());
        }
        Commands::Check {
            user,
            permission,
            campus,
        } => {
            init_telemetry::init_telemetry_and_tracing(settings.debug)?;
            // No fallback here, a broken policy file must not read as a denial
            let auth_service = AuthorizationService::new(&settings.rbac.policy_path)
                .await
                .with_context(|| {
                    format!(
                        "Failed to load authorization policy from '{}'",
                        settings.rbac.policy_path
                    )
                })?;
            let decision = auth_service
                .check_permission(user, permission, *campus)
                .await;
            println!(
                "{}: {}",
                if decision.is_allowed() { "allowed" } else { "denied" },
                decision.reason()
            );
            return Ok(());
        }
        Commands::Run => {
            // Continue with the normal server startup
        }
    }

    init_telemetry::init_telemetry_and_tracing(settings.debug)?;

    let bind_address = settings.api.bind_address.clone();
    let app_state = app_state::AppState::new(settings).await?;

    let mut handles = vec![setup_http_server(app_state.clone(), &bind_address).await?];

    sleep(std::time::Duration::from_millis(100)).await;

    loop {
        handles.retain(|handle| !handle.is_finished());

        if handles.is_empty() {
            info!("All tasks are done");
            break;
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
    }

    Ok(())
}
