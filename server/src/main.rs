use reelup::{
    cron, routes,
    server::run_server,
    telemetry::{setup_sentry, setup_tracing},
    AppState,
};
use tracing::info;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Initialize Sentry for error tracking
    let _sentry_guard = setup_sentry();

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()?
        .block_on(async { run_application().await })
}

async fn run_application() -> reelup::Result<()> {
    setup_tracing("reelup")?;

    let app_state = AppState::from_env().await?;

    info!("Spawning application tasks");
    let futures = spawn_application_tasks(app_state);

    futures::future::try_join_all(futures)
        .await?
        .into_iter()
        .collect::<reelup::Result<Vec<()>>>()?;

    Ok(())
}

/// Spawn the server and background tasks that aren't disabled
fn spawn_application_tasks(
    app_state: AppState,
) -> Vec<tokio::task::JoinHandle<reelup::Result<()>>> {
    let mut futures = vec![];

    if is_feature_enabled("SERVER") {
        info!("Server Enabled");
        futures.push(tokio::spawn(run_server(routes::routes(app_state.clone()))));
    } else {
        info!("Server Disabled");
    }

    if is_feature_enabled("CRON") {
        info!("Cron Enabled");
        futures.push(tokio::spawn(cron::run_cron(app_state.clone())));
    } else {
        info!("Cron Disabled");
    }

    info!("All application tasks spawned successfully");
    futures
}

/// Check if a feature is enabled based on environment variables
fn is_feature_enabled(feature: &str) -> bool {
    std::env::var(format!("{}_DISABLED", feature)).unwrap_or_else(|_| "false".to_string()) != "true"
}
