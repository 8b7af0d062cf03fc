use ignite::prelude::*;
use tracing_subscriber::EnvFilter;

mod bootstrappers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ignite=debug")),
        )
        .init();

    tracing::info!("🚀 Starting bootstrap server...");

    // APPSETTINGS overrides the bundled settings file
    let settings_path = std::env::var("APPSETTINGS")
        .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/appsettings.json").to_string());
    let config = ConfigService::load(Some(std::path::Path::new(&settings_path)))?;
    let settings = BootstrapSettings::from_config(&config)?;

    let host = config.get_or("Server:Host", "0.0.0.0");
    let port = config.get_parsed::<u16>("Server:Port")?.unwrap_or(3000);

    let Bootstrapped {
        app,
        report,
        background,
    } = BootstrapEngine::from_settings(&settings)
        .run(AppBuilder::new(config))
        .await?;

    tracing::info!(
        run_id = %report.run_id,
        components = report.scheduled.len(),
        background = report.launched(),
        failures = report.failures().count(),
        "Bootstrap phases finished"
    );

    tokio::spawn(async move {
        match background.join().await {
            Ok(settled) => tracing::info!(
                completed = settled.completed,
                failed = settled.failures.len(),
                "✅ Background bootstrap work settled"
            ),
            Err(e) => tracing::error!(error = %e, "Background bootstrap sweep aborted"),
        }
    });

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!("✅ Server running on http://127.0.0.1:{}", port);

    app.serve(listener).await?;

    tracing::info!("👋 Server stopped");
    Ok(())
}
