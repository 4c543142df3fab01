use std::path::PathBuf;

use sw_report::generate_report;
use sw_types::ReportConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ENV_CONFIG: &str = "STOCKWATCH_CONFIG";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockwatch=info,sw_data=info,sw_risk=info,sw_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ENV_CONFIG).ok())
        .map(PathBuf::from);

    let config = match config_path {
        Some(path) => ReportConfig::from_json_file(&path)?,
        None => ReportConfig::default(),
    };
    let config = config.apply_env_overrides()?;

    tracing::info!("Reporting on {} sources for {}", config.sources.len(), config.window);

    let output = generate_report(&config)?;
    println!("{}", output);
    Ok(())
}
