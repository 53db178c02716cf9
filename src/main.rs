use anyhow::Result;
use clap::Parser;
use weather_charts::cli::Cli;
use wxc_core::{AppError, Config};
use wxc_weather::default_locations;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    wxc_core::init()?;

    let loaded = match &cli.config {
        Some(path) => Config::load_validated_from(path),
        None => Config::load_validated(),
    };
    let config = match loaded {
        Ok((config, _)) => config,
        Err(e) => {
            let err = AppError::Config(e);
            tracing::error!(hint = err.user_message(), "{}", err);
            return Err(err.into());
        }
    };

    let locations = default_locations();
    tracing::info!(
        locations = locations.len(),
        output = %config.output.dir.display(),
        "weather-charts started"
    );

    if cli.once {
        let summary = match weather_charts::run_cycle(&config, &locations).await {
            Ok(summary) => summary,
            Err(err) => {
                tracing::error!(hint = err.user_message(), "{}", err);
                return Err(err.into());
            }
        };
        println!(
            "Rendered {} of {} locations ({} skipped, {} failed)",
            summary.rendered.len(),
            summary.total(),
            summary.skipped.len(),
            summary.failed.len()
        );
        return Ok(());
    }

    weather_charts::run_forever(&config, &locations).await;
    Ok(())
}
