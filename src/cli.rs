//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "weather-charts", version, about = "Hourly forecast charts for a fixed list of locations")]
pub struct Cli {
    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, env = "WEATHER_CHARTS_CONFIG")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_reload_loop() {
        let cli = Cli::try_parse_from(["weather-charts"]).unwrap();
        assert!(!cli.once);
    }

    #[test]
    fn test_once_flag() {
        let cli = Cli::try_parse_from(["weather-charts", "--once"]).unwrap();
        assert!(cli.once);
    }

    #[test]
    fn test_config_path() {
        let cli =
            Cli::try_parse_from(["weather-charts", "--config", "/tmp/charts.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/charts.toml")));
    }

    #[test]
    fn test_misspelled_flag_is_rejected() {
        assert!(Cli::try_parse_from(["weather-charts", "--onse"]).is_err());
        assert!(Cli::try_parse_from(["weather-charts", "once"]).is_err());
    }
}
