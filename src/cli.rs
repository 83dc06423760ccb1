//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Overrides;

#[derive(Parser, Debug)]
#[command(name = "healthportal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "HEALTHPORTAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Storage backend: memory or sqlite
    #[arg(long)]
    pub storage: Option<String>,

    /// SQLite database file (implies --storage sqlite)
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Log filter, e.g. "healthportal=debug"
    #[arg(short, long)]
    pub log: Option<String>,
}

impl Cli {
    /// Flags as the highest-precedence configuration layer.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            storage: self.storage.clone(),
            database: self.database.clone(),
            log_filter: self.log.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_into_overrides() {
        let cli = Cli::try_parse_from([
            "healthportal",
            "--host",
            "0.0.0.0",
            "-p",
            "8080",
            "--database",
            "portal.db",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(overrides.port, Some(8080));
        assert_eq!(overrides.database, Some(PathBuf::from("portal.db")));
        assert!(overrides.storage.is_none());
    }

    #[test]
    fn no_flags_means_no_overrides() {
        let cli = Cli::try_parse_from(["healthportal"]).unwrap();
        let overrides = cli.overrides();
        assert!(overrides.host.is_none());
        assert!(overrides.port.is_none());
        assert!(overrides.log_filter.is_none());
    }

    #[test]
    fn port_zero_is_rejected() {
        assert!(Cli::try_parse_from(["healthportal", "--port", "0"]).is_err());
    }
}
