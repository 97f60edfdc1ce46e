use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "incubator")]
#[command(about = "Configure an egg incubator and run its rotation cycles")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory holding incubator documents (overrides store.path)
    #[arg(long, global = true)]
    pub store_path: Option<String>,

    /// Incubator to operate on (overrides incubator.default_id)
    #[arg(short, long, global = true)]
    pub incubator: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Create or replace the incubator
    Create {
        /// Number of eggs in the incubator
        #[arg(long = "eggs")]
        number_of_eggs: String,

        /// Space separated egg ids, e.g. "0 1 2 3"
        #[arg(long, allow_hyphen_values = true)]
        sequence: String,

        /// Fraction of the sequence rotated per port run
        #[arg(long = "rotation")]
        rotation_amount: String,
    },
    /// Advance the incubator by one rotation cycle
    PortRun,
    /// Print the current incubator report
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create() {
        let config = CliConfig::parse_from([
            "incubator",
            "create",
            "--eggs",
            "4",
            "--sequence",
            "0 1 2 3",
            "--rotation",
            "0.5",
            "--incubator",
            "barn",
        ]);

        assert_eq!(config.incubator.as_deref(), Some("barn"));
        match config.command {
            CliCommand::Create {
                number_of_eggs,
                sequence,
                rotation_amount,
            } => {
                assert_eq!(number_of_eggs, "4");
                assert_eq!(sequence, "0 1 2 3");
                assert_eq!(rotation_amount, "0.5");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_port_run_with_globals() {
        let config =
            CliConfig::parse_from(["incubator", "-v", "port-run", "--store-path", "/tmp/eggs"]);
        assert!(config.verbose);
        assert_eq!(config.store_path.as_deref(), Some("/tmp/eggs"));
        assert!(matches!(config.command, CliCommand::PortRun));
    }
}
