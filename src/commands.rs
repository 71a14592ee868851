//! CLI command definitions
//!
//! Defines the clap commands for the scenario CLI.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// List the scenarios under the assets root
    List,

    /// Restore and build a scenario, listing the packages it produced
    Build {
        /// Scenario name (a directory under the assets root)
        name: String,

        /// Build only this project of the solution
        #[arg(long)]
        target: Option<String>,

        /// Build property, repeatable: -p Configuration=Release
        #[arg(long = "property", short = 'p', value_parser = parse_property)]
        properties: Vec<(String, String)>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore and build a scenario that must yield exactly one package
    Single {
        /// Scenario name
        name: String,

        /// Package id to build and select (case-insensitive)
        #[arg(long)]
        package: Option<String>,

        /// Build property, repeatable: -p Configuration=Release
        #[arg(long = "property", short = 'p', value_parser = parse_property)]
        properties: Vec<(String, String)>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore and build a scenario whose build must fail
    ExpectFailure {
        /// Scenario name
        name: String,

        /// Build only this project of the solution
        #[arg(long)]
        target: Option<String>,

        /// Build property, repeatable: -p Configuration=Release
        #[arg(long = "property", short = 'p', value_parser = parse_property)]
        properties: Vec<(String, String)>,
    },

    /// Check scenarios against their scenario.yaml (all scenarios if none given)
    Check {
        /// Scenario names
        names: Vec<String>,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Parse a `KEY=VALUE` build property
pub fn parse_property(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty property name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
