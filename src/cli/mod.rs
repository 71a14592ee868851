//! CLI command handling
//!
//! Builds a runner from configuration and formats results.

use std::path::PathBuf;

use crate::assets::ScenarioAssets;
use crate::check;
use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::package::{ArtifactSet, PackageDescriptor};
use crate::runner::{ScenarioRequest, ScenarioRunner};

/// Options shared by every command
#[derive(Debug, Default)]
pub struct GlobalOptions {
    /// Explicit configuration file instead of the platform default
    pub config: Option<PathBuf>,
    /// Assets root overriding the configured one
    pub assets: Option<PathBuf>,
}

impl GlobalOptions {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Some(root) = &self.assets {
            config.assets.root = root.clone();
        }
        Ok(config)
    }
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, options: GlobalOptions) -> Result<()> {
    let config = options.load_config()?;

    match command {
        Commands::List => {
            let assets = ScenarioAssets::from_config(&config.assets);
            let names = assets.list()?;
            if names.is_empty() {
                println!("No scenarios under {}", assets.root().display());
            }
            for name in names {
                println!("{}", name);
            }
            Ok(())
        }

        Commands::Build {
            name,
            target,
            properties,
            json,
        } => {
            let runner = ScenarioRunner::from_config(&config)?;
            let mut request = ScenarioRequest::new(name).with_properties(properties);
            if let Some(target) = target {
                request = request.with_target(target);
            }

            let packages = runner.run_many(&request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&packages)?);
            } else {
                print_packages(&packages);
            }
            Ok(())
        }

        Commands::Single {
            name,
            package,
            properties,
            json,
        } => {
            let runner = ScenarioRunner::from_config(&config)?;
            let mut request = ScenarioRequest::new(name).with_properties(properties);
            if let Some(package) = package {
                request = request.with_target(package);
            }

            let package = runner.run_single(&request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&package)?);
            } else {
                print_package(&package);
                for file in &package.files {
                    println!("  {}", file);
                }
            }
            Ok(())
        }

        Commands::ExpectFailure {
            name,
            target,
            properties,
        } => {
            let runner = ScenarioRunner::from_config(&config)?;
            let mut request = ScenarioRequest::new(name.clone()).with_properties(properties);
            if let Some(target) = target {
                request = request.with_target(target);
            }

            runner.run_and_expect_failure(&request).await?;
            println!("Scenario '{}' failed to build, as expected", name);
            Ok(())
        }

        Commands::Check {
            names,
            verbose,
            json,
        } => {
            let runner = ScenarioRunner::from_config(&config)?;
            let names = if names.is_empty() {
                runner.assets().list()?
            } else {
                names
            };

            // JSON goes to stdout alone
            let progress = check::Progress::from_flags(verbose, json);
            let mut results = Vec::with_capacity(names.len());
            for name in &names {
                results.push(check::check_scenario(&runner, name, progress).await?);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }

            let failed = results.iter().filter(|r| !r.passed).count();
            if failed > 0 {
                return Err(Error::ChecksFailed {
                    failed,
                    total: results.len(),
                });
            }
            Ok(())
        }
    }
}

fn print_packages(packages: &ArtifactSet) {
    for package in packages {
        print_package(package);
    }
}

fn print_package(package: &PackageDescriptor) {
    println!(
        "{} {}  {}",
        package.id,
        package.version,
        package.path.display()
    );
}
