//! Check execution
//!
//! Runs a scenario through the runner and judges the outcome against its
//! manifest, printing progress to stdout unless silenced.

use colored::Colorize;
use serde::Serialize;

use super::manifest::ScenarioManifest;
use crate::backend::BuildBackend;
use crate::common::Result;
use crate::runner::ScenarioRunner;

/// How much progress a check prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Print nothing; the caller reports the results
    Silent,
    Normal,
    /// Also print the request and each package's files
    Verbose,
}

impl Progress {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Silent,
            (false, true) => Self::Verbose,
            (false, false) => Self::Normal,
        }
    }
}

/// Result of checking one scenario
#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    /// Ids of the packages the build produced
    pub packages: Vec<String>,
    pub error: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, packages: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            packages,
            error: None,
        }
    }

    fn fail(name: &str, packages: Vec<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            packages,
            error: Some(error.into()),
        }
    }
}

/// Check a scenario against its `scenario.yaml`
///
/// A missing manifest means "the build succeeds". Workflow failures become a
/// failed result; only an unreadable manifest is returned as an error.
pub async fn check_scenario<B: BuildBackend>(
    runner: &ScenarioRunner<B>,
    name: &str,
    progress: Progress,
) -> Result<CheckResult> {
    let manifest = match runner.assets().manifest_path(name) {
        Ok(Some(path)) => ScenarioManifest::load(&path)?,
        // A missing scenario is reported by the run itself
        Ok(None) | Err(_) => ScenarioManifest::default(),
    };

    let show = progress != Progress::Silent;
    let verbose = progress == Progress::Verbose;

    if show {
        println!(
            "\n{} {}",
            "Checking Scenario:".blue().bold(),
            name.white().bold()
        );
        if let Some(desc) = &manifest.description {
            println!("  {}", desc.dimmed());
        }
    }

    let request = manifest.request(name);
    if verbose {
        if let Some(target) = request.target() {
            println!("  Target: {}", target.dimmed());
        }
        for (key, value) in request.properties() {
            println!("  {} = {}", key.dimmed(), value.dimmed());
        }
    }

    let result = if !manifest.expect.success {
        match runner.run_and_expect_failure(&request).await {
            Ok(()) => {
                if show {
                    println!("  {} Build failed as expected", "✓".green());
                }
                CheckResult::pass(name, Vec::new())
            }
            Err(e) => CheckResult::fail(name, Vec::new(), e.to_string()),
        }
    } else {
        match runner.run_many(&request).await {
            Ok(packages) => {
                if show {
                    for package in &packages {
                        println!(
                            "  {} {} {}",
                            "✓".green(),
                            package.id,
                            package.version.dimmed()
                        );
                        if verbose {
                            for file in &package.files {
                                println!("      {}", file.dimmed());
                            }
                        }
                    }
                }

                let produced: Vec<String> = packages.ids().into_iter().map(String::from).collect();
                match &manifest.expect.packages {
                    Some(expected) if !same_ids(expected, &produced) => CheckResult::fail(
                        name,
                        produced.clone(),
                        format!(
                            "Expected packages [{}], got [{}]",
                            expected.join(", "),
                            produced.join(", ")
                        ),
                    ),
                    _ => CheckResult::pass(name, produced),
                }
            }
            Err(e) => CheckResult::fail(name, Vec::new(), e.to_string()),
        }
    };

    if show {
        match &result.error {
            None => println!("\n{} {}\n", "✓".green().bold(), "Check Passed".green().bold()),
            Some(error) => println!("  {} {}\n", "✗".red(), error),
        }
    }

    Ok(result)
}

/// Compare id lists as case-insensitive sets
fn same_ids(expected: &[String], produced: &[String]) -> bool {
    let normalize = |ids: &[String]| {
        let mut ids: Vec<String> = ids.iter().map(|id| id.to_lowercase()).collect();
        ids.sort();
        ids.dedup();
        ids
    };
    normalize(expected) == normalize(produced)
}
