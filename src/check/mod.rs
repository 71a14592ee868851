//! Manifest-driven scenario checks
//!
//! A scenario directory may carry a `scenario.yaml` stating what its build
//! should produce. Checks run the scenario and compare the result against
//! it, reporting structured pass/fail results instead of raw logs.

mod checker;
mod manifest;

pub use checker::{check_scenario, CheckResult, Progress};
pub use manifest::{Expectation, ScenarioManifest};
