//! Process-backed build backend
//!
//! Shells out to a NuGet-style restore tool and an MSBuild-compatible build
//! tool, capturing their output as diagnostics.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::{BuildBackend, BuildOutcome, Properties};
use crate::common::config::{Config, ToolConfig};
use crate::common::{Error, Result};

/// A resolved external program plus its leading arguments
#[derive(Debug, Clone)]
pub struct Tool {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Tool {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Resolve a configured tool, searching PATH when no program is given
    pub fn resolve(name: &str, config: &ToolConfig) -> Result<Self> {
        if let Some(program) = &config.program {
            if program.components().count() > 1 && !program.exists() {
                return Err(Error::tool_not_found(name, &[program.display().to_string()]));
            }
            return Ok(Self::new(program.clone(), config.args.clone()));
        }

        config
            .candidates
            .iter()
            .find_map(|candidate| which::which(candidate).ok())
            .map(|program| Self::new(program, config.args.clone()))
            .ok_or_else(|| Error::tool_not_found(name, &config.candidates))
    }

    /// Run the tool in `cwd` with extra arguments, capturing output
    async fn run(&self, cwd: &Path, extra: &[OsString]) -> Result<ToolOutput> {
        tracing::debug!(
            "Running {} {} {:?} in {}",
            self.program.display(),
            self.args.join(" "),
            extra,
            cwd.display()
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .args(extra)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|error| Error::ToolSpawn {
                program: self.program.clone(),
                error,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&stderr);
        }

        Ok(ToolOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            text,
        })
    }
}

struct ToolOutput {
    success: bool,
    exit_code: Option<i32>,
    text: String,
}

/// Build backend that runs real restore and build executables
#[derive(Debug, Clone)]
pub struct ProcessBackend {
    restore: Tool,
    build: Tool,
}

impl ProcessBackend {
    pub fn new(restore: Tool, build: Tool) -> Self {
        Self { restore, build }
    }

    /// Resolve both tools from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Tool::resolve("restore", &config.restore)?,
            Tool::resolve("build", &config.build)?,
        ))
    }
}

#[async_trait]
impl BuildBackend for ProcessBackend {
    async fn restore(&self, directory: &Path) -> Result<()> {
        let output = self
            .restore
            .run(directory, &[directory.as_os_str().to_owned()])
            .await?;

        if !output.success {
            return Err(Error::RestoreFailed {
                directory: directory.to_path_buf(),
                diagnostics: output.text,
            });
        }
        Ok(())
    }

    async fn rebuild(
        &self,
        project: &Path,
        target: Option<&str>,
        properties: &Properties,
    ) -> Result<BuildOutcome> {
        let cwd = project.parent().unwrap_or(Path::new("."));
        let args: Vec<OsString> = rebuild_args(project, target, properties)
            .into_iter()
            .map(OsString::from)
            .collect();

        let output = self.build.run(cwd, &args).await?;

        Ok(if output.success {
            BuildOutcome::succeeded(output.text)
        } else {
            BuildOutcome::failed(output.exit_code, output.text)
        })
    }
}

/// Per-invocation MSBuild arguments for a clean rebuild
///
/// Solution project targets replace `.` with `_`, so a target name of
/// `Contoso.Tool` becomes `/t:Contoso_Tool:Rebuild`.
pub fn rebuild_args(project: &Path, target: Option<&str>, properties: &Properties) -> Vec<String> {
    let target = match target {
        Some(name) => format!("/t:{}:Rebuild", name.replace('.', "_")),
        None => "/t:Rebuild".to_string(),
    };

    let mut args = vec![project.display().to_string(), target];
    args.extend(
        properties
            .iter()
            .map(|(key, value)| format!("/p:{key}={value}")),
    );
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_args_whole_solution() {
        let args = rebuild_args(Path::new("/s/Single.sln"), None, &Properties::new());
        assert_eq!(args, vec!["/s/Single.sln", "/t:Rebuild"]);
    }

    #[test]
    fn test_rebuild_args_target_and_sorted_properties() {
        let mut properties = Properties::new();
        properties.insert("Version".to_string(), "2.0.0".to_string());
        properties.insert("Configuration".to_string(), "Release".to_string());

        let args = rebuild_args(
            Path::new("/s/Multi.sln"),
            Some("Contoso.Tool"),
            &properties,
        );
        assert_eq!(
            args,
            vec![
                "/s/Multi.sln",
                "/t:Contoso_Tool:Rebuild",
                "/p:Configuration=Release",
                "/p:Version=2.0.0",
            ]
        );
    }

    #[test]
    fn test_resolve_missing_candidates() {
        let config = ToolConfig {
            program: None,
            candidates: vec!["definitely-not-a-real-build-tool".to_string()],
            args: Vec::new(),
        };
        let err = Tool::resolve("build", &config).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
        assert!(err.to_string().contains("definitely-not-a-real-build-tool"));
    }

    #[test]
    fn test_resolve_explicit_program() {
        let config = ToolConfig {
            program: Some(PathBuf::from("msbuild")),
            candidates: Vec::new(),
            args: vec!["/nologo".to_string()],
        };
        let tool = Tool::resolve("build", &config).unwrap();
        assert_eq!(tool.program, PathBuf::from("msbuild"));
        assert_eq!(tool.args, vec!["/nologo"]);
    }

    #[test]
    fn test_resolve_missing_explicit_path() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("tools/msbuild");
        let config = ToolConfig {
            program: Some(missing.clone()),
            candidates: vec!["msbuild".to_string()],
            args: Vec::new(),
        };

        let err = Tool::resolve("build", &config).unwrap_err();
        match err {
            Error::ToolNotFound { name, searched } => {
                assert_eq!(name, "build");
                assert_eq!(searched, missing.display().to_string());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_restore_failure_carries_output() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = ProcessBackend::new(
            Tool::new("sh", vec!["-c".into(), "echo unable to restore >&2; exit 3".into()]),
            Tool::new("true", Vec::new()),
        );

        let err = backend.restore(tmp.path()).await.unwrap_err();
        match err {
            Error::RestoreFailed { diagnostics, .. } => {
                assert!(diagnostics.contains("unable to restore"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rebuild_maps_exit_status() {
        let tmp = tempfile::tempdir().unwrap();
        let project = tmp.path().join("A.sln");
        std::fs::write(&project, "").unwrap();

        let failing = ProcessBackend::new(
            Tool::new("true", Vec::new()),
            Tool::new("sh", vec!["-c".into(), "echo 'A.sln: error X1: boom'; exit 1".into()]),
        );
        let outcome = failing
            .rebuild(&project, None, &Properties::new())
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(1));
        assert_eq!(outcome.errors(), vec!["A.sln: error X1: boom"]);

        let passing = ProcessBackend::new(
            Tool::new("true", Vec::new()),
            Tool::new("true", Vec::new()),
        );
        let outcome = passing
            .rebuild(&project, Some("A"), &Properties::new())
            .await
            .unwrap();
        assert!(outcome.success);
    }
}
