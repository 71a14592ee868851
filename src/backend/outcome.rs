//! Build outcome and its assertions

use serde::Serialize;
use std::path::Path;

use crate::common::{tail_lines, Error, Result};

/// Lines of log kept in a build error when no error lines could be extracted
const LOG_TAIL_LINES: usize = 40;

/// Result of one build invocation
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
    /// Whether the build tool reported success
    pub success: bool,
    /// Process exit code, when the tool exited normally
    pub exit_code: Option<i32>,
    /// Combined tool output
    pub diagnostics: String,
}

impl BuildOutcome {
    pub fn succeeded(diagnostics: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            diagnostics: diagnostics.into(),
        }
    }

    pub fn failed(exit_code: Option<i32>, diagnostics: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code,
            diagnostics: diagnostics.into(),
        }
    }

    /// MSBuild-style `file(line): error CODE: message` lines
    pub fn errors(&self) -> Vec<&str> {
        self.lines_matching(": error ")
    }

    /// MSBuild-style warning lines
    pub fn warnings(&self) -> Vec<&str> {
        self.lines_matching(": warning ")
    }

    /// Fail unless the build succeeded
    pub fn assert_successful_build(&self, project: &Path) -> Result<()> {
        for warning in self.warnings() {
            tracing::debug!("{}", warning);
        }

        if self.success {
            return Ok(());
        }

        Err(Error::BuildFailed {
            project: project.to_path_buf(),
            diagnostics: self.summary(),
        })
    }

    /// Fail if the build succeeded
    pub fn assert_unsuccessful_build(&self, project: &Path) -> Result<()> {
        if self.success {
            return Err(Error::UnexpectedBuildSuccess {
                project: project.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Error lines when there are any, otherwise the tail of the log
    pub fn summary(&self) -> String {
        let errors = self.errors();
        if errors.is_empty() {
            tail_lines(&self.diagnostics, LOG_TAIL_LINES)
        } else {
            errors.join("\n")
        }
    }

    fn lines_matching(&self, needle: &str) -> Vec<&str> {
        let mut seen = Vec::new();
        for line in self.diagnostics.lines().map(str::trim) {
            // MSBuild repeats every diagnostic in its closing summary
            if line.contains(needle) && !seen.contains(&line) {
                seen.push(line);
            }
        }
        seen
    }
}
