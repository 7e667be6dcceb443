//! Run-scoped context for a detection run.
//!
//! Replaces the ad hoc module-level logger and directory conventions of
//! experiment scripts with one explicit object handed into the pipeline.
//! No global mutable state: installing a tracing subscriber is the
//! caller's concern, the context only owns the run's output location and
//! its logging span.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Output paths and logging scope for one detection run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    output_dir: Option<PathBuf>,
}

impl RunContext {
    /// A context with no output directory; results are only returned, not
    /// written anywhere.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self { output_dir: None }
    }

    /// A context rooted at `output_dir`, created (with parents) if absent.
    ///
    /// # Errors
    ///
    /// Propagates directory-creation failures.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir: Some(output_dir),
        })
    }

    /// The run's output directory, if any.
    #[must_use]
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Resolves a file name inside the output directory.
    #[must_use]
    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.output_dir.as_ref().map(|dir| dir.join(name))
    }

    /// The tracing span scoping all events of this run.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("detection_run")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ephemeral_has_no_paths() {
        let ctx = RunContext::ephemeral();
        assert!(ctx.output_dir().is_none());
        assert!(ctx.path("scores.json").is_none());
    }

    #[test]
    fn test_output_dir_created() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("runs").join("detect");
        let ctx = RunContext::with_output_dir(&nested).expect("creation succeeds");
        assert!(nested.is_dir());
        assert_eq!(
            ctx.path("scores.json").expect("dir configured"),
            nested.join("scores.json")
        );
    }
}
