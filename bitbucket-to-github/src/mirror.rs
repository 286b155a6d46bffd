//! Repository content mirroring.
//!
//! Clones the source repository with `--mirror` into a temp directory and
//! pushes every ref to the freshly created target repository. Issues and
//! pull requests depend on the branches this step brings over, so the
//! writer runs it before the orchestrator migrates either.

use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Errors that can occur while mirroring repository content.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Could not create the working directory.
    #[error("Failed to create temp directory: {0}")]
    TempDir(#[from] std::io::Error),

    /// `git clone --mirror` failed.
    #[error("Failed to clone repository: {message}")]
    CloneFailed { message: String },

    /// `git push --mirror` failed.
    #[error("Failed to push repository: {message}")]
    PushFailed { message: String },
}

/// Mirrors all refs from `source_url` to `target_url`.
///
/// Both URLs carry embedded credentials; they are never logged.
///
/// # Errors
///
/// Returns [`MirrorError`] if either git step fails.
pub async fn mirror_repository(source_url: &str, target_url: &str) -> Result<(), MirrorError> {
    let temp_dir = tempfile::tempdir()?;

    info!("Cloning repository content from source");
    run_git(
        &["clone", "--mirror", source_url, "."],
        temp_dir.path(),
        |message| MirrorError::CloneFailed { message },
    )
    .await?;

    info!("Pushing repository content to target");
    run_git(
        &["push", "--mirror", target_url],
        temp_dir.path(),
        |message| MirrorError::PushFailed { message },
    )
    .await?;

    info!("Repository content mirrored");
    Ok(())
}

async fn run_git(
    args: &[&str],
    cwd: &Path,
    to_error: impl Fn(String) -> MirrorError,
) -> Result<(), MirrorError> {
    debug!(subcommand = args[0], "Running git");

    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| to_error(format!("failed to execute git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(to_error(format!(
            "git {} failed: {}",
            args[0],
            stderr.trim()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clone_failure_is_reported_with_stderr() {
        // An invalid URL fails fast without touching the network.
        let result = mirror_repository("not-a-real-url::", "also-not-real::").await;
        assert!(matches!(result, Err(MirrorError::CloneFailed { .. })));
    }
}
