//! Migration configuration.
//!
//! Credentials arrive via CLI flags or the `BB_USERNAME`, `BB_PASSWORD`,
//! `BB_WORKSPACE`, `GITHUB_TOKEN` and `GH_ORG` environment variables. A
//! value of the form `$(command)` is resolved by running the command in a
//! shell and taking its trimmed stdout, so credentials can live in an
//! external store instead of the environment.

mod error;

pub use error::ConfigError;

use tokio::process::Command;
use tracing::debug;

/// Shared configuration for a migration run.
///
/// Passed explicitly into the reader and writer constructors; there is no
/// process-wide session state.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Bitbucket username for App-Password authentication.
    pub bb_username: String,

    /// Bitbucket App Password.
    pub bb_password: String,

    /// Bitbucket workspace to migrate from.
    pub bb_workspace: String,

    /// GitHub personal access token (scopes: repo, admin:org, workflow).
    pub github_token: String,

    /// GitHub organization to migrate into.
    pub gh_org: String,

    /// Whether to suppress all write calls.
    pub dry_run: bool,

    /// Whether to echo per-request detail.
    pub verbose: bool,
}

impl MigrationConfig {
    /// Builds a configuration from already-resolved parts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] for any absent credential.
    pub fn from_parts(
        bb_username: Option<String>,
        bb_password: Option<String>,
        bb_workspace: Option<String>,
        github_token: Option<String>,
        gh_org: Option<String>,
        dry_run: bool,
        verbose: bool,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            bb_username: require(bb_username, "BB_USERNAME")?,
            bb_password: require(bb_password, "BB_PASSWORD")?,
            bb_workspace: require(bb_workspace, "BB_WORKSPACE")?,
            github_token: require(github_token, "GITHUB_TOKEN")?,
            gh_org: require(gh_org, "GH_ORG")?,
            dry_run,
            verbose,
        })
    }
}

fn require(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingValue { name }),
    }
}

/// Resolves a configuration value, evaluating `$(command)` substitutions.
///
/// Plain values pass through unchanged. `None` stays `None`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the substituted command fails or prints
/// nothing.
pub async fn resolve_value(value: Option<String>) -> Result<Option<String>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let Some(command) = value
        .strip_prefix("$(")
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return Ok(Some(value));
    };

    debug!(command, "Resolving credential via shell command");

    let output = Command::new("sh")
        .args(["-c", command])
        .output()
        .await
        .map_err(|e| ConfigError::CommandFailed {
            command: command.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConfigError::CommandFailed {
            command: command.to_string(),
            message: format!("exit status {}: {}", output.status, stderr.trim()),
        });
    }

    let resolved = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if resolved.is_empty() {
        return Err(ConfigError::EmptyCommandOutput {
            command: command.to_string(),
        });
    }

    Ok(Some(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> MigrationConfig {
        MigrationConfig::from_parts(
            Some("user".to_string()),
            Some("pass".to_string()),
            Some("workspace".to_string()),
            Some("token".to_string()),
            Some("org".to_string()),
            false,
            false,
        )
        .unwrap()
    }

    #[test]
    fn builds_from_complete_parts() {
        let config = parts();
        assert_eq!(config.bb_workspace, "workspace");
        assert_eq!(config.gh_org, "org");
        assert!(!config.dry_run);
    }

    #[test]
    fn rejects_missing_value() {
        let result = MigrationConfig::from_parts(
            Some("user".to_string()),
            None,
            Some("workspace".to_string()),
            Some("token".to_string()),
            Some("org".to_string()),
            false,
            false,
        );
        assert!(
            matches!(result, Err(ConfigError::MissingValue { name }) if name == "BB_PASSWORD")
        );
    }

    #[test]
    fn rejects_blank_value() {
        let result = MigrationConfig::from_parts(
            Some("  ".to_string()),
            Some("pass".to_string()),
            Some("workspace".to_string()),
            Some("token".to_string()),
            Some("org".to_string()),
            false,
            false,
        );
        assert!(matches!(result, Err(ConfigError::MissingValue { .. })));
    }

    #[tokio::test]
    async fn passes_plain_values_through() {
        let resolved = resolve_value(Some("plain-token".to_string())).await.unwrap();
        assert_eq!(resolved, Some("plain-token".to_string()));
    }

    #[tokio::test]
    async fn resolves_shell_substitution() {
        let resolved = resolve_value(Some("$(echo secret)".to_string()))
            .await
            .unwrap();
        assert_eq!(resolved, Some("secret".to_string()));
    }

    #[tokio::test]
    async fn rejects_failing_command() {
        let result = resolve_value(Some("$(false)".to_string())).await;
        assert!(matches!(result, Err(ConfigError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn rejects_empty_command_output() {
        let result = resolve_value(Some("$(true)".to_string())).await;
        assert!(matches!(result, Err(ConfigError::EmptyCommandOutput { .. })));
    }

    #[tokio::test]
    async fn none_stays_none() {
        let resolved = resolve_value(None).await.unwrap();
        assert_eq!(resolved, None);
    }
}
