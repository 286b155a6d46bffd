//! CLI for the Bitbucket to GitHub migration tool.
//!
//! This tool migrates repositories, issues, pull requests and comments from
//! a Bitbucket Cloud workspace into a GitHub organization.

use bitbucket_to_github::{
    config::resolve_value, BitbucketReader, GitHubWriter, MigrationConfig, MigrationReport,
    Runner, RunnerConfig, SourceReader, TargetWriter,
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::error::Error;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Migrate repositories, issues and pull requests from Bitbucket to GitHub.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    credentials: Credentials,

    /// Preview the migration without writing anything to GitHub.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Echo per-request detail.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Credential values may be given literally or as `$(command)` shell
/// substitutions, which are resolved before use.
#[derive(ClapArgs, Debug)]
struct Credentials {
    /// Bitbucket username.
    #[arg(long, env = "BB_USERNAME", global = true)]
    bb_username: Option<String>,

    /// Bitbucket App Password.
    #[arg(long, env = "BB_PASSWORD", global = true, hide_env_values = true)]
    bb_password: Option<String>,

    /// Bitbucket workspace to migrate from.
    #[arg(long, env = "BB_WORKSPACE", global = true)]
    bb_workspace: Option<String>,

    /// GitHub personal access token (scopes: repo, admin:org, workflow).
    #[arg(long, env = "GITHUB_TOKEN", global = true, hide_env_values = true)]
    github_token: Option<String>,

    /// GitHub organization to migrate into.
    #[arg(long, env = "GH_ORG", global = true)]
    gh_org: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify credentials against both platforms without migrating.
    TestConnection,

    /// Migrate the named repositories.
    MigrateRepo {
        /// Repository slugs to migrate, in order.
        #[arg(required = true)]
        slugs: Vec<String>,

        /// Skip git content mirroring (issues and pull requests only).
        #[arg(long)]
        no_mirror: bool,
    },

    /// Migrate every repository in the workspace.
    MigrateWorkspace {
        /// Maximum repositories processed in parallel.
        #[arg(long, default_value_t = 1)]
        concurrency: usize,

        /// Skip git content mirroring (issues and pull requests only).
        #[arg(long)]
        no_mirror: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_tracing(args.verbose);

    match run(args).await {
        // A completed run exits 0 even when individual items failed; the
        // failures are listed in the report. Only fatal setup errors are
        // non-zero.
        Ok(Some(report)) => {
            println!("{}", report.render());
            ExitCode::from(0)
        }
        Ok(None) => ExitCode::from(0),
        Err(e) => {
            error!(error = %e, "Migration aborted");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info", or
///   "debug" when `--verbose` is given)
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

/// Main execution logic. Returns a report for migration commands, `None`
/// for `test-connection`.
async fn run(args: Args) -> Result<Option<MigrationReport>, Box<dyn Error>> {
    let config = build_config(args.credentials, args.dry_run, args.verbose).await?;

    let reader = BitbucketReader::new(&config)?;
    let writer = GitHubWriter::new(&config)?;

    match args.command {
        Command::TestConnection => {
            test_connection(&config, &reader, &writer, args.verbose).await?;
            Ok(None)
        }
        Command::MigrateRepo { slugs, no_mirror } => {
            let runner_config = RunnerConfig::new(config.dry_run).with_mirror_content(!no_mirror);
            let runner = Runner::new(reader, writer, runner_config);
            install_cancel_handler(&runner);
            Ok(Some(runner.migrate_repositories(&slugs).await?))
        }
        Command::MigrateWorkspace {
            concurrency,
            no_mirror,
        } => {
            let runner_config = RunnerConfig::new(config.dry_run)
                .with_concurrency(concurrency)
                .with_mirror_content(!no_mirror);
            let runner = Runner::new(reader, writer, runner_config);
            install_cancel_handler(&runner);
            Ok(Some(runner.migrate_workspace().await?))
        }
    }
}

/// Resolves `$(command)` substitutions and assembles the configuration.
async fn build_config(
    credentials: Credentials,
    dry_run: bool,
    verbose: bool,
) -> Result<MigrationConfig, Box<dyn Error>> {
    Ok(MigrationConfig::from_parts(
        resolve_value(credentials.bb_username).await?,
        resolve_value(credentials.bb_password).await?,
        resolve_value(credentials.bb_workspace).await?,
        resolve_value(credentials.github_token).await?,
        resolve_value(credentials.gh_org).await?,
        dry_run,
        verbose,
    )?)
}

/// Verifies both credentials; with `--verbose`, also lists the source
/// workspace contents.
async fn test_connection(
    config: &MigrationConfig,
    reader: &BitbucketReader,
    writer: &GitHubWriter,
    verbose: bool,
) -> Result<(), Box<dyn Error>> {
    reader.test_connection().await?;
    println!(
        "Bitbucket: authenticated against workspace '{}'",
        config.bb_workspace
    );

    writer.test_connection().await?;
    println!("GitHub: authenticated against organization '{}'", config.gh_org);

    if verbose {
        let repos = reader.list_repositories().await?;
        println!("\n{} repositories in workspace:", repos.len());
        for repo in repos {
            let issues = reader.list_issues(&repo.slug).await?;
            let prs = reader.list_pull_requests(&repo.slug).await?;
            println!(
                "  {} (default branch: {}, issues: {}, open pull requests: {})",
                repo.slug,
                repo.default_branch,
                issues.len(),
                prs.len()
            );
        }
    }

    Ok(())
}

/// Flips the runner's cancel flag on the first Ctrl-C so the run stops
/// between items with a partial report. A second Ctrl-C kills the process.
fn install_cancel_handler<R: SourceReader, W: TargetWriter>(runner: &Runner<R, W>) {
    let cancel = runner.config().cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Cancellation requested, finishing the current item");
            cancel.store(true, std::sync::atomic::Ordering::SeqCst);

            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Second interrupt, exiting immediately");
                std::process::exit(130);
            }
        }
    });
}
