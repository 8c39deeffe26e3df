//! settings-assert CLI
//!
//! Entry point for the `settings-assert` command-line tool. Every flag has an
//! environment fallback so the tool runs unchanged inside a CI action.

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use settings_assert::summary::FATAL_EXIT_CODE;
use settings_assert::{render_table, LoaderConfig, RunOptions, RunSummary, Runner, Settings, Target};
use settings_assert_github::{ClientConfig, GitHubClient, DEFAULT_API_URL};
use std::path::PathBuf;
use std::process;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "settings-assert")]
#[command(about = "Check a GitHub repository's live settings against a settings document", version)]
struct Cli {
    /// Repository to check, as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: String,

    /// API token able to read the repository settings
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Checkout holding the project settings file
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    workspace: PathBuf,

    /// Directory holding the global settings file
    #[arg(long, env = "CONFIGDIR", default_value = settings_assert::config::DEFAULT_CONFIG_DIR)]
    config_dir: PathBuf,

    /// Project settings file (default: <workspace>/.repository-settings.yaml)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Global settings file (default: <config-dir>/default-repository-settings.yaml)
    #[arg(long)]
    defaults: Option<PathBuf>,

    /// GitHub API root
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Exit 0 even when tests fail ("true" to enable)
    #[arg(
        long,
        env = "INPUT_IGNORE_FAILURES",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    ignore_failures: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Also write the JSON run summary to this file
    #[arg(long)]
    summary_out: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose, cli.quiet) {
        eprintln!("Error: {:#}", e);
        process::exit(FATAL_EXIT_CODE);
    }

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(FATAL_EXIT_CODE);
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SETTINGS_ASSERT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let target: Target = cli.repository.parse()?;
    let options = RunOptions::from_flag(cli.ignore_failures.as_deref());

    let mut loader = LoaderConfig::from_dirs(&cli.workspace, &cli.config_dir);
    if let Some(path) = cli.settings {
        loader.project_path = path;
    }
    if let Some(path) = cli.defaults {
        loader.global_path = path;
    }
    let settings = Settings::load(&loader).context("Failed to load settings")?;
    debug!(tests = settings.tests().len(), "Settings loaded");

    info!(repository = %target, "Checking repository");

    let token = match cli.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => bail!(
            "No GitHub token provided. Make sure this repository has access to the \
             organization secret holding the token and that it is passed as `github_token`."
        ),
    };

    let client = GitHubClient::new(ClientConfig {
        api_url: cli.api_url,
        ..ClientConfig::new(token)
    })?;

    let results = Runner::new(&client, &target).run(&settings)?;
    let summary = RunSummary::from_results(&results, &target, settings.sources(), options.ignore_failures);

    match cli.format {
        OutputFormat::Table => {
            print!("{}", render_table(results.results()));
            println!();
            println!("{}", summary.human_summary);
        }
        OutputFormat::Json => println!("{}", summary.to_json()?),
    }

    if let Some(path) = cli.summary_out {
        summary
            .write_to_file(&path)
            .with_context(|| format!("Failed to write run summary to {}", path.display()))?;
    }

    Ok(summary.exit_code)
}
