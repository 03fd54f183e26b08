// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, load config, build the API client
//   and hand off to one command.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use codewars_cli::api::ApiClient;
use codewars_cli::config::Config;
use codewars_cli::practice::{self, Progress, SearchQuery, SortBy};
use codewars_cli::runner::{self, RunMode};
use codewars_cli::session::SessionStore;
use codewars_cli::{submit, train, ui};
use std::io::Write;

/// An unofficial CLI for Codewars.
#[derive(Parser)]
#[command(name = "codewars", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a kata.
    Practice {
        #[arg(short, long, default_value = "")]
        query: String,

        #[arg(short, long, value_enum, default_value_t = SortBy::Newest)]
        sort_by: SortBy,

        #[arg(short, long, default_value = "my-languages")]
        language: String,

        /// Include approved katas (`--no-approved` to exclude).
        #[arg(long, overrides_with = "no_approved")]
        approved: bool,
        #[arg(long, overrides_with = "approved")]
        no_approved: bool,

        /// Include beta katas.
        #[arg(long, overrides_with = "no_beta")]
        beta: bool,
        #[arg(long, overrides_with = "beta")]
        no_beta: bool,

        #[arg(short, long, value_enum, default_value_t = Progress::All)]
        progress: Progress,

        /// Kyu rank to include; repeatable.
        #[arg(short, long, action = ArgAction::Append, value_parser = clap::value_parser!(u8).range(1..=8))]
        difficulty: Vec<u8>,

        /// Tag to filter on; repeatable.
        #[arg(short, long, action = ArgAction::Append)]
        tags: Vec<String>,
    },

    /// Choose a kata to solve.
    ///
    /// KATA is the id of the kata to train, from its URL or from `practice`.
    Train {
        /// The language to solve the kata in.
        #[arg(long)]
        language: String,

        kata: String,
    },

    /// Test against the sample tests.
    Test,

    /// Attempt to pass the full test suite.
    Attempt,

    /// Submit your solution.
    Submit,
}

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().filter_or("CODEWARS_LOG", "warn"));
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let endpoints = &config.endpoints;
    let api = ApiClient::new(&config.credentials, &endpoints.base_url)?;

    match cli.command {
        Commands::Practice {
            query,
            sort_by,
            language,
            approved: _,
            no_approved,
            beta,
            no_beta: _,
            progress,
            difficulty,
            tags,
        } => {
            let query = SearchQuery {
                query,
                sort_by,
                language,
                approved: !no_approved,
                beta,
                progress,
                difficulties: difficulty,
                tags,
            };
            let listings = ui::with_spinner("Searching...", || practice::search(&api, endpoints, &query))?;
            ui::print_listings(&listings);
        }
        Commands::Train { language, kata } => {
            let session = ui::with_spinner("Fetching kata...", || train::fetch(&api, endpoints, &kata, &language))
                .with_context(|| format!("failed to fetch kata `{kata}` for {language}"))?;
            let cwd = std::env::current_dir()?;
            let store = train::materialize(&cwd, &session)?;
            log::info!("kata written to {}", store.root().display());
            ui::page(&ui::markdown_lines(&session.description))?;
        }
        Commands::Test => run(&api, &config, RunMode::Sample)?,
        Commands::Attempt => run(&api, &config, RunMode::Full)?,
        Commands::Submit => {
            let session = SessionStore::current_dir()?.load()?;
            let submission = ui::with_spinner("Submitting...", || submit::submit(&api, endpoints, &session))?;
            ui::print_submission(&submission);
        }
    }
    Ok(())
}

/// Shared body of `test` and `attempt`; exits with the grader's code.
fn run(api: &ApiClient, config: &Config, mode: RunMode) -> Result<()> {
    let store = SessionStore::current_dir()?;
    let session = store.load()?;
    let code = store.load_source_code(&session.language_name)?;

    let spinner_text = match mode {
        RunMode::Sample => "Running sample tests...",
        RunMode::Full => "Running full test suite...",
    };
    // Buffered so the spinner never interleaves with the result panel.
    let mut rendered = Vec::new();
    let outcome = ui::with_spinner(spinner_text, || {
        runner::execute(api, &config.endpoints, mode, &session, &code, &mut rendered)
    })?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&rendered)?;
    stdout.flush()?;
    std::process::exit(outcome.exit_code);
}
