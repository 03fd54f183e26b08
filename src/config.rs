// Runtime configuration: platform credentials and endpoint roots, read
// from the environment (optionally seeded from `.env` files).

use crate::error::{CliError, Result};
use std::path::PathBuf;

pub const SESSION_ID_VAR: &str = "CW_SESSION_ID";
pub const REMEMBER_TOKEN_VAR: &str = "CW_REMEMBER_USER_TOKEN";

const DEFAULT_BASE_URL: &str = "https://www.codewars.com";
const DEFAULT_RUNNER_URL: &str = "https://runner.codewars.com";

/// Session-identity cookies of a logged-in browser session.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub session_id: String,
    pub remember_user_token: String,
}

/// Roots of the two hosts the CLI talks to. Every endpoint URL is built
/// from these so tests can point the whole client elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base_url: String,
    pub runner_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub endpoints: Endpoints,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        match (std::env::var(SESSION_ID_VAR), std::env::var(REMEMBER_TOKEN_VAR)) {
            (Ok(session_id), Ok(remember_user_token)) => Ok(Credentials {
                session_id,
                remember_user_token,
            }),
            _ => Err(CliError::Usage(format!(
                "`{SESSION_ID_VAR}` and `{REMEMBER_TOKEN_VAR}` environment variables must be set."
            ))),
        }
    }
}

impl Endpoints {
    pub fn new(base_url: &str, runner_url: &str) -> Self {
        Endpoints {
            base_url: base_url.trim_end_matches('/').to_string(),
            runner_url: runner_url.trim_end_matches('/').to_string(),
        }
    }

    /// `CW_BASE_URL` / `CW_RUNNER_URL`, falling back to the public hosts.
    pub fn from_env() -> Self {
        let base = std::env::var("CW_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let runner = std::env::var("CW_RUNNER_URL").unwrap_or_else(|_| DEFAULT_RUNNER_URL.into());
        Endpoints::new(&base, &runner)
    }

    pub fn search(&self, language: &str) -> String {
        format!("{}/kata/search/{}", self.base_url, language)
    }

    pub fn train_page(&self, kata_id: &str, language: &str) -> String {
        format!("{}/kata/{}/train/{}", self.base_url, kata_id, language)
    }

    pub fn challenge(&self, kata_id: &str) -> String {
        format!("{}/api/v1/code-challenges/{}", self.base_url, kata_id)
    }

    pub fn session(&self, project_id: &str, language: &str) -> String {
        format!("{}/kata/projects/{}/{}/session", self.base_url, project_id, language)
    }

    pub fn authorize(&self) -> String {
        format!("{}/api/v1/runner/authorize", self.base_url)
    }

    pub fn run(&self) -> String {
        format!("{}/run", self.runner_url)
    }

    fn solution(&self, project_id: &str, solution_id: &str) -> String {
        format!(
            "{}/api/v1/code-challenges/projects/{}/solutions/{}",
            self.base_url, project_id, solution_id
        )
    }

    pub fn notify(&self, project_id: &str, solution_id: &str) -> String {
        format!("{}/notify", self.solution(project_id, solution_id))
    }

    pub fn finalize(&self, project_id: &str, solution_id: &str) -> String {
        format!("{}/finalize", self.solution(project_id, solution_id))
    }

    pub fn solutions_page(&self, kata_id: &str, language: &str) -> String {
        format!("{}/kata/{}/solutions/{}", self.base_url, kata_id, language)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints::new(DEFAULT_BASE_URL, DEFAULT_RUNNER_URL)
    }
}

impl Config {
    /// Load `.env` files, then read credentials and endpoints. Missing
    /// credentials are a usage error.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Ok(Config {
            credentials: Credentials::from_env()?,
            endpoints: Endpoints::from_env(),
        })
    }
}

/// Per-user `.env` location, e.g. `~/.config/codewars-cli/.env`.
pub fn user_env_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("codewars-cli").join(".env"))
}

fn load_dotenv() {
    // Values already in the environment win over both files.
    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("loaded environment from {}", path.display());
    }
    if let Some(path) = user_env_file().filter(|p| p.is_file()) {
        if let Err(e) = dotenvy::from_path(&path) {
            log::warn!("could not read {}: {}", path.display(), e);
        }
    }
}
