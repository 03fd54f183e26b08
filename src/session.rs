// Persisted state of the challenge being trained in a directory.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const SESSION_FILE: &str = "kata.json";
pub const DESCRIPTION_FILE: &str = "description.md";
const SOURCE_STEM: &str = "solution";

/// Everything later commands need about a fetched challenge. Written once
/// by `train` and never updated; tokens are not refreshed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeSession {
    #[serde(alias = "id")]
    pub challenge_id: String,
    pub project_id: String,
    pub solution_id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub language_name: String,
    pub language_version: String,
    pub example_fixture: String,
    pub fixture: String,
    #[serde(alias = "setup")]
    pub setup_code: String,
    /// Opaque package blob; sent back to the runner as its `setup` field.
    #[serde(alias = "package")]
    pub package_metadata: Value,
    pub test_framework: String,
    pub csrf_token: String,
    #[serde(alias = "authorization")]
    pub authorization_token: String,
}

/// Source file extension for a platform language name.
pub fn source_extension(language: &str) -> Option<&'static str> {
    match language {
        "python" => Some(".py"),
        "rust" => Some(".rs"),
        _ => None,
    }
}

pub fn source_file_name(language: &str) -> Result<String> {
    source_extension(language)
        .map(|ext| format!("{SOURCE_STEM}{ext}"))
        .ok_or_else(|| CliError::UnsupportedLanguage(language.to_string()))
}

/// Files of one challenge directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SessionStore { root: root.into() }
    }

    /// Store rooted at the current working directory.
    pub fn current_dir() -> Result<Self> {
        Ok(SessionStore::new(std::env::current_dir()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn session_path(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }

    pub fn save(&self, session: &ChallengeSession) -> Result<()> {
        let json = serde_json::to_string_pretty(session)?;
        fs::write(self.session_path(), json)?;
        Ok(())
    }

    pub fn load(&self) -> Result<ChallengeSession> {
        let path = self.session_path();
        let text = read_existing(&path)?;
        serde_json::from_str(&text).map_err(|source| CliError::Parse { path, source })
    }

    pub fn load_source_code(&self, language: &str) -> Result<String> {
        let path = self.root.join(source_file_name(language)?);
        read_existing(&path)
    }

    /// Write the stub solution, returning its path.
    pub fn save_source_code(&self, language: &str, code: &str) -> Result<PathBuf> {
        let path = self.root.join(source_file_name(language)?);
        fs::write(&path, code)?;
        Ok(path)
    }

    pub fn save_description(&self, description: &str) -> Result<PathBuf> {
        let path = self.root.join(DESCRIPTION_FILE);
        fs::write(&path, description)?;
        Ok(path)
    }
}

fn read_existing(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CliError::NotFound(path.to_path_buf()),
        _ => CliError::Io(e),
    })
}

#[cfg(test)]
pub(crate) fn sample_session() -> ChallengeSession {
    ChallengeSession {
        challenge_id: "5a3e1319b6486ac96f000049".into(),
        project_id: "proj-1".into(),
        solution_id: "sol-1".into(),
        slug: "sum-array".into(),
        name: "Sum Array".into(),
        description: "Sum all the numbers.".into(),
        language_name: "python".into(),
        language_version: "3.11".into(),
        example_fixture: "test.assert_equals(sum_array([1]), 1)".into(),
        fixture: "test.assert_equals(sum_array([1, 2]), 3)".into(),
        setup_code: "def sum_array(a):\n    pass\n".into(),
        package_metadata: Value::Null,
        test_framework: "cw-2".into(),
        csrf_token: "csrf token".into(),
        authorization_token: "jwt-abc".into(),
    }
}
