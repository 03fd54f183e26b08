// `test` / `attempt`: authorize, send the solution to the remote grader,
// draw the result and tell the platform a run happened.

use crate::api::{str_field, Remote};
use crate::config::Endpoints;
use crate::error::{CliError, Result};
use crate::outcome::RunOutcome;
use crate::render;
use crate::session::ChallengeSession;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// Which fixture the grader runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Example tests shown in the kata UI.
    Sample,
    /// Full grading suite.
    Full,
}

impl RunMode {
    fn fixture(self, session: &ChallengeSession) -> &str {
        match self {
            RunMode::Sample => &session.example_fixture,
            RunMode::Full => &session.fixture,
        }
    }

    /// Payload fields the grader should accept as already encrypted.
    fn ciphered(self) -> &'static [&'static str] {
        match self {
            RunMode::Sample => &["setup"],
            RunMode::Full => &["setup", "fixture"],
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RunPayload<'a> {
    ciphered: &'static [&'static str],
    code: &'a str,
    fixture: &'a str,
    language: &'a str,
    language_version: &'a str,
    relay_id: &'a str,
    setup: &'a Value,
    success_mode: Option<&'a str>,
    test_framework: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NotifyPayload<'a> {
    code: &'a str,
    fixture: &'a str,
    language_version: &'a str,
    test_framework: &'a str,
    token: &'a str,
}

fn platform_headers(session: &ChallengeSession) -> [(&'static str, &str); 2] {
    [
        ("authorization", session.authorization_token.as_str()),
        ("X-CSRF-Token", session.csrf_token.as_str()),
    ]
}

/// Exchange the captured platform tokens for a short-lived runner token.
pub fn authorize(remote: &dyn Remote, endpoints: &Endpoints, session: &ChallengeSession) -> Result<String> {
    let url = endpoints.authorize();
    let res = remote.post(&url, &platform_headers(session), None)?;
    if !res.is_success() {
        return Err(CliError::Auth(format!("{} returned status {}", url, res.status)));
    }
    let body = res
        .json()
        .map_err(|e| CliError::Auth(format!("unreadable response from {url}: {e}")))?;
    str_field(&body, "token", &url)
        .map_err(|_| CliError::Auth(format!("no token in response from {url}")))
}

/// POST the solution to the grader and parse its verdict.
pub fn run(
    remote: &dyn Remote,
    endpoints: &Endpoints,
    mode: RunMode,
    session: &ChallengeSession,
    code: &str,
    token: &str,
) -> Result<RunOutcome> {
    let url = endpoints.run();
    let payload = RunPayload {
        ciphered: mode.ciphered(),
        code,
        fixture: mode.fixture(session),
        language: &session.language_name,
        language_version: &session.language_version,
        relay_id: &session.solution_id,
        setup: &session.package_metadata,
        success_mode: None,
        test_framework: &session.test_framework,
    };
    let body = serde_json::to_value(&payload)?;
    let bearer = format!("Bearer {token}");

    let res = remote
        .post(&url, &[("Authorization", bearer.as_str())], Some(&body))?
        .error_for_status(&url)?;
    Ok(RunOutcome::from_json(res.json()?)?)
}

/// Tell the platform about the run. Failures are logged and dropped.
pub fn notify(
    remote: &dyn Remote,
    endpoints: &Endpoints,
    session: &ChallengeSession,
    code: &str,
    fixture: &str,
    run_token: &str,
) {
    let url = endpoints.notify(&session.project_id, &session.solution_id);
    let payload = NotifyPayload {
        code,
        fixture,
        language_version: &session.language_version,
        test_framework: &session.test_framework,
        token: run_token,
    };
    let body = match serde_json::to_value(&payload) {
        Ok(body) => body,
        Err(e) => {
            log::debug!("notify payload not serializable: {}", e);
            return;
        }
    };
    match remote.post(&url, &platform_headers(session), Some(&body)) {
        Ok(res) => log::debug!("notify answered {}", res.status),
        Err(e) => log::debug!("notify failed: {}", e),
    }
}

/// Full `test`/`attempt` flow. The rendered outcome is written to `out`
/// before the notify call; the returned outcome's exit code is the
/// process exit code.
pub fn execute(
    remote: &dyn Remote,
    endpoints: &Endpoints,
    mode: RunMode,
    session: &ChallengeSession,
    code: &str,
    out: &mut dyn Write,
) -> Result<RunOutcome> {
    let token = authorize(remote, endpoints, session)?;
    let outcome = run(remote, endpoints, mode, session, code, &token)?;

    for line in render::paint(&render::render(&outcome)) {
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    // The platform records the example fixture for both modes.
    notify(
        remote,
        endpoints,
        session,
        code,
        &session.example_fixture,
        &outcome.continuation_token,
    );
    Ok(outcome)
}
