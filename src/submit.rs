// `submit`: finalize the solution on the platform.

use crate::api::Remote;
use crate::config::Endpoints;
use crate::error::Result;
use crate::session::ChallengeSession;
use serde_json::Value;

/// Result of a finalize call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Accepted; link to other people's solutions.
    Accepted { solutions_url: String },
    Rejected,
}

pub fn submit(remote: &dyn Remote, endpoints: &Endpoints, session: &ChallengeSession) -> Result<Submission> {
    let url = endpoints.finalize(&session.project_id, &session.solution_id);
    let headers = [
        ("X-CSRF-Token", session.csrf_token.as_str()),
        ("authorization", session.authorization_token.as_str()),
    ];
    let body = remote.post(&url, &headers, None)?.json()?;

    if body.get("success").and_then(Value::as_bool).unwrap_or(false) {
        Ok(Submission::Accepted {
            solutions_url: endpoints.solutions_page(&session.challenge_id, &session.language_name),
        })
    } else {
        log::debug!("finalize rejected: {}", body);
        Ok(Submission::Rejected)
    }
}
