// `train`: pull a kata's metadata, stub and fixtures from the platform
// and lay them out in a fresh directory.

use crate::api::{any_field, str_field, Remote};
use crate::config::Endpoints;
use crate::error::{CliError, Result};
use crate::extract;
use crate::session::{ChallengeSession, SessionStore};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const CSRF_COOKIE: &str = "CSRF-TOKEN";

/// Run the four dependent requests and assemble the session record.
pub fn fetch(
    remote: &dyn Remote,
    endpoints: &Endpoints,
    kata_id: &str,
    language: &str,
) -> Result<ChallengeSession> {
    // 1. Training page: project id and JWT are only embedded in the HTML.
    let page_url = endpoints.train_page(kata_id, language);
    let page = remote.get(&page_url)?.error_for_status(&page_url)?;
    let project_id = extract::project_id(&page.body).ok_or_else(|| CliError::Extraction {
        what: "the project id",
        url: page_url.clone(),
    })?;
    let authorization = extract::authorization_token(&page.body).ok_or_else(|| CliError::Extraction {
        what: "the authorization token",
        url: page_url.clone(),
    })?;
    log::debug!("project {} for kata {}", project_id, kata_id);

    // 2. Public metadata.
    let info_url = endpoints.challenge(kata_id);
    let info = remote.get(&info_url)?.error_for_status(&info_url)?.json()?;

    // 3. CSRF token from the cookie set by the training page.
    let csrf_token = remote
        .cookie(&page_url, CSRF_COOKIE)
        .map(|raw| extract::decode_cookie(&raw))
        .ok_or_else(|| CliError::Extraction {
            what: "the CSRF-TOKEN cookie",
            url: page_url.clone(),
        })?;

    // 4. Session bootstrap.
    let session_url = endpoints.session(&project_id, language);
    let headers = [
        ("authorization", authorization.as_str()),
        ("X-CSRF-Token", csrf_token.as_str()),
    ];
    let boot = remote
        .post(&session_url, &headers, None)?
        .error_for_status(&session_url)?
        .json()?;

    Ok(ChallengeSession {
        challenge_id: str_field(&info, "id", &info_url)?,
        name: str_field(&info, "name", &info_url)?,
        slug: str_field(&info, "slug", &info_url)?,
        description: str_field(&info, "description", &info_url)?,
        project_id,
        authorization_token: authorization,
        csrf_token,
        language_name: str_field(&boot, "languageName", &session_url)?,
        language_version: str_field(&boot, "activeVersion", &session_url)?,
        example_fixture: str_field(&boot, "exampleFixture", &session_url)?,
        fixture: str_field(&boot, "fixture", &session_url)?,
        setup_code: str_field(&boot, "setup", &session_url)?,
        package_metadata: any_field(&boot, "package", &session_url)?,
        test_framework: str_field(&boot, "testFramework", &session_url)?,
        solution_id: str_field(&boot, "solutionId", &session_url)?,
    })
}

/// Create `<parent>/<slug>/` and write the description, stub and session
/// file into it. An existing directory is reused.
pub fn materialize(parent: &Path, session: &ChallengeSession) -> Result<SessionStore> {
    let dir = parent.join(&session.slug);
    match fs::create_dir(&dir) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            log::warn!("Directory for `{}` already exists.", session.slug);
        }
        Err(e) => return Err(e.into()),
    }

    let store = SessionStore::new(dir);
    store.save_description(&session.description)?;
    store.save_source_code(&session.language_name, &session.setup_code)?;
    store.save(session)?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeRemote;
    use serde_json::json;

    const PAGE: &str = "https://www.codewars.com/kata/abc123/train/python";
    const INFO: &str = "https://www.codewars.com/api/v1/code-challenges/abc123";
    const SESSION: &str = "https://www.codewars.com/kata/projects/proj-9/python/session";

    fn page_html() -> &'static str {
        r#"<a href="/kata/projects/proj-9/%7Blanguage%7D/session"></a>
           <script>var p = "{\"currentUser\":{\"jwt\":\"jwt-xyz\"}}";</script>"#
    }

    fn scripted() -> FakeRemote {
        FakeRemote::new()
            .on("GET", PAGE, 200, page_html())
            .on(
                "GET",
                INFO,
                200,
                &json!({
                    "id": "abc123",
                    "name": "Sum Array",
                    "slug": "sum-array",
                    "description": "Sum **all** numbers.",
                    "rank": { "id": -6 }
                })
                .to_string(),
            )
            .on(
                "POST",
                SESSION,
                200,
                &json!({
                    "languageName": "python",
                    "activeVersion": "3.11",
                    "exampleFixture": "test.assert_equals(f([1]), 1)",
                    "fixture": "ciphered-fixture",
                    "setup": "def f(a):\n    pass\n",
                    "package": "ciphered-package",
                    "testFramework": "cw-2",
                    "solutionId": "sol-42"
                })
                .to_string(),
            )
            .with_cookie("CSRF-TOKEN", "tok%2Ben+x")
    }

    #[test]
    fn fetch_takes_values_verbatim() {
        let remote = scripted();
        let session = fetch(&remote, &Endpoints::default(), "abc123", "python").unwrap();

        assert_eq!(
            session,
            ChallengeSession {
                challenge_id: "abc123".into(),
                project_id: "proj-9".into(),
                solution_id: "sol-42".into(),
                slug: "sum-array".into(),
                name: "Sum Array".into(),
                description: "Sum **all** numbers.".into(),
                language_name: "python".into(),
                language_version: "3.11".into(),
                example_fixture: "test.assert_equals(f([1]), 1)".into(),
                fixture: "ciphered-fixture".into(),
                setup_code: "def f(a):\n    pass\n".into(),
                package_metadata: json!("ciphered-package"),
                test_framework: "cw-2".into(),
                csrf_token: "tok+en x".into(),
                authorization_token: "jwt-xyz".into(),
            }
        );

        let calls = remote.calls.borrow();
        let urls: Vec<&str> = calls.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, [PAGE, INFO, SESSION]);
        assert_eq!(
            calls[2].headers,
            vec![
                ("authorization".to_string(), "jwt-xyz".to_string()),
                ("X-CSRF-Token".to_string(), "tok+en x".to_string()),
            ]
        );
    }

    #[test]
    fn missing_markers_are_extraction_errors() {
        let remote = FakeRemote::new().on("GET", PAGE, 200, "<html>Sign in</html>");
        let err = fetch(&remote, &Endpoints::default(), "abc123", "python").unwrap_err();
        assert!(matches!(err, CliError::Extraction { what: "the project id", .. }));
        assert_eq!(remote.call_count(), 1);
    }

    #[test]
    fn missing_session_field_is_fatal() {
        let remote = FakeRemote::new()
            .on("GET", PAGE, 200, page_html())
            .on(
                "GET",
                INFO,
                200,
                r#"{"id":"abc123","name":"n","slug":"s","description":"d"}"#,
            )
            .on("POST", SESSION, 200, r#"{"languageName":"python"}"#)
            .with_cookie("CSRF-TOKEN", "t");
        let err = fetch(&remote, &Endpoints::default(), "abc123", "python").unwrap_err();
        assert!(matches!(err, CliError::KeyMissing { key: "activeVersion", .. }));
    }

    #[test]
    fn materialize_writes_challenge_files() {
        let remote = scripted();
        let session = fetch(&remote, &Endpoints::default(), "abc123", "python").unwrap();
        let parent = tempfile::tempdir().unwrap();

        let store = materialize(parent.path(), &session).unwrap();
        let dir = parent.path().join("sum-array");
        assert_eq!(store.root(), dir.as_path());
        assert_eq!(
            fs::read_to_string(dir.join("description.md")).unwrap(),
            "Sum **all** numbers."
        );
        assert_eq!(
            fs::read_to_string(dir.join("solution.py")).unwrap(),
            "def f(a):\n    pass\n"
        );
        assert_eq!(store.load().unwrap(), session);

        // A second fetch into the same directory overwrites in place.
        materialize(parent.path(), &session).unwrap();
        assert_eq!(store.load().unwrap(), session);
    }
}
