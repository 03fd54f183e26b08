// tests/integration_tests.rs
use codewars_cli::api::{Remote, Response};
use codewars_cli::config::Endpoints;
use codewars_cli::outcome::{ResultNode, RunOutcome};
use codewars_cli::practice::{search, SearchQuery};
use codewars_cli::render::{self, Element, Tone};
use codewars_cli::session::{ChallengeSession, SessionStore};
use codewars_cli::CliError;
use serde_json::{json, Value};
use std::cell::Cell;

/// Remote that counts calls and answers every one with a 500.
#[derive(Default)]
struct CountingRemote {
    calls: Cell<usize>,
}

impl Remote for CountingRemote {
    fn get(&self, _url: &str) -> codewars_cli::Result<Response> {
        self.calls.set(self.calls.get() + 1);
        Ok(Response::new(500, ""))
    }

    fn post(&self, _url: &str, _headers: &[(&str, &str)], _body: Option<&Value>) -> codewars_cli::Result<Response> {
        self.calls.set(self.calls.get() + 1);
        Ok(Response::new(500, ""))
    }

    fn cookie(&self, _url: &str, _name: &str) -> Option<String> {
        None
    }
}

fn passing_outcome() -> RunOutcome {
    RunOutcome::from_json(json!({
        "exitCode": 0,
        "timedOut": false,
        "wallTime": 120,
        "stderr": "",
        "token": "tok",
        "result": {
            "passed": 3,
            "failed": 0,
            "output": [{ "t": "describe", "v": "Fixed tests", "p": true, "items": [
                { "t": "it", "v": "one", "p": true, "items": [{ "t": "passed", "v": "Test Passed" }] },
                { "t": "it", "v": "two", "p": true, "items": [{ "t": "passed", "v": "Test Passed" }] },
                { "t": "it", "v": "three", "p": true, "items": [{ "t": "passed", "v": "Test Passed" }] },
                { "t": "completedin", "v": 2 }
            ]}]
        }
    }))
    .unwrap()
}

#[test]
fn test_passing_run_shows_banner_and_green_border() {
    let outcome = passing_outcome();
    let panel = render::render(&outcome);

    assert_eq!(panel.border_tone, Tone::Pass);
    let banner = panel.body.iter().any(|el| match el {
        Element::Panel(p) => p.body.iter().any(|inner| {
            matches!(inner, Element::Text(span) if span.text == render::SUCCESS_BANNER && span.tone == Tone::Pass)
        }),
        _ => false,
    });
    assert!(banner);

    let title: String = panel.title.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(title, "Time: 120ms   Passed: 3   Failed: 0   Exit Code: 0");
}

#[test]
fn test_render_is_deterministic() {
    let outcome = passing_outcome();
    assert_eq!(render::render(&outcome), render::render(&outcome.clone()));
    assert_eq!(
        render::paint(&render::render(&outcome)),
        render::paint(&render::render(&outcome))
    );
}

#[test]
fn test_failing_outcome_has_red_border() {
    let mut outcome = passing_outcome();
    outcome.exit_code = 1;
    outcome.failed_count = 1;
    outcome.result_tree = vec![ResultNode::It {
        label: "broken".into(),
        passed: false,
        items: vec![ResultNode::Failed { text: "expected 3".into() }],
    }];
    let panel = render::render(&outcome);
    assert_eq!(panel.border_tone, Tone::Fail);

    let text = render::paint_plain(&panel).join("\n");
    assert!(text.contains("expected 3"));
    assert!(!text.contains(render::SUCCESS_BANNER));
}

#[test]
fn test_session_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    let session = ChallengeSession {
        challenge_id: "id".into(),
        project_id: "project".into(),
        solution_id: "solution".into(),
        slug: "multiply".into(),
        name: "Multiply".into(),
        description: "Fix the `multiply` function.\n\n```rust\nfn multiply() {}\n```".into(),
        language_name: "rust".into(),
        language_version: "1.79".into(),
        example_fixture: "#[test] fn t() {}".into(),
        fixture: "ciphered".into(),
        setup_code: "fn multiply(a: i32, b: i32) -> i32 { a * b }".into(),
        package_metadata: json!({ "deps": ["rand"] }),
        test_framework: "rust".into(),
        csrf_token: "csrf".into(),
        authorization_token: "jwt".into(),
    };
    store.save(&session).unwrap();
    assert_eq!(store.load().unwrap(), session);
}

#[test]
fn test_search_rejects_hidden_status_without_network() {
    let remote = CountingRemote::default();
    let query = SearchQuery {
        approved: false,
        beta: false,
        ..SearchQuery::default()
    };
    let err = search(&remote, &Endpoints::default(), &query).unwrap_err();
    assert!(matches!(err, CliError::Usage(_)));
    assert_eq!(remote.calls.get(), 0);
}
