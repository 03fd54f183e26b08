// API client module: a small blocking HTTP client that carries the
// platform's session cookies on every call. Commands only see the
// `Remote` trait so tests can script responses and count calls.

use crate::config::Credentials;
use crate::error::{CliError, Result};
use reqwest::blocking::Client;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;

const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) codewars-cli/",
    env!("CARGO_PKG_VERSION")
);

/// Status and body of a finished request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Response {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turn a non-2xx response into a `Status` error.
    pub fn error_for_status(self, url: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CliError::Status {
                url: url.to_string(),
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// The HTTP capability every command is written against.
pub trait Remote {
    fn get(&self, url: &str) -> Result<Response>;

    fn post(&self, url: &str, headers: &[(&str, &str)], body: Option<&Value>) -> Result<Response>;

    /// Value of cookie `name` as the jar would send it to `url`.
    fn cookie(&self, url: &str, name: &str) -> Option<String>;
}

/// Client context built once per invocation: the reqwest client plus the
/// cookie jar it shares across calls.
pub struct ApiClient {
    client: Client,
    jar: Arc<Jar>,
}

impl ApiClient {
    /// Build a client whose jar is seeded with the session cookies for
    /// `base_url`.
    pub fn new(credentials: &Credentials, base_url: &str) -> Result<Self> {
        let url = parse_url(base_url)?;
        let jar = Arc::new(Jar::default());
        jar.add_cookie_str(&format!("_session_id={}", credentials.session_id), &url);
        jar.add_cookie_str(
            &format!("remember_user_token={}", credentials.remember_user_token),
            &url,
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(Arc::clone(&jar))
            .build()?;
        Ok(ApiClient { client, jar })
    }

    fn finish(&self, url: &str, res: reqwest::blocking::Response) -> Result<Response> {
        let status = res.status().as_u16();
        let body = res.text()?;
        log::debug!("{} <- {} ({} bytes)", status, url, body.len());
        Ok(Response { status, body })
    }
}

impl Remote for ApiClient {
    fn get(&self, url: &str) -> Result<Response> {
        log::debug!("GET {}", url);
        let res = self.client.get(url).send()?;
        self.finish(url, res)
    }

    fn post(&self, url: &str, headers: &[(&str, &str)], body: Option<&Value>) -> Result<Response> {
        log::debug!("POST {}", url);
        let mut req = self.client.post(url);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req.send()?;
        self.finish(url, res)
    }

    fn cookie(&self, url: &str, name: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        let header = self.jar.cookies(&url)?;
        let header = header.to_str().ok()?;
        find_cookie(header, name)
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| CliError::Usage(format!("Invalid URL `{url}`: {e}")))
}

/// Pick one value out of a `Cookie:` header (`a=1; b=2`).
fn find_cookie(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Read a string field, failing with `KeyMissing` when absent or not a
/// string.
pub fn str_field(value: &Value, key: &'static str, url: &str) -> Result<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CliError::KeyMissing {
            key,
            url: url.to_string(),
        })
}

/// Read any field, failing with `KeyMissing` only when absent.
pub fn any_field(value: &Value, key: &'static str, url: &str) -> Result<Value> {
    value.get(key).cloned().ok_or_else(|| CliError::KeyMissing {
        key,
        url: url.to_string(),
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn find_cookie_picks_named_pair() {
        let header = "_session_id=abc; CSRF-TOKEN=x%2By; other=1";
        assert_eq!(find_cookie(header, "CSRF-TOKEN").as_deref(), Some("x%2By"));
        assert_eq!(find_cookie(header, "missing"), None);
    }

    #[test]
    fn error_for_status_keeps_body() {
        let err = Response::new(403, "denied").error_for_status("http://x").unwrap_err();
        match err {
            CliError::Status { status, body, .. } => {
                assert_eq!(status, 403);
                assert_eq!(body, "denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn str_field_reports_missing_key() {
        let value = json!({ "name": "Sum Array", "rank": 6 });
        assert_eq!(str_field(&value, "name", "u").unwrap(), "Sum Array");
        assert!(matches!(
            str_field(&value, "rank", "u"),
            Err(CliError::KeyMissing { key: "rank", .. })
        ));
        assert!(matches!(
            any_field(&value, "slug", "u"),
            Err(CliError::KeyMissing { key: "slug", .. })
        ));
    }

    #[test]
    fn jar_is_seeded_with_credentials() {
        let credentials = Credentials {
            session_id: "sess".into(),
            remember_user_token: "remember".into(),
        };
        let client = ApiClient::new(&credentials, "https://www.codewars.com").unwrap();
        assert_eq!(
            client.cookie("https://www.codewars.com/kata", "_session_id").as_deref(),
            Some("sess")
        );
        assert_eq!(
            client
                .cookie("https://www.codewars.com/", "remember_user_token")
                .as_deref(),
            Some("remember")
        );
    }
}
