// Pattern searches over scraped HTML. Each function fails (or returns
// nothing) on non-match; none of them touch the network.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::OnceLock;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern is valid"))
}

/// Project id embedded in the training page as `projects/<id>/%7Blanguage%7D`.
pub fn project_id(html: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"projects/([^/]+)/%7Blanguage%7D")
        .captures(html)
        .map(|caps| caps[1].to_string())
}

/// JWT embedded as escaped JSON: `\"jwt\":\"<token>\"`.
pub fn authorization_token(html: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"\\"jwt\\":\\"([^"\\]+)"#)
        .captures(html)
        .map(|caps| caps[1].to_string())
}

/// Decode a form-encoded cookie value (`+` is a space).
pub fn decode_cookie(value: &str) -> String {
    let spaced = value.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// One row of the kata search listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub id: String,
    pub title: String,
    /// Rank label as shown, e.g. `6 kyu`.
    pub rank: String,
}

/// Every `list-item-kata` row of a search page, in page order. Rows
/// without an id, title or rank badge are skipped.
pub fn listing_rows(html: &str) -> Vec<ListingRow> {
    let row = selector("div.list-item-kata");
    let rank = selector("div.inner-small-hex > span");

    let doc = Html::parse_document(html);
    let rows = doc
        .select(&row)
        .filter_map(|kata| {
            let badge = kata.select(&rank).next()?;
            Some(ListingRow {
                id: kata.value().attr("id")?.to_string(),
                title: kata.value().attr("data-title")?.to_string(),
                rank: badge.text().collect::<String>().trim().to_string(),
            })
        })
        .collect();
    rows
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRAIN_PAGE: &str = r#"<script>
        window.App = {"routes":"/kata/projects/64f0c1a2/%7Blanguage%7D/session"};
        data-props="{\"user\":{\"jwt\":\"eyJhbGciOi.payload.sig\",\"name\":\"me\"}}"
    </script>"#;

    #[test]
    fn extracts_project_id_and_jwt() {
        assert_eq!(project_id(TRAIN_PAGE).as_deref(), Some("64f0c1a2"));
        assert_eq!(
            authorization_token(TRAIN_PAGE).as_deref(),
            Some("eyJhbGciOi.payload.sig")
        );
    }

    #[test]
    fn missing_markers_yield_none() {
        let page = "<html><body>Sign in to continue</body></html>";
        assert_eq!(project_id(page), None);
        assert_eq!(authorization_token(page), None);
    }

    #[test]
    fn cookie_decoding_handles_plus_and_percent() {
        assert_eq!(decode_cookie("ab%2Bcd+ef%3D%3D"), "ab+cd ef==");
    }

    #[test]
    fn listing_rows_are_parsed_in_order() {
        let html = r#"
            <div class="list-item-kata bg-ui-section" id="aaa111" data-title="Sum Array">
              <div class="inner-small-hex is-extra-wide"><span>6 kyu</span></div>
            </div>
            <div class="list-item-kata" data-title="Fish &amp; Chips" id="bbb222">
              <div class="small-hex is-white-rank"><div class="inner-small-hex "><span>8 kyu</span></div></div>
            </div>
            <div class="list-item-kata" id="broken"></div>
            <div class='list-item-kata' id='ccc333' data-title='Don&#8217;t &#x2F; stop&nbsp;now'>
              <div class='inner-small-hex'><span> 2 kyu </span></div>
            </div>
        "#;
        let rows = listing_rows(html);
        assert_eq!(
            rows,
            vec![
                ListingRow {
                    id: "aaa111".into(),
                    title: "Sum Array".into(),
                    rank: "6 kyu".into(),
                },
                ListingRow {
                    id: "bbb222".into(),
                    title: "Fish & Chips".into(),
                    rank: "8 kyu".into(),
                },
                ListingRow {
                    id: "ccc333".into(),
                    title: "Don\u{2019}t / stop\u{a0}now".into(),
                    rank: "2 kyu".into(),
                },
            ]
        );
    }
}
