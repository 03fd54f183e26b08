// `practice`: search the kata catalogue and list matching challenges.

use crate::api::Remote;
use crate::config::Endpoints;
use crate::error::{CliError, Result};
use crate::extract::{self, ListingRow};
use clap::ValueEnum;
use crossterm::style::{Color, Stylize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SortBy {
    Newest,
    Oldest,
    Popularity,
    PositiveFeedback,
    MostCompleted,
    LeastCompleted,
    RecentlyPublished,
    Hardest,
    Easiest,
    Name,
    LowSatisfaction,
}

impl SortBy {
    /// Value of the `order_by` query parameter.
    pub fn fragment(self) -> &'static str {
        match self {
            SortBy::Newest => "sort_date desc",
            SortBy::Oldest => "published_at asc",
            SortBy::Popularity => "popularity desc",
            SortBy::PositiveFeedback => "satisfaction_percent desc%2Ctotal_completed desc",
            SortBy::MostCompleted => "total_completed desc",
            SortBy::LeastCompleted => "total_completed asc",
            SortBy::RecentlyPublished => "published_at desc",
            SortBy::Hardest => "rank_id desc",
            SortBy::Easiest => "rank_id asc",
            SortBy::Name => "name asc",
            SortBy::LowSatisfaction => "satisfaction_percent asc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Progress {
    All,
    NotTrained,
    NotCompleted,
    Completed,
}

impl Progress {
    pub fn fragment(self) -> &'static str {
        match self {
            Progress::All => "",
            Progress::NotTrained => "&xids=played",
            Progress::NotCompleted => "&xids=completed",
            Progress::Completed => "&xids=not_completed",
        }
    }
}

/// Filters of one search, as given on the command line.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub sort_by: SortBy,
    pub language: String,
    pub approved: bool,
    pub beta: bool,
    pub progress: Progress,
    pub difficulties: Vec<u8>,
    pub tags: Vec<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery {
            query: String::new(),
            sort_by: SortBy::Newest,
            language: "my-languages".into(),
            approved: true,
            beta: false,
            progress: Progress::All,
            difficulties: Vec::new(),
            tags: Vec::new(),
        }
    }
}

fn status_fragment(approved: bool, beta: bool) -> Result<&'static str> {
    match (approved, beta) {
        (true, true) => Ok(""),
        (true, false) => Ok("&beta=false"),
        (false, true) => Ok("&beta=true"),
        (false, false) => Err(CliError::Usage(
            "You can't set both --approved and --beta to 'False'.".into(),
        )),
    }
}

/// Capitalise the first letter of every run of letters, lowercase the
/// rest (`object-oriented` -> `Object-Oriented`).
fn title_case(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut in_word = false;
    for c in tag.chars() {
        if in_word {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        in_word = c.is_alphabetic();
    }
    out
}

/// Full listing URL for `query`. Fails on the approved/beta combination
/// that would match nothing.
pub fn search_url(endpoints: &Endpoints, query: &SearchQuery) -> Result<String> {
    let status = status_fragment(query.approved, query.beta)?;
    let language = if query.language == "all" { "" } else { &query.language };

    let difficulty: String = query
        .difficulties
        .iter()
        .map(|d| format!("&r[]=-{d}"))
        .collect();
    let tags = if query.tags.is_empty() {
        String::new()
    } else {
        let joined: Vec<String> = query.tags.iter().map(|t| title_case(t)).collect();
        format!("&tags={}", joined.join("%2C"))
    };

    Ok(format!(
        "{}?q={}{}{}{}{}&order_by={}",
        endpoints.search(language),
        urlencoding::encode(&query.query),
        status,
        query.progress.fragment(),
        difficulty,
        tags,
        query.sort_by.fragment(),
    ))
}

/// Colour band of a kyu/dan rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTier {
    White,
    Yellow,
    Blue,
    Purple,
    Unranked,
}

impl RankTier {
    /// Tier from a rank label such as `6 kyu`; only the leading number
    /// matters.
    pub fn of(rank: &str) -> Self {
        match rank.split_whitespace().next() {
            Some("8" | "7") => RankTier::White,
            Some("6" | "5") => RankTier::Yellow,
            Some("4" | "3") => RankTier::Blue,
            Some("2" | "1") => RankTier::Purple,
            _ => RankTier::Unranked,
        }
    }

    pub fn color(self) -> Color {
        match self {
            RankTier::White => Color::White,
            RankTier::Yellow => Color::Yellow,
            RankTier::Blue => Color::Blue,
            RankTier::Purple => Color::Magenta,
            RankTier::Unranked => Color::DarkGrey,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KataListing {
    pub row: ListingRow,
    pub tier: RankTier,
}

impl KataListing {
    pub fn new(row: ListingRow) -> Self {
        let tier = RankTier::of(&row.rank);
        KataListing { row, tier }
    }

    /// `difficulty title id`, difficulty underlined in its tier colour.
    pub fn line(&self) -> String {
        format!(
            "{} {} {}",
            self.row.rank.as_str().with(self.tier.color()).underlined(),
            self.row.title,
            self.row.id.as_str().dark_grey()
        )
    }
}

/// Validate `query`, fetch one listing page and parse its rows.
pub fn search(remote: &dyn Remote, endpoints: &Endpoints, query: &SearchQuery) -> Result<Vec<KataListing>> {
    let url = search_url(endpoints, query)?;
    let page = remote.get(&url)?.error_for_status(&url)?;
    let listings: Vec<KataListing> = extract::listing_rows(&page.body)
        .into_iter()
        .map(KataListing::new)
        .collect();
    log::debug!("{} katas listed", listings.len());
    Ok(listings)
}
