use moviemuse_models::Movie;
use serde::{Deserialize, Serialize};

/// The catalog API rejects page numbers above 500
pub const MAX_PAGE: u32 = 500;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Popular,
    Trending,
    TopRated,
    NowPlaying,
    Upcoming,
    Search,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Popular => "popular",
            Category::Trending => "trending",
            Category::TopRated => "top_rated",
            Category::NowPlaying => "now_playing",
            Category::Upcoming => "upcoming",
            Category::Search => "search",
        }
    }

    /// Unknown values fall back to the default category rather than erroring
    pub fn parse(s: &str) -> Self {
        match s {
            "trending" => Category::Trending,
            "top_rated" => Category::TopRated,
            "now_playing" => Category::NowPlaying,
            "upcoming" => Category::Upcoming,
            "search" => Category::Search,
            _ => Category::Popular,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Popular => "Popular Movies",
            Category::Trending => "Trending Movies",
            Category::TopRated => "Top Rated Movies",
            Category::NowPlaying => "Now Playing",
            Category::Upcoming => "Coming Soon",
            Category::Search => "Search Results",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Score,
    Popularity,
    ReleaseDate,
    Title,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Score => "score",
            SortBy::Popularity => "popularity",
            SortBy::ReleaseDate => "release_date",
            SortBy::Title => "title",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "popularity" => SortBy::Popularity,
            "release_date" => SortBy::ReleaseDate,
            "title" => SortBy::Title,
            _ => SortBy::Score,
        }
    }
}

/// Listing-page state, derived from and written back to a query string.
///
/// Mirrors the browse URL: `cat=<category>&page=<n>&q=<search>&sort=<order>`.
/// Absent or unrecognized keys take defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseQuery {
    pub category: Category,
    pub page: u32,
    pub query: Option<String>,
    pub sort: SortBy,
}

impl Default for BrowseQuery {
    fn default() -> Self {
        Self {
            category: Category::Popular,
            page: 1,
            query: None,
            sort: SortBy::Score,
        }
    }
}

impl BrowseQuery {
    pub fn from_query_string(s: &str) -> Self {
        let mut browse = Self::default();
        for pair in s.trim_start_matches('?').split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "cat" => browse.category = Category::parse(value),
                "page" => browse.page = value.parse().unwrap_or(1).clamp(1, MAX_PAGE),
                "q" => {
                    let decoded = urlencoding::decode(value)
                        .map(|d| d.into_owned())
                        .unwrap_or_else(|_| value.to_string());
                    if !decoded.is_empty() {
                        browse.query = Some(decoded);
                    }
                }
                "sort" => browse.sort = SortBy::parse(value),
                _ => {}
            }
        }
        browse
    }

    pub fn to_query_string(&self) -> String {
        let mut out = format!("cat={}&page={}", self.category.as_str(), self.page);
        if let Some(ref q) = self.query {
            out.push_str("&q=");
            out.push_str(&urlencoding::encode(q));
        }
        out.push_str("&sort=");
        out.push_str(self.sort.as_str());
        out
    }

    /// Changing category clears any active search and restarts at page 1
    pub fn set_category(&mut self, category: Category) {
        self.category = category;
        self.query = None;
        self.page = 1;
    }

    /// Searching switches into the search category and restarts at page 1
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.query = Some(query.into());
        self.category = Category::Search;
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortBy) {
        self.sort = sort;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.clamp(1, MAX_PAGE);
    }
}

/// Client-side ordering of a fetched page
pub fn sort_movies(movies: &mut [Movie], sort: SortBy) {
    match sort {
        SortBy::Score => movies.sort_by(|a, b| b.vote_average.total_cmp(&a.vote_average)),
        SortBy::Popularity => movies.sort_by(|a, b| b.popularity.total_cmp(&a.popularity)),
        // Newest first; YYYY-MM-DD compares correctly as a string
        SortBy::ReleaseDate => movies.sort_by(|a, b| b.release_date.cmp(&a.release_date)),
        SortBy::Title => movies.sort_by(|a, b| a.title.cmp(&b.title)),
    }
}
