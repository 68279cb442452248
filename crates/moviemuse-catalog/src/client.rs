use crate::browse::{BrowseQuery, Category};
use crate::error::CatalogError;
use moviemuse_config::CatalogConfig;
use moviemuse_models::{Credits, Genre, Movie, MovieDetails, Page, Review, Video};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

/// Error body the catalog returns for non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    status_message: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    results: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct GenresResponse {
    genres: Vec<Genre>,
}

#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl CatalogClient {
    pub fn new(api_key: String, config: &CatalogConfig) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(endpoint, "Catalog request");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
            .query(params)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) => body.status_message,
                Err(e) => {
                    warn!("Failed to decode catalog error body: {}", e);
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                }
            };
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    pub async fn popular_movies(&self, page: u32) -> Result<Page<Movie>, CatalogError> {
        self.get("/movie/popular", &[("page", page.to_string())]).await
    }

    pub async fn trending_movies(&self, page: u32) -> Result<Page<Movie>, CatalogError> {
        self.get("/trending/movie/week", &[("page", page.to_string())]).await
    }

    pub async fn top_rated_movies(&self, page: u32) -> Result<Page<Movie>, CatalogError> {
        self.get("/movie/top_rated", &[("page", page.to_string())]).await
    }

    pub async fn now_playing_movies(&self, page: u32) -> Result<Page<Movie>, CatalogError> {
        self.get("/movie/now_playing", &[("page", page.to_string())]).await
    }

    pub async fn upcoming_movies(&self, page: u32) -> Result<Page<Movie>, CatalogError> {
        self.get("/movie/upcoming", &[("page", page.to_string())]).await
    }

    pub async fn search_movies(&self, query: &str, page: u32) -> Result<Page<Movie>, CatalogError> {
        self.get(
            "/search/movie",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    /// Fetch the page a browse query asks for: search when a query is set,
    /// otherwise the category listing
    pub async fn browse(&self, query: &BrowseQuery) -> Result<Page<Movie>, CatalogError> {
        if let Some(ref q) = query.query {
            return self.search_movies(q, query.page).await;
        }
        match query.category {
            Category::Trending => self.trending_movies(query.page).await,
            Category::TopRated => self.top_rated_movies(query.page).await,
            Category::NowPlaying => self.now_playing_movies(query.page).await,
            Category::Upcoming => self.upcoming_movies(query.page).await,
            Category::Popular | Category::Search => self.popular_movies(query.page).await,
        }
    }

    pub async fn movie_details(&self, id: u64) -> Result<MovieDetails, CatalogError> {
        self.get(&format!("/movie/{}", id), &[]).await
    }

    pub async fn movie_credits(&self, id: u64) -> Result<Credits, CatalogError> {
        self.get(&format!("/movie/{}/credits", id), &[]).await
    }

    pub async fn movie_videos(&self, id: u64) -> Result<Vec<Video>, CatalogError> {
        let response: VideosResponse = self.get(&format!("/movie/{}/videos", id), &[]).await?;
        Ok(response.results)
    }

    pub async fn movie_reviews(&self, id: u64, page: u32) -> Result<Page<Review>, CatalogError> {
        self.get(
            &format!("/movie/{}/reviews", id),
            &[("page", page.to_string())],
        )
        .await
    }

    pub async fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let response: GenresResponse = self.get("/genre/movie/list", &[]).await?;
        Ok(response.genres)
    }
}

#[cfg(test)]
mod tests {
    use moviemuse_models::{Movie, MovieDetails, Page};

    const MOVIE_PAGE_JSON: &str = r#"{
        "page": 1,
        "results": [
            {
                "id": 603,
                "title": "The Matrix",
                "overview": "A hacker learns the truth.",
                "poster_path": "/matrix.jpg",
                "backdrop_path": null,
                "release_date": "1999-03-30",
                "vote_average": 8.2,
                "vote_count": 24000,
                "genre_ids": [28, 878],
                "adult": false,
                "original_language": "en",
                "original_title": "The Matrix",
                "popularity": 85.4,
                "video": false
            }
        ],
        "total_pages": 500,
        "total_results": 10000
    }"#;

    const DETAILS_JSON: &str = r#"{
        "id": 603,
        "title": "The Matrix",
        "overview": "A hacker learns the truth.",
        "poster_path": "/matrix.jpg",
        "backdrop_path": "/matrix_bg.jpg",
        "release_date": "1999-03-30",
        "vote_average": 8.2,
        "vote_count": 24000,
        "adult": false,
        "original_language": "en",
        "original_title": "The Matrix",
        "popularity": 85.4,
        "video": false,
        "genres": [{"id": 28, "name": "Action"}],
        "runtime": 136,
        "production_companies": [],
        "production_countries": [],
        "spoken_languages": [],
        "status": "Released",
        "tagline": "Free your mind.",
        "budget": 63000000,
        "revenue": 463517383
    }"#;

    #[test]
    fn test_decode_movie_page() {
        let page: Page<Movie> = serde_json::from_str(MOVIE_PAGE_JSON).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, 603);
        assert_eq!(page.results[0].release_year(), Some(1999));
        assert_eq!(page.total_pages, 500);
    }

    #[test]
    fn test_decode_details_without_genre_ids() {
        // Detail responses carry `genres` objects instead of `genre_ids`
        let details: MovieDetails = serde_json::from_str(DETAILS_JSON).unwrap();
        assert_eq!(details.movie.title, "The Matrix");
        assert_eq!(details.runtime, Some(136));
        assert_eq!(details.genres[0].name, "Action");
        assert!(details.movie.genre_ids.is_empty());
    }
}
