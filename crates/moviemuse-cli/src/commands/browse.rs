use super::{catalog_client, load_environment};
use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Table;
use moviemuse_catalog::browse::sort_movies;
use moviemuse_catalog::{format_rating, BrowseQuery, Category, SortBy, MAX_PAGE};
use serde_json::json;
use tracing::debug;

pub async fn run_browse(
    category: &str,
    page: u32,
    search: Option<String>,
    sort: &str,
    output: &Output,
) -> Result<()> {
    let (_path_manager, config, credentials) = load_environment()?;
    let client = catalog_client(&config, &credentials)?;

    // Mutator order matters: category and search reset the page
    let mut query = BrowseQuery::default();
    query.set_category(Category::parse(category));
    if let Some(q) = search {
        query.set_search(q);
    }
    query.set_sort(SortBy::parse(sort));
    query.set_page(page);
    debug!(query = %query.to_query_string(), "Browsing catalog");

    let fetched = client
        .browse(&query)
        .await
        .map_err(|e| eyre!("Failed to fetch movies: {}", e))?;
    let total_pages = fetched.total_pages.min(MAX_PAGE);

    let mut movies = fetched.results;
    sort_movies(&mut movies, query.sort);

    match output.format() {
        OutputFormat::Human => {
            let heading = match query.query {
                Some(ref q) => format!("All Results for \"{}\"", q),
                None => query.category.label().to_string(),
            };
            output.println(heading);

            let mut table = Table::new();
            table.set_header(vec!["ID", "Title", "Year", "Rating"]);
            for movie in &movies {
                table.add_row(vec![
                    movie.id.to_string(),
                    movie.title.clone(),
                    movie
                        .release_year()
                        .map(|y| y.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    format_rating(movie.vote_average),
                ]);
            }
            output.println(table.to_string());
            output.println(format!(
                "Page {} of {} ({} results)",
                fetched.page, total_pages, fetched.total_results
            ));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "query": query.to_query_string(),
                "page": fetched.page,
                "total_pages": total_pages,
                "total_results": fetched.total_results,
                "movies": movies,
            }));
        }
    }

    Ok(())
}
