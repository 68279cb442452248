use super::{catalog_client, load_environment};
use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Table;
use moviemuse_catalog::{format_rating, format_runtime};
use moviemuse_models::Video;
use serde_json::json;

pub async fn run_details(id: u64, output: &Output) -> Result<()> {
    let (_path_manager, config, credentials) = load_environment()?;
    let client = catalog_client(&config, &credentials)?;

    let details = client
        .movie_details(id)
        .await
        .map_err(|e| eyre!("Failed to fetch movie {}: {}", id, e))?;

    // Secondary data is best-effort; the detail record alone is still useful
    let (credits, videos, reviews) = tokio::join!(
        client.movie_credits(id),
        client.movie_videos(id),
        client.movie_reviews(id, 1)
    );

    if let OutputFormat::Json | OutputFormat::JsonPretty = output.format() {
        output.json(&json!({
            "details": details,
            "credits": credits.as_ref().ok(),
            "trailer": videos.as_ref().ok().and_then(|v| pick_trailer(v)).and_then(|t| t.watch_url()),
            "reviews": reviews.as_ref().ok().map(|page| &page.results),
        }));
        return Ok(());
    }

    let year = details
        .movie
        .release_year()
        .map(|y| format!(" ({})", y))
        .unwrap_or_default();
    output.println(format!("{}{}", details.movie.title, year));
    if !details.tagline.is_empty() {
        output.println(format!("\"{}\"", details.tagline));
    }

    let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
    if !genres.is_empty() {
        output.println(format!("Genres: {}", genres.join(", ")));
    }
    if let Some(runtime) = details.runtime {
        output.println(format!("Runtime: {}", format_runtime(runtime)));
    }
    output.println(format!(
        "Rating: {} ({} votes)",
        format_rating(details.movie.vote_average),
        details.movie.vote_count
    ));
    if !details.movie.overview.is_empty() {
        output.println(format!("\n{}", details.movie.overview));
    }

    match credits {
        Ok(credits) => {
            if let Some(director) = credits.director() {
                output.println(format!("\nDirector: {}", director.name));
            }
            let top_billed = credits.top_billed(10);
            if !top_billed.is_empty() {
                let mut table = Table::new();
                table.set_header(vec!["Cast", "Character"]);
                for member in top_billed {
                    table.add_row(vec![member.name.clone(), member.character.clone()]);
                }
                output.println(table.to_string());
            }
        }
        Err(e) => output.warn(format!("Failed to fetch cast: {}", e)),
    }

    match videos {
        Ok(videos) => {
            if let Some(url) = pick_trailer(&videos).and_then(|t| t.watch_url()) {
                output.println(format!("\nTrailer: {}", url));
            }
        }
        Err(e) => output.warn(format!("Failed to fetch videos: {}", e)),
    }

    match reviews {
        Ok(reviews) => {
            for review in reviews.results.iter().take(3) {
                output.println(format!(
                    "\n- {} ({}):\n{}",
                    review.author,
                    review.created_at.format("%Y-%m-%d"),
                    excerpt(&review.content, 240)
                ));
            }
        }
        Err(e) => output.warn(format!("Failed to fetch reviews: {}", e)),
    }

    Ok(())
}

/// Prefer the official trailer, fall back to any trailer
fn pick_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .find(|v| v.is_trailer() && v.official)
        .or_else(|| videos.iter().find(|v| v.is_trailer()))
}

fn excerpt(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let cut: String = content.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
