use std::io::IsTerminal;
use std::time::Duration;

use color_eyre::Result;
use comfy_table::{Cell, Table};
use flickbox_catalog::{Catalog, DiscoverFilters};
use flickbox_models::{Genre, MediaDetails, MediaItem, MediaType, Page};
use indicatif::{ProgressBar, ProgressStyle};

use crate::output::{Output, OutputFormat};

/// Spinner shown while a catalog request is in flight. Hidden when stderr is
/// not a terminal so piped output stays clean.
pub fn fetch_spinner(msg: &str) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb.set_message(msg.to_string());
    pb
}

fn media_table(items: &[MediaItem]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Type", "Title", "Year", "Rating"]);
    for item in items {
        table.add_row(vec![
            Cell::new(item.id()),
            Cell::new(item.media_type()),
            Cell::new(item.display_title()),
            Cell::new(item.year().unwrap_or("-")),
            Cell::new(format!("{:.1}", item.vote_average())),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn print_items(items: Vec<MediaItem>, output: &Output) -> Result<()> {
    if output.format() == OutputFormat::Human {
        if items.is_empty() {
            output.info("No results.");
        } else {
            output.info(media_table(&items).to_string());
        }
    } else {
        output.json(&serde_json::to_value(&items)?);
    }
    Ok(())
}

fn print_page(page: Page<MediaItem>, output: &Output) -> Result<()> {
    if output.format() == OutputFormat::Human {
        if page.results.is_empty() {
            output.info("No results.");
        } else {
            output.info(media_table(&page.results).to_string());
            output.info(format!(
                "Page {} of {} ({} results total)",
                page.page, page.total_pages, page.total_results
            ));
        }
    } else {
        output.json(&serde_json::to_value(&page)?);
    }
    Ok(())
}

pub async fn run_trending(catalog: &dyn Catalog, tv: bool, output: &Output) -> Result<()> {
    let spinner = fetch_spinner("Fetching trending titles...");
    let items = if tv {
        catalog
            .trending_tv()
            .await?
            .into_iter()
            .map(MediaItem::Tv)
            .collect()
    } else {
        catalog
            .trending_movies()
            .await?
            .into_iter()
            .map(MediaItem::Movie)
            .collect()
    };
    spinner.finish_and_clear();
    print_items(items, output)
}

pub async fn run_popular(catalog: &dyn Catalog, output: &Output) -> Result<()> {
    let spinner = fetch_spinner("Fetching popular movies...");
    let items = catalog
        .popular_movies()
        .await?
        .into_iter()
        .map(MediaItem::Movie)
        .collect();
    spinner.finish_and_clear();
    print_items(items, output)
}

pub async fn run_top_rated(catalog: &dyn Catalog, tv: bool, output: &Output) -> Result<()> {
    let spinner = fetch_spinner("Fetching top rated titles...");
    let items = if tv {
        catalog
            .top_rated_tv()
            .await?
            .into_iter()
            .map(MediaItem::Tv)
            .collect()
    } else {
        catalog
            .top_rated_movies()
            .await?
            .into_iter()
            .map(MediaItem::Movie)
            .collect()
    };
    spinner.finish_and_clear();
    print_items(items, output)
}

pub async fn run_search(
    catalog: &dyn Catalog,
    query: &str,
    tv: bool,
    multi: bool,
    page: u32,
    output: &Output,
) -> Result<()> {
    let spinner = fetch_spinner(&format!("Searching for \"{}\"...", query));
    let page = if multi {
        catalog.search_multi(query, page).await?
    } else if tv {
        catalog.search_tv(query, page).await?.map(MediaItem::Tv)
    } else {
        catalog
            .search_movies(query, page)
            .await?
            .map(MediaItem::Movie)
    };
    spinner.finish_and_clear();
    print_page(page, output)
}

pub async fn run_discover(
    catalog: &dyn Catalog,
    media_type: MediaType,
    filters: DiscoverFilters,
    output: &Output,
) -> Result<()> {
    let spinner = fetch_spinner("Discovering titles...");
    let page = catalog.discover(media_type, &filters).await?;
    spinner.finish_and_clear();
    print_page(page, output)
}

pub async fn run_genres(
    catalog: &dyn Catalog,
    media_type: Option<MediaType>,
    output: &Output,
) -> Result<()> {
    let spinner = fetch_spinner("Fetching genres...");
    let genres: Vec<Genre> = match media_type {
        Some(MediaType::Movie) => catalog.movie_genres().await?,
        Some(MediaType::Tv) => catalog.tv_genres().await?,
        None => catalog.all_genres().await?,
    };
    spinner.finish_and_clear();

    if output.format() == OutputFormat::Human {
        let mut table = Table::new();
        table.set_header(vec!["ID", "Genre"]);
        for genre in &genres {
            table.add_row(vec![Cell::new(genre.id), Cell::new(&genre.name)]);
        }
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
        output.info(table.to_string());
    } else {
        output.json(&serde_json::to_value(&genres)?);
    }
    Ok(())
}

pub async fn run_details(
    catalog: &dyn Catalog,
    id: i64,
    media_type: MediaType,
    output: &Output,
) -> Result<()> {
    let spinner = fetch_spinner("Fetching details...");
    let details = match media_type {
        MediaType::Movie => catalog.movie_details(id).await?,
        MediaType::Tv => catalog.tv_details(id).await?,
    };
    spinner.finish_and_clear();

    if output.format() != OutputFormat::Human {
        output.json(&serde_json::to_value(&details)?);
        return Ok(());
    }

    print_details(&details, output);
    Ok(())
}

fn print_details(details: &MediaDetails, output: &Output) {
    let mut heading = details.display_title().to_string();
    if let Some(date) = details
        .release_date
        .as_deref()
        .or(details.first_air_date.as_deref())
    {
        if let Some(year) = date.get(0..4) {
            heading.push_str(&format!(" ({})", year));
        }
    }
    output.info(heading);

    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        output.info(format!("\"{}\"", tagline));
    }
    if !details.overview.is_empty() {
        output.info("");
        output.info(&details.overview);
    }

    output.info("");
    let genres = details
        .genres
        .iter()
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if !genres.is_empty() {
        output.info(format!("Genres:  {}", genres));
    }
    output.info(format!(
        "Rating:  {:.1} ({} votes)",
        details.vote_average, details.vote_count
    ));
    if let Some(runtime) = details.runtime {
        output.info(format!("Runtime: {} min", runtime));
    }
    if let (Some(seasons), Some(episodes)) =
        (details.number_of_seasons, details.number_of_episodes)
    {
        output.info(format!("Seasons: {} ({} episodes)", seasons, episodes));
    }
    if let Some(status) = details.status.as_deref() {
        output.info(format!("Status:  {}", status));
    }

    let cast = details
        .credits
        .cast
        .iter()
        .take(5)
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if !cast.is_empty() {
        output.info(format!("Cast:    {}", cast));
    }

    // Surface the first YouTube trailer the way the detail page did.
    if let Some(trailer) = details
        .videos
        .iter()
        .find(|v| v.site == "YouTube" && v.video_type == "Trailer")
    {
        output.info(format!(
            "Trailer: https://www.youtube.com/watch?v={}",
            trailer.key
        ));
    }
}
