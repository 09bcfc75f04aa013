use std::io::IsTerminal;
use std::path::PathBuf;

use clap::ValueEnum;
use color_eyre::eyre::Context;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use dialoguer::Confirm;
use flickbox_catalog::Catalog;
use flickbox_models::{MediaType, WatchlistEntry};
use flickbox_store::{Notice, Watchlist};

use crate::commands::browse::fetch_spinner;
use crate::output::{Output, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Render a mutation's notice the way the app surfaced its toasts.
fn report(notice: &Notice, output: &Output) {
    match notice {
        Notice::Added { title } => {
            output.success(format!("{} has been added to your watchlist", title));
        }
        Notice::AlreadyInWatchlist { title } => {
            output.info(format!("{} is already in your watchlist", title));
        }
        Notice::Removed { title } => {
            output.success(format!("{} has been removed from your watchlist", title));
        }
        Notice::MarkedWatched { title } => {
            output.success(format!("{} marked as watched", title));
        }
        Notice::MarkedUnwatched { title } => {
            output.success(format!("{} marked as unwatched", title));
        }
        Notice::NotFound => {
            output.warn("No matching title in your watchlist");
        }
        Notice::Cleared => {
            output.success("All items have been removed from your watchlist");
        }
    }
}

pub fn run_list(watchlist: &Watchlist, watched: Option<bool>, output: &Output) -> Result<()> {
    let entries = match watched {
        Some(watched) => {
            if watched {
                watchlist.watched_items()
            } else {
                watchlist.unwatched_items()
            }
        }
        None => watchlist.entries(),
    };

    if output.format() != OutputFormat::Human {
        output.json(&serde_json::to_value(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        output.info("Your watchlist is empty.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Type", "Title", "Released", "Added", "Watched"]);
    for entry in &entries {
        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(entry.media_type),
            Cell::new(entry.display_title()),
            Cell::new(entry.date().unwrap_or("-")),
            Cell::new(entry.added_at.format("%Y-%m-%d")),
            Cell::new(if entry.watched { "yes" } else { "no" }),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    output.info(table.to_string());
    output.info(format!(
        "{} title(s), {} watched",
        watchlist.len(),
        watchlist.watched_count()
    ));
    Ok(())
}

/// Fetch the detail record, snapshot it, and add it to the watchlist.
pub async fn run_add(
    catalog: &dyn Catalog,
    watchlist: &Watchlist,
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

    let item = details.to_media_item(media_type);
    let notice = watchlist.add(&item)?;
    report(&notice, output);
    Ok(())
}

pub fn run_remove(
    watchlist: &Watchlist,
    id: i64,
    media_type: MediaType,
    output: &Output,
) -> Result<()> {
    let notice = watchlist.remove(id, media_type)?;
    report(&notice, output);
    Ok(())
}

pub fn run_watched(
    watchlist: &Watchlist,
    id: i64,
    media_type: MediaType,
    output: &Output,
) -> Result<()> {
    let notice = watchlist.toggle_watched(id, media_type)?;
    report(&notice, output);
    Ok(())
}

pub fn run_clear(watchlist: &Watchlist, yes: bool, output: &Output) -> Result<()> {
    if watchlist.is_empty() {
        output.info("Your watchlist is already empty.");
        return Ok(());
    }

    // Never prompt when the answer was given up front or no one is there to
    // answer.
    let confirmed = if yes || output.is_quiet() || !std::io::stdin().is_terminal() {
        yes
    } else {
        Confirm::new()
            .with_prompt(format!(
                "Remove all {} title(s) from your watchlist?",
                watchlist.len()
            ))
            .default(false)
            .interact()?
    };

    if !confirmed {
        output.info("Nothing cleared.");
        return Ok(());
    }

    let notice = watchlist.clear()?;
    report(&notice, output);
    Ok(())
}

pub fn run_export(
    watchlist: &Watchlist,
    format: ExportFormat,
    out: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let entries = watchlist.entries();
    let rendered = match format {
        ExportFormat::Json => serde_json::to_string_pretty(&entries)?,
        ExportFormat::Csv => render_csv(&entries)?,
    };

    match out {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("writing export to {}", path.display()))?;
            output.success(format!(
                "Exported {} title(s) to {}",
                entries.len(),
                path.display()
            ));
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn render_csv(entries: &[WatchlistEntry]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "media_type",
        "title",
        "released",
        "vote_average",
        "genre_ids",
        "added_at",
        "watched",
    ])?;
    for entry in entries {
        let genre_ids = entry
            .genre_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writer.write_record([
            entry.id.to_string(),
            entry.media_type.to_string(),
            entry.display_title().to_string(),
            entry.date().unwrap_or("").to_string(),
            format!("{:.1}", entry.vote_average),
            genre_ids,
            entry.added_at.to_rfc3339(),
            entry.watched.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| color_eyre::eyre::eyre!("finalizing csv export: {}", e))?;
    Ok(String::from_utf8(bytes).context("csv export was not valid utf-8")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flickbox_models::{MediaItem, Movie};

    #[test]
    fn csv_export_has_one_row_per_entry() {
        let item = MediaItem::Movie(Movie {
            id: 550,
            title: "Fight Club".to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: Some("1999-10-15".to_string()),
            vote_average: 8.4,
            vote_count: 26000,
            popularity: 61.4,
            genre_ids: vec![18, 53],
        });
        let entries = vec![WatchlistEntry::from_media(&item, Utc::now())];

        let csv = render_csv(&entries).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,media_type,title"));
        assert!(lines[1].contains("Fight Club"));
        assert!(lines[1].contains("18 53"));
    }
}
