//! Printing section views and listings.

use crate::cli::OutputFormat;
use chrono::NaiveDate;
use serde_json::json;
use tenor::output::TextTable;
use tenor::{FilteredReturns, SectionView};

/// Render every table of a view in the requested format.
pub(crate) fn render_view(
    view: &SectionView,
    filtered: &FilteredReturns,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        OutputFormat::Json => view.report(filtered)?.to_json()?,
        OutputFormat::Text | OutputFormat::Markdown => {
            let mut out = String::new();
            if filtered.is_empty() {
                out.push_str("No returns match the selection.\n");
            }
            out.push_str(&render_tables(&view.tables(), format));
            out
        }
    })
}

fn render_tables(tables: &[TextTable], format: OutputFormat) -> String {
    let rendered: Vec<String> = tables
        .iter()
        .map(|table| match format {
            OutputFormat::Markdown => table.to_markdown(),
            _ => table.to_ascii_table(),
        })
        .collect();
    rendered.join("\n")
}

/// Render the asset listing.
pub(crate) fn render_assets(
    assets: &[String],
    range: Option<(NaiveDate, NaiveDate)>,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(&json!({
            "assets": assets,
            "start": range.map(|r| r.0),
            "end": range.map(|r| r.1),
        }));
    }

    let mut table = TextTable::new("Available Assets", ["#", "Asset"]);
    for (i, asset) in assets.iter().enumerate() {
        table.push_row(vec![(i + 1).to_string(), asset.clone()]);
    }
    let mut out = match format {
        OutputFormat::Markdown => table.to_markdown(),
        _ => table.to_ascii_table(),
    };
    if let Some((start, end)) = range {
        out.push_str(&format!("\nDate range: {start} to {end}\n"));
    }
    Ok(out)
}
