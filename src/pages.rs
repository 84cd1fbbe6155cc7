//! HTML views for browsers following a paste URL.

use crate::error::{ApiError, ApiResult};
use crate::models::PasteRecord;

const STYLE: &str = "body { font-family: sans-serif; max-width: 900px; margin: 2em auto; \
                     padding: 0 1em; } pre { background: #f4f4f5; padding: 1em; overflow-x: \
                     auto; white-space: pre-wrap; } .meta { color: #555; font-size: 0.9em; }";

/// Render a paste that has just been viewed. `record.views` already counts
/// this view.
pub fn paste(id: &str, record: &PasteRecord) -> ApiResult<String> {
    let mut meta = Vec::new();
    if let Some(created_at) = record.created_at_rfc3339() {
        meta.push(format!("created {}", escaped(&created_at)?));
    }
    if let Some(expires_at) = record.expires_at_rfc3339() {
        meta.push(format!("expires {}", escaped(&expires_at)?));
    }
    meta.push(match record.max_views {
        Some(max_views) => format!("{} of {max_views} views", record.views),
        None => format!("{} views", record.views),
    });
    if let Some(remaining) = record.remaining_views() {
        meta.push(format!("{remaining} views left"));
    }

    let body = format!(
        "<p class=\"meta\">{}</p><pre>{}</pre>",
        meta.join(" &middot; "),
        escaped(&record.content)?
    );
    Ok(layout(&format!("Paste {}", escaped(id)?), &body))
}

/// One page for missing, expired and used-up pastes alike.
pub fn not_found() -> String {
    layout(
        "Paste not found",
        "<p>This paste does not exist, has expired, or has reached its view limit.</p>",
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{STYLE}</style></head><body><h1>{title}</h1>{body}</body></html>\n"
    )
}

/// HTML-escape text; ANSI colour codes in pastes render as styled spans.
fn escaped(text: &str) -> ApiResult<String> {
    ansi_to_html::convert_escaped(text).map_err(|err| ApiError::Render(format!("{err:?}")))
}
