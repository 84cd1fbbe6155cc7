use chrono::{DateTime, Utc};
use tracing::{debug, enabled, info, warn, Level};

use crate::error::{ApiError, ApiResult, ValidationError};
use crate::keys::generate_key;
use crate::models::PasteRecord;
use crate::storage::Store;
use crate::types::api::{CreatedPaste, NewPaste};
use crate::App;

/// Fresh ids drawn before giving up on finding an unused one.
const MAX_KEY_ATTEMPTS: usize = 8;

pub async fn create(app: &App, paste: NewPaste, now: DateTime<Utc>) -> ApiResult<CreatedPaste> {
    let NewPaste {
        content,
        ttl_seconds,
        max_views,
    } = paste;

    if content.trim().is_empty() {
        return Err(ValidationError::InvalidContent.into());
    }

    let now = now.timestamp_millis();
    let expires_at = ttl_seconds.map(|ttl| expiry(now, ttl)).transpose()?;
    let max_views = max_views
        .map(|n| {
            u64::try_from(n)
                .ok()
                .filter(|n| *n >= 1)
                .ok_or(ValidationError::InvalidMaxViews)
        })
        .transpose()?;

    let key = unused_key(app).await?;

    info!(
        "new paste: key='{key}', size={size}, expires_at={expires_at:?}, max_views={max_views:?}",
        size = content.len()
    );

    app.store
        .set(&key, PasteRecord::new(content, now, expires_at, max_views))
        .await?;

    let url = format!("{base_url}/p/{key}", base_url = app.config.base_url);
    Ok(CreatedPaste { id: key, url })
}

/// Count a view of the paste and return it, with `views` including this one.
pub async fn read(app: &App, key: &str, now: DateTime<Utc>) -> ApiResult<PasteRecord> {
    let now = now.timestamp_millis();

    let Some(record) = app.store.record_view(key, now).await? else {
        if enabled!(Level::DEBUG) {
            log_hidden(app, key, now).await;
        }
        return Err(ApiError::NotFound);
    };

    Ok(record)
}

/// Whether the backing store is reachable.
pub async fn health(app: &App) -> bool {
    match app.store.ping().await {
        Ok(()) => true,
        Err(err) => {
            warn!("health check failed: {err}");
            false
        }
    }
}

fn expiry(now: i64, ttl_seconds: i64) -> Result<i64, ValidationError> {
    if ttl_seconds < 1 {
        return Err(ValidationError::InvalidTtl);
    }
    ttl_seconds
        .checked_mul(1000)
        .and_then(|ttl| now.checked_add(ttl))
        .filter(|expires_at| DateTime::<Utc>::from_timestamp_millis(*expires_at).is_some())
        .ok_or(ValidationError::TtlTooLarge)
}

async fn unused_key(app: &App) -> ApiResult<String> {
    for _ in 0..MAX_KEY_ATTEMPTS {
        let key = generate_key();
        if !app.store.has(&key).await? {
            return Ok(key);
        }
        warn!("paste key collision: {key}");
    }
    Err(ApiError::KeyExhausted)
}

async fn log_hidden(app: &App, key: &str, now: i64) {
    let reason = match app.store.get(key).await {
        Ok(None) => "missing",
        Ok(Some(record)) if record.is_expired(now) => "expired",
        Ok(Some(record)) if record.is_exhausted() => "view cap reached",
        Ok(Some(_)) => "hidden",
        Err(_) => "unknown",
    };
    debug!("paste not served: key='{key}', reason={reason}");
}
