use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::models::PasteRecord;

/// A create request after type checking. Range rules are applied by
/// [`crate::controllers::paste::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaste {
    pub content: String,
    pub ttl_seconds: Option<i64>,
    pub max_views: Option<i64>,
}

impl TryFrom<Value> for NewPaste {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut fields) = value else {
            return Err(ValidationError::NotAnObject);
        };

        let content = match fields.remove("content") {
            Some(Value::String(content)) => content,
            _ => return Err(ValidationError::InvalidContent),
        };
        let ttl_seconds = optional_integer(fields.remove("ttl_seconds"))
            .map_err(|_| ValidationError::InvalidTtl)?;
        let max_views = optional_integer(fields.remove("max_views"))
            .map_err(|_| ValidationError::InvalidMaxViews)?;

        Ok(NewPaste {
            content,
            ttl_seconds,
            max_views,
        })
    }
}

/// Absent and `null` both mean "not given". Integral floats such as `5.0`
/// count as integers. Anything outside the `i64` range is rejected.
fn optional_integer(value: Option<Value>) -> Result<Option<i64>, ()> {
    let number = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number,
        Some(_) => return Err(()),
    };

    if let Some(n) = number.as_i64() {
        Ok(Some(n))
    } else if number.as_u64().is_some() {
        Err(())
    } else {
        match number.as_f64() {
            Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                Ok(Some(f as i64))
            }
            _ => Err(()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedPaste {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PasteView {
    pub content: String,
    pub remaining_views: Option<u64>,
    pub expires_at: Option<String>,
}

impl From<PasteRecord> for PasteView {
    fn from(record: PasteRecord) -> Self {
        PasteView {
            remaining_views: record.remaining_views(),
            expires_at: record.expires_at_rfc3339(),
            content: record.content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub ok: bool,
}
