//! Fixed-format timestamp handling
//!
//! Every timestamp on the wire uses the HTTP date layout
//! `"Mon, 02 Jan 2006 15:04:05 GMT"`. Parsing is exact: anything that does
//! not match the layout (including a weekday that disagrees with the date)
//! is rejected.

use chrono::{NaiveDateTime, SubsecRound, Utc};

/// chrono layout of the wire timestamp format
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

const HTTP_DATE_ERROR: &str = "Date must use the format 'Mon, 02 Jan 2006 15:04:05 GMT'";

/// Parse a wire timestamp.
///
/// chrono accepts unpadded numbers and any letter case, so the parsed value
/// must also format back to exactly the input.
pub fn parse_http_date(value: &str) -> Result<NaiveDateTime, &'static str> {
    let parsed = NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT).map_err(|_| HTTP_DATE_ERROR)?;
    if format_http_date(&parsed) != value {
        return Err(HTTP_DATE_ERROR);
    }
    Ok(parsed)
}

/// Format a timestamp for the wire
pub fn format_http_date(value: &NaiveDateTime) -> String {
    value.format(HTTP_DATE_FORMAT).to_string()
}

/// Current UTC time truncated to whole seconds, the resolution of the wire format
pub fn now_utc() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(0)
}

/// Serde adapter for `NaiveDateTime` fields using the wire format
pub mod http_date {
    use chrono::NaiveDateTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_http_date(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_http_date(&raw).map_err(D::Error::custom)
    }
}
