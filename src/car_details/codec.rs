use super::details::CarDetails;
use lazy_static::lazy_static;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const INDENT: &[u8] = b"   ";

lazy_static! {
    static ref CONTROL_WHITESPACE: BytesRegex = BytesRegex::new(r"[\t\r\n]+").unwrap();
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();
}

#[derive(Debug, Error)]
pub enum CarDetailsError {
    #[error("Malformed car details document: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Could not serialize car details: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Decodes a `ui_car.json` document.
///
/// Tabs, carriage returns and newlines are removed wherever they appear and a
/// leading UTF-8 BOM is dropped before decoding. The numeric specs are always
/// recomputed from the string specs.
pub fn parse(raw: &[u8]) -> Result<CarDetails, CarDetailsError> {
    let cleaned = CONTROL_WHITESPACE.replace_all(raw, &b""[..]);
    let cleaned = cleaned.strip_prefix(UTF8_BOM).unwrap_or(&cleaned[..]);

    let value: Value = serde_json::from_slice(cleaned).map_err(CarDetailsError::Parse)?;
    if !value.is_object() {
        return Err(CarDetailsError::Parse(serde::de::Error::custom(
            "expected a JSON object",
        )));
    }

    let mut details: CarDetails = serde_json::from_value(value).map_err(CarDetailsError::Parse)?;
    details.refresh_numeric_specs();
    Ok(details)
}

/// Encodes details with three-space indentation and a trailing newline.
pub fn serialize(details: &CarDetails) -> Result<Vec<u8>, CarDetailsError> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    details
        .serialize(&mut serializer)
        .map_err(CarDetailsError::Serialize)?;
    out.push(b'\n');
    Ok(out)
}

/// First run of ASCII digits in `text` as an integer, or 0 when there is none
/// (or it does not fit in an i64).
pub fn extract_leading_integer(text: &str) -> i64 {
    DIGIT_RUN
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
