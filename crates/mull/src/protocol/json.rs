use serde::de::DeserializeOwned;

/// Decode one stream unit, or skip it.
///
/// Blank input is not an error and is skipped silently. Malformed input is logged at
/// debug level and skipped; a bad unit never ends the stream it arrived on.
pub fn parse_or_skip<T: DeserializeOwned>(raw: &[u8]) -> Option<T> {
    let Some(start) = raw.iter().position(|b| !b.is_ascii_whitespace()) else {
        return None;
    };
    let end = raw
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(raw.len(), |i| i + 1);
    let raw = &raw[start..end];

    match serde_json::from_slice(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(
                error = %e,
                unit = %String::from_utf8_lossy(raw),
                "Skipping malformed stream unit"
            );
            None
        }
    }
}
