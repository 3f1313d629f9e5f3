use jiff::Zoned;

use crate::format::AudioFormat;

/// Label used when the client does not name the voice
pub const DEFAULT_LABEL: &str = "default";

/// Download name: `<YYYY-MM-DD_HH-MM>_<label>.<ext>`
///
/// Spaces in the label become underscores. The minute comes from `now`, so
/// two requests in the same minute get the same name.
pub fn compose_filename(label: Option<&str>, format: AudioFormat, now: &Zoned) -> String {
    let label = label
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .unwrap_or(DEFAULT_LABEL)
        .replace(' ', "_");

    format!("{}_{label}.{}", now.strftime("%Y-%m-%d_%H-%M"), format.extension())
}

/// `Content-Disposition` value for a download
///
/// Names that are not plain visible ASCII get an ASCII fallback plus an
/// RFC 5987 `filename*` parameter.
pub fn content_disposition(filename: &str) -> String {
    if filename.bytes().all(|b| b.is_ascii_graphic() && b != b'"' && b != b'\\') {
        return format!("attachment; filename=\"{filename}\"");
    }

    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();

    let encoded: String = filename
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b"-._~".contains(&b) {
                char::from(b).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect();

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
