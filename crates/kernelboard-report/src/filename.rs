//! File names for downloads.

use kernelboard_core::FilterSelection;

/// `"{prefix}_{filters}.{ext}"`, or `"{prefix}.{ext}"` when nothing is
/// selected. Characters that are unsafe in file names, and anything outside
/// ASCII, become `-` so the name fits a plain HTTP header.
#[must_use]
pub fn download_name(prefix: &str, selection: &FilterSelection, ext: &str) -> String {
    let parts = selection.label_parts();
    let stem = if parts.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}_{}", parts.join("_"))
    };
    format!("{}.{ext}", sanitize(&stem))
}

fn sanitize(stem: &str) -> String {
    stem.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if !c.is_ascii() || c.is_ascii_control() || c.is_whitespace() => '-',
            c => c,
        })
        .collect()
}
