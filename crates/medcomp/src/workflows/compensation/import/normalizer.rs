/// Strip invisible marks and collapse runs of whitespace, preserving case.
pub(crate) fn normalize_label(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-case lookup form used for category aliases.
pub(crate) fn normalize_alias(value: &str) -> String {
    normalize_label(value)
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}
