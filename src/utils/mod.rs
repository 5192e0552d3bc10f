const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const FALLBACK_STEM: &str = "document";

/// Keep `[A-Za-z0-9._-]`, turn whitespace into `_`, collapse dot runs and trim the ends.
///
/// Cleaning an already cleaned segment returns it unchanged.
fn clean_segment(segment: &str) -> String {
    let mut cleaned = String::with_capacity(segment.len());
    for c in segment.chars() {
        let c = match c {
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' => c,
            c if c.is_whitespace() => '_',
            _ => continue,
        };
        if c == '.' && cleaned.ends_with('.') {
            continue;
        }
        cleaned.push(c);
    }
    cleaned.trim_start_matches('.').trim_end_matches(['.', '_']).to_string()
}

/// Last path component of an uploaded name, treating both `/` and `\` as separators.
fn base_name(original: &str) -> &str {
    original.rsplit(['/', '\\']).next().unwrap_or(original)
}

/// Lower-cased text after the final `.`, or `None` when the name has no extension.
pub fn file_extension(name: &str) -> Option<String> {
    let (stem, ext) = base_name(name).rsplit_once('.')?;
    if ext.is_empty() || stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Reduce a client supplied filename to a single safe path segment.
///
/// Returns `None` for names that carry nothing usable (empty, only separators, only dots).
pub fn sanitize_filename(original: &str) -> Option<String> {
    let base = base_name(original).trim();
    if base.is_empty() || base.chars().all(|c| c == '.') {
        return None;
    }

    let (raw_stem, raw_ext) = match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (base, None),
    };

    let mut stem = clean_segment(raw_stem);
    if stem.is_empty() {
        stem = FALLBACK_STEM.to_string();
    }
    let reserved = stem.split('.').next().unwrap_or(&stem).to_ascii_uppercase();
    if RESERVED_NAMES.contains(&reserved.as_str()) {
        stem = format!("_{}", stem);
    }

    let ext = raw_ext.map(|e| clean_segment(e).to_ascii_lowercase()).filter(|e| !e.is_empty());
    match ext {
        Some(ext) => Some(format!("{}.{}", stem, ext)),
        None => Some(stem),
    }
}

/// Whether `name` can be joined onto a directory without escaping it.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\', '\0'])
        && !name.contains("..")
        && sanitize_filename(name).as_deref() == Some(name)
}

/// Swap the extension of an already sanitized name.
pub fn with_extension(name: &str, ext: &str) -> String {
    let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name);
    format!("{}.{}", stem, ext)
}
