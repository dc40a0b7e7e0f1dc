//! Windows `Path` variable manipulation.
//!
//! Pure string functions. Entries compare case-insensitively and ignore a
//! trailing separator, matching how Windows resolves them.

/// Separator between entries of a Windows `Path` value.
pub const SEPARATOR: char = ';';

/// Iterate over the non-empty entries of a `Path` value.
pub fn entries(path_var: &str) -> impl Iterator<Item = &str> {
    path_var
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|e| !e.is_empty())
}

fn normalize(entry: &str) -> String {
    entry
        .trim()
        .trim_end_matches(['\\', '/'])
        .to_ascii_lowercase()
}

/// Returns `true` if `dir` is already an entry of `path_var`.
#[must_use]
pub fn contains_entry(path_var: &str, dir: &str) -> bool {
    let wanted = normalize(dir);
    entries(path_var).any(|e| normalize(e) == wanted)
}

/// Append `dir` to `path_var`.
///
/// Returns `None` when `dir` is empty or already present, so callers can skip
/// the write. Empty segments in the existing value are dropped.
#[must_use]
pub fn append_entry(path_var: &str, dir: &str) -> Option<String> {
    let dir = dir.trim();
    if dir.is_empty() || contains_entry(path_var, dir) {
        return None;
    }
    let mut parts: Vec<&str> = entries(path_var).collect();
    parts.push(dir);
    Some(parts.join(&SEPARATOR.to_string()))
}
