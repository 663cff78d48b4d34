use std::collections::HashSet;

/// Pick a filename that does not collide with any name already stored for
/// the node.
///
/// A taken name gets a `_copy-NN` suffix before the extension, numbered
/// one past the highest suffix already present for that `(stem, extension)`
/// pair. The counter is global per pair: uploading `a_copy-01.txt` into a
/// directory that already holds it yields `a_copy-02.txt`, not a nested
/// `a_copy-01_copy-01.txt`.
///
/// `existing` is a snapshot; the caller is responsible for passing a fresh
/// listing and for surfacing any snapshot-to-write race as a write failure.
pub fn allocate(desired: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(desired) {
        return desired.to_string();
    }

    let (stem, ext) = split_name(desired);
    let stem = strip_copy_suffix(stem);

    let max_seen = existing
        .iter()
        .filter_map(|name| copy_sequence(name, stem, ext))
        .max()
        .unwrap_or(0);

    let mut next = max_seen + 1;
    loop {
        let candidate = format!("{stem}_copy-{next:02}{ext}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        next += 1;
    }
}

/// Split into `(stem, extension)` where the extension keeps its leading dot
/// and is empty when absent. A lone leading dot (`.gitignore`) is part of
/// the stem, not an extension.
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// If the stem already carries a `_copy-NN` suffix, strip it so collision
/// counting runs against the original basename.
fn strip_copy_suffix(stem: &str) -> &str {
    if let Some(idx) = stem.rfind("_copy-") {
        let digits = &stem[idx + "_copy-".len()..];
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return &stem[..idx];
        }
    }
    stem
}

/// The sequence number of `name` if it matches `{stem}_copy-NN{ext}`.
fn copy_sequence(name: &str, stem: &str, ext: &str) -> Option<u32> {
    let middle = name.strip_suffix(ext)?.strip_prefix(stem)?;
    let digits = middle.strip_prefix("_copy-")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
