use time::PrimitiveDateTime;
use time::macros::format_description;
use tracing::warn;

use super::manifest::ManifestEntry;
use super::paths::same_relative;

pub fn normalize_timestamp(value: &str) -> String {
    if let Some(index) = value.rfind('.') {
        return value[..index].to_string();
    }
    let trimmed = value.strip_suffix('Z').unwrap_or(value);
    strip_offset(trimmed).to_string()
}

// `...T10:00:00+02:00` -> `...T10:00:00`
fn strip_offset(value: &str) -> &str {
    let Some(time_start) = value.find('T') else {
        return value;
    };
    match value[time_start..].rfind(['+', '-']) {
        Some(index) => &value[..time_start + index],
        None => value,
    }
}

pub fn parse_timestamp(value: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(value, &format)
}

pub fn is_moved(entry: Option<&ManifestEntry>, new_name: &str, new_path: &str) -> bool {
    match entry {
        Some(entry) => entry.name != new_name || !same_relative(&entry.path, new_path),
        None => false,
    }
}

pub fn is_modified(
    entry: Option<&ManifestEntry>,
    is_folder: bool,
    new_updated_at: &str,
    new_size: u64,
) -> bool {
    let Some(entry) = entry else {
        return true;
    };
    if is_folder || entry.is_folder {
        return true;
    }
    // Renames bump the timestamp too, so a newer time alone is not a change.
    match is_newer(&entry.updated_at, new_updated_at) {
        Some(newer) => newer && entry.size != new_size,
        None => true,
    }
}

// `None` when either side cannot be parsed.
fn is_newer(stored: &str, observed: &str) -> Option<bool> {
    let stored_time = parse_timestamp(stored)
        .inspect_err(|err| warn!("unreadable recorded timestamp {stored:?}: {err}"))
        .ok()?;
    let observed_time = parse_timestamp(observed)
        .inspect_err(|err| warn!("unreadable remote timestamp {observed:?}: {err}"))
        .ok()?;
    Some(stored_time < observed_time)
}
