use chrono::Local;

/// Characters that are illegal in filenames on common platforms.
const ILLEGAL_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Base name used when the configured one sanitizes to nothing.
pub const DEFAULT_BASE_NAME: &str = "ifc_properties_export";

/// Replace illegal filename characters with underscores.
#[must_use]
pub fn sanitize_base_name(name: &str) -> String {
    name.trim().replace(ILLEGAL_CHARS, "_")
}

/// `<sanitized-base>_<date>.<ext>` with an explicit date part.
#[must_use]
pub fn compose_filename(base: &str, date: &str, ext: &str) -> String {
    let safe = sanitize_base_name(base);
    let safe = if safe.is_empty() {
        DEFAULT_BASE_NAME
    } else {
        safe.as_str()
    };
    format!("{safe}_{date}.{ext}")
}

/// Output filename stamped with today's date in `MM-DD` form.
#[must_use]
pub fn make_output_filename(base: &str, ext: &str) -> String {
    compose_filename(base, &Local::now().format("%m-%d").to_string(), ext)
}
