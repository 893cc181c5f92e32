//! Minimal service unit parsing.

/// Return the first non-empty `WorkingDirectory=` value in a unit file.
///
/// Blank lines and `#` comments are skipped; sections are not interpreted.
pub fn parse_working_directory(contents: &str) -> Option<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.strip_prefix("WorkingDirectory="))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
