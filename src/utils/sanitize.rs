//! Filename sanitization utilities

/// Suffixes that mark a file as a cached image
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

/// Whether `name` ends in one of [`IMAGE_EXTENSIONS`], ignoring case
pub fn has_image_extension(name: &str) -> bool {
    let name = name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Map a Graph object id to a file name that stays inside the cache directory
///
/// Path separators and other filesystem-unsafe characters are replaced with
/// visually similar Unicode alternatives. Ids that would resolve to the
/// directory itself or its parent become `_`. Ids ending in an image
/// extension get a trailing `_` so a cache clear never matches them.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(cache_file_name("10150"), "10150");
/// assert_eq!(cache_file_name("../etc/passwd"), "..⧸etc⧸passwd");
/// ```
pub fn cache_file_name(id: &str) -> String {
    let name = id
        .chars()
        .map(|c| match c {
            '/' => '⧸',  // U+29F8 Big Solidus
            '\\' => '⧹', // U+29F9 Big Reverse Solidus
            ':' => '꞉',  // U+A789 Modifier Letter Colon
            '*' => '⁎',  // U+204E Low Asterisk
            '?' => '？', // U+FF1F Fullwidth Question Mark
            '"' => '″',  // U+2033 Double Prime
            '<' => '‹',  // U+2039
            '>' => '›',  // U+203A
            '|' => '｜', // U+FF5C Fullwidth Vertical Line
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string();

    match name.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ if has_image_extension(&name) => format!("{}_", name),
        _ => name,
    }
}
