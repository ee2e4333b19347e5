/// Split a schema file into its statements.
///
/// Statements are `;`-terminated; blank fragments are dropped.
pub fn split_schema(text: &str) -> Vec<String> {
    text.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
