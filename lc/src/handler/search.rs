//! Search string normalization

/// Strip symbols from a search string
///
/// Keeps letters, digits and single spaces; leading and trailing whitespace
/// is removed.
pub fn ignore_symbols(search: &str) -> String {
    search
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_symbols() {
        assert_eq!(ignore_symbols("hello, world!"), "hello world");
        assert_eq!(ignore_symbols("  a--b  "), "a b");
        assert_eq!(ignore_symbols("(555) 123-4567"), "555 123 4567");
        assert_eq!(ignore_symbols("Привет"), "Привет");
        assert_eq!(ignore_symbols("%%%"), "");
    }
}
