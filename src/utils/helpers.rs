/// Trimmed text, or `None` when nothing but whitespace remains
pub fn non_blank(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Optional free text as stored by the backend: blank becomes null
pub fn blank_to_null(text: Option<String>) -> Option<String> {
    text.and_then(|t| non_blank(&t).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_is_blank() {
        assert_eq!(non_blank("   \n\t"), None);
        assert_eq!(non_blank("  Great track "), Some("Great track"));
    }

    #[test]
    fn blank_optional_text_is_null() {
        assert_eq!(blank_to_null(Some("  ".into())), None);
        assert_eq!(blank_to_null(None), None);
        assert_eq!(blank_to_null(Some(" Spa ".into())), Some("Spa".to_string()));
    }
}
