//! Input format allow-list

/// Extensions accepted by the task enumerator.
///
/// Anything else in the input tree is skipped silently.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"]
}

/// Check if a file extension is eligible for processing (case-insensitive)
pub fn is_supported_input_extension(extension: &str) -> bool {
    supported_input_extensions()
        .iter()
        .any(|&ext| ext.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_input_extension("jpg"));
        assert!(is_supported_input_extension("jpeg"));
        assert!(is_supported_input_extension("png"));
        assert!(is_supported_input_extension("bmp"));
        assert!(is_supported_input_extension("tiff"));
        assert!(is_supported_input_extension("webp"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_supported_input_extension("JPG"));
        assert!(is_supported_input_extension("WebP"));
        assert!(is_supported_input_extension("TIFF"));
    }

    #[test]
    fn test_rejected_extensions() {
        assert!(!is_supported_input_extension("txt"));
        assert!(!is_supported_input_extension("gif"));
        assert!(!is_supported_input_extension(""));
        assert!(!is_supported_input_extension("jpg "));
    }
}
