// Credential masking for diagnostics and logs

const VISIBLE_CHARS: usize = 4;

/// Mask a secret, keeping a short prefix and suffix
///
/// Secrets too short to hide anything are masked entirely.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= VISIBLE_CHARS * 3 {
        return "***".to_string();
    }
    let prefix: String = chars[..VISIBLE_CHARS].iter().collect();
    let suffix: String = chars[chars.len() - VISIBLE_CHARS..].iter().collect();
    format!("{prefix}***{suffix}")
}

/// Replace every occurrence of `secret` in `text` with its masked form
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, &mask_secret(secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_keeps_prefix_and_suffix() {
        assert_eq!(mask_secret("EAABsbCS1iHgBAKZBZC0token9xyz"), "EAAB***9xyz");
    }

    #[test]
    fn test_mask_short_secret_entirely() {
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret("123456789012"), "***");
        assert_eq!(mask_secret(""), "***");
    }

    #[test]
    fn test_redact_preserves_rest_of_body() {
        let token = "EAABsbCS1iHgBAKZBZC0token9xyz";
        let body = format!(r#"{{"error":{{"message":"bad token {token}","code":190}}}}"#);

        let redacted = redact(&body, token);

        assert!(!redacted.contains(token));
        assert!(redacted.contains("EAAB***9xyz"));
        assert!(redacted.contains(r#""code":190"#));
    }

    #[test]
    fn test_redact_with_empty_secret_is_identity() {
        assert_eq!(redact("body", ""), "body");
    }
}
