pub mod time;

pub use self::time::*;

pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// `sanitize_key` normalizes a free-form breaker identifier into a
/// storage-safe key: lower-case, every character outside `[a-z0-9_-]`
/// replaced with `_`, runs of `_` collapsed, trailing `_` stripped.
/// Total and deterministic; an empty result means "no key suffix" and
/// callers fall back to their default record.
pub fn sanitize_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut prev_underscore = false;
    for c in raw.chars() {
        let c = c.to_ascii_lowercase();
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-' {
            c
        } else {
            '_'
        };
        if c == '_' {
            if prev_underscore {
                continue;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
        }
        key.push(c);
    }
    while key.ends_with('_') {
        key.pop();
    }
    key
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sanitize_example_key() {
        assert_eq!(
            sanitize_key("This is an Example Key!@#"),
            "this_is_an_example_key"
        );
    }

    #[test]
    fn sanitize_keeps_valid_chars() {
        assert_eq!(sanitize_key("billing-api_v2"), "billing-api_v2");
        assert_eq!(sanitize_key("UPPER"), "upper");
    }

    #[test]
    fn sanitize_collapses_runs_and_strips_trailing() {
        assert_eq!(sanitize_key("a   b"), "a_b");
        assert_eq!(sanitize_key("a__b___c"), "a_b_c");
        assert_eq!(sanitize_key("tail!!!"), "tail");
    }

    #[test]
    fn sanitize_may_yield_empty() {
        assert_eq!(sanitize_key(""), "");
        assert_eq!(sanitize_key("!@#$%"), "");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for raw in [
            "This is an Example Key!@#",
            "billing-api",
            "___",
            "Ärger im Büro",
            "a   b  _ c",
        ] {
            let once = sanitize_key(raw);
            assert_eq!(sanitize_key(&once), once);
        }
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank(""));
        assert!(is_blank("  \t"));
        assert!(!is_blank(" x "));
    }
}
