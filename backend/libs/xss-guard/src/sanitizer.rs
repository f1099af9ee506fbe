//! Destructive, idempotent sanitization of untrusted strings
//!
//! Steps run in a fixed order: trim, entity-encode reserved characters,
//! strip signature matches from the encoded text, remove C0 control
//! characters. Encoding runs first, so markup signatures are neutralized
//! by encoding and the strip pass only removes signatures that survive
//! encoding (`javascript:`, event-handler assignments, call patterns).

use crate::detector::detector;
use once_cell::sync::Lazy;
use regex::Regex;

/// A recognized, already-encoded entity. An `&` introducing one of these
/// is left alone so repeated sanitization never double-encodes.
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^&(?:[a-zA-Z][a-zA-Z0-9]{1,31}|#[0-9]{1,7}|#x[0-9a-fA-F]{1,6});")
        .expect("entity pattern must compile")
});

/// Sanitization output plus the audit flag. `had_matches` reports whether
/// the raw input matched any injection signature; it drives audit logging
/// only and never changes the sanitized value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeOutcome {
    pub value: String,
    pub had_matches: bool,
}

/// Sanitize a single untrusted string.
///
/// Idempotent: `sanitize(&sanitize(x)) == sanitize(x)` for all inputs.
pub fn sanitize(input: &str) -> String {
    sanitize_with_report(input).value
}

/// Sanitize and report whether the raw input carried a signature.
pub fn sanitize_with_report(input: &str) -> SanitizeOutcome {
    let had_matches = detector().is_match(input);

    // The full encode/strip/clean cycle runs to a fixpoint. One pass is
    // not enough: stripping can consume the body of a string the encoder
    // had classified as an entity ("&cookie;" becomes "&;"), or expose
    // leading/trailing whitespace, and either residue would change again
    // under a later call. Encoding introduces only entity text, which no
    // signature matches, so the cycle stabilizes.
    let mut current = input.trim().to_string();
    loop {
        let encoded = encode_entities(&current);
        let stripped = strip_signatures(&encoded);
        let cleaned = strip_control_chars(&stripped);
        let next = cleaned.trim().to_string();
        if next == current {
            break;
        }
        current = next;
    }

    SanitizeOutcome {
        value: current,
        had_matches,
    }
}

/// Entity-encode `& < > " '`, leaving an `&` that already starts a
/// recognized entity untouched.
fn encode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (i, ch) in input.char_indices() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '&' => {
                if ENTITY.is_match(&input[i..]) {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Remove every signature match, repeating until a fixpoint so that the
/// seam left by one removal cannot splice a new signature together
/// (e.g. `javajavascript:script:`).
fn strip_signatures(input: &str) -> String {
    let pattern = detector().pattern();
    let mut current = input.to_string();
    while pattern.is_match(&current) {
        let next = pattern.replace_all(&current, "").into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Drop C0 control characters and DEL, keeping common whitespace.
fn strip_control_chars(input: &str) -> String {
    input
        .chars()
        .filter(|&c| !c.is_control() || c == '\t' || c == '\n' || c == '\r')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::detector;

    #[test]
    fn encodes_reserved_characters() {
        let out = sanitize("<b>hi</b>");
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
        assert_eq!(out, "&lt;b&gt;hi&lt;/b&gt;");
    }

    #[test]
    fn encodes_quotes_and_ampersand() {
        assert_eq!(sanitize(r#"a"b'c&d"#), "a&quot;b&#x27;c&amp;d");
    }

    #[test]
    fn strips_pseudo_protocol() {
        let out = sanitize("click javascript:alert(1) here");
        assert!(!out.to_lowercase().contains("javascript:"));
        assert!(!out.contains("alert("));
    }

    #[test]
    fn strips_spliced_signature() {
        // Removing the inner match must not leave a fresh one behind
        let out = sanitize("javajavascript:script:");
        assert!(!detector().is_match(&out));
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(sanitize("  hello  "), "hello");
    }

    #[test]
    fn removes_control_characters() {
        assert_eq!(sanitize("ab\u{0000}cd\u{0008}e"), "abcde");
        // Common whitespace survives
        assert_eq!(sanitize("a\tb\nc"), "a\tb\nc");
    }

    #[test]
    fn empty_and_blank_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   "), "");
    }

    #[test]
    fn idempotent_on_clean_input() {
        for s in ["hello world", "O'Brien & Sons", "a < b", "tom&jerry"] {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn idempotent_on_hostile_input() {
        for s in [
            "<script>alert(1)</script>",
            "<img src=x onerror=alert(1)>",
            "javascript:document.cookie",
            "  <iframe src=javascript:evil()>  ",
            "data:text/html,<script>x</script>",
        ] {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn idempotent_when_strip_consumes_an_entity_body() {
        // "&cookie;" reads as an entity to the encoder, but the strip
        // pass removes "cookie" and leaves a bare "&" that must be
        // encoded within the same call, not on the next one
        let once = sanitize("&cookie;");
        assert_eq!(once, "&amp;;");
        assert_eq!(sanitize(&once), once);

        for s in ["&cookie;", "x&urlcookie;(y", "&alertcookie;("] {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn output_never_rematches_detector() {
        for s in [
            "<script>alert(1)</script>",
            "javajavascript:script:",
            "onload=eval(document.cookie)",
        ] {
            let out = sanitize(s);
            assert!(!detector().is_match(&out), "residual signature in {out:?}");
        }
    }

    #[test]
    fn reports_matches_for_audit() {
        assert!(sanitize_with_report("<script>x</script>").had_matches);
        assert!(!sanitize_with_report("plain text").had_matches);
    }
}
