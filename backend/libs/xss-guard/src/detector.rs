//! Injection signature matching
//!
//! One combined case-insensitive pattern covering every signature class
//! this service rejects: dangerous tag openings (closed or not), script
//! pseudo-protocols, inline event handlers, CSS escape hatches, script
//! function calls and DOM object references.

use once_cell::sync::Lazy;
use regex::Regex;

/// Signature classes, one pattern per injection vector.
///
/// Tag openings match on `<tag` alone so unclosed and malformed tags
/// are still caught.
const SIGNATURE_PATTERNS: &[&str] = &[
    // Tag openings and closings
    r"<\s*script\b",
    r"<\s*iframe\b",
    r"<\s*object\b",
    r"<\s*embed\b",
    r"<\s*style\b",
    r"<\s*link\b",
    r"<\s*meta\b",
    r"</\s*(?:script|iframe|object|embed|style)\s*>",
    // Pseudo-protocol URI schemes
    r"javascript\s*:",
    r"vbscript\s*:",
    r"data\s*:",
    // Inline event handler attributes (onerror=, onload=, ...)
    r"\bon\w+\s*=",
    // CSS escape hatches
    r"expression\s*\(",
    r"url\s*\(",
    r"@import",
    // Script-like function calls
    r"alert\s*\(",
    r"confirm\s*\(",
    r"prompt\s*\(",
    r"eval\s*\(",
    r"setTimeout\s*\(",
    r"setInterval\s*\(",
    r"Function\s*\(",
    // DOM object references
    r"window\.",
    r"document\.",
    r"location\.",
    r"cookie",
    r"innerHTML",
    r"outerHTML",
];

static COMBINED: Lazy<Regex> = Lazy::new(|| {
    let combined = format!("(?i){}", SIGNATURE_PATTERNS.join("|"));
    Regex::new(&combined).expect("signature pattern set must compile")
});

/// Stateless matcher over the fixed signature set.
pub struct ThreatDetector {
    combined: &'static Regex,
}

/// Process-wide detector handle. The combined pattern is compiled on
/// first use and never mutated, so the handle is safe to share across
/// all request tasks without synchronization.
pub fn detector() -> &'static ThreatDetector {
    static DETECTOR: Lazy<ThreatDetector> = Lazy::new(|| ThreatDetector {
        combined: &COMBINED,
    });
    &DETECTOR
}

impl ThreatDetector {
    /// True if `input` contains any configured injection signature.
    /// Empty input never matches.
    pub fn is_match(&self, input: &str) -> bool {
        if input.is_empty() {
            return false;
        }
        self.combined.is_match(input)
    }

    pub(crate) fn pattern(&self) -> &Regex {
        self.combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_script_tag() {
        assert!(detector().is_match("<script>alert(1)</script>"));
    }

    #[test]
    fn matches_unclosed_tag() {
        // No closing '>' at all; the opening alone must match
        assert!(detector().is_match("<script src=x"));
        assert!(detector().is_match("<IFRAME"));
    }

    #[test]
    fn matches_case_insensitive() {
        assert!(detector().is_match("JaVaScRiPt: void(0)"));
        assert!(detector().is_match("<ScRiPt>"));
    }

    #[test]
    fn matches_event_handler_attribute() {
        assert!(detector().is_match("<img src=x onerror=alert(1)>"));
        assert!(detector().is_match("onmouseover = steal()"));
    }

    #[test]
    fn matches_pseudo_protocols() {
        assert!(detector().is_match("javascript:alert(1)"));
        assert!(detector().is_match("vbscript : msgbox"));
        assert!(detector().is_match("data:text/html;base64,xyz"));
    }

    #[test]
    fn matches_css_and_calls() {
        assert!(detector().is_match("width: expression(alert(1))"));
        assert!(detector().is_match("background: url(evil)"));
        assert!(detector().is_match("@import 'x'"));
        assert!(detector().is_match("eval(code)"));
        assert!(detector().is_match("setTimeout (fn, 0)"));
    }

    #[test]
    fn matches_dom_references() {
        assert!(detector().is_match("document.cookie"));
        assert!(detector().is_match("window.open"));
        assert!(detector().is_match("x.innerHTML"));
    }

    #[test]
    fn clean_strings_do_not_match() {
        assert!(!detector().is_match("hello world"));
        assert!(!detector().is_match("O'Brien & Sons"));
        assert!(!detector().is_match("a <= b and b >= c"));
        assert!(!detector().is_match("price: $19.99"));
    }

    #[test]
    fn empty_input_does_not_match() {
        assert!(!detector().is_match(""));
    }

    #[test]
    fn json_field_named_data_does_not_match() {
        // Quote sits between the word and the colon
        assert!(!detector().is_match(r#"{"data": 1}"#));
    }
}
