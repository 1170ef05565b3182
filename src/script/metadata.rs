//! # Annotation recognizers over script source.
//!
//! ## Rules
//! - `unsafe` and `name` consult the **first** match only.
//! - Named events are collected from **every** match; duplicates collapse.
//! - `.` never crosses a line break, so an annotation's argument list is
//!   expected on one line; whitespace before `(` may span lines.
//! - No match is a valid outcome and yields `None` / empty / `false`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

const EVENT_ANNOTATION: &str = "@OnEvent";

static UNSAFE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)@BTrace\s*\(.*unsafe\s*=\s*(true|false).*\)").expect("valid unsafe pattern")
});

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)@BTrace\s*\(.*name\s*=\s*"(.*)".*\)"#).expect("valid name pattern")
});

static NAMED_EVENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)@OnEvent\s*\(\s*"(\w.*)"\s*\)"#).expect("valid named event pattern")
});

// Group 1 participates only when an argument list follows.
static EVENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@OnEvent(\s*\()?").expect("valid event pattern"));

/// Metadata derived from one version of a script's source text.
///
/// # Example
/// ```
/// use tracevisor::ScriptMetadata;
///
/// let meta = ScriptMetadata::extract(r#"
/// @BTrace(unsafe = true, name = "probe")
/// public class Probe {
///     @OnEvent("flush") public static void flush() {}
///     @OnEvent public static void any() {}
/// }
/// "#);
///
/// assert_eq!(meta.unsafe_flag(), Some(true));
/// assert_eq!(meta.name(), Some("probe"));
/// assert!(meta.named_events().contains("flush"));
/// assert!(meta.has_anonymous_events());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptMetadata {
    name: Option<String>,
    unsafe_flag: Option<bool>,
    named_events: BTreeSet<String>,
    anonymous_events: bool,
    has_events: bool,
}

impl ScriptMetadata {
    /// Runs every recognizer over `source`.
    pub fn extract(source: &str) -> Self {
        Self {
            name: Self::find_name(source),
            unsafe_flag: Self::find_unsafe(source),
            named_events: Self::find_named_events(source),
            anonymous_events: Self::find_anonymous_event(source),
            has_events: source.contains(EVENT_ANNOTATION),
        }
    }

    /// Declared name, if the script declares one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Declared unsafe flag; `None` when the script does not declare it.
    pub fn unsafe_flag(&self) -> Option<bool> {
        self.unsafe_flag
    }

    /// Distinct names of all named events.
    pub fn named_events(&self) -> &BTreeSet<String> {
        &self.named_events
    }

    /// True if an event annotation appears without an argument list.
    pub fn has_anonymous_events(&self) -> bool {
        self.anonymous_events
    }

    /// True if the event annotation appears anywhere, in any form.
    pub fn has_events(&self) -> bool {
        self.has_events
    }

    fn find_unsafe(source: &str) -> Option<bool> {
        UNSAFE_PATTERN
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str() == "true")
    }

    fn find_name(source: &str) -> Option<String> {
        NAME_PATTERN
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn find_named_events(source: &str) -> BTreeSet<String> {
        NAMED_EVENT_PATTERN
            .captures_iter(source)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn find_anonymous_event(source: &str) -> bool {
        EVENT_PATTERN
            .captures_iter(source)
            .any(|caps| caps.get(1).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsafe_and_name_from_one_annotation() {
        let meta = ScriptMetadata::extract(r#"@BTrace(unsafe=true, name="foo") class A {}"#);
        assert_eq!(meta.unsafe_flag(), Some(true));
        assert_eq!(meta.name(), Some("foo"));
    }

    #[test]
    fn test_unsafe_false_and_whitespace() {
        let meta = ScriptMetadata::extract("@BTrace ( trusted = 1 , unsafe  =  false )");
        assert_eq!(meta.unsafe_flag(), Some(false));
        assert_eq!(meta.name(), None);
    }

    #[test]
    fn test_first_annotation_wins() {
        let src = "@BTrace(name=\"first\")\nclass A {}\n@BTrace(name=\"second\")\nclass B {}";
        let meta = ScriptMetadata::extract(src);
        assert_eq!(meta.name(), Some("first"));
    }

    #[test]
    fn test_no_annotations() {
        let meta = ScriptMetadata::extract("class Plain { void run() {} }");
        assert_eq!(meta, ScriptMetadata::default());
    }

    #[test]
    fn test_named_events_collapse_duplicates() {
        let src = r#"
            @OnEvent("a") void one() {}
            @OnEvent("a") void two() {}
            @OnEvent( "b" ) void three() {}
        "#;
        let meta = ScriptMetadata::extract(src);
        let expected: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(meta.named_events(), &expected);
        assert!(!meta.has_anonymous_events());
        assert!(meta.has_events());
    }

    #[test]
    fn test_anonymous_event_is_not_named() {
        let src = "@OnEvent\nvoid any() {}\n@OnEvent(\"x\") void x() {}";
        let meta = ScriptMetadata::extract(src);
        assert!(meta.has_anonymous_events());
        assert_eq!(meta.named_events().len(), 1);
        assert!(meta.named_events().contains("x"));
    }

    #[test]
    fn test_paren_on_next_line_is_not_anonymous() {
        let meta = ScriptMetadata::extract("@OnEvent\n   (\"late\")");
        assert!(!meta.has_anonymous_events());
        assert!(meta.named_events().contains("late"));
    }

    #[test]
    fn test_event_name_must_start_with_word_char() {
        let meta = ScriptMetadata::extract(r#"@OnEvent(" spaced")"#);
        assert!(meta.named_events().is_empty());
        assert!(meta.has_events());
        assert!(!meta.has_anonymous_events());
    }
}
