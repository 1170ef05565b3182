//! # ClassPathBuilder
//!
//! ## Rules
//! - With a working directory, every non-empty entry of the raw class path is
//!   prefixed with `<user.dir><file separator>`, order preserved.
//! - Without a working directory, the raw class path is kept verbatim.
//! - User entries follow the initial path; no leading separator is emitted
//!   when the initial path is empty.

use std::collections::HashMap;
use std::path::MAIN_SEPARATOR;

/// Property holding the process working directory.
pub const USER_DIR_PROPERTY: &str = "user.dir";

/// Property holding the process class path.
pub const CLASS_PATH_PROPERTY: &str = "java.class.path";

/// Platform path-list separator.
#[cfg(windows)]
pub const PATH_SEPARATOR: char = ';';

/// Platform path-list separator.
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = ':';

/// Builds a class path string from process properties and user entries.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use tracevisor::ClassPathBuilder;
///
/// let mut props = HashMap::new();
/// props.insert("java.class.path".to_string(), "app.jar".to_string());
///
/// let cp = ClassPathBuilder::from_properties(&props).build();
/// assert_eq!(cp, "app.jar");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClassPathBuilder {
    initial: String,
    entries: Vec<String>,
}

impl ClassPathBuilder {
    /// Derives the initial class path from a process's properties.
    pub fn from_properties(props: &HashMap<String, String>) -> Self {
        let raw = props
            .get(CLASS_PATH_PROPERTY)
            .map(String::as_str)
            .unwrap_or_default();

        let initial = match props.get(USER_DIR_PROPERTY) {
            Some(user_dir) => Self::rebase(raw, user_dir),
            None => raw.to_string(),
        };

        Self {
            initial,
            entries: Vec::new(),
        }
    }

    /// Appends user-managed entries after the initial path.
    pub fn with_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.extend(entries.into_iter().map(Into::into));
        self
    }

    /// The initial path derived from the process properties.
    pub fn initial(&self) -> &str {
        &self.initial
    }

    /// Joins the initial path and user entries with [`PATH_SEPARATOR`].
    pub fn build(self) -> String {
        let mut out = self.initial;
        for entry in self.entries {
            if !out.is_empty() {
                out.push(PATH_SEPARATOR);
            }
            out.push_str(&entry);
        }
        out
    }

    fn rebase(raw: &str, user_dir: &str) -> String {
        raw.split(PATH_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .map(|segment| format!("{user_dir}{MAIN_SEPARATOR}{segment}"))
            .collect::<Vec<_>>()
            .join(&PATH_SEPARATOR.to_string())
    }
}
