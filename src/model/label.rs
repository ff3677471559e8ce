//! Entity labels used to tag spans.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label applied when nothing else has been picked.
pub const DEFAULT_LABEL: &str = "PERS";

/// A tag string such as `PERS` or `LOC`.
///
/// The palette offered in the UI is fixed by configuration, but labels coming
/// back from the backend are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Create a label from its tag string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tag string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Default label palette for new sessions.
pub fn default_labels() -> Vec<Label> {
    ["PERS", "LOC", "ORG", "DATE", "MISC"]
        .into_iter()
        .map(Label::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_label_is_in_palette() {
        assert!(default_labels().contains(&Label::default()));
    }
}
