use std::collections::BTreeMap;

/// Raw form values keyed by field name. A key that is present with an empty
/// value means "set to NULL"; an absent key means "leave alone".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    values: BTreeMap<String, Option<String>>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) -> &mut Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: &str) -> Self {
        self.set(name, Some(value.to_string()));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The trimmed non-empty value, if any.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_read_as_absent_but_stay_present() {
        let draft = Draft::new().with("unit", "   ").with("name", " Ali ");
        assert!(draft.contains("unit"));
        assert_eq!(draft.value("unit"), None);
        assert_eq!(draft.value("name"), Some("Ali"));
        assert!(!draft.contains("phone"));
    }
}
