//! The `{ old, new, delete }` change-tracking wrapper.

use serde::{Deserialize, Serialize};

/// A possibly in-flight change to one schema entity.
///
/// Generators only ever read `new`, and only while `delete` is false. `old`
/// is the last value seen in the raw schema and exists for diffing; it is
/// `None` for entities proposed in the Edit Set that the source does not
/// have yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEdit<T> {
    pub old: Option<T>,
    pub new: T,
    #[serde(default)]
    pub delete: bool,
}

impl<T: Clone> PendingEdit<T> {
    /// Wraps a value straight from the source: `old` and `new` are equal.
    pub fn unchanged(value: T) -> Self {
        Self {
            old: Some(value.clone()),
            new: value,
            delete: false,
        }
    }
}

impl<T> PendingEdit<T> {
    /// Wraps a value with no source counterpart.
    pub fn proposed(value: T) -> Self {
        Self {
            old: None,
            new: value,
            delete: false,
        }
    }

    /// The value generators should see, if the entity is not deleted.
    pub fn active(&self) -> Option<&T> {
        if self.delete {
            None
        } else {
            Some(&self.new)
        }
    }

    pub fn is_active(&self) -> bool {
        !self.delete
    }
}

impl<T: PartialEq> PendingEdit<T> {
    /// Whether this entry carries a change that has not reached the source.
    pub fn is_pending(&self) -> bool {
        self.delete || self.old.as_ref() != Some(&self.new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_is_not_pending() {
        let edit = PendingEdit::unchanged("text".to_string());
        assert_eq!(edit.old.as_deref(), Some("text"));
        assert_eq!(edit.active().map(String::as_str), Some("text"));
        assert!(!edit.is_pending());
    }

    #[test]
    fn test_deleted_entry_is_inactive() {
        let mut edit = PendingEdit::unchanged(1);
        edit.delete = true;
        assert!(edit.active().is_none());
        assert!(edit.is_pending());
    }

    #[test]
    fn test_proposed_has_no_old_value() {
        let edit = PendingEdit::proposed(7);
        assert!(edit.old.is_none());
        assert!(edit.is_pending());
    }

    #[test]
    fn test_delete_defaults_to_false() {
        let edit: PendingEdit<u32> = serde_json::from_str(r#"{"old": null, "new": 3}"#).unwrap();
        assert!(!edit.delete);
        assert_eq!(edit.new, 3);
    }
}
