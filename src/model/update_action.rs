use super::event::FieldChanges;
use serde::Serialize;

/// A partial update to one field: leave it alone or replace it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UpdateAction<T> {
    #[default]
    DoNothing,
    ChangeTo(T),
}

impl<T> UpdateAction<T> {
    pub fn change_to(value: T) -> Self {
        Self::ChangeTo(value)
    }

    pub fn should_change(&self) -> bool {
        matches!(self, Self::ChangeTo(_))
    }

    pub fn or_else(self, current: T) -> T {
        match self {
            Self::DoNothing => current,
            Self::ChangeTo(value) => value,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> UpdateAction<U> {
        match self {
            Self::DoNothing => UpdateAction::DoNothing,
            Self::ChangeTo(value) => UpdateAction::ChangeTo(f(value)),
        }
    }
}

impl<T: PartialEq + Serialize> UpdateAction<T> {
    /// Writes the new value into `slot` when it differs, noting the change.
    pub fn apply_to(self, slot: &mut T, field: &'static str, changes: &mut FieldChanges) {
        if let Self::ChangeTo(value) = self {
            if *slot != value {
                changes.record(field, &value);
                *slot = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_only_records_real_changes() {
        let mut changes = FieldChanges::new();
        let mut name = "a".to_string();

        UpdateAction::DoNothing.apply_to(&mut name, "name", &mut changes);
        UpdateAction::change_to("a".to_string()).apply_to(&mut name, "name", &mut changes);
        assert!(changes.is_empty());

        UpdateAction::change_to("b".to_string()).apply_to(&mut name, "name", &mut changes);
        assert_eq!(name, "b");
        assert!(changes.contains("name"));
    }

    #[test]
    fn or_else_prefers_the_change() {
        assert_eq!(UpdateAction::DoNothing.or_else(1), 1);
        assert_eq!(UpdateAction::ChangeTo(2).or_else(1), 2);
        assert_eq!(UpdateAction::ChangeTo(2).map(|v| v * 10), UpdateAction::ChangeTo(20));
    }
}
