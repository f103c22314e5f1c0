//! Lookup of actions by their command-line flags.

use std::collections::HashMap;

use crate::action_definitions::{ActionDefinition, BUILTIN_ACTIONS};
use crate::error::{Error, Result};

/// Validated catalog of actions.
///
/// Flags and IDs are guaranteed unique once constructed, so a flag always
/// resolves to at most one action.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    actions: Vec<ActionDefinition>,
    by_flag: HashMap<String, usize>,
}

fn validate_flags(action: &ActionDefinition) -> Result<()> {
    let invalid = |flag: String, reason: &str| Error::InvalidActionFlag {
        action: action.id.to_string(),
        flag,
        reason: reason.to_string(),
    };

    if !action.short_flag.is_ascii_alphanumeric() {
        return Err(invalid(
            action.short_flag.to_string(),
            "short flag must be an ASCII letter or digit",
        ));
    }

    if action.long_flag.is_empty() {
        return Err(invalid(String::new(), "long flag may not be empty"));
    }

    if action.long_flag.starts_with('-') || action.long_flag.contains(&['=', ' '][..]) {
        return Err(invalid(
            action.long_flag.to_string(),
            "long flag may not start with `-` or contain `=` or spaces",
        ));
    }

    Ok(())
}

impl ActionRegistry {
    /// Builds a registry, keeping the given order for listing.
    ///
    /// # Errors
    ///
    /// Returns an error if an ID or flag is used twice, or a flag is malformed.
    pub fn new(actions: Vec<ActionDefinition>) -> Result<Self> {
        let mut by_flag: HashMap<String, usize> = HashMap::new();

        for (index, action) in actions.iter().enumerate() {
            validate_flags(action)?;

            if actions[..index].iter().any(|other| other.id == action.id) {
                return Err(Error::DuplicateActionId(action.id.to_string()));
            }

            for flag in action.flags() {
                if let Some(&existing) = by_flag.get(&flag) {
                    return Err(Error::DuplicateActionFlag {
                        flag,
                        first: actions[existing].id.to_string(),
                        second: action.id.to_string(),
                    });
                }
                by_flag.insert(flag, index);
            }
        }

        Ok(Self { actions, by_flag })
    }

    /// The built-in catalog.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in table itself is inconsistent.
    pub fn builtin() -> Result<Self> {
        Self::new(BUILTIN_ACTIONS.to_vec())
    }

    /// Rejects action flags that clash with flags owned by the front-end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedActionFlag`] for the first clash found.
    pub fn ensure_flags_available(&self, reserved: &[&str]) -> Result<()> {
        for action in &self.actions {
            if let Some(flag) = action.flags().into_iter().find(|f| reserved.contains(&f.as_str())) {
                return Err(Error::ReservedActionFlag {
                    action: action.id.to_string(),
                    flag,
                });
            }
        }

        Ok(())
    }

    /// Finds the action for a `-x` or `--long` flag.
    #[must_use]
    pub fn find_by_flag(&self, flag: &str) -> Option<&ActionDefinition> {
        self.by_flag.get(flag).map(|&index| &self.actions[index])
    }

    /// Like [`Self::find_by_flag`], but an unknown flag is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownActionFlag`] if no action owns `flag`.
    pub fn lookup(&self, flag: &str) -> Result<&ActionDefinition> {
        self.find_by_flag(flag)
            .ok_or_else(|| Error::UnknownActionFlag(flag.to_string()))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|action| action.id == id)
    }

    /// All actions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.actions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
