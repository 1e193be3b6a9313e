//! Label universes
//!
//! Heroes and weapon actions are closed, enumerable sets. Both share the
//! [`Label`] trait so the selector, aggregator and evaluator stay generic.

pub mod action;
pub mod hero;

pub use action::WeaponAction;
pub use hero::Hero;

use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;

/// A value from a closed set of recognizable labels
pub trait Label: Copy + Eq + Hash + Debug + Display + 'static {
    /// Every label in declaration order, sentinel last
    const ALL: &'static [Self];

    /// The "no label" sentinel
    const NONE: Self;

    /// Display name, as stored in ground-truth files
    fn name(&self) -> &'static str;

    /// Look up a label by display name, falling back to [`Label::NONE`]
    fn from_name(name: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.name() == name)
            .unwrap_or(Self::NONE)
    }

    /// Strict lookup: unknown names are an error rather than the sentinel
    fn parse_name(name: &str) -> Result<Self, LabelError> {
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.name() == name)
            .ok_or_else(|| LabelError::Unknown(name.to_string()))
    }

    fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Every label except the sentinel
    fn known() -> impl Iterator<Item = Self> {
        Self::ALL.iter().copied().filter(|label| !label.is_none())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("unknown label name: '{0}'")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_excludes_sentinel() {
        assert_eq!(Hero::known().count(), Hero::ALL.len() - 1);
        assert!(WeaponAction::known().all(|action| !action.is_none()));
    }

    #[test]
    fn test_parse_name_rejects_unknown() {
        assert_eq!(
            Hero::parse_name("Gandalf"),
            Err(LabelError::Unknown("Gandalf".to_string()))
        );
        assert_eq!(Hero::parse_name("Lucio"), Ok(Hero::Lucio));
    }
}
