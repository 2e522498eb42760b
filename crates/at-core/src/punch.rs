//! Punch actions as the single source of truth for action type strings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four actions an employee can punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    Login,
    Logout,
    BreakStart,
    BreakEnd,
}

impl ActionType {
    /// All recognized actions, in the order they usually occur during a day.
    pub const ALL: [Self; 4] = [Self::Login, Self::BreakStart, Self::BreakEnd, Self::Logout];

    /// String representation for storage and the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::BreakStart => "break_start",
            Self::BreakEnd => "break_end",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(Self::Login),
            "logout" => Ok(Self::Logout),
            "break_start" => Ok(Self::BreakStart),
            "break_end" => Ok(Self::BreakEnd),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

impl Serialize for ActionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown action strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAction(String);

impl UnknownAction {
    /// The rejected action string.
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnknownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action type: {}", self.0)
    }
}

impl std::error::Error for UnknownAction {}

/// A punch suitable for duration reconstruction and status derivation.
///
/// This trait lets the reconstructor work with different punch
/// representations (e.g., `StoredPunch` from at-db, or test fixtures).
pub trait Punch {
    /// When the punch was recorded.
    fn timestamp(&self) -> DateTime<Utc>;

    /// The recognized action, or `None` when the stored action text is not
    /// one of the four known actions.
    fn action(&self) -> Option<ActionType>;
}

/// An in-memory punch with a recognized action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchEvent {
    pub action_type: ActionType,
    pub timestamp: DateTime<Utc>,
}

impl PunchEvent {
    #[must_use]
    pub const fn new(action_type: ActionType, timestamp: DateTime<Utc>) -> Self {
        Self {
            action_type,
            timestamp,
        }
    }
}

impl Punch for PunchEvent {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn action(&self) -> Option<ActionType> {
        Some(self.action_type)
    }
}

impl<P: Punch + ?Sized> Punch for &P {
    fn timestamp(&self) -> DateTime<Utc> {
        (**self).timestamp()
    }

    fn action(&self) -> Option<ActionType> {
        (**self).action()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_variants() {
        for variant in &ActionType::ALL {
            let s = variant.to_string();
            let parsed: ActionType = s.parse().expect("should parse");
            assert_eq!(parsed, *variant, "roundtrip failed for {variant:?}");
        }
    }

    #[test]
    fn unknown_action_errors() {
        let err = "lunch".parse::<ActionType>().unwrap_err();
        assert_eq!(err.value(), "lunch");
        assert_eq!(err.to_string(), "unknown action type: lunch");
    }

    #[test]
    fn action_strings_are_case_sensitive() {
        assert!("LOGIN".parse::<ActionType>().is_err());
        assert!("break-start".parse::<ActionType>().is_err());
    }

    #[test]
    fn deserialize_rejects_unknown_action() {
        let ok: ActionType = serde_json::from_str(r#""break_start""#).unwrap();
        assert_eq!(ok, ActionType::BreakStart);

        let err = serde_json::from_str::<ActionType>(r#""nap""#).unwrap_err();
        assert!(err.to_string().contains("unknown action type: nap"));
    }
}
