//! Tracking consent states

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpoolError;

/// The user's data-collection consent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Consent {
    /// Undecided; data is collected provisionally
    Pending,
    /// Collection allowed
    Granted,
    /// Collection refused
    NotGranted,
}

impl Consent {
    /// Every consent state, in declaration order
    pub const ALL: [Consent; 3] = [Consent::Pending, Consent::Granted, Consent::NotGranted];
}

impl fmt::Display for Consent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consent::Pending => write!(f, "PENDING"),
            Consent::Granted => write!(f, "GRANTED"),
            Consent::NotGranted => write!(f, "NOT_GRANTED"),
        }
    }
}

impl FromStr for Consent {
    type Err = SpoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(Consent::Pending),
            "granted" => Ok(Consent::Granted),
            "not_granted" | "denied" => Ok(Consent::NotGranted),
            other => Err(SpoolError::config(format!("unknown consent value: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_consent() {
        assert_eq!("pending".parse::<Consent>().unwrap(), Consent::Pending);
        assert_eq!("GRANTED".parse::<Consent>().unwrap(), Consent::Granted);
        assert_eq!("not-granted".parse::<Consent>().unwrap(), Consent::NotGranted);
        assert!("maybe".parse::<Consent>().is_err());
    }

    #[test]
    fn test_display_matches_serde() {
        for consent in Consent::ALL {
            let json = serde_json::to_string(&consent).unwrap();
            assert_eq!(json, format!("\"{}\"", consent));
        }
    }
}
