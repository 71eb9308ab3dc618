//! Camera facing direction

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which physical camera feeds the preview
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingDirection {
    Front,
    #[default]
    Back,
}

impl FacingDirection {
    /// The opposite camera
    pub fn toggled(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }
}

impl fmt::Display for FacingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacingDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" => Ok(Self::Front),
            "back" => Ok(Self::Back),
            other => Err(CoreError::InvalidFacing(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_back() {
        assert_eq!(FacingDirection::default(), FacingDirection::Back);
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let facing = FacingDirection::Front;
        assert_eq!(facing.toggled(), FacingDirection::Back);
        assert_eq!(facing.toggled().toggled(), facing);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Front".parse::<FacingDirection>().unwrap(), FacingDirection::Front);
        assert_eq!(" back ".parse::<FacingDirection>().unwrap(), FacingDirection::Back);
        assert!("side".parse::<FacingDirection>().is_err());
    }
}
