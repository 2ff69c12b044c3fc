//! Hardware platform identification.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// GPU hardware platform a nightly run executed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hardware {
    Mi30x,
    Mi35x,
}

impl Hardware {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mi30x => "mi30x",
            Self::Mi35x => "mi35x",
        }
    }

    /// All platforms the fleet tracks.
    pub fn all() -> [Hardware; 2] {
        [Self::Mi30x, Self::Mi35x]
    }

    /// Resolve the platform for a host from the configured hostname map.
    ///
    /// Detection is an explicit lookup rather than a process-global side
    /// effect; callers decide which hostname to ask about.
    pub fn detect(hostname: &str, map: &HashMap<String, Hardware>) -> Option<Hardware> {
        map.get(hostname).copied()
    }
}

impl fmt::Display for Hardware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hardware {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mi30x" => Ok(Self::Mi30x),
            "mi35x" => Ok(Self::Mi35x),
            other => Err(format!("unknown hardware platform: {other}")),
        }
    }
}
