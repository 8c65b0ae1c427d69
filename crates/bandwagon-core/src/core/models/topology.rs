use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Molecule shape. Circular molecules (plasmids) have no ends, so their first
/// and last restriction fragments are one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    Linear,
    Circular,
}

impl Topology {
    pub fn is_linear(self) -> bool {
        self == Topology::Linear
    }

    pub fn from_linear(linear: bool) -> Self {
        if linear {
            Topology::Linear
        } else {
            Topology::Circular
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Linear => f.write_str("linear"),
            Topology::Circular => f.write_str("circular"),
        }
    }
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Topology::Linear),
            "circular" => Ok(Topology::Circular),
            other => Err(format!("unknown topology '{other}'")),
        }
    }
}
