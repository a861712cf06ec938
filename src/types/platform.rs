//! Bottle platform tags
//!
//! A platform identifies the OS release / CPU architecture combination a
//! prebuilt bottle was compiled for. The tag doubles as the staging-directory
//! name and as the key under `bottle.stable.files` in the formula registry.

use serde::{Deserialize, Serialize};

/// OS/architecture variant of a prebuilt bottle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// macOS 10.15, `x86_64`
    Catalina,
    /// macOS 11, `x86_64`
    BigSur,
    /// macOS 11, arm64
    Arm64BigSur,
}

impl Platform {
    /// Registry tag, also used as the staging-directory name.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Catalina => "catalina",
            Self::BigSur => "big_sur",
            Self::Arm64BigSur => "arm64_big_sur",
        }
    }

    /// CPU architecture carried by bottles for this platform.
    pub fn arch(self) -> &'static str {
        match self {
            Self::Catalina | Self::BigSur => "x86_64",
            Self::Arm64BigSur => "arm64",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "catalina" => Ok(Self::Catalina),
            "big_sur" => Ok(Self::BigSur),
            "arm64_big_sur" => Ok(Self::Arm64BigSur),
            _ => Err(format!("Unknown platform: {s}")),
        }
    }
}
