//! Host OS family detection and `os/arch` cross-compilation targets.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Operating system family of the machine running the tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl OsFamily {
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn from_os_name(name: &str) -> Self {
        match name {
            "linux" => Self::Linux,
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            _ => Self::Other,
        }
    }

    /// Global package installs need an elevated-privilege prefix on Linux only.
    pub fn elevates_global_installs(self) -> bool {
        matches!(self, Self::Linux)
    }
}

/// A cross-compilation target written as `os/arch` (e.g. `linux/arm`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (os, arch) = s
            .split_once('/')
            .ok_or_else(|| anyhow!("platform '{s}' must be written as os/arch"))?;
        let (os, arch) = (os.trim(), arch.trim());
        if os.is_empty() || arch.is_empty() || arch.contains('/') {
            return Err(anyhow!("platform '{s}' must be written as os/arch"));
        }
        Ok(Self::new(os, arch))
    }
}

impl TryFrom<String> for Platform {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.to_string()
    }
}
