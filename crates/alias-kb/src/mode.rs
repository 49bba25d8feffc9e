//! Connection modes and model sections

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// How the provider is being driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// Authoring against an offline configuration
    #[default]
    Offline,

    /// Live management of a running system
    Online,
}

impl ConnectionMode {
    /// Lowercase mode name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Online => "online",
        }
    }
}

impl Display for ConnectionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "offline" => Ok(Self::Offline),
            "online" => Ok(Self::Online),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Unrecognized connection mode name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown connection mode: '{0}'")]
pub struct UnknownMode(pub String);

/// Set of modes a metadata entry applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeSet {
    /// Both modes
    #[default]
    Both,

    /// Offline only
    Offline,

    /// Online only
    Online,
}

impl ModeSet {
    /// Check if `mode` is in the set
    #[inline]
    #[must_use]
    pub fn contains(self, mode: ConnectionMode) -> bool {
        matches!(
            (self, mode),
            (Self::Both, _)
                | (Self::Offline, ConnectionMode::Offline)
                | (Self::Online, ConnectionMode::Online)
        )
    }

    /// Smallest set containing both sets
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if self == other {
            self
        } else {
            Self::Both
        }
    }
}

impl Display for ModeSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Both => "both",
            Self::Offline => "offline",
            Self::Online => "online",
        })
    }
}

/// Top-level section of a model document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelSection {
    /// Domain-wide settings consumed before creation
    #[serde(rename = "domainInfo")]
    DomainInfo,

    /// Servers, clusters, security and the like
    #[default]
    #[serde(rename = "topology")]
    Topology,

    /// Data sources, messaging and other resources
    #[serde(rename = "resources")]
    Resources,

    /// Applications and libraries
    #[serde(rename = "appDeployments")]
    AppDeployments,
}

impl ModelSection {
    /// Section key as written in a model document
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DomainInfo => "domainInfo",
            Self::Topology => "topology",
            Self::Resources => "resources",
            Self::AppDeployments => "appDeployments",
        }
    }
}

impl Display for ModelSection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value given once or separately per connection mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerMode<T> {
    /// Per-mode values
    Split {
        /// Value used offline
        offline: T,
        /// Value used online
        online: T,
    },

    /// Same value in both modes
    Both(T),
}

impl<T> PerMode<T> {
    /// Value for `mode`
    #[must_use]
    pub fn get(&self, mode: ConnectionMode) -> &T {
        match (self, mode) {
            (Self::Both(v), _) => v,
            (Self::Split { offline, .. }, ConnectionMode::Offline) => offline,
            (Self::Split { online, .. }, ConnectionMode::Online) => online,
        }
    }
}

impl<T> From<T> for PerMode<T> {
    fn from(value: T) -> Self {
        Self::Both(value)
    }
}
