use std::fmt;
use std::str::FromStr;

use crate::error::BindingError;

/// Which way values flow through a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BindingDirection {
    /// Source to destination only.
    #[default]
    OneWay = 0,
    /// Both ways; destination changes are written back to the source.
    TwoWay = 1,
}

/// The side a propagation started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOrigin {
    Source,
    Destination,
}

/// The propagation a connection triggers after re-evaluating its binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BindingConnectionDirection {
    #[default]
    SourceToDestination = 0,
    DestinationToSource = 1,
}

impl TryFrom<u8> for BindingDirection {
    type Error = BindingError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::OneWay),
            1 => Ok(Self::TwoWay),
            other => Err(invalid("binding direction", other)),
        }
    }
}

impl FromStr for BindingDirection {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "oneway" => Ok(Self::OneWay),
            "twoway" => Ok(Self::TwoWay),
            _ => Err(invalid("binding direction", s)),
        }
    }
}

impl TryFrom<u8> for BindingConnectionDirection {
    type Error = BindingError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::SourceToDestination),
            1 => Ok(Self::DestinationToSource),
            other => Err(invalid("connection direction", other)),
        }
    }
}

impl FromStr for BindingConnectionDirection {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "sourcetodestination" | "s2d" => Ok(Self::SourceToDestination),
            "destinationtosource" | "d2s" => Ok(Self::DestinationToSource),
            _ => Err(invalid("connection direction", s)),
        }
    }
}

impl fmt::Display for BindingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OneWay => "one-way",
            Self::TwoWay => "two-way",
        })
    }
}

impl fmt::Display for BindingConnectionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SourceToDestination => "source-to-destination",
            Self::DestinationToSource => "destination-to-source",
        })
    }
}

/// Lowercase with `-`, `_` and spaces removed, so `Two-Way` and `two_way`
/// both read as `twoway`.
fn normalized(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn invalid(kind: &'static str, value: impl fmt::Display) -> BindingError {
    BindingError::InvalidDirection {
        kind,
        value: value.to_string(),
    }
}
