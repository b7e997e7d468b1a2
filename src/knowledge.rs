// 🧭 Knowledge - Entity versions and per-device high-water marks
//
// An entity version looks like `A-86`: a short device id and a counter.
// A knowledge string is a comma-separated list of such marks, one per
// device (`A-86,B-3`). Only the counter of our own device is ever advanced;
// every other mark is carried through untouched.

use crate::error::{Result, SplitterError};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<prefix>[A-Z]+)-(?P<number>\d+)$").expect("entity version pattern is valid")
    })
}

// ============================================================================
// ENTITY VERSION
// ============================================================================

/// Version stamp of one entity, issued by a single device
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityVersion {
    prefix: String,
    number: u128,
}

impl EntityVersion {
    pub fn new(prefix: impl Into<String>, number: u128) -> Self {
        EntityVersion {
            prefix: prefix.into(),
            number,
        }
    }

    /// Short id of the device that issued this version
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn number(&self) -> u128 {
        self.number
    }
}

impl FromStr for EntityVersion {
    type Err = SplitterError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = version_pattern()
            .captures(s)
            .ok_or_else(|| SplitterError::format("entity version", s))?;
        let number = caps["number"]
            .parse::<u128>()
            .map_err(|_| SplitterError::format("entity version", s))?;
        Ok(EntityVersion::new(&caps["prefix"], number))
    }
}

impl fmt::Display for EntityVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.number)
    }
}

/// Versions of different devices are incomparable.
impl PartialOrd for EntityVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.prefix == other.prefix {
            Some(self.number.cmp(&other.number))
        } else {
            None
        }
    }
}

impl Serialize for EntityVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// KNOWLEDGE
// ============================================================================

/// Structured form of a knowledge string: one high-water mark per device,
/// kept in the order the host wrote them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Knowledge {
    marks: Vec<EntityVersion>,
}

impl Knowledge {
    pub fn new(marks: Vec<EntityVersion>) -> Self {
        Knowledge { marks }
    }

    pub fn marks(&self) -> &[EntityVersion] {
        &self.marks
    }

    /// High-water mark of the given device, if it has one
    pub fn version_of(&self, short_device_id: &str) -> Option<&EntityVersion> {
        self.marks.iter().find(|mark| mark.prefix == short_device_id)
    }

    /// Copy of this knowledge with `version`'s device advanced to `version`.
    /// A device without a mark yet is appended at the end.
    pub fn with_version(&self, version: &EntityVersion) -> Knowledge {
        let mut marks = self.marks.clone();
        match marks.iter_mut().find(|mark| mark.prefix == version.prefix) {
            Some(mark) => mark.number = version.number,
            None => marks.push(version.clone()),
        }
        Knowledge { marks }
    }
}

impl FromStr for Knowledge {
    type Err = SplitterError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(SplitterError::format("knowledge", s));
        }
        let marks = s
            .split(',')
            .map(|part| part.trim().parse::<EntityVersion>())
            .collect::<Result<Vec<_>>>()
            .map_err(|_| SplitterError::format("knowledge", s))?;
        Ok(Knowledge { marks })
    }
}

impl fmt::Display for Knowledge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mark) in self.marks.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", mark)?;
        }
        Ok(())
    }
}

impl Serialize for Knowledge {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Knowledge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
