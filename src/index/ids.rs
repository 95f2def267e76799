//! Local IDs
//!
//! Dense, zero-based indices into one `IndexFile`'s tables. They are arena indices
//! and mean nothing outside the index that assigned them; cross-index joins go
//! through the USR.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::symbol::Range;

macro_rules! local_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

local_id!(
    /// Index into `IndexFile::types`
    TypeId
);
local_id!(
    /// Index into `IndexFile::funcs`
    FuncId
);
local_id!(
    /// Index into `IndexFile::vars`
    VarId
);

/// A call edge endpoint: the function on the other side plus the call site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuncRef {
    pub id: FuncId,
    pub loc: Range,
}

impl fmt::Display for FuncRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.loc)
    }
}

impl FromStr for FuncRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, loc) = s
            .split_once('@')
            .ok_or_else(|| format!("Invalid call reference: expected 'id@range', got '{s}'"))?;
        let id = id
            .parse()
            .map_err(|_| format!("Invalid function id: '{id}'"))?;
        Ok(FuncRef {
            id: FuncId(id),
            loc: loc.parse()?,
        })
    }
}

impl Serialize for FuncRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FuncRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Append `item` unless it is already present, preserving first-seen order
pub(crate) fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) -> bool {
    if list.contains(&item) {
        false
    } else {
        list.push(item);
        true
    }
}
