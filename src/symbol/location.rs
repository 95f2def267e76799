//! Source location model
//!
//! Positions are 1-based, exactly as the front end reports them, and ranges
//! serialize to the compact `L1:C1-L2:C2` form used throughout the index output.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use lsp_types::{Position as LspPosition, Range as LspRange};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, column) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid position: expected 'line:column', got '{s}'"))?;
        let line: u32 = line
            .parse()
            .map_err(|_| format!("Invalid line number: '{line}'"))?;
        let column: u32 = column
            .parse()
            .map_err(|_| format!("Invalid column number: '{column}'"))?;
        if line == 0 || column == 0 {
            return Err("Line and column numbers must be 1-based (> 0)".to_string());
        }
        Ok(Position { line, column })
    }
}

/// Half-open source range within a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Shorthand used heavily by tests and the dump front end
    pub fn from_coords(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start: Position::new(start_line, start_col),
            end: Position::new(end_line, end_col),
        }
    }

    pub fn contains(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for Range {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid range: expected 'L1:C1-L2:C2', got '{s}'"))?;
        Ok(Range {
            start: start.parse()?,
            end: end.parse()?,
        })
    }
}

impl Serialize for Range {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Range {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A range qualified by the file it lives in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileLocation {
    pub file_path: PathBuf,
    pub range: Range,
}

impl FileLocation {
    pub fn new(file_path: impl Into<PathBuf>, range: Range) -> Self {
        Self {
            file_path: file_path.into(),
            range,
        }
    }

    /// Compact form: `file.cpp:23:5-25:10`
    pub fn to_compact_range(&self) -> String {
        format!("{}:{}", self.file_path.to_string_lossy(), self.range)
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_compact_range())
    }
}

impl FromStr for FileLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The range separator is the last '-'; file paths may contain dashes.
        let (head, end) = match s.rsplit_once('-') {
            Some((head, end)) if end.parse::<Position>().is_ok() => (head, Some(end)),
            _ => (s, None),
        };

        let parts: Vec<&str> = head.rsplitn(3, ':').collect();
        if parts.len() != 3 {
            return Err(format!(
                "Invalid format: expected '/path/file.cpp:line:column[-line:column]', got '{s}'"
            ));
        }

        let start: Position = format!("{}:{}", parts[1], parts[0]).parse()?;
        let end = match end {
            Some(end) => end.parse()?,
            None => start,
        };

        Ok(FileLocation {
            file_path: PathBuf::from(parts[2]),
            range: Range { start, end },
        })
    }
}

impl Serialize for FileLocation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_compact_range())
    }
}

impl<'de> Deserialize<'de> for FileLocation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct FileLocationVisitor;

        impl<'de> Visitor<'de> for FileLocationVisitor {
            type Value = FileLocation;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a compact location string or FileLocation object")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(E::custom)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut range = None;
                let mut file_path = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "range" => range = Some(map.next_value()?),
                        "file_path" => file_path = Some(map.next_value()?),
                        _ => {
                            let _: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }

                Ok(FileLocation {
                    range: range.ok_or_else(|| de::Error::missing_field("range"))?,
                    file_path: file_path.ok_or_else(|| de::Error::missing_field("file_path"))?,
                })
            }
        }

        deserializer.deserialize_any(FileLocationVisitor)
    }
}

// LSP positions are 0-based.

impl From<Position> for LspPosition {
    fn from(pos: Position) -> Self {
        LspPosition {
            line: pos.line.saturating_sub(1),
            character: pos.column.saturating_sub(1),
        }
    }
}

impl From<LspPosition> for Position {
    fn from(pos: LspPosition) -> Self {
        Position {
            line: pos.line.saturating_add(1),
            column: pos.character.saturating_add(1),
        }
    }
}

impl From<Range> for LspRange {
    fn from(range: Range) -> Self {
        LspRange {
            start: range.start.into(),
            end: range.end.into(),
        }
    }
}

impl From<LspRange> for Range {
    fn from(range: LspRange) -> Self {
        Range {
            start: range.start.into(),
            end: range.end.into(),
        }
    }
}
