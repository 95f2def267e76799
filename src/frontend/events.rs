//! Front-end event model
//!
//! What the external AST walker reports for one translation unit: declarations,
//! references and calls in visitation order, plus includes and skipped ranges.
//! Relationship fields name other entities by USR string.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::symbol::{FileLocation, Range, SymbolKind, Usr};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// Main source file of the unit
    pub path: PathBuf,
    #[serde(default)]
    pub events: Vec<IndexEvent>,
    #[serde(default)]
    pub includes: Vec<Inclusion>,
    #[serde(default)]
    pub skipped_by_preprocessor: Vec<FileLocation>,
}

impl TranslationUnit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            events: Vec::new(),
            includes: Vec::new(),
            skipped_by_preprocessor: Vec::new(),
        }
    }

    pub fn with_event(mut self, event: impl Into<IndexEvent>) -> Self {
        self.events.push(event.into());
        self
    }

    pub fn with_include(mut self, includer: impl Into<PathBuf>, included: impl Into<PathBuf>) -> Self {
        self.includes.push(Inclusion {
            includer: includer.into(),
            included: included.into(),
        });
        self
    }
}

/// One `#include` edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inclusion {
    pub includer: PathBuf,
    pub included: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IndexEvent {
    Declaration(DeclEvent),
    Reference(RefEvent),
    Call(CallEvent),
}

impl From<DeclEvent> for IndexEvent {
    fn from(event: DeclEvent) -> Self {
        IndexEvent::Declaration(event)
    }
}

impl From<RefEvent> for IndexEvent {
    fn from(event: RefEvent) -> Self {
        IndexEvent::Reference(event)
    }
}

impl From<CallEvent> for IndexEvent {
    fn from(event: CallEvent) -> Self {
        IndexEvent::Call(event)
    }
}

/// A declaration or definition cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclEvent {
    pub usr: String,
    pub kind: SymbolKind,
    /// Empty for unnamed structs and unions
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub detailed_name: String,
    /// Range of the name token
    pub spelling: FileLocation,
    /// Full extent of the construct, in the spelling's file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Range>,
    #[serde(default)]
    pub is_definition: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overridden_function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_of: Option<String>,
    /// Function a local variable or parameter belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_parent_function: Option<String>,
    #[serde(default)]
    pub is_operator: bool,
}

impl DeclEvent {
    pub fn new(
        usr: impl Into<String>,
        kind: SymbolKind,
        short_name: impl Into<String>,
        detailed_name: impl Into<String>,
        spelling: FileLocation,
    ) -> Self {
        Self {
            usr: usr.into(),
            kind,
            short_name: short_name.into(),
            detailed_name: detailed_name.into(),
            spelling,
            extent: None,
            is_definition: false,
            declaring_type: None,
            base_types: Vec::new(),
            overridden_function: None,
            type_of: None,
            semantic_parent_function: None,
            is_operator: false,
        }
    }

    pub fn usr(&self) -> Usr {
        Usr::from_usr_string(&self.usr)
    }

    pub fn definition(mut self, extent: Range) -> Self {
        self.is_definition = true;
        self.extent = Some(extent);
        self
    }

    pub fn declared_in(mut self, type_usr: impl Into<String>) -> Self {
        self.declaring_type = Some(type_usr.into());
        self
    }

    pub fn with_base(mut self, type_usr: impl Into<String>) -> Self {
        self.base_types.push(type_usr.into());
        self
    }

    pub fn overrides(mut self, func_usr: impl Into<String>) -> Self {
        self.overridden_function = Some(func_usr.into());
        self
    }

    pub fn of_type(mut self, type_usr: impl Into<String>) -> Self {
        self.type_of = Some(type_usr.into());
        self
    }

    pub fn local_of(mut self, func_usr: impl Into<String>) -> Self {
        self.semantic_parent_function = Some(func_usr.into());
        self
    }
}

/// A token naming an already-declared entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefEvent {
    pub usr: String,
    pub kind: SymbolKind,
    pub location: FileLocation,
}

impl RefEvent {
    pub fn new(usr: impl Into<String>, kind: SymbolKind, location: FileLocation) -> Self {
        Self {
            usr: usr.into(),
            kind,
            location,
        }
    }

    pub fn usr(&self) -> Usr {
        Usr::from_usr_string(&self.usr)
    }
}

/// A call from one function to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEvent {
    pub caller_usr: String,
    pub callee_usr: String,
    pub location: FileLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let json = r#"{
            "path": "/src/main.cc",
            "events": [
                {
                    "event": "declaration",
                    "usr": "c:@S@Foo",
                    "kind": 7,
                    "short_name": "Foo",
                    "detailed_name": "Foo",
                    "spelling": "/src/main.cc:1:7-1:10",
                    "extent": "1:1-1:14",
                    "is_definition": true
                },
                {
                    "event": "reference",
                    "usr": "c:@S@Foo",
                    "kind": 7,
                    "location": "/src/main.cc:3:1-3:4"
                },
                {
                    "event": "call",
                    "caller_usr": "c:@F@main#",
                    "callee_usr": "c:@F@helper#",
                    "location": "/src/main.cc:5:3-5:9"
                }
            ],
            "includes": [{"includer": "/src/main.cc", "included": "/src/foo.h"}],
            "skipped_by_preprocessor": ["/src/main.cc:7:1-9:7"]
        }"#;

        let tu: TranslationUnit = serde_json::from_str(json).unwrap();
        assert_eq!(tu.events.len(), 3);
        match &tu.events[0] {
            IndexEvent::Declaration(decl) => {
                assert_eq!(decl.kind, SymbolKind::Class);
                assert!(decl.is_definition);
                assert_eq!(decl.extent, Some(Range::from_coords(1, 1, 1, 14)));
                assert_eq!(decl.usr(), Usr::from_usr_string("c:@S@Foo"));
            }
            other => panic!("expected declaration, got {other:?}"),
        }
        assert!(matches!(tu.events[2], IndexEvent::Call(_)));
        assert_eq!(tu.includes[0].included, PathBuf::from("/src/foo.h"));
        assert_eq!(
            tu.skipped_by_preprocessor[0].range,
            Range::from_coords(7, 1, 9, 7)
        );
    }

    #[test]
    fn test_builder_sets_relationships() {
        let decl = DeclEvent::new(
            "c:@S@Derived",
            SymbolKind::Class,
            "Derived",
            "Derived",
            FileLocation::new("/src/a.h", Range::from_coords(2, 7, 2, 14)),
        )
        .definition(Range::from_coords(2, 1, 2, 30))
        .with_base("c:@S@Base");

        assert!(decl.is_definition);
        assert_eq!(decl.base_types, vec!["c:@S@Base".to_string()]);
        let round: DeclEvent =
            serde_json::from_value(serde_json::to_value(&decl).unwrap()).unwrap();
        assert_eq!(round, decl);
    }
}
