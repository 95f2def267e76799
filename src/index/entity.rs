//! Entity records: types, functions and variables
//!
//! Records start as declaration-only stubs carrying just a USR and get filled in
//! as the front end reports their declarations and definitions.

use serde::{Deserialize, Serialize};

use super::ids::{FuncId, FuncRef, TypeId, VarId};
use crate::symbol::{Range, SymbolKind, Usr};

/// Short name given to unnamed structs, unions, classes and enums
pub const ANONYMOUS_NAME: &str = "<anonymous>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedType {
    pub id: TypeId,
    pub usr: Usr,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub detailed_name: String,
    #[serde(default)]
    pub kind: SymbolKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_spelling: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_extent: Option<Range>,
    /// Base classes
    #[serde(default)]
    pub parents: Vec<TypeId>,
    /// Subclasses seen so far
    #[serde(default)]
    pub derived: Vec<TypeId>,
    /// Nested types
    #[serde(default)]
    pub types: Vec<TypeId>,
    #[serde(default)]
    pub funcs: Vec<FuncId>,
    #[serde(default)]
    pub vars: Vec<VarId>,
    /// Variables whose type is this type
    #[serde(default)]
    pub instances: Vec<VarId>,
    #[serde(default)]
    pub uses: Vec<Range>,
}

impl IndexedType {
    pub fn new(id: TypeId, usr: Usr) -> Self {
        Self {
            id,
            usr,
            short_name: String::new(),
            detailed_name: String::new(),
            kind: SymbolKind::Unknown,
            definition_spelling: None,
            definition_extent: None,
            parents: Vec::new(),
            derived: Vec::new(),
            types: Vec::new(),
            funcs: Vec::new(),
            vars: Vec::new(),
            instances: Vec::new(),
            uses: Vec::new(),
        }
    }

    pub fn is_definition(&self) -> bool {
        self.definition_spelling.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedFunc {
    pub id: FuncId,
    #[serde(default)]
    pub is_operator: bool,
    pub usr: Usr,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub detailed_name: String,
    #[serde(default)]
    pub kind: SymbolKind,
    /// Spellings of declarations that are not the definition
    #[serde(default)]
    pub declarations: Vec<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_spelling: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_extent: Option<Range>,
    /// Class a method belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<TypeId>,
    /// Overridden virtual functions
    #[serde(default)]
    pub base: Vec<FuncId>,
    /// Known overriders
    #[serde(default)]
    pub derived: Vec<FuncId>,
    #[serde(default)]
    pub locals: Vec<VarId>,
    #[serde(default)]
    pub callers: Vec<FuncRef>,
    #[serde(default)]
    pub callees: Vec<FuncRef>,
    /// Not part of the emitted format; call sites are reported through `callers`.
    #[serde(skip)]
    pub uses: Vec<Range>,
}

impl IndexedFunc {
    pub fn new(id: FuncId, usr: Usr) -> Self {
        Self {
            id,
            is_operator: false,
            usr,
            short_name: String::new(),
            detailed_name: String::new(),
            kind: SymbolKind::Unknown,
            declarations: Vec::new(),
            definition_spelling: None,
            definition_extent: None,
            declaring_type: None,
            base: Vec::new(),
            derived: Vec::new(),
            locals: Vec::new(),
            callers: Vec::new(),
            callees: Vec::new(),
            uses: Vec::new(),
        }
    }

    pub fn is_definition(&self) -> bool {
        self.definition_spelling.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedVar {
    pub id: VarId,
    pub usr: Usr,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub detailed_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_spelling: Option<Range>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_extent: Option<Range>,
    /// Owning struct/union/class, `None` for globals and locals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<TypeId>,
    /// Type of the variable when it is an instance of an indexed type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<TypeId>,
    #[serde(default)]
    pub kind: SymbolKind,
    #[serde(default)]
    pub uses: Vec<Range>,
}

impl IndexedVar {
    pub fn new(id: VarId, usr: Usr) -> Self {
        Self {
            id,
            usr,
            short_name: String::new(),
            detailed_name: String::new(),
            definition_spelling: None,
            definition_extent: None,
            declaring_type: None,
            variable_type: None,
            kind: SymbolKind::Unknown,
            uses: Vec::new(),
        }
    }

    pub fn is_definition(&self) -> bool {
        self.definition_spelling.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stub_type_serializes_without_definition() {
        let ty = IndexedType::new(TypeId(0), Usr(7));
        let value = serde_json::to_value(&ty).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 0,
                "usr": 7,
                "short_name": "",
                "detailed_name": "",
                "kind": 0,
                "parents": [],
                "derived": [],
                "types": [],
                "funcs": [],
                "vars": [],
                "instances": [],
                "uses": []
            })
        );
        assert!(!ty.is_definition());
    }

    #[test]
    fn test_func_uses_are_not_emitted() {
        let mut func = IndexedFunc::new(FuncId(0), Usr(1));
        func.uses.push(Range::from_coords(8, 6, 8, 9));
        let value = serde_json::to_value(&func).unwrap();
        assert!(value.get("uses").is_none());
        assert!(value.get("declaring_type").is_none());
        assert_eq!(value["base"], json!([]));
    }

    #[test]
    fn test_method_declaring_type_follows_definition() {
        let mut func = IndexedFunc::new(FuncId(0), Usr(9));
        func.kind = SymbolKind::InstanceMethod;
        func.declarations.push(Range::from_coords(3, 8, 3, 11));
        func.definition_spelling = Some(Range::from_coords(6, 11, 6, 14));
        func.definition_extent = Some(Range::from_coords(6, 1, 6, 19));
        func.declaring_type = Some(TypeId(0));
        let text = serde_json::to_string(&func).unwrap();
        assert!(
            text.contains(
                r#""declarations":["3:8-3:11"],"definition_spelling":"6:11-6:14","definition_extent":"6:1-6:19","declaring_type":0,"base":[]"#
            ),
            "{text}"
        );
    }

    #[test]
    fn test_var_optional_fields() {
        let mut var = IndexedVar::new(VarId(2), Usr(3));
        var.variable_type = Some(TypeId(0));
        let value = serde_json::to_value(&var).unwrap();
        assert_eq!(value["variable_type"], json!(0));
        assert!(value.get("declaring_type").is_none());
    }
}
