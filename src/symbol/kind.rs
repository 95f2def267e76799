//! Symbol kind tags
//!
//! The numeric values are part of the emitted index format and must stay stable.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum SymbolKind {
    #[default]
    Unknown = 0,
    Module = 1,
    Namespace = 2,
    NamespaceAlias = 3,
    Macro = 4,
    Enum = 5,
    Struct = 6,
    Class = 7,
    Protocol = 8,
    Extension = 9,
    Union = 10,
    TypeAlias = 11,
    Function = 12,
    Variable = 13,
    Field = 14,
    EnumConstant = 15,
    InstanceMethod = 16,
    ClassMethod = 17,
    StaticMethod = 18,
    InstanceProperty = 19,
    ClassProperty = 20,
    StaticProperty = 21,
    Constructor = 22,
    Destructor = 23,
    ConversionFunction = 24,
    Parameter = 25,
    Using = 26,
}

/// Which entity table a symbol of a given kind is recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    Type,
    Func,
    Var,
}

impl std::fmt::Display for EntityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntityClass::Type => "types",
            EntityClass::Func => "funcs",
            EntityClass::Var => "vars",
        })
    }
}

impl SymbolKind {
    const ALL: [SymbolKind; 27] = [
        SymbolKind::Unknown,
        SymbolKind::Module,
        SymbolKind::Namespace,
        SymbolKind::NamespaceAlias,
        SymbolKind::Macro,
        SymbolKind::Enum,
        SymbolKind::Struct,
        SymbolKind::Class,
        SymbolKind::Protocol,
        SymbolKind::Extension,
        SymbolKind::Union,
        SymbolKind::TypeAlias,
        SymbolKind::Function,
        SymbolKind::Variable,
        SymbolKind::Field,
        SymbolKind::EnumConstant,
        SymbolKind::InstanceMethod,
        SymbolKind::ClassMethod,
        SymbolKind::StaticMethod,
        SymbolKind::InstanceProperty,
        SymbolKind::ClassProperty,
        SymbolKind::StaticProperty,
        SymbolKind::Constructor,
        SymbolKind::Destructor,
        SymbolKind::ConversionFunction,
        SymbolKind::Parameter,
        SymbolKind::Using,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Table this kind is recorded in, if it is indexed at all
    pub fn entity_class(self) -> Option<EntityClass> {
        use SymbolKind::*;
        match self {
            Namespace | NamespaceAlias | Module | Enum | Struct | Class | Protocol | Extension
            | Union | TypeAlias | Using => Some(EntityClass::Type),
            Function | InstanceMethod | ClassMethod | StaticMethod | Constructor | Destructor
            | ConversionFunction => Some(EntityClass::Func),
            Variable | Field | EnumConstant | Parameter | InstanceProperty | ClassProperty
            | StaticProperty | Macro => Some(EntityClass::Var),
            Unknown => None,
        }
    }

    /// Struct, class, union or enum: the kinds that may be declared without a name
    pub fn is_aggregate(self) -> bool {
        matches!(
            self,
            SymbolKind::Struct | SymbolKind::Class | SymbolKind::Union | SymbolKind::Enum
        )
    }
}

impl Serialize for SymbolKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for SymbolKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u8::deserialize(deserializer)?;
        SymbolKind::from_u8(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown symbol kind: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_values_match_format() {
        assert_eq!(SymbolKind::Struct as u8, 6);
        assert_eq!(SymbolKind::Union as u8, 10);
        assert_eq!(SymbolKind::Function as u8, 12);
        assert_eq!(SymbolKind::Variable as u8, 13);
        assert_eq!(SymbolKind::Field as u8, 14);
        assert_eq!(SymbolKind::Using as u8, 26);
    }

    #[test]
    fn test_from_u8_covers_every_variant() {
        for (i, kind) in SymbolKind::ALL.iter().enumerate() {
            assert_eq!(SymbolKind::from_u8(i as u8), Some(*kind));
        }
        assert_eq!(SymbolKind::from_u8(27), None);
    }

    #[test]
    fn test_serde_as_integer() {
        assert_eq!(serde_json::to_string(&SymbolKind::Field).unwrap(), "14");
        let kind: SymbolKind = serde_json::from_str("10").unwrap();
        assert_eq!(kind, SymbolKind::Union);
        assert!(serde_json::from_str::<SymbolKind>("99").is_err());
    }

    #[test]
    fn test_entity_class() {
        assert_eq!(SymbolKind::Union.entity_class(), Some(EntityClass::Type));
        assert_eq!(SymbolKind::Constructor.entity_class(), Some(EntityClass::Func));
        assert_eq!(SymbolKind::Field.entity_class(), Some(EntityClass::Var));
        assert_eq!(SymbolKind::Unknown.entity_class(), None);
    }
}
