//! Type mapping between spec types and Python type expressions.

use crate::error::{GeneratorError, GeneratorResult};
use algokit_app_spec::AbiType;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Python type of co-submitted transaction arguments.
pub const TRANSACTION_ARGUMENT_TYPE: &str = "algokit_utils.AppMethodCallTransactionArgument";

/// Where a mapped type is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypePosition {
    /// A method argument; accepts convenience representations.
    Input,
    /// A return value or a value read from state.
    Output,
}

impl TypePosition {
    const fn describe(self) -> &'static str {
        match self {
            Self::Input => "an input",
            Self::Output => "an output",
        }
    }
}

/// Foreign reference argument types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `account`
    Account,
    /// `asset`
    Asset,
    /// `application`
    Application,
}

/// Transaction argument types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// `txn`
    Any,
    /// `pay`
    Payment,
    /// `keyreg`
    KeyRegistration,
    /// `acfg`
    AssetConfig,
    /// `axfer`
    AssetTransfer,
    /// `afrz`
    AssetFreeze,
    /// `appl`
    ApplicationCall,
}

impl TransactionKind {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "txn" => Self::Any,
            "pay" => Self::Payment,
            "keyreg" => Self::KeyRegistration,
            "acfg" => Self::AssetConfig,
            "axfer" => Self::AssetTransfer,
            "afrz" => Self::AssetFreeze,
            "appl" => Self::ApplicationCall,
            _ => return None,
        })
    }
}

/// Raw AVM stack types used by state declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvmType {
    /// `AVMBytes`
    Bytes,
    /// `AVMString`
    String,
    /// `AVMUint64`
    Uint64,
}

/// Identity of a struct: its declared name, or `{field:type,...}` for inline
/// field lists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StructKey(String);

impl StructKey {
    /// Key of a declared struct.
    pub fn named(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Key of an inline field list, built from already resolved field keys.
    pub fn anonymous<'a>(fields: impl IntoIterator<Item = (&'a str, String)>) -> Self {
        let body: Vec<String> = fields
            .into_iter()
            .map(|(name, ty)| format!("{name}:{ty}"))
            .collect();
        Self(format!("{{{}}}", body.join(",")))
    }

    /// Returns true for inline field lists.
    pub fn is_anonymous(&self) -> bool {
        self.0.starts_with('{')
    }

    /// The key as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StructKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved spec type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// An ABI encoded value.
    Abi(AbiType),
    /// A struct from the struct table.
    Struct(StructKey),
    /// A foreign reference argument.
    Reference(ReferenceKind),
    /// A co-submitted transaction.
    Transaction(TransactionKind),
    /// A raw AVM value.
    Avm(AvmType),
    /// No value.
    Void,
}

impl ValueType {
    /// Resolves a type string.
    ///
    /// Special names are tried before declared struct names, and ABI grammar
    /// is the last resort. `location` names the reference in error messages.
    pub fn parse(
        type_str: &str,
        is_struct: impl Fn(&str) -> bool,
        location: &str,
    ) -> GeneratorResult<Self> {
        if type_str == "void" {
            return Ok(Self::Void);
        }
        if let Some(kind) = TransactionKind::parse(type_str) {
            return Ok(Self::Transaction(kind));
        }
        let special = match type_str {
            "account" => Some(Self::Reference(ReferenceKind::Account)),
            "asset" => Some(Self::Reference(ReferenceKind::Asset)),
            "application" => Some(Self::Reference(ReferenceKind::Application)),
            "AVMBytes" => Some(Self::Avm(AvmType::Bytes)),
            "AVMString" => Some(Self::Avm(AvmType::String)),
            "AVMUint64" => Some(Self::Avm(AvmType::Uint64)),
            _ => None,
        };
        if let Some(special) = special {
            return Ok(special);
        }
        if is_struct(type_str) {
            return Ok(Self::Struct(StructKey::named(type_str)));
        }
        type_str
            .parse::<AbiType>()
            .map(Self::Abi)
            .map_err(|_| GeneratorError::unknown_type(type_str, location))
    }

    /// Returns true for transaction arguments.
    pub fn is_transaction(&self) -> bool {
        matches!(self, Self::Transaction(_))
    }
}

/// Maps [`ValueType`]s to Python type expressions.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    struct_names: &'a BTreeMap<StructKey, String>,
}

impl<'a> TypeMapper<'a> {
    /// Creates a mapper resolving structs through `struct_names`.
    pub fn new(struct_names: &'a BTreeMap<StructKey, String>) -> Self {
        Self { struct_names }
    }

    /// Maps a resolved type.
    pub fn map(&self, ty: &ValueType, position: TypePosition) -> GeneratorResult<String> {
        match ty {
            ValueType::Abi(abi) => Ok(map_abi(abi, position)),
            ValueType::Struct(key) => self
                .struct_names
                .get(key)
                .cloned()
                .ok_or_else(|| GeneratorError::UnknownStruct(key.to_string())),
            ValueType::Reference(ReferenceKind::Account) => Ok(match position {
                TypePosition::Input => "str | bytes".to_string(),
                TypePosition::Output => "str".to_string(),
            }),
            ValueType::Reference(_) => Ok("int".to_string()),
            ValueType::Transaction(_) => match position {
                TypePosition::Input => Ok(TRANSACTION_ARGUMENT_TYPE.to_string()),
                TypePosition::Output => Err(GeneratorError::InvalidPosition {
                    type_str: "transaction".to_string(),
                    position: position.describe(),
                }),
            },
            ValueType::Avm(AvmType::Bytes) => Ok("bytes".to_string()),
            ValueType::Avm(AvmType::String) => Ok("str".to_string()),
            ValueType::Avm(AvmType::Uint64) => Ok("int".to_string()),
            ValueType::Void => Ok("None".to_string()),
        }
    }

    /// Resolves and maps a raw type string.
    pub fn map_str(&self, type_str: &str, position: TypePosition) -> GeneratorResult<String> {
        let ty = ValueType::parse(
            type_str,
            |name| self.struct_names.contains_key(&StructKey::named(name)),
            "type mapping",
        )?;
        self.map(&ty, position)
    }
}

fn repeat_tuple(element: &str, len: usize) -> String {
    if len == 0 {
        return "tuple[()]".to_string();
    }
    format!("tuple[{}]", vec![element; len].join(", "))
}

/// Maps an ABI type.
pub fn map_abi(abi: &AbiType, position: TypePosition) -> String {
    match abi {
        AbiType::Uint(_) | AbiType::Byte => "int".to_string(),
        AbiType::Bool => "bool".to_string(),
        AbiType::Ufixed { .. } => "decimal.Decimal".to_string(),
        AbiType::String | AbiType::Address => "str".to_string(),
        AbiType::StaticArray(inner, len) if **inner == AbiType::Byte => match position {
            TypePosition::Output => "bytes".to_string(),
            TypePosition::Input => format!("bytes | str | {}", repeat_tuple("int", *len)),
        },
        AbiType::DynamicArray(inner) if **inner == AbiType::Byte => match position {
            TypePosition::Output => "bytes".to_string(),
            TypePosition::Input => "bytes | str".to_string(),
        },
        AbiType::StaticArray(inner, len) => repeat_tuple(&map_abi(inner, position), *len),
        AbiType::DynamicArray(inner) => format!("list[{}]", map_abi(inner, position)),
        AbiType::Tuple(children) if children.is_empty() => "tuple[()]".to_string(),
        AbiType::Tuple(children) => {
            let mapped: Vec<String> = children.iter().map(|c| map_abi(c, position)).collect();
            format!("tuple[{}]", mapped.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(s: &str) -> GeneratorResult<ValueType> {
        ValueType::parse(s, |name| name == "Vector", "test")
    }

    fn map(s: &str, position: TypePosition) -> String {
        let mut names = BTreeMap::new();
        names.insert(StructKey::named("Vector"), "Vector".to_string());
        TypeMapper::new(&names).map_str(s, position).unwrap()
    }

    #[test]
    fn test_resolution_order() {
        assert_eq!(resolve("void").unwrap(), ValueType::Void);
        assert_eq!(
            resolve("axfer").unwrap(),
            ValueType::Transaction(TransactionKind::AssetTransfer)
        );
        assert_eq!(
            resolve("account").unwrap(),
            ValueType::Reference(ReferenceKind::Account)
        );
        assert_eq!(resolve("AVMString").unwrap(), ValueType::Avm(AvmType::String));
        assert_eq!(
            resolve("Vector").unwrap(),
            ValueType::Struct(StructKey::named("Vector"))
        );
        assert_eq!(resolve("uint64").unwrap(), ValueType::Abi(AbiType::Uint(64)));
    }

    #[test]
    fn test_unknown_type_fails() {
        let err = resolve("Point").unwrap_err();
        assert!(matches!(err, GeneratorError::UnknownType { .. }));
        assert!(err.to_string().contains("Point"));
    }

    #[test]
    fn test_primitives() {
        use TypePosition::*;
        assert_eq!(map("uint64", Input), "int");
        assert_eq!(map("byte", Output), "int");
        assert_eq!(map("bool", Input), "bool");
        assert_eq!(map("ufixed64x2", Output), "decimal.Decimal");
        assert_eq!(map("string", Input), "str");
        assert_eq!(map("address", Output), "str");
        assert_eq!(map("void", Output), "None");
        assert_eq!(map("AVMBytes", Output), "bytes");
        assert_eq!(map("AVMUint64", Output), "int");
    }

    #[test]
    fn test_byte_arrays_depend_on_position() {
        use TypePosition::*;
        assert_eq!(map("byte[]", Output), "bytes");
        assert_eq!(map("byte[]", Input), "bytes | str");
        assert_eq!(map("byte[3]", Output), "bytes");
        assert_eq!(map("byte[3]", Input), "bytes | str | tuple[int, int, int]");
    }

    #[test]
    fn test_composites() {
        use TypePosition::*;
        assert_eq!(map("uint8[2]", Output), "tuple[int, int]");
        assert_eq!(map("string[]", Input), "list[str]");
        assert_eq!(map("(uint64,(bool,byte[]))", Output), "tuple[int, tuple[bool, bytes]]");
        assert_eq!(map("()", Output), "tuple[()]");
        assert_eq!(map("uint64[0]", Output), "tuple[()]");
    }

    #[test]
    fn test_references_and_transactions() {
        use TypePosition::*;
        assert_eq!(map("account", Input), "str | bytes");
        assert_eq!(map("asset", Input), "int");
        assert_eq!(map("application", Input), "int");
        assert_eq!(map("pay", Input), TRANSACTION_ARGUMENT_TYPE);

        let names = BTreeMap::new();
        let err = TypeMapper::new(&names).map_str("txn", Output).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidPosition { .. }));
    }

    #[test]
    fn test_structs_map_to_generated_names() {
        assert_eq!(map("Vector", TypePosition::Output), "Vector");

        let names = BTreeMap::new();
        let err = TypeMapper::new(&names)
            .map(&ValueType::Struct(StructKey::named("Missing")), TypePosition::Output)
            .unwrap_err();
        assert!(matches!(err, GeneratorError::UnknownStruct(_)));
    }

    #[test]
    fn test_anonymous_struct_key() {
        let key = StructKey::anonymous([("a", "uint64".to_string()), ("b", "Vector".to_string())]);
        assert_eq!(key.as_str(), "{a:uint64,b:Vector}");
        assert!(key.is_anonymous());
        assert!(!StructKey::named("Vector").is_anonymous());
    }
}
