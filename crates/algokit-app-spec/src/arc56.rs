//! ARC-56 contract description.
//!
//! Only the parts a client generator reads are modelled with concrete types.
//! Compiled program metadata is kept as raw JSON because it is only ever
//! re-embedded or stripped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// An ARC-56 contract description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc56Contract {
    /// Contract name.
    pub name: String,
    /// Contract description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// ARCs the contract conforms to.
    #[serde(default)]
    pub arcs: Vec<u32>,
    /// Named structs, keyed by struct name.
    #[serde(default)]
    pub structs: BTreeMap<String, Vec<StructField>>,
    /// ABI methods.
    pub methods: Vec<Method>,
    /// Storage layout.
    #[serde(default)]
    pub state: State,
    /// On-completion actions reachable without an ABI method.
    #[serde(default)]
    pub bare_actions: Actions,
    /// Known deployments, keyed by genesis hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<Value>,
    /// ARC-28 events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Value>,
    /// Program source maps and error messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_info: Option<Value>,
    /// Base64 encoded TEAL source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    /// Base64 encoded compiled bytecode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_code: Option<Value>,
    /// Compiler that produced the programs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_info: Option<Value>,
    /// Deploy-time template variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_variables: Option<Value>,
    /// Scratch slot annotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_variables: Option<Value>,
}

/// Top-level keys holding compiled program metadata.
///
/// These are removed by minimal generation.
pub const COMPILED_PROGRAM_KEYS: &[&str] = &[
    "byteCode",
    "source",
    "compilerInfo",
    "templateVariables",
    "scratchVariables",
];

/// A field of a named struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructField {
    /// Field name.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub field_type: StructFieldType,
}

/// The type of a struct field: a type string, or an inline list of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructFieldType {
    /// An ABI type, AVM type or the name of another struct.
    Type(String),
    /// An anonymous nested struct.
    Fields(Vec<StructField>),
}

/// An ABI method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    /// Method name.
    pub name: String,
    /// Method description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Ordered arguments.
    #[serde(default)]
    pub args: Vec<MethodArg>,
    /// Return value.
    pub returns: MethodReturns,
    /// Allowed on-completion actions.
    #[serde(default)]
    pub actions: Actions,
    /// Whether the method can be simulated without changing state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
    /// ARC-28 events the method may emit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Value>,
    /// Call recommendations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Value>,
}

impl Method {
    /// Returns the method signature, e.g. `add(uint64,uint64)uint64`.
    pub fn signature(&self) -> String {
        let args: Vec<&str> = self.args.iter().map(|a| a.arg_type.as_str()).collect();
        format!("{}({}){}", self.name, args.join(","), self.returns.return_type)
    }
}

/// An ABI method argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodArg {
    /// ABI type of the argument.
    #[serde(rename = "type")]
    pub arg_type: String,
    /// Struct the argument is encoded as, if any.
    #[serde(rename = "struct", default, skip_serializing_if = "Option::is_none")]
    pub struct_name: Option<String>,
    /// Argument name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Argument description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Where a value comes from when the caller omits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
}

/// An ABI method return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodReturns {
    /// ABI type of the return value, `void` for none.
    #[serde(rename = "type")]
    pub return_type: String,
    /// Struct the value is encoded as, if any.
    #[serde(rename = "struct", default, skip_serializing_if = "Option::is_none")]
    pub struct_name: Option<String>,
    /// Description of the return value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// Default value of a method argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultValue {
    /// Base64 key, method signature or base64 literal, depending on `source`.
    pub data: Value,
    /// How `data` is encoded.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Where the value is read from.
    pub source: DefaultValueSource,
}

/// Source of a default argument value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultValueSource {
    /// A box.
    Box,
    /// A global state key.
    Global,
    /// A local state key of the sender.
    Local,
    /// A literal value.
    Literal,
    /// The return value of a read-only method.
    Method,
}

/// On-completion actions for create and call transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actions {
    /// Actions allowed when creating the application.
    #[serde(default)]
    pub create: Vec<OnCompleteAction>,
    /// Actions allowed when calling an existing application.
    #[serde(default)]
    pub call: Vec<OnCompleteAction>,
}

/// An application call on-completion action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OnCompleteAction {
    /// Plain call.
    NoOp,
    /// Opt the sender into local state.
    OptIn,
    /// Close out the sender's local state.
    CloseOut,
    /// Clear the sender's local state.
    ClearState,
    /// Replace the application programs.
    UpdateApplication,
    /// Delete the application.
    DeleteApplication,
}

impl OnCompleteAction {
    /// Every action, in transaction-field order.
    pub const ALL: [OnCompleteAction; 6] = [
        Self::NoOp,
        Self::OptIn,
        Self::CloseOut,
        Self::ClearState,
        Self::UpdateApplication,
        Self::DeleteApplication,
    ];

    /// Returns whether the action may be used when creating an application.
    pub const fn allowed_on_create(self) -> bool {
        matches!(self, Self::NoOp | Self::OptIn | Self::DeleteApplication)
    }

    /// Parses an ARC-32 call-config key such as `opt_in`.
    pub fn from_arc32_key(key: &str) -> Option<Self> {
        match key {
            "no_op" => Some(Self::NoOp),
            "opt_in" => Some(Self::OptIn),
            "close_out" => Some(Self::CloseOut),
            "clear_state" => Some(Self::ClearState),
            "update_application" => Some(Self::UpdateApplication),
            "delete_application" => Some(Self::DeleteApplication),
            _ => None,
        }
    }

    /// Returns the ARC-56 name of the action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoOp => "NoOp",
            Self::OptIn => "OptIn",
            Self::CloseOut => "CloseOut",
            Self::ClearState => "ClearState",
            Self::UpdateApplication => "UpdateApplication",
            Self::DeleteApplication => "DeleteApplication",
        }
    }
}

impl Display for OnCompleteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Storage layout of the contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Declared schema sizes.
    #[serde(default)]
    pub schema: StateSchema,
    /// Single-value storage keys.
    #[serde(default)]
    pub keys: StorageKeys,
    /// Key-prefixed storage maps.
    #[serde(default)]
    pub maps: StorageMaps,
}

/// Global and local schema sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSchema {
    /// Global schema.
    #[serde(default)]
    pub global: SchemaCounts,
    /// Local schema.
    #[serde(default)]
    pub local: SchemaCounts,
}

/// Number of integer and byte-slice slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCounts {
    /// Integer slots.
    #[serde(default)]
    pub ints: u64,
    /// Byte-slice slots.
    #[serde(default)]
    pub bytes: u64,
}

/// Named single-value keys per storage scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    /// Global state keys.
    #[serde(default)]
    pub global: BTreeMap<String, StorageKey>,
    /// Local state keys.
    #[serde(default)]
    pub local: BTreeMap<String, StorageKey>,
    /// Box keys.
    #[serde(rename = "box", default)]
    pub boxes: BTreeMap<String, StorageKey>,
}

/// Named maps per storage scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageMaps {
    /// Global state maps.
    #[serde(default)]
    pub global: BTreeMap<String, StorageMap>,
    /// Local state maps.
    #[serde(default)]
    pub local: BTreeMap<String, StorageMap>,
    /// Box maps.
    #[serde(rename = "box", default)]
    pub boxes: BTreeMap<String, StorageMap>,
}

/// A single storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageKey {
    /// Type of the key.
    pub key_type: String,
    /// Type of the stored value; may name a struct.
    pub value_type: String,
    /// Base64 encoded key bytes.
    pub key: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// A storage map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageMap {
    /// Type of the map keys; may name a struct.
    pub key_type: String,
    /// Type of the map values; may name a struct.
    pub value_type: String,
    /// Base64 encoded key prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}
