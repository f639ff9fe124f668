//! Legacy ARC-32 application specification.
//!
//! ARC-32 describes methods through an ARC-4 contract plus per-signature
//! `hints` (call config, struct layouts, defaults). [`Arc32ApplicationSpec::to_arc56`]
//! resolves those hints once into the ARC-56 model.

use crate::arc56::{
    Actions, Arc56Contract, DefaultValue, DefaultValueSource, Method, MethodArg, MethodReturns,
    OnCompleteAction, SchemaCounts, State, StateSchema, StorageKey, StructField, StructFieldType,
};
use crate::error::{SpecError, SpecResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Hint key that refers to a method's return value rather than an argument.
const OUTPUT_HINT_KEY: &str = "output";

/// An ARC-32 `application.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc32ApplicationSpec {
    /// Per-method hints keyed by method signature.
    #[serde(default)]
    pub hints: BTreeMap<String, MethodHints>,
    /// Base64 encoded TEAL programs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    /// Schema sizes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Arc32StateSchema>,
    /// Declared state keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Arc32Schema>,
    /// The ARC-4 contract.
    pub contract: Arc32Contract,
    /// Bare call configuration keyed by on-completion.
    #[serde(default)]
    pub bare_call_config: BTreeMap<String, CallConfig>,
}

/// Hints for one method signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodHints {
    /// Struct layouts keyed by argument name or `output`.
    #[serde(default)]
    pub structs: BTreeMap<String, StructHint>,
    /// Whether the method is read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    /// Default argument sources keyed by argument name.
    #[serde(default)]
    pub default_arguments: BTreeMap<String, DefaultArgument>,
    /// Call configuration keyed by on-completion.
    #[serde(default)]
    pub call_config: BTreeMap<String, CallConfig>,
}

/// A struct layout hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructHint {
    /// Struct name.
    pub name: String,
    /// Ordered `[field, type]` pairs.
    pub elements: Vec<(String, String)>,
}

/// A default argument hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultArgument {
    /// `global-state`, `local-state`, `abi-method` or `constant`.
    pub source: String,
    /// Key name, method description or constant value.
    pub data: Value,
}

/// ARC-32 call configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallConfig {
    /// Not allowed.
    Never,
    /// Allowed on an existing application.
    Call,
    /// Allowed when creating the application.
    Create,
    /// Allowed in both cases.
    All,
}

/// Schema sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc32StateSchema {
    /// Global schema.
    #[serde(default)]
    pub global: Arc32SchemaCounts,
    /// Local schema.
    #[serde(default)]
    pub local: Arc32SchemaCounts,
}

/// Slot counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc32SchemaCounts {
    /// Integer slots.
    #[serde(default)]
    pub num_uints: u64,
    /// Byte-slice slots.
    #[serde(default)]
    pub num_byte_slices: u64,
}

/// Declared state per scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arc32Schema {
    /// Global state.
    #[serde(default)]
    pub global: Arc32DeclaredSchema,
    /// Local state.
    #[serde(default)]
    pub local: Arc32DeclaredSchema,
}

/// Declared and reserved keys of one scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arc32DeclaredSchema {
    /// Statically known keys.
    #[serde(default)]
    pub declared: BTreeMap<String, DeclaredValue>,
    /// Dynamically keyed slots.
    #[serde(default)]
    pub reserved: BTreeMap<String, Value>,
}

/// A declared state value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredValue {
    /// `uint64` or `bytes`.
    #[serde(rename = "type")]
    pub value_type: String,
    /// The raw key.
    pub key: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descr: Option<String>,
}

/// The ARC-4 contract embedded in an ARC-32 spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc32Contract {
    /// Contract name.
    pub name: String,
    /// Contract description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// ABI methods.
    #[serde(default)]
    pub methods: Vec<Arc32Method>,
    /// Known deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<Value>,
}

/// An ARC-4 method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc32Method {
    /// Method name.
    pub name: String,
    /// Ordered arguments.
    #[serde(default)]
    pub args: Vec<Arc32Arg>,
    /// Return value.
    pub returns: Arc32Returns,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl Arc32Method {
    /// Returns the method signature used to key `hints`.
    pub fn signature(&self) -> String {
        let args: Vec<&str> = self.args.iter().map(|a| a.arg_type.as_str()).collect();
        format!("{}({}){}", self.name, args.join(","), self.returns.return_type)
    }
}

/// An ARC-4 method argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc32Arg {
    /// ABI type.
    #[serde(rename = "type")]
    pub arg_type: String,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// An ARC-4 method return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arc32Returns {
    /// ABI type.
    #[serde(rename = "type")]
    pub return_type: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl Arc32ApplicationSpec {
    /// Converts this specification into the ARC-56 model.
    pub fn to_arc56(&self) -> SpecResult<Arc56Contract> {
        let mut structs: BTreeMap<String, Vec<StructField>> = BTreeMap::new();
        let mut methods = Vec::with_capacity(self.contract.methods.len());

        for method in &self.contract.methods {
            let signature = method.signature();
            let hints = self.hints.get(&signature).cloned().unwrap_or_default();
            methods.push(convert_method(method, &signature, &hints, &mut structs)?);
        }

        Ok(Arc56Contract {
            name: self.contract.name.clone(),
            desc: self.contract.desc.clone(),
            arcs: Vec::new(),
            structs,
            methods,
            state: self.convert_state(),
            bare_actions: convert_call_config("bare_call_config", &self.bare_call_config)?,
            networks: self.contract.networks.clone(),
            events: None,
            source_info: None,
            source: self.source.clone(),
            byte_code: None,
            compiler_info: None,
            template_variables: None,
            scratch_variables: None,
        })
    }

    fn convert_state(&self) -> State {
        let mut state = State::default();
        if let Some(counts) = &self.state {
            state.schema = StateSchema {
                global: SchemaCounts {
                    ints: counts.global.num_uints,
                    bytes: counts.global.num_byte_slices,
                },
                local: SchemaCounts {
                    ints: counts.local.num_uints,
                    bytes: counts.local.num_byte_slices,
                },
            };
        }
        if let Some(schema) = &self.schema {
            state.keys.global = convert_declared(&schema.global.declared);
            state.keys.local = convert_declared(&schema.local.declared);
        }
        state
    }
}

fn convert_declared(declared: &BTreeMap<String, DeclaredValue>) -> BTreeMap<String, StorageKey> {
    declared
        .iter()
        .map(|(name, value)| {
            let value_type = if value.value_type == "uint64" {
                "AVMUint64"
            } else {
                "AVMBytes"
            };
            let key = StorageKey {
                key_type: "AVMString".to_string(),
                value_type: value_type.to_string(),
                key: base64::encode(value.key.as_bytes()),
                desc: value.descr.clone(),
            };
            (name.clone(), key)
        })
        .collect()
}

fn convert_call_config(
    context: &str,
    config: &BTreeMap<String, CallConfig>,
) -> SpecResult<Actions> {
    let mut actions = Actions::default();
    for (key, call_config) in config {
        let action = OnCompleteAction::from_arc32_key(key).ok_or_else(|| {
            SpecError::InvalidCallConfig(format!("unknown on-completion `{key}` in {context}"))
        })?;
        if matches!(call_config, CallConfig::Call | CallConfig::All) {
            actions.call.push(action);
        }
        if matches!(call_config, CallConfig::Create | CallConfig::All) {
            actions.create.push(action);
        }
    }
    actions.call.sort();
    actions.create.sort();
    Ok(actions)
}

fn convert_method(
    method: &Arc32Method,
    signature: &str,
    hints: &MethodHints,
    structs: &mut BTreeMap<String, Vec<StructField>>,
) -> SpecResult<Method> {
    for (target, hint) in &hints.structs {
        let known_target = target == OUTPUT_HINT_KEY
            || method.args.iter().any(|a| a.name.as_deref() == Some(target.as_str()));
        if !known_target {
            return Err(SpecError::inconsistent_hints(
                signature,
                format!("struct hint targets unknown argument `{target}`"),
            ));
        }
        register_struct_hint(signature, hint, structs)?;
    }

    let struct_for = |target: &str| hints.structs.get(target).map(|h| h.name.clone());

    let args = method
        .args
        .iter()
        .map(|arg| {
            let default_value = match arg.name.as_deref() {
                Some(name) => hints
                    .default_arguments
                    .get(name)
                    .map(|d| convert_default(signature, d))
                    .transpose()?,
                None => None,
            };
            Ok::<_, SpecError>(MethodArg {
                arg_type: arg.arg_type.clone(),
                struct_name: arg.name.as_deref().and_then(struct_for),
                name: arg.name.clone(),
                desc: arg.desc.clone(),
                default_value,
            })
        })
        .collect::<SpecResult<Vec<_>>>()?;

    let actions = if hints.call_config.is_empty() {
        Actions {
            create: Vec::new(),
            call: vec![OnCompleteAction::NoOp],
        }
    } else {
        convert_call_config(signature, &hints.call_config)?
    };

    Ok(Method {
        name: method.name.clone(),
        desc: method.desc.clone(),
        args,
        returns: MethodReturns {
            return_type: method.returns.return_type.clone(),
            struct_name: struct_for(OUTPUT_HINT_KEY),
            desc: method.returns.desc.clone(),
        },
        actions,
        readonly: hints.read_only,
        events: None,
        recommendations: None,
    })
}

fn register_struct_hint(
    signature: &str,
    hint: &StructHint,
    structs: &mut BTreeMap<String, Vec<StructField>>,
) -> SpecResult<()> {
    let fields: Vec<StructField> = hint
        .elements
        .iter()
        .map(|(name, field_type)| StructField {
            name: name.clone(),
            field_type: StructFieldType::Type(field_type.clone()),
        })
        .collect();

    match structs.get(&hint.name) {
        Some(existing) if *existing != fields => Err(SpecError::inconsistent_hints(
            signature,
            format!("struct `{}` is redefined with different elements", hint.name),
        )),
        Some(_) => Ok(()),
        None => {
            structs.insert(hint.name.clone(), fields);
            Ok(())
        }
    }
}

fn convert_default(signature: &str, default: &DefaultArgument) -> SpecResult<DefaultValue> {
    match default.source.as_str() {
        "global-state" | "local-state" => {
            let key = default.data.as_str().ok_or_else(|| {
                SpecError::inconsistent_hints(signature, "state default must name a key")
            })?;
            let source = if default.source == "global-state" {
                DefaultValueSource::Global
            } else {
                DefaultValueSource::Local
            };
            Ok(DefaultValue {
                data: Value::String(base64::encode(key.as_bytes())),
                value_type: Some("AVMString".to_string()),
                source,
            })
        }
        "abi-method" => {
            let method: Arc32Method =
                serde_json::from_value(default.data.clone()).map_err(|e| {
                    SpecError::inconsistent_hints(signature, format!("invalid default method: {e}"))
                })?;
            Ok(DefaultValue {
                data: Value::String(method.signature()),
                value_type: None,
                source: DefaultValueSource::Method,
            })
        }
        "constant" => {
            let (value_type, encoded) = encode_constant(signature, &default.data)?;
            Ok(DefaultValue {
                data: Value::String(base64::encode(encoded)),
                value_type: Some(value_type.to_string()),
                source: DefaultValueSource::Literal,
            })
        }
        other => Err(SpecError::inconsistent_hints(
            signature,
            format!("unknown default argument source `{other}`"),
        )),
    }
}

/// Encodes a constant default as AVM bytes: strings as their UTF-8 bytes,
/// integers as a big-endian uint64. The argument's ABI type does not matter.
fn encode_constant(signature: &str, data: &Value) -> SpecResult<(&'static str, Vec<u8>)> {
    match data {
        Value::String(s) => Ok(("AVMString", s.as_bytes().to_vec())),
        Value::Number(n) => {
            let value = n.as_u64().ok_or_else(|| {
                SpecError::inconsistent_hints(signature, format!("constant {n} is not a uint64"))
            })?;
            Ok(("AVMUint64", value.to_be_bytes().to_vec()))
        }
        _ => Err(SpecError::inconsistent_hints(
            signature,
            format!("constant {data} is neither a string nor an integer"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_WORLD: &str = r#"{
        "hints": {
            "hello(string)string": {
                "call_config": {"no_op": "CALL"}
            },
            "get_vector()(string,string)": {
                "structs": {
                    "output": {"name": "Vector", "elements": [["x", "string"], ["y", "string"]]}
                },
                "read_only": true,
                "call_config": {"no_op": "CALL", "opt_in": "ALL"}
            },
            "set_vector((string,string),uint64)void": {
                "structs": {
                    "v": {"name": "Vector", "elements": [["x", "string"], ["y", "string"]]}
                },
                "default_arguments": {
                    "n": {"source": "constant", "data": 7}
                },
                "call_config": {"no_op": "CALL"}
            }
        },
        "source": {"approval": "I3ByYWdtYSB2ZXJzaW9uIDg=", "clear": "I3ByYWdtYSB2ZXJzaW9uIDg="},
        "state": {
            "global": {"num_uints": 1, "num_byte_slices": 1},
            "local": {"num_uints": 0, "num_byte_slices": 0}
        },
        "schema": {
            "global": {
                "declared": {
                    "counter": {"type": "uint64", "key": "counter", "descr": "A counter"},
                    "greeting": {"type": "bytes", "key": "greeting"}
                },
                "reserved": {}
            },
            "local": {"declared": {}, "reserved": {}}
        },
        "contract": {
            "name": "HelloWorld",
            "methods": [
                {"name": "hello", "args": [{"type": "string", "name": "name"}], "returns": {"type": "string"}},
                {"name": "get_vector", "args": [], "returns": {"type": "(string,string)"}},
                {
                    "name": "set_vector",
                    "args": [{"type": "(string,string)", "name": "v"}, {"type": "uint64", "name": "n"}],
                    "returns": {"type": "void"}
                }
            ],
            "networks": {}
        },
        "bare_call_config": {"no_op": "CREATE", "delete_application": "CALL"}
    }"#;

    fn hello_world() -> Arc56Contract {
        let spec: Arc32ApplicationSpec = serde_json::from_str(HELLO_WORLD).unwrap();
        spec.to_arc56().unwrap()
    }

    #[test]
    fn test_methods_and_actions() {
        let contract = hello_world();
        assert_eq!(contract.name, "HelloWorld");
        assert_eq!(contract.methods.len(), 3);

        let get_vector = &contract.methods[1];
        assert_eq!(
            get_vector.actions.call,
            vec![OnCompleteAction::NoOp, OnCompleteAction::OptIn]
        );
        assert_eq!(get_vector.actions.create, vec![OnCompleteAction::OptIn]);
        assert_eq!(get_vector.readonly, Some(true));
        assert_eq!(get_vector.returns.struct_name.as_deref(), Some("Vector"));

        assert_eq!(contract.bare_actions.create, vec![OnCompleteAction::NoOp]);
        assert_eq!(
            contract.bare_actions.call,
            vec![OnCompleteAction::DeleteApplication]
        );
    }

    #[test]
    fn test_struct_hints_are_shared() {
        let contract = hello_world();
        assert_eq!(contract.structs.len(), 1);
        let vector = &contract.structs["Vector"];
        assert_eq!(vector[0].name, "x");
        assert_eq!(vector[1].field_type, StructFieldType::Type("string".to_string()));
        assert_eq!(contract.methods[2].args[0].struct_name.as_deref(), Some("Vector"));
        assert_eq!(contract.methods[2].args[1].struct_name, None);
    }

    #[test]
    fn test_state_keys() {
        let contract = hello_world();
        let counter = &contract.state.keys.global["counter"];
        assert_eq!(counter.value_type, "AVMUint64");
        assert_eq!(counter.key, "Y291bnRlcg==");
        assert_eq!(counter.desc.as_deref(), Some("A counter"));
        assert_eq!(contract.state.keys.global["greeting"].value_type, "AVMBytes");
        assert_eq!(contract.state.schema.global.ints, 1);
    }

    #[test]
    fn test_constant_default() {
        let contract = hello_world();
        let default = contract.methods[2].args[1].default_value.as_ref().unwrap();
        assert_eq!(default.source, DefaultValueSource::Literal);
        assert_eq!(default.value_type.as_deref(), Some("AVMUint64"));
        // 7 as a big-endian uint64
        assert_eq!(default.data, Value::String("AAAAAAAAAAc=".to_string()));
    }

    #[test]
    fn test_missing_hint_defaults_to_no_op_call() {
        let mut spec: Arc32ApplicationSpec = serde_json::from_str(HELLO_WORLD).unwrap();
        spec.hints.remove("hello(string)string");
        let contract = spec.to_arc56().unwrap();
        assert_eq!(contract.methods[0].actions.call, vec![OnCompleteAction::NoOp]);
        assert!(contract.methods[0].actions.create.is_empty());
    }

    #[test]
    fn test_conflicting_struct_hints_rejected() {
        let mut spec: Arc32ApplicationSpec = serde_json::from_str(HELLO_WORLD).unwrap();
        let hint = spec
            .hints
            .get_mut("set_vector((string,string),uint64)void")
            .unwrap();
        hint.structs.get_mut("v").unwrap().elements[1].1 = "uint64".to_string();

        let err = spec.to_arc56().unwrap_err();
        assert!(matches!(err, SpecError::InconsistentHints { .. }));
    }

    #[test]
    fn test_unknown_call_config_rejected() {
        let mut spec: Arc32ApplicationSpec = serde_json::from_str(HELLO_WORLD).unwrap();
        spec.bare_call_config
            .insert("launch".to_string(), CallConfig::Call);
        let err = spec.to_arc56().unwrap_err();
        assert!(matches!(err, SpecError::InvalidCallConfig(_)));
    }

    #[test]
    fn test_encode_constant() {
        let sig = "m(uint8)void";
        assert_eq!(
            encode_constant(sig, &serde_json::json!(5)).unwrap(),
            ("AVMUint64", vec![0, 0, 0, 0, 0, 0, 0, 5])
        );
        assert_eq!(
            encode_constant(sig, &serde_json::json!("hi")).unwrap(),
            ("AVMString", b"hi".to_vec())
        );
        assert!(encode_constant(sig, &serde_json::json!(-1)).is_err());
        assert!(encode_constant(sig, &serde_json::json!(true)).is_err());
    }

    #[test]
    fn test_constant_defaults_ignore_argument_type() {
        let mut spec: Arc32ApplicationSpec = serde_json::from_str(HELLO_WORLD).unwrap();
        let greet = serde_json::json!({
            "name": "greet",
            "args": [{"type": "byte[]", "name": "prefix"}, {"type": "asset", "name": "token"}],
            "returns": {"type": "void"}
        });
        spec.contract.methods.push(serde_json::from_value(greet).unwrap());
        spec.hints.insert(
            "greet(byte[],asset)void".to_string(),
            serde_json::from_value(serde_json::json!({
                "default_arguments": {
                    "prefix": {"source": "constant", "data": "hi"},
                    "token": {"source": "constant", "data": 1234}
                },
                "call_config": {"no_op": "CALL"}
            }))
            .unwrap(),
        );

        let contract = spec.to_arc56().unwrap();
        let greet = contract.methods.iter().find(|m| m.name == "greet").unwrap();
        let prefix = greet.args[0].default_value.as_ref().unwrap();
        assert_eq!(prefix.value_type.as_deref(), Some("AVMString"));
        assert_eq!(prefix.data, Value::String("aGk=".to_string()));
        let token = greet.args[1].default_value.as_ref().unwrap();
        assert_eq!(token.value_type.as_deref(), Some("AVMUint64"));
        // 1234 as a big-endian uint64
        assert_eq!(token.data, Value::String("AAAAAAAABNI=".to_string()));
    }
}
