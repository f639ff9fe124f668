//! Per-invocation generator context.
//!
//! [`GeneratorContext::new`] performs every naming and typing decision up
//! front. Section generators only read from it.

use crate::config::{GenerationMode, GeneratorConfig};
use crate::error::GeneratorResult;
use crate::naming::{sanitizer_for, Sanitizer, SymbolPool};
use crate::spec_model::{ContractMethods, SpecModel, StateModel, StructTable};
use crate::type_mapping::TypeMapper;
use algokit_app_spec::arc56::COMPILED_PROGRAM_KEYS;
use algokit_app_spec::{AppSpec, Arc56Contract, OnCompleteAction};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Module-level names introduced by the fixed scaffolding of a generated client.
pub const RESERVED_MODULE_NAMES: &[&str] = &[
    // imports
    "dataclasses",
    "typing",
    "decimal",
    "algosdk",
    "algokit_utils",
    "OnComplete",
    "TransactionSigner",
    "SourceMap",
    "Transaction",
    "SimulateTraceConfig",
    "_AlgoKitAlgorandClient",
    // scaffolding
    "APP_SPEC",
    "_APP_SPEC_JSON",
    "_parse_abi_args",
    "_init_dataclass",
    "GlobalStateValue",
    "LocalStateValue",
    "BoxStateValue",
    "_GlobalState",
    "_LocalState",
    "_BoxState",
    "_MapState",
    "_AppClientStateMethodsProtocol",
    "_KeyType",
    "_ValueType",
    // builtins
    "Any",
    "bool",
    "bytes",
    "dict",
    "int",
    "list",
    "object",
    "property",
    "str",
    "super",
    "tuple",
];

/// Method names the generated client and builder classes define themselves.
pub const RESERVED_CLIENT_METHOD_NAMES: &[&str] = &[
    "add_transaction",
    "algorand",
    "app_address",
    "app_client",
    "app_id",
    "app_name",
    "app_spec",
    "bare",
    "call",
    "clear_state",
    "client",
    "clone",
    "close_out",
    "composer",
    "create_transaction",
    "decode_return_value",
    "delete",
    "from_creator_and_name",
    "from_network",
    "new_group",
    "opt_in",
    "params",
    "send",
    "simulate",
    "state",
    "update",
];

/// On-completion actions that get their own namespace class.
pub const OPERATIONS: [Operation; 4] = [
    Operation {
        action: OnCompleteAction::OptIn,
        attribute: "opt_in",
        class_suffix: "OptIn",
    },
    Operation {
        action: OnCompleteAction::CloseOut,
        attribute: "close_out",
        class_suffix: "CloseOut",
    },
    Operation {
        action: OnCompleteAction::UpdateApplication,
        attribute: "update",
        class_suffix: "Update",
    },
    Operation {
        action: OnCompleteAction::DeleteApplication,
        attribute: "delete",
        class_suffix: "Delete",
    },
];

/// A namespaced on-completion action, e.g. `client.send.opt_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// The action.
    pub action: OnCompleteAction,
    /// Attribute the namespace is exposed under.
    pub attribute: &'static str,
    /// Suffix of the namespace class name.
    pub class_suffix: &'static str,
}

/// Names of every generated class derived from the contract name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNames {
    /// Sanitized contract name every class name starts with.
    pub prefix: String,
    /// `{P}Client`
    pub client: String,
    /// `{P}Params`
    pub params: String,
    /// `{P}CreateTransactionParams`
    pub create_transaction: String,
    /// `{P}Send`
    pub send: String,
    /// `{P}State`
    pub state: String,
    /// `{P}Factory`
    pub factory: String,
    /// `{P}FactoryParams`
    pub factory_params: String,
    /// `{P}FactoryCreateParams`
    pub factory_create_params: String,
    /// `{P}FactoryUpdateParams`
    pub factory_update_params: String,
    /// `{P}FactoryDeleteParams`
    pub factory_delete_params: String,
    /// `{P}FactoryCreateTransaction`
    pub factory_create_transaction: String,
    /// `{P}FactoryCreateTransactionCreate`
    pub factory_create_transaction_create: String,
    /// `{P}FactorySend`
    pub factory_send: String,
    /// `{P}FactorySendCreate`
    pub factory_send_create: String,
    /// `{P}MethodCallCreateParams`
    pub method_call_create_params: String,
    /// `{P}BareCallCreateParams`
    pub bare_call_create_params: String,
    /// `{P}MethodCallUpdateParams`
    pub method_call_update_params: String,
    /// `{P}BareCallUpdateParams`
    pub bare_call_update_params: String,
    /// `{P}MethodCallDeleteParams`
    pub method_call_delete_params: String,
    /// `{P}BareCallDeleteParams`
    pub bare_call_delete_params: String,
    /// `{P}Composer`
    pub composer: String,
    /// Namespace classes of the params builder, e.g. `_{P}OptIn`.
    pub params_operations: BTreeMap<OnCompleteAction, String>,
    /// Namespace classes of the transaction builder, e.g. `_{P}OptInTransaction`.
    pub transaction_operations: BTreeMap<OnCompleteAction, String>,
    /// Namespace classes of the sender, e.g. `_{P}OptInSend`.
    pub send_operations: BTreeMap<OnCompleteAction, String>,
    /// Namespace classes of the composer, e.g. `_{P}OptInComposer`.
    pub composer_operations: BTreeMap<OnCompleteAction, String>,
}

impl ClassNames {
    fn allocate(contract_name: &str, sanitizer: &dyn Sanitizer, pool: &mut SymbolPool) -> Self {
        let prefix = pool.allocate(&sanitizer.type_name(contract_name));
        let mut derived = |suffix: &str| pool.allocate(&format!("{prefix}{suffix}"));

        let client = derived("Client");
        let params = derived("Params");
        let create_transaction = derived("CreateTransactionParams");
        let send = derived("Send");
        let state = derived("State");
        let factory = derived("Factory");
        let factory_params = derived("FactoryParams");
        let factory_create_params = derived("FactoryCreateParams");
        let factory_update_params = derived("FactoryUpdateParams");
        let factory_delete_params = derived("FactoryDeleteParams");
        let factory_create_transaction = derived("FactoryCreateTransaction");
        let factory_create_transaction_create = derived("FactoryCreateTransactionCreate");
        let factory_send = derived("FactorySend");
        let factory_send_create = derived("FactorySendCreate");
        let method_call_create_params = derived("MethodCallCreateParams");
        let bare_call_create_params = derived("BareCallCreateParams");
        let method_call_update_params = derived("MethodCallUpdateParams");
        let bare_call_update_params = derived("BareCallUpdateParams");
        let method_call_delete_params = derived("MethodCallDeleteParams");
        let bare_call_delete_params = derived("BareCallDeleteParams");
        let composer = derived("Composer");

        let mut operations = |kind: &str| -> BTreeMap<OnCompleteAction, String> {
            OPERATIONS
                .iter()
                .map(|op| {
                    let name = pool.allocate(&format!("_{prefix}{}{kind}", op.class_suffix));
                    (op.action, name)
                })
                .collect()
        };
        let params_operations = operations("");
        let transaction_operations = operations("Transaction");
        let send_operations = operations("Send");
        let composer_operations = operations("Composer");

        Self {
            prefix,
            client,
            params,
            create_transaction,
            send,
            state,
            factory,
            factory_params,
            factory_create_params,
            factory_update_params,
            factory_delete_params,
            factory_create_transaction,
            factory_create_transaction_create,
            factory_send,
            factory_send_create,
            method_call_create_params,
            bare_call_create_params,
            method_call_update_params,
            bare_call_update_params,
            method_call_delete_params,
            bare_call_delete_params,
            composer,
            params_operations,
            transaction_operations,
            send_operations,
            composer_operations,
        }
    }
}

/// Removes compiled program metadata, keeping only source info entries that
/// carry an error message.
pub fn prune_compiled_metadata(spec: &mut Value) {
    let Some(object) = spec.as_object_mut() else {
        return;
    };
    let kept: Map<String, Value> = std::mem::take(object)
        .into_iter()
        .filter(|(key, _)| !COMPILED_PROGRAM_KEYS.contains(&key.as_str()))
        .collect();
    *object = kept;

    let Some(source_info) = object.get_mut("sourceInfo").and_then(Value::as_object_mut) else {
        return;
    };
    for program in ["approval", "clear"] {
        let entries = source_info
            .get_mut(program)
            .and_then(|p| p.get_mut("sourceInfo"))
            .and_then(Value::as_array_mut);
        if let Some(entries) = entries {
            entries.retain(|entry| entry.get("errorMessage").is_some());
        }
    }
}

/// Everything the section generators need, resolved once.
#[derive(Debug)]
pub struct GeneratorContext {
    config: GeneratorConfig,
    contract: Arc56Contract,
    app_spec_json: String,
    sanitizer: Box<dyn Sanitizer>,
    names: ClassNames,
    model: SpecModel,
    module_pool: SymbolPool,
    client_pool: SymbolPool,
}

impl GeneratorContext {
    /// Builds the context for one generation run.
    ///
    /// `spec` may be ARC-32 or ARC-56; it is copied and normalized to ARC-56
    /// (and pruned in minimal mode) before anything is derived from it.
    pub fn new(spec: &Value, config: GeneratorConfig) -> GeneratorResult<Self> {
        let mut normalized = AppSpec::from_value(spec.clone())?.into_arc56_value()?;
        if config.mode == GenerationMode::Minimal {
            prune_compiled_metadata(&mut normalized);
        }
        let contract: Arc56Contract = serde_json::from_value(normalized.clone())?;
        let app_spec_json = serde_json::to_string(&normalized)?;

        let sanitizer = sanitizer_for(config.naming);
        let mut module_pool = SymbolPool::with_reserved(RESERVED_MODULE_NAMES.iter().copied());
        let mut client_pool =
            SymbolPool::with_reserved(RESERVED_CLIENT_METHOD_NAMES.iter().copied());

        let names = ClassNames::allocate(&contract.name, sanitizer.as_ref(), &mut module_pool);
        let model = SpecModel::build(
            &contract,
            sanitizer.as_ref(),
            &mut module_pool,
            &mut client_pool,
        )?;

        debug!(
            contract = %contract.name,
            mode = %config.mode,
            class_prefix = %names.prefix,
            structs = model.structs.len(),
            module_names = module_pool.len(),
            client_methods = client_pool.len(),
            "Built generator context"
        );

        Ok(Self {
            config,
            contract,
            app_spec_json,
            sanitizer,
            names,
            model,
            module_pool,
            client_pool,
        })
    }

    /// Generator configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Whether full-mode sections are emitted.
    pub fn is_full(&self) -> bool {
        self.config.mode.is_full()
    }

    /// The normalized contract.
    pub fn contract(&self) -> &Arc56Contract {
        &self.contract
    }

    /// Compact JSON of the normalized (and possibly pruned) spec.
    pub fn app_spec_json(&self) -> &str {
        &self.app_spec_json
    }

    /// Identifier policy.
    pub fn sanitizer(&self) -> &dyn Sanitizer {
        self.sanitizer.as_ref()
    }

    /// Generated class names.
    pub fn names(&self) -> &ClassNames {
        &self.names
    }

    /// Deduplicated structs.
    pub fn structs(&self) -> &StructTable {
        &self.model.structs
    }

    /// Classified methods.
    pub fn methods(&self) -> &ContractMethods {
        &self.model.methods
    }

    /// Storage model.
    pub fn state(&self) -> &StateModel {
        &self.model.state
    }

    /// Type mapper resolving this contract's structs.
    pub fn type_mapper(&self) -> TypeMapper<'_> {
        TypeMapper::new(self.model.structs.names())
    }

    /// Module-level names claimed during construction.
    pub fn module_pool(&self) -> &SymbolPool {
        &self.module_pool
    }

    /// Client method names claimed during construction.
    pub fn client_pool(&self) -> &SymbolPool {
        &self.client_pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingPolicy;
    use serde_json::json;

    fn spec() -> Value {
        json!({
            "name": "hello_world",
            "structs": {"Client": [{"name": "a", "type": "uint64"}]},
            "methods": [{
                "name": "hello",
                "args": [{"type": "string", "name": "name"}],
                "returns": {"type": "string"},
                "actions": {"create": [], "call": ["NoOp"]}
            }],
            "byteCode": {"approval": "AA==", "clear": "AA=="},
            "source": {"approval": "AA==", "clear": "AA=="},
            "compilerInfo": {"compiler": "puya"},
            "sourceInfo": {
                "approval": {
                    "sourceInfo": [
                        {"pc": [1], "errorMessage": "assert failed"},
                        {"pc": [2], "teal": 4}
                    ],
                    "pcOffsetMethod": "none"
                },
                "clear": {"sourceInfo": [], "pcOffsetMethod": "none"}
            }
        })
    }

    #[test]
    fn test_class_names() {
        let ctx = GeneratorContext::new(&spec(), GeneratorConfig::default()).unwrap();
        let names = ctx.names();
        assert_eq!(names.prefix, "HelloWorld");
        assert_eq!(names.client, "HelloWorldClient");
        assert_eq!(names.composer, "HelloWorldComposer");
        assert_eq!(names.params_operations[&OnCompleteAction::OptIn], "_HelloWorldOptIn");
        assert_eq!(
            names.send_operations[&OnCompleteAction::DeleteApplication],
            "_HelloWorldDeleteSend"
        );
        assert!(ctx.module_pool().contains("HelloWorldFactory"));
    }

    #[test]
    fn test_struct_names_avoid_scaffolding() {
        let ctx = GeneratorContext::new(&spec(), GeneratorConfig::default()).unwrap();
        let names: Vec<_> = ctx.structs().iter().map(|s| s.type_name.as_str()).collect();
        assert_eq!(names, ["Client"]);

        let mut clashing = spec();
        clashing["structs"] = json!({"APP_SPEC": [{"name": "a", "type": "uint64"}]});
        let ctx = GeneratorContext::new(&clashing, GeneratorConfig::default().with_naming(NamingPolicy::Preserve)).unwrap();
        let names: Vec<_> = ctx.structs().iter().map(|s| s.type_name.as_str()).collect();
        assert_eq!(names, ["APP_SPEC1"]);
    }

    #[test]
    fn test_minimal_prunes_metadata() {
        let mut value = spec();
        prune_compiled_metadata(&mut value);
        assert!(value.get("byteCode").is_none());
        assert!(value.get("source").is_none());
        assert!(value.get("compilerInfo").is_none());
        let entries = value["sourceInfo"]["approval"]["sourceInfo"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["errorMessage"], "assert failed");
    }

    #[test]
    fn test_full_mode_keeps_spec() {
        let ctx = GeneratorContext::new(&spec(), GeneratorConfig::default()).unwrap();
        assert!(ctx.app_spec_json().contains("byteCode"));
        assert!(ctx.app_spec_json().starts_with("{\"name\":\"hello_world\""));

        let minimal = GeneratorConfig::default().with_mode(GenerationMode::Minimal);
        let ctx = GeneratorContext::new(&spec(), minimal).unwrap();
        assert!(!ctx.app_spec_json().contains("byteCode"));
        assert!(!ctx.is_full());
    }

    #[test]
    fn test_client_methods_avoid_reserved_names() {
        let mut value = spec();
        value["methods"][0]["name"] = json!("clone");
        let ctx = GeneratorContext::new(&value, GeneratorConfig::default()).unwrap();
        assert_eq!(ctx.methods().abi_methods()[0].client_method_name, "clone1");
    }
}
