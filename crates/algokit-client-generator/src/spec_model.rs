//! Normalized view of a contract: struct table, classified methods and state.
//!
//! Everything here is resolved once, while the [`crate::GeneratorContext`] is
//! built. Struct hints become [`ValueType::Struct`] references into a
//! deduplicated [`StructTable`], and every method is filed under the
//! on-completion actions it can be called with.

use crate::error::{GeneratorError, GeneratorResult};
use crate::naming::{Sanitizer, SymbolPool};
use crate::type_mapping::{StructKey, TypeMapper, TypePosition, ValueType};
use algokit_app_spec::arc56::{Method, StorageKey, StorageMap};
use algokit_app_spec::{AbiType, Arc56Contract, OnCompleteAction, StructField, StructFieldType};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use tracing::{debug, warn};

/// Field of a generated struct dataclass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiStructField {
    /// Field name as declared.
    pub name: String,
    /// Python attribute name.
    pub identifier: String,
    /// Resolved field type.
    pub value_type: ValueType,
    /// Python type annotation.
    pub python_type: String,
}

/// A deduplicated struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiStruct {
    /// Identity of the struct.
    pub key: StructKey,
    /// Generated dataclass name.
    pub type_name: String,
    /// Ordered fields.
    pub fields: Vec<AbiStructField>,
    /// The ABI tuple the struct encodes as, when every field is ABI encodable.
    pub abi_tuple: Option<AbiType>,
}

/// Structs in registration order; nested structs precede their parents.
#[derive(Debug, Clone, Default)]
pub struct StructTable {
    structs: Vec<AbiStruct>,
    index: BTreeMap<StructKey, usize>,
    names: BTreeMap<StructKey, String>,
}

impl StructTable {
    /// Looks up a struct.
    pub fn get(&self, key: &StructKey) -> Option<&AbiStruct> {
        self.index.get(key).map(|&i| &self.structs[i])
    }

    /// Iterates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AbiStruct> {
        self.structs.iter()
    }

    /// Number of structs.
    pub fn len(&self) -> usize {
        self.structs.len()
    }

    /// Returns true if no struct is registered.
    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    /// Generated names keyed by struct identity.
    pub fn names(&self) -> &BTreeMap<StructKey, String> {
        &self.names
    }

    fn insert(&mut self, s: AbiStruct) {
        self.index.insert(s.key.clone(), self.structs.len());
        self.names.insert(s.key.clone(), s.type_name.clone());
        self.structs.push(s);
    }

    /// Adds every struct reachable from `ty` to `out`.
    fn collect_keys(&self, ty: &ValueType, out: &mut BTreeSet<StructKey>) {
        if let ValueType::Struct(key) = ty {
            if out.insert(key.clone()) {
                if let Some(s) = self.get(key) {
                    for field in &s.fields {
                        self.collect_keys(&field.value_type, out);
                    }
                }
            }
        }
    }
}

/// Registers structs on demand while the contract is walked.
struct StructResolver<'a> {
    declared: &'a BTreeMap<String, Vec<StructField>>,
    sanitizer: &'a dyn Sanitizer,
    table: StructTable,
    in_progress: Vec<StructKey>,
}

impl<'a> StructResolver<'a> {
    fn is_declared(&self, name: &str) -> bool {
        self.declared.contains_key(name)
    }

    /// Resolves a type string, registering any struct it names.
    fn resolve(
        &mut self,
        type_str: &str,
        location: &str,
        pool: &mut SymbolPool,
    ) -> GeneratorResult<ValueType> {
        let declared = self.declared;
        let ty = ValueType::parse(type_str, |n| declared.contains_key(n), location)?;
        if let ValueType::Struct(key) = &ty {
            self.register_named(key.as_str(), pool)?;
        }
        Ok(ty)
    }

    fn register_named(&mut self, name: &str, pool: &mut SymbolPool) -> GeneratorResult<StructKey> {
        let key = StructKey::named(name);
        if self.table.get(&key).is_some() {
            return Ok(key);
        }
        let declared = self.declared;
        let fields = declared
            .get(name)
            .ok_or_else(|| GeneratorError::UnknownStruct(name.to_string()))?;
        if self.in_progress.contains(&key) {
            return Err(GeneratorError::inconsistent_struct(
                name,
                "struct contains itself",
            ));
        }

        self.in_progress.push(key.clone());
        let resolved = self.resolve_fields(name, fields, pool);
        self.in_progress.pop();
        let resolved = resolved?;

        let type_name = pool.allocate(&self.sanitizer.type_name(name));
        self.finish(key.clone(), type_name, resolved)?;
        Ok(key)
    }

    fn register_anonymous(
        &mut self,
        parent: &str,
        fields: &[StructField],
        pool: &mut SymbolPool,
    ) -> GeneratorResult<StructKey> {
        let resolved = self.resolve_fields(parent, fields, pool)?;
        let key = StructKey::anonymous(
            resolved
                .iter()
                .map(|(name, ty)| (name.as_str(), structural_type_key(ty))),
        );
        if self.table.get(&key).is_some() {
            return Ok(key);
        }
        let bare = key.as_str().trim_start_matches('{').trim_end_matches('}');
        let type_name = pool.allocate(&self.sanitizer.type_name(bare));
        self.finish(key.clone(), type_name, resolved)?;
        Ok(key)
    }

    fn resolve_fields(
        &mut self,
        parent: &str,
        fields: &[StructField],
        pool: &mut SymbolPool,
    ) -> GeneratorResult<Vec<(String, ValueType)>> {
        fields
            .iter()
            .map(|field| {
                let ty = match &field.field_type {
                    StructFieldType::Type(type_str) => {
                        let location = format!("struct `{parent}` field `{}`", field.name);
                        self.resolve(type_str, &location, pool)?
                    }
                    StructFieldType::Fields(inner) => {
                        ValueType::Struct(self.register_anonymous(parent, inner, pool)?)
                    }
                };
                Ok::<_, GeneratorError>((field.name.clone(), ty))
            })
            .collect()
    }

    fn finish(
        &mut self,
        key: StructKey,
        type_name: String,
        resolved: Vec<(String, ValueType)>,
    ) -> GeneratorResult<()> {
        let mapper = TypeMapper::new(self.table.names());
        let mut identifiers = SymbolPool::new();
        let mut fields = Vec::with_capacity(resolved.len());
        let mut tuple = Some(Vec::with_capacity(resolved.len()));

        for (name, value_type) in resolved {
            let python_type = mapper.map(&value_type, TypePosition::Output)?;
            tuple = match (tuple, flatten_abi(&value_type, &self.table)) {
                (Some(mut items), Some(abi)) => {
                    items.push(abi);
                    Some(items)
                }
                _ => None,
            };
            fields.push(AbiStructField {
                identifier: identifiers.allocate(&self.sanitizer.property_name(&name)),
                name,
                value_type,
                python_type,
            });
        }

        self.table.insert(AbiStruct {
            key,
            type_name,
            fields,
            abi_tuple: tuple.map(AbiType::Tuple),
        });
        Ok(())
    }
}

/// The string a resolved type contributes to an anonymous struct key.
fn structural_type_key(ty: &ValueType) -> String {
    match ty {
        ValueType::Abi(abi) => abi.to_string(),
        ValueType::Struct(key) => key.to_string(),
        other => format!("{other:?}"),
    }
}

/// The ABI type a value encodes as, expanding structs into tuples.
fn flatten_abi(ty: &ValueType, table: &StructTable) -> Option<AbiType> {
    match ty {
        ValueType::Abi(abi) => Some(abi.clone()),
        ValueType::Struct(key) => table.get(key).and_then(|s| s.abi_tuple.clone()),
        _ => None,
    }
}

/// Whether a classified method is a call on an existing app or a create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallConfig {
    /// Called on an existing application.
    Call,
    /// Creates the application.
    Create,
}

/// An argument of an ABI method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodArgument {
    /// Argument name as declared, or `argN` when unnamed.
    pub name: String,
    /// Field name in the generated `Args` dataclass.
    pub identifier: String,
    /// Type string as declared.
    pub type_str: String,
    /// Resolved type.
    pub value_type: ValueType,
    /// Python type annotation in input position.
    pub python_type: String,
    /// Whether the spec provides a default value.
    pub has_default: bool,
    /// Whether the argument can be omitted; only trailing defaults are optional.
    pub optional: bool,
    /// Description.
    pub desc: Option<String>,
}

impl MethodArgument {
    /// Python annotation; omittable arguments also accept `None`.
    pub fn annotation(&self) -> String {
        if self.optional {
            format!("{} | None", self.python_type)
        } else {
            self.python_type.clone()
        }
    }
}

/// An ABI method with every derived name and type precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiContractMethod {
    /// Method name as declared.
    pub name: String,
    /// Full signature, e.g. `add(uint64,uint64)uint64`.
    pub signature: String,
    /// Signature as a Python string literal.
    pub signature_literal: String,
    /// Name of the generated client method.
    pub client_method_name: String,
    /// Name of the generated `Args` dataclass, absent for methods without arguments.
    pub args_class_name: Option<String>,
    /// Ordered arguments.
    pub args: Vec<MethodArgument>,
    /// Resolved return type.
    pub returns: ValueType,
    /// Python return annotation.
    pub return_type: String,
    /// Structs reachable from the arguments and the return value.
    pub structs: BTreeSet<StructKey>,
    /// Whether the method is read-only.
    pub readonly: bool,
    /// Method description.
    pub desc: Option<String>,
    /// Return value description.
    pub returns_desc: Option<String>,
}

impl AbiContractMethod {
    /// Returns the struct the method returns, if any.
    pub fn return_struct(&self) -> Option<&StructKey> {
        match &self.returns {
            ValueType::Struct(key) => Some(key),
            _ => None,
        }
    }

    /// Python type of the positional argument tuple, e.g. `tuple[int, str]`.
    pub fn args_tuple_type(&self) -> String {
        let items: Vec<String> = self.args.iter().map(MethodArgument::annotation).collect();
        if items.is_empty() {
            "tuple[()]".to_string()
        } else {
            format!("tuple[{}]", items.join(", "))
        }
    }

    /// Whether every argument can be omitted.
    pub fn args_optional(&self) -> bool {
        !self.args.is_empty() && self.args.iter().all(|a| a.optional)
    }
}

/// One callable surface of the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractMethod {
    /// The ABI method, absent for bare calls.
    pub abi: Option<Rc<AbiContractMethod>>,
    /// On-completion actions this entry covers.
    pub actions: Vec<OnCompleteAction>,
    /// Call or create.
    pub call_config: CallConfig,
}

/// Contract methods bucketed by on-completion action.
#[derive(Debug, Clone, Default)]
pub struct ContractMethods {
    abi_methods: Vec<Rc<AbiContractMethod>>,
    calls: BTreeMap<OnCompleteAction, Vec<ContractMethod>>,
    creates: Vec<ContractMethod>,
}

impl ContractMethods {
    /// Every ABI method in declaration order.
    pub fn abi_methods(&self) -> &[Rc<AbiContractMethod>] {
        &self.abi_methods
    }

    /// Call entries for `action`, ABI methods first, bare call last.
    pub fn calls(&self, action: OnCompleteAction) -> &[ContractMethod] {
        self.calls.get(&action).map_or(&[], Vec::as_slice)
    }

    /// ABI methods callable with `action`.
    pub fn abi_calls(&self, action: OnCompleteAction) -> impl Iterator<Item = &AbiContractMethod> {
        self.calls(action).iter().filter_map(|m| m.abi.as_deref())
    }

    /// Whether a bare call with `action` is allowed.
    pub fn has_bare_call(&self, action: OnCompleteAction) -> bool {
        self.calls(action).iter().any(|m| m.abi.is_none())
    }

    /// Create entries, ABI methods first.
    pub fn creates(&self) -> &[ContractMethod] {
        &self.creates
    }

    /// ABI create entries with their allowed actions.
    pub fn abi_creates(&self) -> impl Iterator<Item = (&AbiContractMethod, &[OnCompleteAction])> {
        self.creates
            .iter()
            .filter_map(|m| m.abi.as_deref().map(|abi| (abi, m.actions.as_slice())))
    }

    /// The bare create entry, if bare creation is allowed.
    pub fn bare_create(&self) -> Option<&ContractMethod> {
        self.creates.iter().find(|m| m.abi.is_none())
    }

    /// Whether any entry exists for `action`, ABI or bare.
    pub fn has_calls(&self, action: OnCompleteAction) -> bool {
        !self.calls(action).is_empty()
    }

    fn file(&mut self, abi: Option<Rc<AbiContractMethod>>, create: &[OnCompleteAction], call: &[OnCompleteAction]) {
        for &action in call {
            if action == OnCompleteAction::ClearState {
                warn!(
                    method = abi.as_ref().map_or("<bare>", |m| m.signature.as_str()),
                    "Ignoring ClearState call action; clear state is always a bare call"
                );
                continue;
            }
            self.calls.entry(action).or_default().push(ContractMethod {
                abi: abi.clone(),
                actions: vec![action],
                call_config: CallConfig::Call,
            });
        }
        let create: Vec<OnCompleteAction> = create
            .iter()
            .copied()
            .filter(|a| a.allowed_on_create())
            .collect();
        if !create.is_empty() {
            self.creates.push(ContractMethod {
                abi,
                actions: create,
                call_config: CallConfig::Create,
            });
        }
    }
}

/// A single-value storage key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateKey {
    /// Key name as declared.
    pub name: String,
    /// Python property name.
    pub property: String,
    /// Base64 encoded key bytes.
    pub key: String,
    /// Resolved value type.
    pub value_type: ValueType,
    /// Python type of the stored value.
    pub python_type: String,
    /// Description.
    pub desc: Option<String>,
}

/// A key-prefixed storage map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMap {
    /// Map name as declared.
    pub name: String,
    /// Python property name.
    pub property: String,
    /// Resolved key type.
    pub key_type: ValueType,
    /// Python type of map keys.
    pub key_python_type: String,
    /// Resolved value type.
    pub value_type: ValueType,
    /// Python type of map values.
    pub value_python_type: String,
    /// Description.
    pub desc: Option<String>,
}

/// Keys and maps of one storage scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageScope {
    /// Single-value keys.
    pub keys: Vec<StateKey>,
    /// Maps.
    pub maps: Vec<StateMap>,
}

impl StorageScope {
    /// Returns true if the scope declares nothing.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.maps.is_empty()
    }
}

/// Storage of the contract, per scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateModel {
    /// Global state.
    pub global: StorageScope,
    /// Local state.
    pub local: StorageScope,
    /// Boxes.
    pub boxes: StorageScope,
}

impl StateModel {
    /// Returns true if no storage is declared.
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.local.is_empty() && self.boxes.is_empty()
    }
}

/// Identifiers used by generated state accessor classes.
const STATE_ACCESSOR_MEMBERS: &[&str] = &[
    "app_client",
    "address",
    "get_all",
    "_state_accessor",
    "_struct_classes",
];

/// Identifiers used by generated `Args` dataclasses.
const ARGS_CLASS_MEMBERS: &[&str] = &["abi_method_signature"];

/// Struct table, classified methods and state of one contract.
#[derive(Debug, Clone)]
pub struct SpecModel {
    /// Deduplicated structs.
    pub structs: StructTable,
    /// Classified methods.
    pub methods: ContractMethods,
    /// Storage.
    pub state: StateModel,
}

impl SpecModel {
    /// Walks `contract` and resolves every struct, method and storage declaration.
    ///
    /// Struct names and `Args` class names are claimed in `module_pool`,
    /// client method names in `client_pool`.
    pub fn build(
        contract: &Arc56Contract,
        sanitizer: &dyn Sanitizer,
        module_pool: &mut SymbolPool,
        client_pool: &mut SymbolPool,
    ) -> GeneratorResult<Self> {
        let mut resolver = StructResolver {
            declared: &contract.structs,
            sanitizer,
            table: StructTable::default(),
            in_progress: Vec::new(),
        };

        let signatures = resolve_method_types(contract, &mut resolver, module_pool)?;
        let state_types = resolve_state_types(contract, &mut resolver, module_pool)?;
        for name in contract.structs.keys() {
            resolver.register_named(name, module_pool)?;
        }
        let structs = resolver.table;

        let methods = classify_methods(contract, signatures, &structs, sanitizer, module_pool, client_pool)?;
        let state = build_state(contract, state_types, &structs, sanitizer)?;

        debug!(
            contract = %contract.name,
            structs = structs.len(),
            abi_methods = methods.abi_methods().len(),
            "Resolved contract model"
        );

        Ok(Self {
            structs,
            methods,
            state,
        })
    }
}

struct ResolvedMethod {
    args: Vec<ValueType>,
    returns: ValueType,
}

fn resolve_tagged(
    resolver: &mut StructResolver<'_>,
    type_str: &str,
    struct_name: Option<&str>,
    location: &str,
    pool: &mut SymbolPool,
) -> GeneratorResult<ValueType> {
    let Some(struct_name) = struct_name else {
        return resolver.resolve(type_str, location, pool);
    };
    if !resolver.is_declared(struct_name) {
        return Err(GeneratorError::UnknownStruct(struct_name.to_string()));
    }
    let key = resolver.register_named(struct_name, pool)?;
    let declared: AbiType = type_str
        .parse()
        .map_err(|_| GeneratorError::unknown_type(type_str, location))?;
    let expected = resolver
        .table
        .get(&key)
        .and_then(|s| s.abi_tuple.clone())
        .ok_or_else(|| {
            GeneratorError::inconsistent_struct(struct_name, "struct is not ABI encodable")
        })?;
    if declared != expected {
        return Err(GeneratorError::inconsistent_struct(
            struct_name,
            format!("{location} has type `{declared}` but the struct encodes as `{expected}`"),
        ));
    }
    Ok(ValueType::Struct(key))
}

fn arg_name(method: &Method, index: usize) -> String {
    method.args[index]
        .name
        .clone()
        .unwrap_or_else(|| format!("arg{index}"))
}

fn resolve_method_types(
    contract: &Arc56Contract,
    resolver: &mut StructResolver<'_>,
    pool: &mut SymbolPool,
) -> GeneratorResult<Vec<ResolvedMethod>> {
    contract
        .methods
        .iter()
        .map(|method| {
            let args = method
                .args
                .iter()
                .enumerate()
                .map(|(i, arg)| {
                    let location =
                        format!("method `{}` argument `{}`", method.name, arg_name(method, i));
                    resolve_tagged(resolver, &arg.arg_type, arg.struct_name.as_deref(), &location, pool)
                })
                .collect::<GeneratorResult<Vec<_>>>()?;
            let location = format!("method `{}` return value", method.name);
            let returns = resolve_tagged(
                resolver,
                &method.returns.return_type,
                method.returns.struct_name.as_deref(),
                &location,
                pool,
            )?;
            Ok::<_, GeneratorError>(ResolvedMethod { args, returns })
        })
        .collect()
}

struct ResolvedState {
    keys: [Vec<ValueType>; 3],
    maps: [Vec<(ValueType, ValueType)>; 3],
}

fn scoped_keys(contract: &Arc56Contract) -> [(&'static str, &BTreeMap<String, StorageKey>); 3] {
    let keys = &contract.state.keys;
    [("global", &keys.global), ("local", &keys.local), ("box", &keys.boxes)]
}

fn scoped_maps(contract: &Arc56Contract) -> [(&'static str, &BTreeMap<String, StorageMap>); 3] {
    let maps = &contract.state.maps;
    [("global", &maps.global), ("local", &maps.local), ("box", &maps.boxes)]
}

fn resolve_state_types(
    contract: &Arc56Contract,
    resolver: &mut StructResolver<'_>,
    pool: &mut SymbolPool,
) -> GeneratorResult<ResolvedState> {
    let mut state = ResolvedState {
        keys: Default::default(),
        maps: Default::default(),
    };
    for (slot, (scope, keys)) in scoped_keys(contract).into_iter().enumerate() {
        for (name, key) in keys {
            let location = format!("{scope} key `{name}`");
            state.keys[slot].push(resolver.resolve(&key.value_type, &location, pool)?);
        }
    }
    for (slot, (scope, maps)) in scoped_maps(contract).into_iter().enumerate() {
        for (name, map) in maps {
            let location = format!("{scope} map `{name}`");
            let key_type = resolver.resolve(&map.key_type, &location, pool)?;
            let value_type = resolver.resolve(&map.value_type, &location, pool)?;
            state.maps[slot].push((key_type, value_type));
        }
    }
    Ok(state)
}

fn classify_methods(
    contract: &Arc56Contract,
    resolved: Vec<ResolvedMethod>,
    structs: &StructTable,
    sanitizer: &dyn Sanitizer,
    module_pool: &mut SymbolPool,
    client_pool: &mut SymbolPool,
) -> GeneratorResult<ContractMethods> {
    let mut overloads: BTreeMap<&str, usize> = BTreeMap::new();
    for method in &contract.methods {
        *overloads.entry(method.name.as_str()).or_default() += 1;
    }

    let mapper = TypeMapper::new(structs.names());
    let mut methods = ContractMethods::default();

    for (method, types) in contract.methods.iter().zip(resolved) {
        let signature = method.signature();
        let base = if overloads.get(method.name.as_str()).copied().unwrap_or(0) > 1 {
            sanitizer.method_name(&signature)
        } else {
            sanitizer.method_name(&method.name)
        };
        let client_method_name = client_pool.allocate(&base);

        let mut identifiers = SymbolPool::with_reserved(ARGS_CLASS_MEMBERS.iter().copied());
        let mut args = Vec::with_capacity(method.args.len());
        for (i, (arg, value_type)) in method.args.iter().zip(types.args).enumerate() {
            let name = arg_name(method, i);
            args.push(MethodArgument {
                identifier: identifiers.allocate(&sanitizer.property_name(&name)),
                type_str: arg.arg_type.clone(),
                python_type: mapper.map(&value_type, TypePosition::Input)?,
                value_type,
                has_default: arg.default_value.is_some(),
                optional: false,
                desc: arg.desc.clone(),
                name,
            });
        }
        for arg in args.iter_mut().rev() {
            if !arg.has_default {
                break;
            }
            arg.optional = true;
        }

        let mut referenced = BTreeSet::new();
        for arg in &args {
            structs.collect_keys(&arg.value_type, &mut referenced);
        }
        structs.collect_keys(&types.returns, &mut referenced);

        let args_class_name = (!args.is_empty()).then(|| {
            module_pool.allocate(&format!("{}Args", sanitizer.type_name(&client_method_name)))
        });

        let abi = Rc::new(AbiContractMethod {
            name: method.name.clone(),
            signature_literal: sanitizer.string_literal(&signature),
            signature,
            client_method_name,
            args_class_name,
            args,
            return_type: mapper.map(&types.returns, TypePosition::Output)?,
            returns: types.returns,
            structs: referenced,
            readonly: method.readonly.unwrap_or(false),
            desc: method.desc.clone(),
            returns_desc: method.returns.desc.clone(),
        });

        methods.abi_methods.push(Rc::clone(&abi));
        methods.file(Some(abi), &method.actions.create, &method.actions.call);
    }

    methods.file(None, &contract.bare_actions.create, &contract.bare_actions.call);
    Ok(methods)
}

fn build_state(
    contract: &Arc56Contract,
    resolved: ResolvedState,
    structs: &StructTable,
    sanitizer: &dyn Sanitizer,
) -> GeneratorResult<StateModel> {
    let mapper = TypeMapper::new(structs.names());
    let mut scopes: [StorageScope; 3] = Default::default();
    let ResolvedState { keys, maps } = resolved;

    for (slot, ((_, declared), types)) in scoped_keys(contract).into_iter().zip(keys).enumerate() {
        let mut properties = SymbolPool::with_reserved(STATE_ACCESSOR_MEMBERS.iter().copied());
        for ((name, key), value_type) in declared.iter().zip(types) {
            scopes[slot].keys.push(StateKey {
                name: name.clone(),
                property: properties.allocate(&sanitizer.property_name(name)),
                key: key.key.clone(),
                python_type: mapper.map(&value_type, TypePosition::Output)?,
                value_type,
                desc: key.desc.clone(),
            });
        }
        for ((name, map), (key_type, value_type)) in scoped_maps(contract)[slot].1.iter().zip(&maps[slot]) {
            scopes[slot].maps.push(StateMap {
                name: name.clone(),
                property: properties.allocate(&sanitizer.property_name(name)),
                key_python_type: mapper.map(key_type, TypePosition::Output)?,
                key_type: key_type.clone(),
                value_python_type: mapper.map(value_type, TypePosition::Output)?,
                value_type: value_type.clone(),
                desc: map.desc.clone(),
            });
        }
    }

    let [global, local, boxes] = scopes;
    Ok(StateModel {
        global,
        local,
        boxes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::SanitizingNames;

    fn build(json: &str) -> GeneratorResult<(SpecModel, SymbolPool, SymbolPool)> {
        let contract: Arc56Contract = serde_json::from_str(json).unwrap();
        let mut module_pool = SymbolPool::with_reserved(["APP_SPEC"]);
        let mut client_pool = SymbolPool::with_reserved(["send"]);
        let model = SpecModel::build(&contract, &SanitizingNames, &mut module_pool, &mut client_pool)?;
        Ok((model, module_pool, client_pool))
    }

    const OVERLOADED: &str = r#"{
        "name": "Calc",
        "methods": [
            {"name": "add", "args": [{"type": "uint64", "name": "a"}, {"type": "uint64", "name": "b"}],
             "returns": {"type": "uint64"}, "actions": {"create": [], "call": ["NoOp"]}},
            {"name": "add", "args": [{"type": "uint64", "name": "a"}, {"type": "uint64", "name": "b"}, {"type": "uint64", "name": "c"}],
             "returns": {"type": "uint64"}, "actions": {"create": [], "call": ["NoOp"]}},
            {"name": "send", "args": [], "returns": {"type": "void"},
             "actions": {"create": ["NoOp", "OptIn"], "call": ["NoOp", "OptIn"]}}
        ],
        "bareActions": {"create": ["NoOp"], "call": ["UpdateApplication", "DeleteApplication"]}
    }"#;

    #[test]
    fn test_overloads_use_signatures() {
        let (model, _, client_pool) = build(OVERLOADED).unwrap();
        let names: Vec<_> = model
            .methods
            .abi_methods()
            .iter()
            .map(|m| m.client_method_name.as_str())
            .collect();
        assert_eq!(names, ["add_uint64_uint64_uint64", "add_uint64_uint64_uint64_uint64", "send1"]);
        assert!(client_pool.contains("send1"));
    }

    #[test]
    fn test_classification() {
        let (model, _, _) = build(OVERLOADED).unwrap();
        let methods = &model.methods;
        assert_eq!(methods.calls(OnCompleteAction::NoOp).len(), 3);
        assert_eq!(methods.abi_calls(OnCompleteAction::OptIn).count(), 1);
        assert!(methods.has_bare_call(OnCompleteAction::UpdateApplication));
        assert!(!methods.has_bare_call(OnCompleteAction::NoOp));

        let creates: Vec<_> = methods.abi_creates().collect();
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].1, [OnCompleteAction::NoOp, OnCompleteAction::OptIn]);
        assert_eq!(methods.bare_create().unwrap().actions, [OnCompleteAction::NoOp]);
    }

    #[test]
    fn test_args_classes() {
        let (model, module_pool, _) = build(OVERLOADED).unwrap();
        let add = &model.methods.abi_methods()[0];
        assert_eq!(add.args_class_name.as_deref(), Some("AddUint64Uint64Uint64Args"));
        assert_eq!(add.args_tuple_type(), "tuple[int, int]");
        assert!(module_pool.contains("AddUint64Uint64Uint64Args"));
        assert_eq!(model.methods.abi_methods()[2].args_class_name, None);
    }

    const STRUCTS: &str = r#"{
        "name": "Shapes",
        "structs": {
            "Vector": [{"name": "x", "type": "string"}, {"name": "y", "type": "string"}],
            "Segment": [{"name": "start", "type": "Vector"}, {"name": "end", "type": "Vector"}],
            "Labelled": [{"name": "label", "type": [{"name": "text", "type": "string"}]}],
            "Other": [{"name": "text", "type": [{"name": "text", "type": "string"}]}],
            "Unused": [{"name": "n", "type": "uint8"}]
        },
        "methods": [
            {"name": "length", "args": [{"type": "((string,string),(string,string))", "struct": "Segment", "name": "seg"}],
             "returns": {"type": "uint64"}, "actions": {"create": [], "call": ["NoOp"]}},
            {"name": "origin", "args": [], "returns": {"type": "(string,string)", "struct": "Vector"},
             "actions": {"create": [], "call": ["NoOp"]}}
        ],
        "state": {
            "keys": {"global": {"last": {"keyType": "AVMString", "valueType": "Vector", "key": "bGFzdA=="}}},
            "maps": {"box": {"labels": {"keyType": "uint64", "valueType": "Labelled", "prefix": "bA=="}}}
        }
    }"#;

    #[test]
    fn test_nested_structs_registered_first() {
        let (model, _, _) = build(STRUCTS).unwrap();
        let order: Vec<_> = model.structs.iter().map(|s| s.type_name.as_str()).collect();
        assert_eq!(order[..2], ["Vector", "Segment"]);
        let segment = model.structs.get(&StructKey::named("Segment")).unwrap();
        assert_eq!(segment.fields[0].python_type, "Vector");
        assert_eq!(
            segment.abi_tuple.as_ref().unwrap().to_string(),
            "((string,string),(string,string))"
        );
        assert!(order.contains(&"Unused"));
    }

    #[test]
    fn test_anonymous_structs_are_shared() {
        let (model, _, _) = build(STRUCTS).unwrap();
        let labelled = model.structs.get(&StructKey::named("Labelled")).unwrap();
        let other = model.structs.get(&StructKey::named("Other")).unwrap();
        assert_eq!(labelled.fields[0].python_type, other.fields[0].python_type);
        assert_eq!(labelled.fields[0].python_type, "TextString");
    }

    #[test]
    fn test_struct_references_share_one_name() {
        let (model, _, _) = build(STRUCTS).unwrap();
        let origin = &model.methods.abi_methods()[1];
        assert_eq!(origin.return_type, "Vector");
        assert_eq!(model.state.global.keys[0].python_type, "Vector");
        assert_eq!(model.state.boxes.maps[0].value_python_type, "Labelled");
        let length = &model.methods.abi_methods()[0];
        assert!(length.structs.contains(&StructKey::named("Vector")));
        assert!(length.structs.contains(&StructKey::named("Segment")));
    }

    #[test]
    fn test_struct_type_mismatch_rejected() {
        let json = STRUCTS.replace(
            r#""returns": {"type": "(string,string)", "struct": "Vector"}"#,
            r#""returns": {"type": "(string,uint64)", "struct": "Vector"}"#,
        );
        let err = build(&json).unwrap_err();
        assert!(matches!(err, GeneratorError::InconsistentStruct { .. }));
    }

    #[test]
    fn test_unknown_struct_and_type_rejected() {
        let json = STRUCTS.replace(r#""struct": "Vector""#, r#""struct": "Point""#);
        assert!(matches!(build(&json).unwrap_err(), GeneratorError::UnknownStruct(_)));

        let json = STRUCTS.replace(r#""valueType": "Vector""#, r#""valueType": "Point""#);
        assert!(matches!(build(&json).unwrap_err(), GeneratorError::UnknownType { .. }));
    }

    #[test]
    fn test_struct_cycle_rejected() {
        let json = r#"{
            "name": "Loop",
            "structs": {"A": [{"name": "b", "type": "B"}], "B": [{"name": "a", "type": "A"}]},
            "methods": []
        }"#;
        assert!(matches!(build(json).unwrap_err(), GeneratorError::InconsistentStruct { .. }));
    }

    #[test]
    fn test_trailing_defaults_are_optional() {
        let json = r#"{
            "name": "Defaults",
            "methods": [{
                "name": "greet",
                "args": [
                    {"type": "string", "name": "a", "defaultValue": {"data": "AA==", "source": "literal"}},
                    {"type": "string", "name": "b"},
                    {"type": "uint64", "name": "c", "defaultValue": {"data": "AA==", "source": "literal"}}
                ],
                "returns": {"type": "void"},
                "actions": {"create": [], "call": ["NoOp"]}
            }]
        }"#;
        let (model, _, _) = build(json).unwrap();
        let args = &model.methods.abi_methods()[0].args;
        assert!(args[0].has_default && !args[0].optional);
        assert!(!args[1].optional);
        assert!(args[2].optional);
    }
}
