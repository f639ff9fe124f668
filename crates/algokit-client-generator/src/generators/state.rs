//! Typed state accessors.
//!
//! `{P}State` exposes one accessor per non-empty storage scope. Keys become
//! properties, maps become `_MapState` views, and struct valued entries are
//! decoded into the same dataclasses method returns use.

use super::{class, docstring, template, PyFunction};
use crate::context::GeneratorContext;
use crate::document::Document;
use crate::error::GeneratorResult;
use crate::spec_model::{StateKey, StorageScope};
use crate::type_mapping::ValueType;
use std::collections::BTreeMap;

const MAP_STATE: &str = r#"
_KeyType = typing.TypeVar("_KeyType")
_ValueType = typing.TypeVar("_ValueType")


class _AppClientStateMethodsProtocol(typing.Protocol):
    def get_map(self, map_name: str) -> dict[typing.Any, typing.Any]:
        ...

    def get_map_value(self, map_name: str, key: typing.Any) -> typing.Any | None:
        ...


class _MapState(typing.Generic[_KeyType, _ValueType]):
    """Generic class for accessing state maps with strongly typed keys and values"""

    def __init__(
        self,
        state_accessor: _AppClientStateMethodsProtocol,
        map_name: str,
        struct_class: typing.Type[_ValueType] | None = None,
    ):
        self._state_accessor = state_accessor
        self._map_name = map_name
        self._struct_class = struct_class

    def get_map(self) -> dict[_KeyType, _ValueType]:
        """Get all current values in the map"""
        result = self._state_accessor.get_map(self._map_name)
        if self._struct_class and result:
            return {
                k: _init_dataclass(self._struct_class, v) if isinstance(v, dict) else v
                for k, v in result.items()
            }  # type: ignore
        return typing.cast(dict[_KeyType, _ValueType], result or {})

    def get_value(self, key: _KeyType) -> _ValueType | None:
        """Get a value from the map by key"""
        key_value = dataclasses.astuple(key) if dataclasses.is_dataclass(key) else key  # type: ignore
        value = self._state_accessor.get_map_value(self._map_name, key_value)
        if value is not None and self._struct_class and isinstance(value, dict):
            return _init_dataclass(self._struct_class, value)  # type: ignore
        return typing.cast(_ValueType | None, value)
"#;

/// One storage scope and the generated names attached to it.
struct Scope<'a> {
    storage: &'a StorageScope,
    /// Attribute on `{P}State` and on `algokit_utils.AppClient.state`.
    attribute: &'static str,
    accessor_class: &'static str,
    value_class: &'static str,
    per_account: bool,
}

fn scopes(ctx: &GeneratorContext) -> [Scope<'_>; 3] {
    let state = ctx.state();
    [
        Scope {
            storage: &state.global,
            attribute: "global_state",
            accessor_class: "_GlobalState",
            value_class: "GlobalStateValue",
            per_account: false,
        },
        Scope {
            storage: &state.local,
            attribute: "local_state",
            accessor_class: "_LocalState",
            value_class: "LocalStateValue",
            per_account: true,
        },
        Scope {
            storage: &state.boxes,
            attribute: "box",
            accessor_class: "_BoxState",
            value_class: "BoxStateValue",
            per_account: false,
        },
    ]
}

pub(crate) fn generate(ctx: &GeneratorContext) -> GeneratorResult<Document> {
    let scopes = scopes(ctx);
    let mut doc = Document::new();

    if scopes.iter().any(|s| !s.storage.maps.is_empty()) {
        doc.append(template(MAP_STATE)).gap(2);
    }
    for scope in scopes.iter().filter(|s| !s.storage.keys.is_empty()) {
        doc.append(value_class(scope)).gap(2);
    }
    doc.append(state_class(ctx, &scopes));
    for scope in scopes.iter().filter(|s| !s.storage.is_empty()) {
        doc.gap(2).append(accessor_class(ctx, scope));
    }
    Ok(doc)
}

fn value_class(scope: &Scope<'_>) -> Document {
    let mut body = Document::new();
    docstring(&mut body, &format!("Shape of {} state key values", scope.attribute));
    for key in &scope.storage.keys {
        body.line(format!("{}: {}", key.property, key.python_type));
    }
    let mut doc = Document::new();
    doc.line("@dataclasses.dataclass(frozen=True)");
    class(&mut doc, format!("class {}:", scope.value_class), body);
    doc
}

fn state_class(ctx: &GeneratorContext, scopes: &[Scope<'_>]) -> Document {
    let mut body = Document::new();
    docstring(
        &mut body,
        &format!("Methods to access state for the current {} app", ctx.contract().name),
    );
    body.line("def __init__(self, app_client: algokit_utils.AppClient):")
        .indent()
        .line("self.app_client = app_client")
        .dedent();

    for scope in scopes.iter().filter(|s| !s.storage.is_empty()) {
        let returns = format!("\"{}\"", scope.accessor_class);
        let doc = format!("Methods to access {} for the current app", scope.attribute);
        let mut getter = Document::new();
        let function = if scope.per_account {
            getter.line(format!("return {}(self.app_client, address)", scope.accessor_class));
            PyFunction::new(scope.attribute, returns).param("address: str")
        } else {
            getter.line(format!("return {}(self.app_client)", scope.accessor_class));
            PyFunction::new(scope.attribute, returns).decorator("property")
        };
        body.gap(1)
            .append(function.doc(Some(doc)).body(getter).into_document());
    }

    let mut doc = Document::new();
    class(&mut doc, format!("class {}:", ctx.names().state), body);
    doc
}

/// Raw type name to dataclass name, for every struct stored in `scope`.
fn struct_classes<'a>(ctx: &'a GeneratorContext, scope: &Scope<'a>) -> BTreeMap<&'a str, &'a str> {
    let values = scope
        .storage
        .keys
        .iter()
        .map(|k| &k.value_type)
        .chain(scope.storage.maps.iter().map(|m| &m.value_type));
    let mut classes = BTreeMap::new();
    for value in values {
        if let ValueType::Struct(key) = value {
            if let Some(s) = ctx.structs().get(key) {
                classes.insert(key.as_str(), s.type_name.as_str());
            }
        }
    }
    classes
}

fn accessor_class(ctx: &GeneratorContext, scope: &Scope<'_>) -> Document {
    let sanitizer = ctx.sanitizer();
    let mut body = Document::new();

    let mut init = Document::new();
    if scope.per_account {
        init.line("self.app_client = app_client")
            .line("self.address = address")
            .line(format!(
                "self._state_accessor = app_client.state.{}(address)",
                scope.attribute
            ));
    } else {
        init.line("self.app_client = app_client").line(format!(
            "self._state_accessor = app_client.state.{}",
            scope.attribute
        ));
    }
    init.new_line()
        .line("# Pre-generated mapping of value types to their struct classes");
    let classes = struct_classes(ctx, scope);
    if classes.is_empty() {
        init.line("self._struct_classes: dict[str, typing.Type[typing.Any]] = {}");
    } else {
        let mut entries = Document::new();
        for (raw, class_name) in &classes {
            entries.line(format!("{}: {class_name},", sanitizer.string_literal(raw)));
        }
        init.line("self._struct_classes: dict[str, typing.Type[typing.Any]] = {")
            .indent()
            .append(entries)
            .dedent()
            .line("}");
    }
    let mut function = PyFunction::new("__init__", "None").param("app_client: algokit_utils.AppClient");
    if scope.per_account {
        function = function.param("address: str");
    }
    body.append(function.body(init).into_document());

    if !scope.storage.keys.is_empty() {
        body.gap(1).append(get_all(ctx, scope));
    }
    for key in &scope.storage.keys {
        body.gap(1).append(key_property(ctx, scope, key));
    }
    for map in &scope.storage.maps {
        let struct_class = match &map.value_type {
            ValueType::Struct(key) => format!(
                "self._struct_classes.get({})",
                sanitizer.string_literal(key.as_str())
            ),
            _ => "None".to_string(),
        };
        let mut getter = Document::new();
        getter
            .line("return _MapState(")
            .indent()
            .line("self._state_accessor,")
            .line(format!("{},", sanitizer.string_literal(&map.name)))
            .line(format!("{struct_class},"))
            .dedent()
            .line(")");
        let summary = format!("Get values from the {} map in {} state", map.name, scope.attribute);
        let doc = match &map.desc {
            Some(desc) => format!("{summary}\n\n{}", desc.trim()),
            None => summary,
        };
        body.gap(1).append(
            PyFunction::new(
                map.property.as_str(),
                format!(
                    "\"_MapState[{}, {}]\"",
                    map.key_python_type, map.value_python_type
                ),
            )
            .decorator("property")
            .doc(Some(doc))
            .body(getter)
            .into_document(),
        );
    }

    let mut doc = Document::new();
    class(&mut doc, format!("class {}:", scope.accessor_class), body);
    doc
}

fn get_all(ctx: &GeneratorContext, scope: &Scope<'_>) -> Document {
    let sanitizer = ctx.sanitizer();
    let mut body = Document::new();
    body.line("result = self._state_accessor.get_all()")
        .new_line()
        .line("converted = {}")
        .line("for key, value in (result or {}).items():")
        .indent()
        .line(format!(
            "key_info = self.app_client.app_spec.state.keys.{}.get(key)",
            scope.attribute
        ))
        .line("struct_class = self._struct_classes.get(key_info.value_type) if key_info else None")
        .line("converted[key] = (")
        .indent()
        .line("_init_dataclass(struct_class, value) if struct_class and isinstance(value, dict)")
        .line("else value")
        .dedent()
        .line(")")
        .dedent();

    let mut fields = Document::new();
    for key in &scope.storage.keys {
        fields.line(format!(
            "{}=typing.cast({}, converted.get({})),",
            key.property,
            key.python_type,
            sanitizer.string_literal(&key.name)
        ));
    }
    body.line(format!("return {}(", scope.value_class))
        .indent()
        .append(fields)
        .dedent()
        .line(")");

    PyFunction::new("get_all", scope.value_class)
        .doc(Some(format!(
            "Get all current keyed values from {} state",
            scope.attribute
        )))
        .body(body)
        .into_document()
}

fn key_property(ctx: &GeneratorContext, scope: &Scope<'_>, key: &StateKey) -> Document {
    let name = ctx.sanitizer().string_literal(&key.name);
    let mut body = Document::new();
    body.line(format!("value = self._state_accessor.get_value({name})"));
    if let ValueType::Struct(struct_key) = &key.value_type {
        if let Some(s) = ctx.structs().get(struct_key) {
            body.line("if isinstance(value, dict):")
                .indent()
                .line(format!(
                    "return typing.cast({0}, _init_dataclass({0}, value))",
                    s.type_name
                ))
                .dedent();
        }
    }
    body.line(format!("return typing.cast({}, value)", key.python_type));

    let summary = format!(
        "Get the current value of the {} key in {} state",
        key.name, scope.attribute
    );
    let doc = match &key.desc {
        Some(desc) => format!("{summary}\n\n{}", desc.trim()),
        None => summary,
    };
    PyFunction::new(key.property.as_str(), key.python_type.as_str())
        .decorator("property")
        .doc(Some(doc))
        .body(body)
        .into_document()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use serde_json::json;

    fn render(spec: serde_json::Value) -> String {
        let ctx = GeneratorContext::new(&spec, GeneratorConfig::default()).unwrap();
        generate(&ctx).unwrap().render("    ").unwrap()
    }

    fn stateful() -> serde_json::Value {
        json!({
            "name": "Geo",
            "structs": {"Vector": [{"name": "x", "type": "string"}, {"name": "y", "type": "string"}]},
            "methods": [],
            "state": {
                "keys": {
                    "global": {
                        "lastVector": {"keyType": "AVMString", "valueType": "Vector", "key": "bGFzdA=="},
                        "counter": {"keyType": "AVMString", "valueType": "AVMUint64", "key": "Y291bnRlcg=="}
                    },
                    "local": {"score": {"keyType": "AVMString", "valueType": "uint64", "key": "c2NvcmU="}}
                },
                "maps": {"box": {"points": {"keyType": "uint64", "valueType": "Vector", "prefix": "cA=="}}}
            }
        })
    }

    #[test]
    fn test_state_class_exposes_scopes() {
        let text = render(stateful());
        assert!(text.contains("class GeoState:\n"));
        assert!(text.contains("    @property\n    def global_state(self) -> \"_GlobalState\":\n"));
        assert!(text.contains("    def local_state(self, address: str) -> \"_LocalState\":\n"));
        assert!(text.contains("        return _BoxState(self.app_client)\n"));
    }

    #[test]
    fn test_struct_keys_decode_to_dataclass() {
        let text = render(stateful());
        assert!(text.contains("    def last_vector(self) -> Vector:\n"));
        assert!(text.contains("            return typing.cast(Vector, _init_dataclass(Vector, value))\n"));
        assert!(text.contains("            \"Vector\": Vector,\n"));
        assert!(text.contains("            last_vector=typing.cast(Vector, converted.get(\"lastVector\")),\n"));
    }

    #[test]
    fn test_maps_use_map_state() {
        let text = render(stateful());
        assert!(text.starts_with("_KeyType = typing.TypeVar(\"_KeyType\")\n"));
        assert!(text.contains("    def points(self) -> \"_MapState[int, Vector]\":\n"));
        assert!(text.contains("            self._struct_classes.get(\"Vector\"),\n"));
        assert!(!text.contains("class BoxStateValue"));
    }

    #[test]
    fn test_stateless_contract() {
        let text = render(json!({"name": "Plain", "methods": []}));
        assert!(!text.contains("_MapState"));
        assert!(!text.contains("_GlobalState"));
        assert!(text.starts_with("class PlainState:\n"));
    }
}
