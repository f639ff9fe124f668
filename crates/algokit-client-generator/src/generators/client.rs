//! The `{P}Client` class.

use super::{decode_return, PyFunction};
use crate::context::GeneratorContext;
use crate::document::Document;
use crate::error::GeneratorResult;
use crate::type_mapping::ValueType;

const CLIENT_OPTIONS: &[(&str, &str)] = &[
    ("app_name", "str | None"),
    ("default_sender", "str | None"),
    ("default_signer", "TransactionSigner | None"),
    ("approval_source_map", "SourceMap | None"),
    ("clear_source_map", "SourceMap | None"),
];

const DECODED_VALUE: &str = "algokit_utils.ABIValue | algokit_utils.ABIStruct | None";

fn optional_params() -> impl Iterator<Item = String> {
    CLIENT_OPTIONS
        .iter()
        .map(|(name, ty)| format!("{name}: {ty} = None"))
}

fn forwarded_args() -> Document {
    let mut doc = Document::new();
    for (name, _) in CLIENT_OPTIONS {
        doc.line(format!("{name}={name},"));
    }
    doc
}

pub(crate) fn generate(ctx: &GeneratorContext) -> GeneratorResult<Document> {
    let names = ctx.names();
    let client = &names.client;

    let mut body = Document::new();
    super::docstring(
        &mut body,
        &format!("Client for interacting with {} smart contract", ctx.contract().name),
    );
    body.append(constructors(ctx));

    body.gap(1).append(
        PyFunction::free("from_creator_and_name", format!("\"{client}\""))
            .decorator("staticmethod")
            .params([
                "creator_address: str",
                "app_name: str",
                "algorand: _AlgoKitAlgorandClient",
            ])
            .params(optional_params().skip(1))
            .params([
                "ignore_cache: bool | None = None",
                "app_lookup_cache: algokit_utils.ApplicationLookup | None = None",
            ])
            .body(wrap_app_client(
                client,
                "algokit_utils.AppClient.from_creator_and_name(",
                &["creator_address=creator_address", "app_name=app_name", "app_spec=APP_SPEC", "algorand=algorand"],
                1,
                &["ignore_cache=ignore_cache", "app_lookup_cache=app_lookup_cache"],
            ))
            .into_document(),
    );

    body.gap(1).append(
        PyFunction::free("from_network", format!("\"{client}\""))
            .decorator("staticmethod")
            .param("algorand: _AlgoKitAlgorandClient")
            .params(optional_params())
            .body(wrap_app_client(
                client,
                "algokit_utils.AppClient.from_network(",
                &["app_spec=APP_SPEC", "algorand=algorand"],
                0,
                &[],
            ))
            .into_document(),
    );

    for (name, ty) in [
        ("app_id", "int"),
        ("app_address", "str"),
        ("app_name", "str"),
        ("app_spec", "algokit_utils.Arc56Contract"),
        ("algorand", "_AlgoKitAlgorandClient"),
    ] {
        let mut getter = Document::new();
        getter.line(format!("return self.app_client.{name}"));
        body.gap(1).append(
            PyFunction::new(name, ty)
                .decorator("property")
                .body(getter)
                .into_document(),
        );
    }

    body.gap(1).append(
        PyFunction::new("clone", format!("\"{client}\""))
            .params(optional_params())
            .body(wrap_app_client(client, "self.app_client.clone(", &[], 0, &[]))
            .into_document(),
    );

    if ctx.is_full() {
        let mut group = Document::new();
        group.line(format!("return {}(self)", names.composer));
        body.gap(1).append(
            PyFunction::new("new_group", format!("\"{}\"", names.composer))
                .body(group)
                .into_document(),
        );
    }

    body.gap(1).append(decode_return_value(ctx));

    let mut doc = Document::new();
    super::class(&mut doc, format!("class {client}:"), body);
    Ok(doc)
}

/// The overloaded `__init__`: wrap an `AppClient` or build one from an app id.
fn constructors(ctx: &GeneratorContext) -> Document {
    let names = ctx.names();
    let by_id_params = [
        "*",
        "algorand: _AlgoKitAlgorandClient",
        "app_id: int",
    ];

    let mut doc = Document::new();
    doc.append(
        PyFunction::new("__init__", "None")
            .decorator("typing.overload")
            .param("app_client: algokit_utils.AppClient")
            .into_document(),
    );
    doc.gap(1).append(
        PyFunction::new("__init__", "None")
            .decorator("typing.overload")
            .params(by_id_params)
            .params(optional_params())
            .into_document(),
    );

    let mut body = Document::new();
    let mut app_client_params = Document::new();
    app_client_params
        .line("algorand=algorand,")
        .line("app_spec=APP_SPEC,")
        .line("app_id=app_id,")
        .append(forwarded_args());
    body.line("if app_client:")
        .indent()
        .line("self.app_client = app_client")
        .dedent()
        .line("elif algorand and app_id:")
        .indent()
        .line("self.app_client = algokit_utils.AppClient(")
        .indent()
        .line("algokit_utils.AppClientParams(")
        .indent()
        .append(app_client_params)
        .dedent()
        .line(")")
        .dedent()
        .line(")")
        .dedent()
        .line("else:")
        .indent()
        .line("raise ValueError(\"Either app_client or algorand and app_id must be provided\")")
        .dedent()
        .new_line()
        .line(format!("self.params = {}(self.app_client)", names.params))
        .line(format!(
            "self.create_transaction = {}(self.app_client)",
            names.create_transaction
        ))
        .line(format!("self.send = {}(self.app_client)", names.send))
        .line(format!("self.state = {}(self.app_client)", names.state));

    doc.gap(1).append(
        PyFunction::new("__init__", "None")
            .param("app_client: algokit_utils.AppClient | None = None")
            .params([
                "*",
                "algorand: _AlgoKitAlgorandClient | None = None",
                "app_id: int | None = None",
            ])
            .params(optional_params())
            .body(body)
            .into_document(),
    );
    doc
}

/// `return {client}({call} ...))` forwarding the shared client options.
///
/// `skip` drops leading options already passed positionally in `leading`.
fn wrap_app_client(
    client: &str,
    call: &str,
    leading: &[&str],
    skip: usize,
    trailing: &[&str],
) -> Document {
    let mut args = Document::new();
    for arg in leading {
        args.line(format!("{arg},"));
    }
    for (name, _) in CLIENT_OPTIONS.iter().skip(skip) {
        args.line(format!("{name}={name},"));
    }
    for arg in trailing {
        args.line(format!("{arg},"));
    }

    let mut doc = Document::new();
    doc.line(format!("return {client}("))
        .indent()
        .line(call)
        .indent()
        .append(args)
        .dedent()
        .line(")")
        .dedent()
        .line(")");
    doc
}

/// Typed overloads plus the implementation decoding ABI returns.
fn decode_return_value(ctx: &GeneratorContext) -> Document {
    let returning: Vec<_> = ctx
        .methods()
        .abi_methods()
        .iter()
        .filter(|m| m.returns != ValueType::Void)
        .collect();

    let mut doc = Document::new();
    if !returning.is_empty() {
        for method in &returning {
            doc.append(
                PyFunction::new("decode_return_value", format!("{} | None", method.return_type))
                    .decorator("typing.overload")
                    .param(format!("method: typing.Literal[{}]", method.signature_literal))
                    .param("return_value: algokit_utils.ABIReturn | None")
                    .into_document(),
            )
            .gap(1);
        }
        doc.append(
            PyFunction::new("decode_return_value", DECODED_VALUE)
                .decorator("typing.overload")
                .param("method: str")
                .param("return_value: algokit_utils.ABIReturn | None")
                .into_document(),
        )
        .gap(1);
    }

    let mut body = Document::new();
    body.line("if return_value is None:")
        .indent()
        .line("return None")
        .dedent()
        .new_line()
        .line("arc56_method = self.app_spec.get_arc56_method(method)")
        .line("decoded = return_value.get_arc56_value(arc56_method, self.app_spec.structs)");
    for method in returning.iter().filter(|m| m.return_struct().is_some()) {
        body.line(format!(
            "if method == {} and isinstance(decoded, dict):",
            method.signature_literal
        ))
        .indent()
        .line(format!("return {}", decode_return(ctx, method, "decoded")))
        .dedent();
    }
    body.line("return decoded");

    let mut returns: Vec<&str> = vec![DECODED_VALUE];
    for method in &returning {
        if !returns.contains(&method.return_type.as_str()) {
            returns.push(method.return_type.as_str());
        }
    }
    doc.append(
        PyFunction::new("decode_return_value", returns.join(" | "))
            .doc(Some("Decodes ABI return value for the given method."))
            .param("method: str")
            .param("return_value: algokit_utils.ABIReturn | None")
            .body(body)
            .into_document(),
    );
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerationMode, GeneratorConfig};
    use serde_json::json;

    fn spec() -> serde_json::Value {
        json!({
            "name": "HelloWorld",
            "structs": {"Vector": [{"name": "x", "type": "string"}, {"name": "y", "type": "string"}]},
            "methods": [
                {"name": "hello", "args": [{"type": "string", "name": "name"}],
                 "returns": {"type": "string"}, "actions": {"create": [], "call": ["NoOp"]}},
                {"name": "origin", "args": [], "returns": {"type": "(string,string)", "struct": "Vector"},
                 "actions": {"create": [], "call": ["NoOp"]}},
                {"name": "reset", "args": [], "returns": {"type": "void"},
                 "actions": {"create": [], "call": ["NoOp"]}}
            ]
        })
    }

    fn render(config: GeneratorConfig) -> String {
        let ctx = GeneratorContext::new(&spec(), config).unwrap();
        generate(&ctx).unwrap().render("    ").unwrap()
    }

    #[test]
    fn test_client_wires_builders() {
        let text = render(GeneratorConfig::default());
        assert!(text.starts_with("class HelloWorldClient:\n"));
        assert!(text.contains("        self.params = HelloWorldParams(self.app_client)\n"));
        assert!(text.contains("        self.state = HelloWorldState(self.app_client)\n"));
        assert!(text.contains("                    app_spec=APP_SPEC,\n"));
        assert!(text.contains("    @staticmethod\n    def from_network(\n"));
        assert!(text.contains("    def app_id(self) -> int:\n        return self.app_client.app_id\n"));
    }

    #[test]
    fn test_decode_return_value_overloads() {
        let text = render(GeneratorConfig::default());
        assert!(text.contains("method: typing.Literal[\"hello(string)string\"],\n"));
        assert!(text.contains("method: typing.Literal[\"origin()(string,string)\"],\n"));
        assert!(!text.contains("reset()void"));
        assert!(text.contains(
            "        if method == \"origin()(string,string)\" and isinstance(decoded, dict):\n            return None if decoded is None else _init_dataclass(Vector, typing.cast(dict, decoded))\n"
        ));
    }

    #[test]
    fn test_new_group_only_in_full_mode() {
        assert!(render(GeneratorConfig::default()).contains("def new_group(self) -> \"HelloWorldComposer\":"));
        let minimal = render(GeneratorConfig::default().with_mode(GenerationMode::Minimal));
        assert!(!minimal.contains("new_group"));
        assert!(minimal.contains("def clone("));
    }
}
