//! Fixed opening sections: header comment, imports, embedded spec and the
//! runtime helpers every client relies on.

use super::template;
use crate::context::GeneratorContext;
use crate::document::Document;
use crate::error::GeneratorResult;

const IMPORTS: &str = r#"
# common
import dataclasses
import decimal
import typing
# core algosdk
import algosdk
from algosdk.transaction import OnComplete
from algosdk.atomic_transaction_composer import TransactionSigner
from algosdk.source_map import SourceMap
from algosdk.transaction import Transaction
from algosdk.v2client.models import SimulateTraceConfig
# utils
import algokit_utils
from algokit_utils import AlgorandClient as _AlgoKitAlgorandClient
"#;

const PARSE_ABI_ARGS: &str = r#"
def _parse_abi_args(args: object | None = None) -> list[object] | None:
    """Helper to parse ABI args into the format expected by underlying client"""
    if args is None:
        return None

    def convert_dataclass(value: object) -> object:
        if dataclasses.is_dataclass(value) and not isinstance(value, type):
            return tuple(convert_dataclass(getattr(value, field.name)) for field in dataclasses.fields(value))
        elif isinstance(value, (list, tuple)):
            return type(value)(convert_dataclass(item) for item in value)
        return value

    match args:
        case tuple():
            method_args = list(args)
        case _ if dataclasses.is_dataclass(args) and not isinstance(args, type):
            method_args = [getattr(args, field.name) for field in dataclasses.fields(args)]
        case _:
            raise ValueError("Invalid 'args' type. Expected 'tuple' or 'dataclass' for respective typed arguments.")

    return [
        convert_dataclass(arg) if not isinstance(arg, algokit_utils.AppMethodCallTransactionArgument) else arg
        for arg in method_args
    ] if method_args else None
"#;

const INIT_DATACLASS: &str = r#"
def _init_dataclass(cls: type, data: dict) -> object:
    """
    Recursively instantiate a dataclass of type `cls` from `data`.

    Fields are looked up by their ABI name, which is kept in the field
    metadata when it differs from the attribute name. Nested dataclass
    fields are instantiated from nested dicts.
    """
    field_values = {}
    for field in dataclasses.fields(cls):
        field_value = data.get(field.metadata.get("abi_name", field.name))
        if dataclasses.is_dataclass(field.type) and isinstance(field_value, dict):
            field_values[field.name] = _init_dataclass(typing.cast(type, field.type), field_value)
        else:
            field_values[field.name] = field_value
    return cls(**field_values)
"#;

/// Lint suppressions, provenance and the runtime requirement.
pub(crate) fn header(ctx: &GeneratorContext) -> GeneratorResult<Document> {
    let mut doc = Document::new();
    doc.line("# flake8: noqa")
        .line("# fmt: off")
        .line("# mypy: disable-error-code=\"no-any-return, no-untyped-call, misc, type-arg\"")
        .line(format!(
            "# This file was automatically generated by {}.",
            ctx.config().generator_name
        ))
        .line("# DO NOT MODIFY IT BY HAND.")
        .line("# requires: algokit-utils@^3.0.0");
    Ok(doc)
}

pub(crate) fn imports(_ctx: &GeneratorContext) -> GeneratorResult<Document> {
    Ok(template(IMPORTS))
}

/// The normalized spec as JSON and its parsed `APP_SPEC` constant.
///
/// A raw string is safe here: JSON never places two unescaped quotes next
/// to each other and always ends with a closing brace.
pub(crate) fn app_spec(ctx: &GeneratorContext) -> GeneratorResult<Document> {
    let mut doc = Document::new();
    doc.line(format!("_APP_SPEC_JSON = r\"\"\"{}\"\"\"", ctx.app_spec_json()))
        .line("APP_SPEC = algokit_utils.Arc56Contract.from_json(_APP_SPEC_JSON)");
    Ok(doc)
}

pub(crate) fn helpers(_ctx: &GeneratorContext) -> GeneratorResult<Document> {
    let mut doc = Document::new();
    doc.append(template(PARSE_ABI_ARGS))
        .gap(2)
        .append(template(INIT_DATACLASS));
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use serde_json::json;

    fn context() -> GeneratorContext {
        let spec = json!({
            "name": "Greeter",
            "methods": [],
            "structs": {}
        });
        GeneratorContext::new(&spec, GeneratorConfig::default().with_generator_name("test-gen"))
            .unwrap()
    }

    #[test]
    fn test_header_names_generator() {
        let text = header(&context()).unwrap().render("    ").unwrap();
        assert!(text.starts_with("# flake8: noqa\n"));
        assert!(text.contains("# This file was automatically generated by test-gen.\n"));
        assert!(text.ends_with("# requires: algokit-utils@^3.0.0\n"));
    }

    #[test]
    fn test_app_spec_is_embedded_once() {
        let text = app_spec(&context()).unwrap().render("    ").unwrap();
        assert!(text.starts_with("_APP_SPEC_JSON = r\"\"\"{\"name\":\"Greeter\""));
        assert_eq!(text.matches("\nAPP_SPEC = ").count(), 1);
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_helpers_follow_indent_unit() {
        let text = helpers(&context()).unwrap().render("\t").unwrap();
        assert!(text.contains("\n\tif args is None:\n\t\treturn None\n"));
        assert!(text.contains("\n\n\ndef _init_dataclass(cls: type, data: dict) -> object:\n"));
    }
}
