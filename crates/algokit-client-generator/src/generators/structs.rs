//! Struct dataclasses and per-method `Args` dataclasses.

use super::{class, docstring, PyFunction};
use crate::context::GeneratorContext;
use crate::document::Document;
use crate::error::GeneratorResult;
use crate::spec_model::{AbiContractMethod, AbiStruct};

pub(crate) fn generate(ctx: &GeneratorContext) -> GeneratorResult<Document> {
    let mut doc = Document::new();
    for s in ctx.structs().iter() {
        doc.gap(2).append(struct_class(ctx, s));
    }
    for method in ctx.methods().abi_methods() {
        if let Some(class_name) = &method.args_class_name {
            doc.gap(2).append(args_class(method, class_name));
        }
    }
    Ok(doc)
}

fn struct_class(ctx: &GeneratorContext, s: &AbiStruct) -> Document {
    let mut body = Document::new();
    let described = if s.key.is_anonymous() {
        s.type_name.as_str()
    } else {
        s.key.as_str()
    };
    docstring(&mut body, &format!("Struct for {described}"));
    for field in &s.fields {
        if field.identifier == field.name {
            body.line(format!("{}: {}", field.identifier, field.python_type));
        } else {
            body.line(format!(
                "{}: {} = dataclasses.field(metadata={{\"abi_name\": {}}})",
                field.identifier,
                field.python_type,
                ctx.sanitizer().string_literal(&field.name)
            ));
        }
    }

    let mut doc = Document::new();
    doc.line("@dataclasses.dataclass(frozen=True)");
    class(&mut doc, format!("class {}:", s.type_name), body);
    doc
}

fn args_class(method: &AbiContractMethod, class_name: &str) -> Document {
    let mut body = Document::new();
    docstring(&mut body, &format!("Dataclass for {} arguments", method.name));
    for arg in &method.args {
        if arg.optional {
            body.line(format!("{}: {} = None", arg.identifier, arg.annotation()));
        } else {
            body.line(format!("{}: {}", arg.identifier, arg.python_type));
        }
    }

    let mut signature = Document::new();
    signature.line(format!("return {}", method.signature_literal));
    body.gap(1).append(
        PyFunction::new("abi_method_signature", "str")
            .decorator("property")
            .body(signature)
            .into_document(),
    );

    let mut doc = Document::new();
    doc.line("@dataclasses.dataclass(kw_only=True, frozen=True)");
    class(&mut doc, format!("class {class_name}:"), body);
    doc
}
