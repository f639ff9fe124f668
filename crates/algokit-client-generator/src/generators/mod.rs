//! Section generators.
//!
//! Each generator reads the [`GeneratorContext`] and returns one
//! [`Document`]. The driver concatenates them in [`SECTIONS`] order with two
//! blank lines between non-empty sections.

mod builders;
mod client;
mod composer;
mod factory;
mod preamble;
mod state;
mod structs;

use crate::context::GeneratorContext;
use crate::document::Document;
use crate::error::GeneratorResult;
use crate::spec_model::AbiContractMethod;
use algokit_app_spec::OnCompleteAction;

/// Produces one section of the generated module.
pub type SectionGenerator = fn(&GeneratorContext) -> GeneratorResult<Document>;

/// Every section, in output order.
pub const SECTIONS: &[(&str, SectionGenerator)] = &[
    ("header", preamble::header),
    ("imports", preamble::imports),
    ("app_spec", preamble::app_spec),
    ("helpers", preamble::helpers),
    ("structs", structs::generate),
    ("params", builders::params),
    ("create_transaction", builders::create_transaction),
    ("send", builders::send),
    ("state", state::generate),
    ("client", client::generate),
    ("factory", factory::generate),
    ("composer", composer::generate),
];

/// Converts fixed Python source into a document.
///
/// Each leading group of four spaces becomes one indentation level, so the
/// configured indent unit applies to fixed snippets too.
pub(crate) fn template(source: &str) -> Document {
    let mut doc = Document::new();
    for line in source.trim_matches('\n').lines() {
        let trimmed = line.trim_start_matches(' ');
        if trimmed.is_empty() {
            doc.new_line();
            continue;
        }
        let depth = (line.len() - trimmed.len()) / 4;
        for _ in 0..depth {
            doc.indent();
        }
        doc.line(trimmed);
        for _ in 0..depth {
            doc.dedent();
        }
    }
    doc
}

/// Appends a class definition; an empty body becomes `pass`.
pub(crate) fn class(doc: &mut Document, header: impl AsRef<str>, mut body: Document) {
    if body.is_empty() {
        body.line("pass");
    }
    doc.block(header, body);
}

/// Appends a docstring, split over several lines when it has more than one.
pub(crate) fn docstring(doc: &mut Document, text: &str) {
    let text = escape_docstring(text.trim());
    if text.contains('\n') {
        doc.line("\"\"\"").line(text).line("\"\"\"");
    } else {
        doc.line(format!("\"\"\"{text}\"\"\""));
    }
}

/// Escapes text for a `"""` literal. Backslashes are doubled and a quote is
/// escaped when it would start a closing run or touch the closing delimiter.
fn escape_docstring(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut escaped = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' if i + 1 == chars.len() || chars[i + 1..].starts_with(&['"', '"']) => {
                escaped.push_str("\\\"")
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Google style docstring of an ABI method, when the spec documents it.
pub(crate) fn method_docstring(method: &AbiContractMethod) -> Option<String> {
    let documented_args: Vec<_> = method.args.iter().filter(|a| a.desc.is_some()).collect();
    if method.desc.is_none() && documented_args.is_empty() && method.returns_desc.is_none() {
        return None;
    }

    let mut sections = Vec::new();
    if let Some(desc) = &method.desc {
        sections.push(desc.trim().to_string());
    }
    if !documented_args.is_empty() {
        let mut args = String::from("Args:");
        for arg in documented_args {
            let desc = arg.desc.as_deref().unwrap_or_default().trim();
            args.push_str(&format!("\n    {}: {desc}", arg.identifier));
        }
        sections.push(args);
    }
    if let Some(returns) = &method.returns_desc {
        sections.push(format!("Returns:\n    {}", returns.trim()));
    }
    Some(sections.join("\n\n"))
}

/// A Python function definition.
#[derive(Debug, Default)]
pub(crate) struct PyFunction {
    decorators: Vec<String>,
    name: String,
    params: Vec<String>,
    returns: String,
    doc: Option<String>,
    body: Document,
}

impl PyFunction {
    pub(crate) fn new(name: impl Into<String>, returns: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            returns: returns.into(),
            params: vec!["self".to_string()],
            ..Self::default()
        }
    }

    /// A function without a `self` parameter.
    pub(crate) fn free(name: impl Into<String>, returns: impl Into<String>) -> Self {
        Self {
            params: Vec::new(),
            ..Self::new(name, returns)
        }
    }

    #[must_use]
    pub(crate) fn decorator(mut self, decorator: impl Into<String>) -> Self {
        self.decorators.push(decorator.into());
        self
    }

    #[must_use]
    pub(crate) fn param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    #[must_use]
    pub(crate) fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.extend(params.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub(crate) fn doc(mut self, doc: Option<impl Into<String>>) -> Self {
        self.doc = doc.map(Into::into);
        self
    }

    #[must_use]
    pub(crate) fn body(mut self, body: Document) -> Self {
        self.body = body;
        self
    }

    /// Renders the definition; a long parameter list gets one line per parameter.
    pub(crate) fn into_document(self) -> Document {
        let mut doc = Document::new();
        for decorator in &self.decorators {
            doc.line(format!("@{decorator}"));
        }
        let signature_len: usize = self.params.iter().map(|p| p.len() + 2).sum();
        if self.params.len() <= 1 || signature_len + self.name.len() + self.returns.len() < 80 {
            doc.line(format!(
                "def {}({}) -> {}:",
                self.name,
                self.params.join(", "),
                self.returns
            ));
        } else {
            let mut params = Document::new();
            for param in &self.params {
                params.line(format!("{param},"));
            }
            doc.line(format!("def {}(", self.name))
                .indent()
                .append(params)
                .dedent()
                .line(format!(") -> {}:", self.returns));
        }

        let mut body = Document::new();
        if let Some(text) = &self.doc {
            docstring(&mut body, text);
        }
        body.append(self.body);
        if body.is_empty() {
            body.line("...");
        }
        doc.indent().append(body).dedent();
        doc
    }
}

/// The `args` parameter of a method taking ABI arguments.
pub(crate) fn args_param(method: &AbiContractMethod) -> Option<String> {
    let class = method.args_class_name.as_ref()?;
    let ty = format!("{} | {class}", method.args_tuple_type());
    Some(if method.args_optional() {
        format!("args: {ty} | None = None")
    } else {
        format!("args: {ty}")
    })
}

/// `typing.Literal` over the `OnComplete` members of `actions`.
pub(crate) fn on_complete_literal(actions: &[OnCompleteAction]) -> String {
    let members: Vec<String> = actions
        .iter()
        .map(|a| format!("OnComplete.{}OC", a.as_str()))
        .collect();
    format!("typing.Literal[{}]", members.join(", "))
}

/// The return annotation of a decoded method result.
pub(crate) fn return_annotation(method: &AbiContractMethod) -> &str {
    method.return_type.as_str()
}

/// Statements converting `source` into the generated return type.
///
/// Struct returns are rebuilt as dataclasses, other values pass through.
pub(crate) fn decode_return(ctx: &GeneratorContext, method: &AbiContractMethod, source: &str) -> String {
    match method.return_struct().and_then(|key| ctx.structs().get(key)) {
        Some(s) => format!(
            "None if {source} is None else _init_dataclass({}, typing.cast(dict, {source}))",
            s.type_name
        ),
        None => format!("typing.cast({}, {source})", return_annotation(method)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(doc: &Document) -> String {
        doc.render("    ").unwrap()
    }

    #[test]
    fn test_template_uses_configured_indent() {
        let doc = template("\nif x:\n    y()\n\n    z()\n");
        assert_eq!(doc.render("  ").unwrap(), "if x:\n  y()\n\n  z()\n");
    }

    #[test]
    fn test_empty_class_gets_pass() {
        let mut doc = Document::new();
        class(&mut doc, "class Empty:", Document::new());
        assert_eq!(render(&doc), "class Empty:\n    pass\n");
    }

    #[test]
    fn test_short_function_on_one_line() {
        let mut body = Document::new();
        body.line("return self.app_client.app_id");
        let doc = PyFunction::new("app_id", "int")
            .decorator("property")
            .body(body)
            .into_document();
        assert_eq!(
            render(&doc),
            "@property\ndef app_id(self) -> int:\n    return self.app_client.app_id\n"
        );
    }

    #[test]
    fn test_long_function_splits_params() {
        let doc = PyFunction::new("hello", "algokit_utils.AppCallMethodCallParams")
            .param("args: tuple[str] | HelloArgs")
            .param("params: algokit_utils.CommonAppCallParams | None = None")
            .into_document();
        let text = render(&doc);
        assert!(text.starts_with("def hello(\n    self,\n    args: tuple[str] | HelloArgs,\n"));
        assert!(text.contains(") -> algokit_utils.AppCallMethodCallParams:\n    ...\n"));
    }

    #[test]
    fn test_multiline_docstring() {
        let mut doc = Document::new();
        docstring(&mut doc, "Adds\n\nReturns:\n    sum");
        assert_eq!(render(&doc), "\"\"\"\nAdds\n\nReturns:\n    sum\n\"\"\"\n");
    }

    #[test]
    fn test_docstring_escapes_quotes_and_backslashes() {
        let mut doc = Document::new();
        docstring(&mut doc, r#"Adds, see "docs""#);
        assert_eq!(render(&doc), "\"\"\"Adds, see \"docs\\\"\"\"\"\n");

        let mut doc = Document::new();
        docstring(&mut doc, r"Path like C:\users\x");
        assert_eq!(render(&doc), "\"\"\"Path like C:\\\\users\\\\x\"\"\"\n");

        let mut doc = Document::new();
        docstring(&mut doc, r#"a """ b"#);
        assert_eq!(render(&doc), "\"\"\"a \\\"\"\" b\"\"\"\n");
    }

    #[test]
    fn test_on_complete_literal() {
        assert_eq!(
            on_complete_literal(&[OnCompleteAction::NoOp, OnCompleteAction::OptIn]),
            "typing.Literal[OnComplete.NoOpOC, OnComplete.OptInOC]"
        );
    }
}
