//! The three call builders exposed on every client: `params`,
//! `create_transaction` and `send`.
//!
//! They share one shape. The main class holds the `NoOp` calls plus
//! `clear_state`, and each other on-completion action with at least one
//! entry gets a namespace class reachable through a property.

use super::{args_param, class, decode_return, method_docstring, PyFunction};
use crate::context::{ClassNames, GeneratorContext, OPERATIONS};
use crate::document::Document;
use crate::error::GeneratorResult;
use crate::spec_model::{AbiContractMethod, ContractMethod};
use algokit_app_spec::OnCompleteAction;
use std::collections::BTreeMap;

const APP_CLIENT_INIT: &str = "def __init__(self, app_client: algokit_utils.AppClient):";
const COMMON_PARAMS: &str = "params: algokit_utils.CommonAppCallParams | None = None";
const BARE_PARAMS: &str = "params: algokit_utils.AppClientBareCallParams | None = None";
const COMPILATION_PARAMS: &str =
    "compilation_params: algokit_utils.AppClientCompilationParams | None = None";
const SEND_PARAMS: &str = "send_params: algokit_utils.SendParams | None = None";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Builder {
    Params,
    CreateTransaction,
    Send,
}

impl Builder {
    /// Attribute of `algokit_utils.AppClient` the builder delegates to.
    fn attribute(self) -> &'static str {
        match self {
            Self::Params => "params",
            Self::CreateTransaction => "create_transaction",
            Self::Send => "send",
        }
    }

    fn class_name(self, names: &ClassNames) -> &str {
        match self {
            Self::Params => &names.params,
            Self::CreateTransaction => &names.create_transaction,
            Self::Send => &names.send,
        }
    }

    fn operation_classes(self, names: &ClassNames) -> &BTreeMap<OnCompleteAction, String> {
        match self {
            Self::Params => &names.params_operations,
            Self::CreateTransaction => &names.transaction_operations,
            Self::Send => &names.send_operations,
        }
    }

    fn description(self, contract: &str) -> String {
        match self {
            Self::Params => format!("Parameters for calling {contract} contract methods"),
            Self::CreateTransaction => {
                format!("Transactions for calling {contract} contract methods")
            }
            Self::Send => format!("Sends calls to {contract} contract methods"),
        }
    }

    fn abi_return_type(self, action: OnCompleteAction, method: &AbiContractMethod) -> String {
        match (self, action) {
            (Self::Params, OnCompleteAction::UpdateApplication) => {
                "algokit_utils.AppUpdateMethodCallParams".to_string()
            }
            (Self::Params, OnCompleteAction::DeleteApplication) => {
                "algokit_utils.AppDeleteMethodCallParams".to_string()
            }
            (Self::Params, _) => "algokit_utils.AppCallMethodCallParams".to_string(),
            (Self::CreateTransaction, _) => "algokit_utils.BuiltTransactions".to_string(),
            (Self::Send, OnCompleteAction::UpdateApplication) => format!(
                "algokit_utils.SendAppUpdateTransactionResult[{}]",
                method.return_type
            ),
            (Self::Send, _) => format!(
                "algokit_utils.SendAppTransactionResult[{}]",
                method.return_type
            ),
        }
    }

    fn bare_return_type(self, action: OnCompleteAction) -> &'static str {
        match (self, action) {
            (Self::Params, OnCompleteAction::UpdateApplication) => "algokit_utils.AppUpdateParams",
            (Self::Params, OnCompleteAction::DeleteApplication) => "algokit_utils.AppDeleteParams",
            (Self::Params, _) => "algokit_utils.AppCallParams",
            (Self::CreateTransaction, _) => "Transaction",
            (Self::Send, OnCompleteAction::UpdateApplication) => {
                "algokit_utils.SendAppUpdateTransactionResult[algokit_utils.ABIReturn]"
            }
            (Self::Send, _) => "algokit_utils.SendAppTransactionResult[algokit_utils.ABIReturn]",
        }
    }
}

/// Method of `algokit_utils.AppClient` builders that issues `action`.
pub(crate) fn app_client_operation(action: OnCompleteAction) -> &'static str {
    match action {
        OnCompleteAction::NoOp => "call",
        OnCompleteAction::OptIn => "opt_in",
        OnCompleteAction::CloseOut => "close_out",
        OnCompleteAction::ClearState => "clear_state",
        OnCompleteAction::UpdateApplication => "update",
        OnCompleteAction::DeleteApplication => "delete",
    }
}

pub(crate) fn params(ctx: &GeneratorContext) -> GeneratorResult<Document> {
    Ok(builder(ctx, Builder::Params))
}

pub(crate) fn create_transaction(ctx: &GeneratorContext) -> GeneratorResult<Document> {
    Ok(builder(ctx, Builder::CreateTransaction))
}

pub(crate) fn send(ctx: &GeneratorContext) -> GeneratorResult<Document> {
    Ok(builder(ctx, Builder::Send))
}

fn builder(ctx: &GeneratorContext, kind: Builder) -> Document {
    let names = ctx.names();
    let methods = ctx.methods();
    let mut doc = Document::new();

    for op in OPERATIONS.iter().filter(|op| methods.has_calls(op.action)) {
        let mut body = Document::new();
        body.append(app_client_init());
        append_entries(ctx, kind, &mut body, op.action, methods.calls(op.action));
        class(
            &mut doc,
            format!("class {}:", kind.operation_classes(names)[&op.action]),
            body,
        );
        doc.gap(2);
    }

    let mut body = Document::new();
    super::docstring(&mut body, &kind.description(&ctx.contract().name));
    body.append(app_client_init());
    for op in OPERATIONS.iter().filter(|op| methods.has_calls(op.action)) {
        let namespace = &kind.operation_classes(names)[&op.action];
        let mut getter = Document::new();
        getter.line(format!("return {namespace}(self.app_client)"));
        body.gap(1).append(
            PyFunction::new(op.attribute, format!("\"{namespace}\""))
                .decorator("property")
                .body(getter)
                .into_document(),
        );
    }
    append_entries(ctx, kind, &mut body, OnCompleteAction::NoOp, methods.calls(OnCompleteAction::NoOp));
    body.gap(1).append(clear_state(kind));

    class(&mut doc, format!("class {}:", kind.class_name(names)), body);
    doc
}

fn app_client_init() -> Document {
    let mut init = Document::new();
    init.line(APP_CLIENT_INIT)
        .indent()
        .line("self.app_client = app_client")
        .dedent();
    init
}

fn append_entries(
    ctx: &GeneratorContext,
    kind: Builder,
    body: &mut Document,
    action: OnCompleteAction,
    entries: &[ContractMethod],
) {
    for entry in entries {
        let method = match &entry.abi {
            Some(abi) => abi_method(ctx, kind, action, abi),
            None => bare_method(kind, action),
        };
        body.gap(1).append(method);
    }
}

fn abi_method(
    ctx: &GeneratorContext,
    kind: Builder,
    action: OnCompleteAction,
    method: &AbiContractMethod,
) -> Document {
    let is_update = action == OnCompleteAction::UpdateApplication;
    let mut function = PyFunction::new(
        method.client_method_name.as_str(),
        kind.abi_return_type(action, method),
    )
    .doc(method_docstring(method));
    if let Some(args) = args_param(method) {
        function = function.param(args);
    }
    function = function.param(COMMON_PARAMS);
    if is_update {
        function = function.param(COMPILATION_PARAMS);
    }
    if kind == Builder::Send {
        function = function.param(SEND_PARAMS);
    }

    let mut body = Document::new();
    let has_args = method.args_class_name.is_some();
    if has_args {
        body.line("method_args = _parse_abi_args(args)");
    }
    body.line("params = params or algokit_utils.CommonAppCallParams()");

    let call = format!(
        "self.app_client.{}.{}(",
        kind.attribute(),
        app_client_operation(action)
    );
    if kind == Builder::Send {
        body.line(format!("response = {call}"));
    } else {
        body.line(format!("return {call}"));
    }

    let mut fields = Document::new();
    fields
        .line("**dataclasses.asdict(params),")
        .line(format!("\"method\": {},", method.signature_literal));
    if has_args {
        fields.line("\"args\": method_args,");
    }
    let mut call_args = Document::new();
    call_args
        .line("algokit_utils.AppClientMethodCallParams(**{")
        .indent()
        .append(fields)
        .dedent()
        .line("}),");
    if is_update {
        call_args.line("compilation_params=compilation_params,");
    }
    if kind == Builder::Send {
        call_args.line("send_params=send_params,");
    }
    body.indent().append(call_args).dedent().line(")");

    if kind == Builder::Send {
        if method.return_struct().is_some() {
            body.line(format!(
                "parsed_response = dataclasses.replace(response, abi_return={})  # type: ignore",
                decode_return(ctx, method, "response.abi_return")
            ));
        } else {
            body.line("parsed_response = response");
        }
        body.line(format!(
            "return typing.cast({}, parsed_response)",
            kind.abi_return_type(action, method)
        ));
    }

    function.body(body).into_document()
}

fn bare_method(kind: Builder, action: OnCompleteAction) -> Document {
    let is_update = action == OnCompleteAction::UpdateApplication;
    let mut function = PyFunction::new("bare", kind.bare_return_type(action))
        .doc(Some(format!("Makes a bare {action} call")))
        .param(BARE_PARAMS);
    let mut extra = Vec::new();
    if is_update {
        function = function.param(COMPILATION_PARAMS);
        extra.push("compilation_params=compilation_params");
    }
    if kind == Builder::Send {
        function = function.param(SEND_PARAMS);
        extra.push("send_params=send_params");
    }
    function
        .body(bare_call(kind, app_client_operation(action), &extra))
        .into_document()
}

fn clear_state(kind: Builder) -> Document {
    let mut function = PyFunction::new(
        "clear_state",
        kind.bare_return_type(OnCompleteAction::ClearState),
    )
    .param(BARE_PARAMS);
    let mut extra = Vec::new();
    if kind == Builder::Send {
        function = function.param(SEND_PARAMS);
        extra.push("send_params=send_params");
    }
    function
        .body(bare_call(kind, "clear_state", &extra))
        .into_document()
}

fn bare_call(kind: Builder, operation: &str, extra: &[&str]) -> Document {
    let mut body = Document::new();
    let call = format!("return self.app_client.{}.bare.{operation}(", kind.attribute());
    if extra.is_empty() {
        body.line(format!("{call}params)"));
    } else {
        let mut args = Document::new();
        args.line("params,");
        for arg in extra {
            args.line(format!("{arg},"));
        }
        body.line(call).indent().append(args).dedent().line(")");
    }
    body
}
