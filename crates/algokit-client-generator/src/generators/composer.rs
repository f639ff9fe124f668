//! The `{P}Composer` transaction group builder. Full mode only.

use super::{args_param, class, docstring, template, PyFunction};
use crate::context::{GeneratorContext, OPERATIONS};
use crate::document::Document;
use crate::error::GeneratorResult;
use crate::spec_model::{AbiContractMethod, ContractMethod};
use algokit_app_spec::OnCompleteAction;

const COMMON_PARAMS: &str = "params: algokit_utils.CommonAppCallParams | None = None";
const BARE_PARAMS: &str = "params: algokit_utils.AppClientBareCallParams | None = None";
const COMPILATION_PARAMS: &str =
    "compilation_params: algokit_utils.AppClientCompilationParams | None = None";

const GROUP_METHODS: &str = r#"
def add_transaction(
    self, txn: Transaction, signer: TransactionSigner | None = None
) -> "COMPOSER":
    self._composer.add_transaction(txn, signer)
    return self

def composer(self) -> algokit_utils.TransactionComposer:
    return self._composer

def simulate(
    self,
    allow_more_logs: bool | None = None,
    allow_empty_signatures: bool | None = None,
    allow_unnamed_resources: bool | None = None,
    extra_opcode_budget: int | None = None,
    exec_trace_config: SimulateTraceConfig | None = None,
    simulation_round: int | None = None,
    skip_signatures: bool | None = None,
) -> algokit_utils.SendAtomicTransactionComposerResults:
    result = self._composer.simulate(
        allow_more_logs=allow_more_logs,
        allow_empty_signatures=allow_empty_signatures,
        allow_unnamed_resources=allow_unnamed_resources,
        extra_opcode_budget=extra_opcode_budget,
        exec_trace_config=exec_trace_config,
        simulation_round=simulation_round,
        skip_signatures=skip_signatures,
    )
    parsed_returns = []
    for i, result_value in enumerate(result.returns):
        map_fn = self._result_mappers[i] if i < len(self._result_mappers) else None
        parsed_returns.append(map_fn(result_value) if map_fn is not None else result_value)

    return algokit_utils.SendAtomicTransactionComposerResults(
        confirmations=result.confirmations,
        group_id=result.group_id,
        returns=parsed_returns,
        tx_ids=result.tx_ids,
        transactions=result.transactions,
        simulate_response=result.simulate_response,
    )

def send(
    self,
    send_params: algokit_utils.SendParams | None = None,
) -> algokit_utils.SendAtomicTransactionComposerResults:
    result = self._composer.send(send_params)
    parsed_returns = []
    for i, result_value in enumerate(result.returns):
        map_fn = self._result_mappers[i] if i < len(self._result_mappers) else None
        parsed_returns.append(map_fn(result_value) if map_fn is not None else result_value)

    return algokit_utils.SendAtomicTransactionComposerResults(
        confirmations=result.confirmations,
        group_id=result.group_id,
        returns=parsed_returns,
        tx_ids=result.tx_ids,
        transactions=result.transactions,
    )
"#;

/// `TransactionComposer` method adding an app call with `action`.
fn add_method(action: OnCompleteAction, abi: bool) -> &'static str {
    match (action, abi) {
        (OnCompleteAction::UpdateApplication, true) => "add_app_update_method_call",
        (OnCompleteAction::UpdateApplication, false) => "add_app_update",
        (OnCompleteAction::DeleteApplication, true) => "add_app_delete_method_call",
        (OnCompleteAction::DeleteApplication, false) => "add_app_delete",
        (_, true) => "add_app_call_method_call",
        (_, false) => "add_app_call",
    }
}

/// How an entry reaches the composer and the client from its class.
struct Receiver {
    /// Expression for the `{P}Composer` instance.
    composer: &'static str,
    /// Attribute path of the client's params builder for the action.
    params: String,
}

pub(crate) fn generate(ctx: &GeneratorContext) -> GeneratorResult<Document> {
    if !ctx.is_full() {
        return Ok(Document::new());
    }
    let names = ctx.names();
    let methods = ctx.methods();
    let composer = &names.composer;
    let mut doc = Document::new();

    for op in OPERATIONS.iter().filter(|op| methods.has_calls(op.action)) {
        let receiver = Receiver {
            composer: "self.composer",
            params: format!("params.{}", op.attribute),
        };
        let mut body = Document::new();
        body.line(format!("def __init__(self, composer: \"{composer}\"):"))
            .indent()
            .line("self.composer = composer")
            .dedent();
        append_entries(ctx, &receiver, &mut body, op.action, methods.calls(op.action));
        class(
            &mut doc,
            format!("class {}:", names.composer_operations[&op.action]),
            body,
        );
        doc.gap(2);
    }

    let receiver = Receiver {
        composer: "self",
        params: "params".to_string(),
    };
    let mut body = Document::new();
    docstring(
        &mut body,
        &format!(
            "Composer for creating transaction groups for {} contract calls",
            ctx.contract().name
        ),
    );
    body.line(format!("def __init__(self, client: \"{}\"):", names.client))
        .indent()
        .line("self.client = client")
        .line("self._composer = client.algorand.new_group()")
        .line("self._result_mappers: list[typing.Callable[[algokit_utils.ABIReturn | None], object] | None] = []")
        .dedent();

    for op in OPERATIONS.iter().filter(|op| methods.has_calls(op.action)) {
        let namespace = &names.composer_operations[&op.action];
        let mut getter = Document::new();
        getter.line(format!("return {namespace}(self)"));
        body.gap(1).append(
            PyFunction::new(op.attribute, format!("\"{namespace}\""))
                .decorator("property")
                .body(getter)
                .into_document(),
        );
    }
    append_entries(
        ctx,
        &receiver,
        &mut body,
        OnCompleteAction::NoOp,
        methods.calls(OnCompleteAction::NoOp),
    );

    let mut clear = Document::new();
    clear
        .line("self._composer.add_app_call(")
        .indent()
        .line("self.client.params.clear_state(params)")
        .dedent()
        .line(")")
        .line("return self");
    body.gap(1).append(
        PyFunction::new("clear_state", format!("\"{composer}\""))
            .param(BARE_PARAMS)
            .body(clear)
            .into_document(),
    );

    let group_methods = GROUP_METHODS.replace("COMPOSER", composer);
    body.gap(1).append(template(&group_methods));

    class(&mut doc, format!("class {composer}:"), body);
    Ok(doc)
}

fn append_entries(
    ctx: &GeneratorContext,
    receiver: &Receiver,
    body: &mut Document,
    action: OnCompleteAction,
    entries: &[ContractMethod],
) {
    for entry in entries {
        let method = match &entry.abi {
            Some(abi) => abi_method(ctx, receiver, action, abi),
            None => bare_method(ctx, receiver, action),
        };
        body.gap(1).append(method);
    }
}

fn abi_method(
    ctx: &GeneratorContext,
    receiver: &Receiver,
    action: OnCompleteAction,
    method: &AbiContractMethod,
) -> Document {
    let composer = receiver.composer;
    let is_update = action == OnCompleteAction::UpdateApplication;
    let mut function = PyFunction::new(
        method.client_method_name.as_str(),
        format!("\"{}\"", ctx.names().composer),
    );
    let mut forwarded = Vec::new();
    if let Some(args) = args_param(method) {
        function = function.param(args);
        forwarded.push("args=args");
    }
    function = function.param(COMMON_PARAMS);
    forwarded.push("params=params");
    if is_update {
        function = function.param(COMPILATION_PARAMS);
        forwarded.push("compilation_params=compilation_params");
    }

    let mut body = Document::new();
    body.line(format!("{composer}._composer.{}(", add_method(action, true)))
        .indent()
        .line(format!(
            "{composer}.client.{}.{}({})",
            receiver.params,
            method.client_method_name,
            forwarded.join(", ")
        ))
        .dedent()
        .line(")")
        .line(format!("{composer}._result_mappers.append("))
        .indent()
        .line(format!(
            "lambda v: {composer}.client.decode_return_value({}, v)",
            method.signature_literal
        ))
        .dedent()
        .line(")")
        .line(format!("return {composer}"));
    function.body(body).into_document()
}

fn bare_method(ctx: &GeneratorContext, receiver: &Receiver, action: OnCompleteAction) -> Document {
    let composer = receiver.composer;
    let mut function =
        PyFunction::new("bare", format!("\"{}\"", ctx.names().composer)).param(BARE_PARAMS);
    let mut forwarded = vec!["params"];
    if action == OnCompleteAction::UpdateApplication {
        function = function.param(COMPILATION_PARAMS);
        forwarded.push("compilation_params=compilation_params");
    }
    let mut body = Document::new();
    body.line(format!("{composer}._composer.{}(", add_method(action, false)))
        .indent()
        .line(format!(
            "{composer}.client.{}.bare({})",
            receiver.params,
            forwarded.join(", ")
        ))
        .dedent()
        .line(")")
        .line(format!("return {composer}"));
    function.body(body).into_document()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerationMode, GeneratorConfig};
    use serde_json::json;

    fn spec() -> serde_json::Value {
        json!({
            "name": "HelloWorld",
            "methods": [
                {"name": "hello", "args": [{"type": "string", "name": "name"}],
                 "returns": {"type": "string"}, "actions": {"create": [], "call": ["NoOp", "OptIn"]}},
                {"name": "upgrade", "args": [], "returns": {"type": "void"},
                 "actions": {"create": [], "call": ["UpdateApplication"]}}
            ],
            "bareActions": {"create": ["NoOp"], "call": ["NoOp"]}
        })
    }

    fn render(config: GeneratorConfig) -> String {
        let ctx = GeneratorContext::new(&spec(), config).unwrap();
        generate(&ctx).unwrap().render("    ").unwrap()
    }

    #[test]
    fn test_composer_chains_calls() {
        let text = render(GeneratorConfig::default());
        assert!(text.contains("class HelloWorldComposer:\n"));
        assert!(text.contains(
            "        self._composer.add_app_call_method_call(\n            self.client.params.hello(args=args, params=params)\n        )\n"
        ));
        assert!(text.contains(
            "            lambda v: self.client.decode_return_value(\"hello(string)string\", v)\n"
        ));
        assert!(text.contains("            self.client.params.bare(params)\n"));
        assert!(text.contains(") -> \"HelloWorldComposer\":\n        self._composer.add_transaction(txn, signer)\n"));
    }

    #[test]
    fn test_namespaces_return_parent() {
        let text = render(GeneratorConfig::default());
        assert!(text.contains("class _HelloWorldOptInComposer:\n"));
        assert!(text.contains("            self.composer.client.params.opt_in.hello(args=args, params=params)\n"));
        assert!(text.contains(
            "            self.composer.client.params.update.upgrade(params=params, compilation_params=compilation_params)\n"
        ));
        assert!(text.contains("        self.composer._composer.add_app_update_method_call(\n"));
        assert!(text.contains("        return self.composer\n"));
    }

    #[test]
    fn test_minimal_mode_is_empty() {
        assert!(render(GeneratorConfig::default().with_mode(GenerationMode::Minimal)).is_empty());
    }
}
