//! Deploy parameter dataclasses and the `{P}Factory` family. Full mode only.

use super::{args_param, class, decode_return, docstring, on_complete_literal, PyFunction};
use crate::context::GeneratorContext;
use crate::document::Document;
use crate::error::GeneratorResult;
use crate::spec_model::AbiContractMethod;
use algokit_app_spec::OnCompleteAction;

const FACTORY_INIT: &str = "def __init__(self, app_factory: algokit_utils.AppFactory):";
const CREATE_PARAMS: &str = "params: algokit_utils.CommonAppCallCreateParams | None = None";
const COMPILATION_PARAMS: &str =
    "compilation_params: algokit_utils.AppClientCompilationParams | None = None";
const SEND_PARAMS: &str = "send_params: algokit_utils.SendParams | None = None";

/// Names of the deploy parameter classes that exist for one deploy step.
struct DeployParams {
    method_call: Option<String>,
    bare_call: Option<String>,
}

impl DeployParams {
    fn annotation(&self) -> Option<String> {
        let classes: Vec<&str> = self
            .method_call
            .iter()
            .chain(self.bare_call.iter())
            .map(String::as_str)
            .collect();
        (!classes.is_empty()).then(|| classes.join(" | "))
    }
}

pub(crate) fn generate(ctx: &GeneratorContext) -> GeneratorResult<Document> {
    if !ctx.is_full() {
        return Ok(Document::new());
    }
    let mut doc = Document::new();
    let (deploy_params, classes) = deploy_param_classes(ctx);
    doc.append(classes)
        .gap(2)
        .append(factory_class(ctx, &deploy_params))
        .gap(2)
        .append(factory_params(ctx))
        .gap(2)
        .append(factory_create_transaction(ctx))
        .gap(2)
        .append(factory_send(ctx));
    Ok(doc)
}

fn create_actions(ctx: &GeneratorContext) -> Vec<OnCompleteAction> {
    let mut actions: Vec<OnCompleteAction> = ctx
        .methods()
        .creates()
        .iter()
        .flat_map(|m| m.actions.iter().copied())
        .collect();
    actions.sort();
    actions.dedup();
    actions
}

/// `args` union and signature literal union over `methods`.
fn method_call_generics(methods: &[&AbiContractMethod]) -> (String, String) {
    let mut args: Vec<String> = Vec::new();
    for method in methods {
        let ty = match &method.args_class_name {
            Some(class) => format!("{} | {class}", method.args_tuple_type()),
            None => "tuple[()]".to_string(),
        };
        if !args.contains(&ty) {
            args.push(ty);
        }
    }
    let literals: Vec<&str> = methods.iter().map(|m| m.signature_literal.as_str()).collect();
    (
        args.join(" | "),
        format!("typing.Literal[{}]", literals.join(", ")),
    )
}

fn to_params_method(target: &str, abi: bool) -> Document {
    let mut body = Document::new();
    if abi {
        body.line("method_args = _parse_abi_args(self.args)")
            .line(format!("return {target}("))
            .indent()
            .line("**{")
            .indent()
            .line("**self.__dict__,")
            .line("\"method\": self.method,")
            .line("\"args\": method_args,")
            .dedent()
            .line("}")
            .dedent()
            .line(")");
    } else {
        body.line(format!("return {target}(**self.__dict__)"));
    }
    PyFunction::new("to_algokit_utils_params", target)
        .body(body)
        .into_document()
}

fn deploy_param_classes(ctx: &GeneratorContext) -> ([DeployParams; 3], Document) {
    let names = ctx.names();
    let methods = ctx.methods();
    let prefix = &ctx.contract().name;
    let mut doc = Document::new();

    let abi_creates: Vec<&AbiContractMethod> = methods.abi_creates().map(|(m, _)| m).collect();
    let on_complete = format!("{} | None = None", on_complete_literal(&create_actions(ctx)));

    let mut create = DeployParams {
        method_call: None,
        bare_call: None,
    };
    if !abi_creates.is_empty() {
        let (args, literals) = method_call_generics(&abi_creates);
        let mut body = Document::new();
        docstring(&mut body, &format!("Parameters for creating {prefix} contract using ABI"));
        body.line(format!("on_complete: {on_complete}"))
            .gap(1)
            .append(to_params_method("algokit_utils.AppClientMethodCallCreateParams", true));
        doc.line("@dataclasses.dataclass(frozen=True)");
        class(
            &mut doc,
            format!(
                "class {}(algokit_utils.AppClientCreateSchema, algokit_utils.BaseAppClientMethodCallParams[{args}, {literals}]):",
                names.method_call_create_params
            ),
            body,
        );
        doc.gap(2);
        create.method_call = Some(names.method_call_create_params.clone());
    }
    if methods.bare_create().is_some() {
        let mut body = Document::new();
        docstring(&mut body, &format!("Parameters for creating {prefix} contract with bare calls"));
        body.line(format!("on_complete: {on_complete}"))
            .gap(1)
            .append(to_params_method("algokit_utils.AppClientBareCallCreateParams", false));
        doc.line("@dataclasses.dataclass(frozen=True)");
        class(
            &mut doc,
            format!(
                "class {}(algokit_utils.AppClientBareCallCreateParams):",
                names.bare_call_create_params
            ),
            body,
        );
        doc.gap(2);
        create.bare_call = Some(names.bare_call_create_params.clone());
    }

    let mut step = |action: OnCompleteAction, verb: &str, method_call: &str, bare_call: &str| {
        let abi: Vec<&AbiContractMethod> = methods.abi_calls(action).collect();
        let mut params = DeployParams {
            method_call: None,
            bare_call: None,
        };
        if !abi.is_empty() {
            let (args, literals) = method_call_generics(&abi);
            let mut body = Document::new();
            docstring(&mut body, &format!("Parameters for calling {prefix} contract using ABI"));
            body.append(to_params_method("algokit_utils.AppClientMethodCallParams", true));
            doc.line("@dataclasses.dataclass(frozen=True)");
            class(
                &mut doc,
                format!(
                    "class {method_call}(algokit_utils.BaseAppClientMethodCallParams[{args}, {literals}]):"
                ),
                body,
            );
            doc.gap(2);
            params.method_call = Some(method_call.to_string());
        }
        if methods.has_bare_call(action) {
            let mut body = Document::new();
            docstring(&mut body, &format!("Parameters for {verb} {prefix} contract with bare calls"));
            body.append(to_params_method("algokit_utils.AppClientBareCallParams", false));
            doc.line("@dataclasses.dataclass(frozen=True)");
            class(
                &mut doc,
                format!("class {bare_call}(algokit_utils.AppClientBareCallParams):"),
                body,
            );
            doc.gap(2);
            params.bare_call = Some(bare_call.to_string());
        }
        params
    };
    let update = step(
        OnCompleteAction::UpdateApplication,
        "updating",
        names.method_call_update_params.as_str(),
        names.bare_call_update_params.as_str(),
    );
    let delete = step(
        OnCompleteAction::DeleteApplication,
        "deleting",
        names.method_call_delete_params.as_str(),
        names.bare_call_delete_params.as_str(),
    );

    ([create, update, delete], doc)
}

fn factory_class(ctx: &GeneratorContext, deploy_params: &[DeployParams; 3]) -> Document {
    let names = ctx.names();
    let client = &names.client;
    let mut body = Document::new();
    docstring(
        &mut body,
        &format!("Factory for deploying and managing {}Client smart contracts", ctx.contract().name),
    );

    let mut init = Document::new();
    init.line("self.app_factory = algokit_utils.AppFactory(")
        .indent()
        .line("algokit_utils.AppFactoryParams(")
        .indent()
        .lines([
            "algorand=algorand,",
            "app_spec=APP_SPEC,",
            "app_name=app_name,",
            "default_sender=default_sender,",
            "default_signer=default_signer,",
            "version=version,",
            "compilation_params=compilation_params,",
        ])
        .dedent()
        .line(")")
        .dedent()
        .line(")")
        .line(format!("self.params = {}(self.app_factory)", names.factory_params))
        .line(format!(
            "self.create_transaction = {}(self.app_factory)",
            names.factory_create_transaction
        ))
        .line(format!("self.send = {}(self.app_factory)", names.factory_send));
    body.append(
        PyFunction::new("__init__", "None")
            .params([
                "algorand: _AlgoKitAlgorandClient",
                "*",
                "app_name: str | None = None",
                "default_sender: str | None = None",
                "default_signer: TransactionSigner | None = None",
                "version: str | None = None",
                COMPILATION_PARAMS,
            ])
            .body(init)
            .into_document(),
    );

    for (name, ty) in [
        ("app_name", "str"),
        ("app_spec", "algokit_utils.Arc56Contract"),
        ("algorand", "_AlgoKitAlgorandClient"),
    ] {
        let mut getter = Document::new();
        getter.line(format!("return self.app_factory.{name}"));
        body.gap(1).append(
            PyFunction::new(name, ty)
                .decorator("property")
                .body(getter)
                .into_document(),
        );
    }

    let steps = ["create_params", "update_params", "delete_params"];
    let mut deploy = PyFunction::new(
        "deploy",
        format!("tuple[{client}, algokit_utils.AppFactoryDeployResult]"),
    )
    .doc(Some("Deploy the application"))
    .params([
        "*",
        "on_update: algokit_utils.OnUpdate | None = None",
        "on_schema_break: algokit_utils.OnSchemaBreak | None = None",
    ]);
    let mut forwarded = Document::new();
    forwarded
        .line("on_update=on_update,")
        .line("on_schema_break=on_schema_break,");
    for (step, params) in steps.iter().zip(deploy_params) {
        if let Some(annotation) = params.annotation() {
            deploy = deploy.param(format!("{step}: {annotation} | None = None"));
            forwarded.line(format!(
                "{step}={step}.to_algokit_utils_params() if {step} else None,"
            ));
        }
    }
    deploy = deploy.params([
        "existing_deployments: algokit_utils.ApplicationLookup | None = None",
        "ignore_cache: bool = False",
        "app_name: str | None = None",
        COMPILATION_PARAMS,
        SEND_PARAMS,
    ]);
    forwarded.lines([
        "existing_deployments=existing_deployments,",
        "ignore_cache=ignore_cache,",
        "app_name=app_name,",
        "compilation_params=compilation_params,",
        "send_params=send_params,",
    ]);
    let mut deploy_body = Document::new();
    deploy_body
        .line("deploy_response = self.app_factory.deploy(")
        .indent()
        .append(forwarded)
        .dedent()
        .line(")")
        .new_line()
        .line(format!(
            "return {client}(deploy_response[0]), deploy_response[1]"
        ));
    body.gap(1).append(deploy.body(deploy_body).into_document());

    let mut by_id = Document::new();
    by_id
        .line(format!("return {client}("))
        .indent()
        .line("self.app_factory.get_app_client_by_id(")
        .indent()
        .lines([
            "app_id,",
            "app_name,",
            "default_sender,",
            "default_signer,",
            "approval_source_map,",
            "clear_source_map,",
        ])
        .dedent()
        .line(")")
        .dedent()
        .line(")");
    body.gap(1).append(
        PyFunction::new("get_app_client_by_id", client.as_str())
            .doc(Some("Get an app client by app ID"))
            .params([
                "app_id: int",
                "app_name: str | None = None",
                "default_sender: str | None = None",
                "default_signer: TransactionSigner | None = None",
                "approval_source_map: SourceMap | None = None",
                "clear_source_map: SourceMap | None = None",
            ])
            .body(by_id)
            .into_document(),
    );

    let mut by_name = Document::new();
    by_name
        .line(format!("return {client}("))
        .indent()
        .line("self.app_factory.get_app_client_by_creator_and_name(")
        .indent()
        .lines([
            "creator_address,",
            "app_name,",
            "default_sender,",
            "default_signer,",
            "ignore_cache,",
            "app_lookup_cache,",
            "approval_source_map,",
            "clear_source_map,",
        ])
        .dedent()
        .line(")")
        .dedent()
        .line(")");
    body.gap(1).append(
        PyFunction::new("get_app_client_by_creator_and_name", client.as_str())
            .doc(Some("Get an app client by creator address and name"))
            .params([
                "creator_address: str",
                "app_name: str",
                "default_sender: str | None = None",
                "default_signer: TransactionSigner | None = None",
                "ignore_cache: bool | None = None",
                "app_lookup_cache: algokit_utils.ApplicationLookup | None = None",
                "approval_source_map: SourceMap | None = None",
                "clear_source_map: SourceMap | None = None",
            ])
            .body(by_name)
            .into_document(),
    );

    let mut doc = Document::new();
    class(&mut doc, format!("class {}:", names.factory), body);
    doc
}

fn factory_init(attributes: &[(&str, &str)]) -> Document {
    let mut body = Document::new();
    body.line("self.app_factory = app_factory");
    for (attribute, class_name) in attributes {
        body.line(format!("self.{attribute} = {class_name}(app_factory)"));
    }
    let mut doc = Document::new();
    doc.line(FACTORY_INIT).indent().append(body).dedent();
    doc
}

/// Parameters shared by the create methods of every factory namespace.
fn create_method(
    method: Option<&AbiContractMethod>,
    actions: &[OnCompleteAction],
    returns: String,
    extra: &[&str],
) -> PyFunction {
    let name = method.map_or("bare", |m| m.client_method_name.as_str());
    let mut function = PyFunction::new(name, returns);
    if let Some(args) = method.and_then(args_param) {
        function = function.param(args);
    }
    function
        .params([
            "*".to_string(),
            format!("on_complete: {} | None = None", on_complete_literal(actions)),
            CREATE_PARAMS.to_string(),
        ])
        .params(extra.iter().copied())
}

/// `algokit_utils.AppFactoryCreate*Params(...)` built from the method arguments.
fn create_params_expr(method: Option<&AbiContractMethod>) -> Document {
    let mut doc = Document::new();
    match method {
        Some(method) => {
            let args = if method.args_class_name.is_some() {
                "_parse_abi_args(args)"
            } else {
                "None"
            };
            doc.line("algokit_utils.AppFactoryCreateMethodCallParams(")
                .indent()
                .line("**{")
                .indent()
                .line("**dataclasses.asdict(params),")
                .line(format!("\"method\": {},", method.signature_literal))
                .line(format!("\"args\": {args},"))
                .line("\"on_complete\": on_complete,")
                .dedent()
                .line("}")
                .dedent()
                .line("),");
        }
        None => {
            doc.line(
                "algokit_utils.AppFactoryCreateParams(**dataclasses.asdict(params), on_complete=on_complete),",
            );
        }
    }
    doc
}

fn factory_params(ctx: &GeneratorContext) -> Document {
    let names = ctx.names();
    let methods = ctx.methods();
    let contract = &ctx.contract().name;
    let mut doc = Document::new();

    let mut body = Document::new();
    docstring(&mut body, &format!("Parameters for creating transactions for {contract} contract"));
    body.append(factory_init(&[
        ("create", names.factory_create_params.as_str()),
        ("update", names.factory_update_params.as_str()),
        ("delete", names.factory_delete_params.as_str()),
    ]));
    class(&mut doc, format!("class {}:", names.factory_params), body);

    let mut create = Document::new();
    docstring(&mut create, &format!("Parameters for 'create' operations of {contract} contract"));
    create.line(FACTORY_INIT).indent().line("self.app_factory = app_factory").dedent();
    for entry in methods.creates() {
        let abi = entry.abi.as_deref();
        let returns = if abi.is_some() {
            "algokit_utils.AppCreateMethodCallParams"
        } else {
            "algokit_utils.AppCreateParams"
        };
        let summary = match abi {
            Some(m) => format!("Creates a new instance using the {} ABI method", m.signature),
            None => "Creates an instance using a bare call".to_string(),
        };
        let target = if abi.is_some() {
            "self.app_factory.params.create("
        } else {
            "self.app_factory.params.bare.create("
        };
        let mut call = Document::new();
        call.line("params = params or algokit_utils.CommonAppCallCreateParams()")
            .line(format!("return {target}"))
            .indent()
            .append(create_params_expr(abi))
            .line("compilation_params=compilation_params,")
            .dedent()
            .line(")");
        create.gap(1).append(
            create_method(abi, &entry.actions, returns.to_string(), &[COMPILATION_PARAMS])
                .doc(Some(summary))
                .body(call)
                .into_document(),
        );
    }
    doc.gap(2);
    class(&mut doc, format!("class {}:", names.factory_create_params), create);

    for (class_name, action, operation, returns) in [
        (
            &names.factory_update_params,
            OnCompleteAction::UpdateApplication,
            "deploy_update",
            "algokit_utils.AppUpdateParams",
        ),
        (
            &names.factory_delete_params,
            OnCompleteAction::DeleteApplication,
            "deploy_delete",
            "algokit_utils.AppDeleteParams",
        ),
    ] {
        let mut body = Document::new();
        docstring(
            &mut body,
            &format!("Parameters for '{}' operations of {contract} contract", app_verb(action)),
        );
        body.line(FACTORY_INIT).indent().line("self.app_factory = app_factory").dedent();
        if methods.has_bare_call(action) {
            let mut call = Document::new();
            call.line("params = params or algokit_utils.CommonAppCallParams()")
                .line(format!(
                    "return self.app_factory.params.bare.{operation}("
                ))
                .indent()
                .line("algokit_utils.AppClientBareCallParams(**dataclasses.asdict(params)),")
                .dedent()
                .line(")");
            body.gap(1).append(
                PyFunction::new("bare", returns)
                    .doc(Some(format!("{} an existing instance using a bare call", capitalized_verb(action))))
                    .param("*")
                    .param("params: algokit_utils.CommonAppCallParams | None = None")
                    .body(call)
                    .into_document(),
            );
        }
        doc.gap(2);
        class(&mut doc, format!("class {class_name}:"), body);
    }
    doc
}

fn app_verb(action: OnCompleteAction) -> &'static str {
    match action {
        OnCompleteAction::UpdateApplication => "update",
        _ => "delete",
    }
}

fn capitalized_verb(action: OnCompleteAction) -> &'static str {
    match action {
        OnCompleteAction::UpdateApplication => "Updates",
        _ => "Deletes",
    }
}

fn factory_create_transaction(ctx: &GeneratorContext) -> Document {
    let names = ctx.names();
    let contract = &ctx.contract().name;
    let mut doc = Document::new();

    let mut body = Document::new();
    docstring(&mut body, &format!("Create transactions for {contract} contract"));
    body.append(factory_init(&[("create", names.factory_create_transaction_create.as_str())]));
    class(&mut doc, format!("class {}:", names.factory_create_transaction), body);

    let mut create = Document::new();
    docstring(&mut create, &format!("Create new instances of {contract} contract"));
    create.line(FACTORY_INIT).indent().line("self.app_factory = app_factory").dedent();
    if let Some(bare) = ctx.methods().bare_create() {
        let mut call = Document::new();
        call.line("params = params or algokit_utils.CommonAppCallCreateParams()")
            .line("return self.app_factory.create_transaction.bare.create(")
            .indent()
            .append(create_params_expr(None))
            .dedent()
            .line(")");
        create.gap(1).append(
            create_method(None, &bare.actions, "Transaction".to_string(), &[])
                .doc(Some("Creates a new instance using a bare call"))
                .body(call)
                .into_document(),
        );
    }
    doc.gap(2);
    class(
        &mut doc,
        format!("class {}:", names.factory_create_transaction_create),
        create,
    );
    doc
}

fn factory_send(ctx: &GeneratorContext) -> Document {
    let names = ctx.names();
    let client = &names.client;
    let contract = &ctx.contract().name;
    let mut doc = Document::new();

    let mut body = Document::new();
    docstring(&mut body, &format!("Send calls to {contract} contract"));
    body.append(factory_init(&[("create", names.factory_send_create.as_str())]));
    class(&mut doc, format!("class {}:", names.factory_send), body);

    let mut create = Document::new();
    docstring(&mut create, &format!("Send create calls to {contract} contract"));
    create.line(FACTORY_INIT).indent().line("self.app_factory = app_factory").dedent();
    for entry in ctx.methods().creates() {
        let abi = entry.abi.as_deref();
        let mut call = Document::new();
        call.line("params = params or algokit_utils.CommonAppCallCreateParams()");
        let (returns, summary) = match abi {
            Some(method) => {
                call.line("client, result = self.app_factory.send.create(")
                    .indent()
                    .append(create_params_expr(Some(method)))
                    .line("send_params=send_params,")
                    .line("compilation_params=compilation_params,")
                    .dedent()
                    .line(")")
                    .line(format!(
                        "return_value = {}",
                        decode_return(ctx, method, "result.abi_return")
                    ))
                    .new_line()
                    .line(format!(
                        "return {client}(client), dataclasses.replace(result, abi_return=return_value)  # type: ignore"
                    ));
                (
                    format!(
                        "tuple[{client}, algokit_utils.AppFactoryCreateMethodCallResult[{}]]",
                        method.return_type
                    ),
                    format!("Creates and sends a transaction using the {} ABI method", method.signature),
                )
            }
            None => {
                call.line("result = self.app_factory.send.bare.create(")
                    .indent()
                    .append(create_params_expr(None))
                    .line("send_params=send_params,")
                    .line("compilation_params=compilation_params,")
                    .dedent()
                    .line(")")
                    .line(format!("return {client}(result[0]), result[1]"));
                (
                    format!("tuple[{client}, algokit_utils.SendAppCreateTransactionResult]"),
                    "Creates a new instance using a bare call".to_string(),
                )
            }
        };
        create.gap(1).append(
            create_method(abi, &entry.actions, returns, &[SEND_PARAMS, COMPILATION_PARAMS])
                .doc(Some(summary))
                .body(call)
                .into_document(),
        );
    }
    doc.gap(2);
    class(&mut doc, format!("class {}:", names.factory_send_create), create);
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
            "methods": [
                {"name": "create", "args": [{"type": "string", "name": "greeting"}],
                 "returns": {"type": "void"}, "actions": {"create": ["NoOp", "OptIn"], "call": []}},
                {"name": "hello", "args": [{"type": "string", "name": "name"}],
                 "returns": {"type": "string"}, "actions": {"create": [], "call": ["NoOp"]}},
                {"name": "upgrade", "args": [], "returns": {"type": "void"},
                 "actions": {"create": [], "call": ["UpdateApplication"]}}
            ],
            "bareActions": {"create": ["NoOp"], "call": ["DeleteApplication"]}
        })
    }

    fn render(config: GeneratorConfig) -> String {
        let ctx = GeneratorContext::new(&spec(), config).unwrap();
        generate(&ctx).unwrap().render("    ").unwrap()
    }

    #[test]
    fn test_minimal_mode_is_empty() {
        assert!(render(GeneratorConfig::default().with_mode(GenerationMode::Minimal)).is_empty());
    }

    #[test]
    fn test_deploy_param_classes() {
        let text = render(GeneratorConfig::default());
        assert!(text.contains(
            "class HelloWorldMethodCallCreateParams(algokit_utils.AppClientCreateSchema, algokit_utils.BaseAppClientMethodCallParams[tuple[str] | CreateArgs, typing.Literal[\"create(string)void\"]]):\n"
        ));
        assert!(text.contains("    on_complete: typing.Literal[OnComplete.NoOpOC, OnComplete.OptInOC] | None = None\n"));
        assert!(text.contains("class HelloWorldBareCallCreateParams(algokit_utils.AppClientBareCallCreateParams):\n"));
        assert!(text.contains("class HelloWorldMethodCallUpdateParams(algokit_utils.BaseAppClientMethodCallParams[tuple[()], typing.Literal[\"upgrade()void\"]]):\n"));
        assert!(text.contains("class HelloWorldBareCallDeleteParams(algokit_utils.AppClientBareCallParams):\n"));
        assert!(!text.contains("HelloWorldBareCallUpdateParams"));
        assert!(!text.contains("HelloWorldMethodCallDeleteParams"));
    }

    #[test]
    fn test_deploy_signature() {
        let text = render(GeneratorConfig::default());
        assert!(text.contains(
            "        create_params: HelloWorldMethodCallCreateParams | HelloWorldBareCallCreateParams | None = None,\n"
        ));
        assert!(text.contains("        update_params: HelloWorldMethodCallUpdateParams | None = None,\n"));
        assert!(text.contains("            delete_params=delete_params.to_algokit_utils_params() if delete_params else None,\n"));
        assert!(text.contains("        return HelloWorldClient(deploy_response[0]), deploy_response[1]\n"));
    }

    #[test]
    fn test_factory_namespaces() {
        let text = render(GeneratorConfig::default());
        assert!(text.contains("class HelloWorldFactory:\n"));
        assert!(text.contains("        self.create = HelloWorldFactoryCreateParams(app_factory)\n"));
        assert!(text.contains("                \"method\": \"create(string)void\",\n"));
        assert!(text.contains("        return self.app_factory.params.bare.deploy_delete(\n"));
        assert!(text.contains("class HelloWorldFactorySendCreate:\n"));
        assert!(text.contains("tuple[HelloWorldClient, algokit_utils.AppFactoryCreateMethodCallResult[None]]"));
        assert!(text.contains("        return HelloWorldClient(result[0]), result[1]\n"));
    }
}
