//! Client IR to a TypeScript module.

use crate::ts::ident::escape_js_string;
use crate::ts::{
    TemplatePart, TsExpr, TsFunction, TsModule, TsObjectProp, TsParam, TsPrimitive, TsProp,
    TsStmt, TsType,
};

use super::normalize::{ClientIr, OperationIr, ParamIr};

/// Used when the document declares no server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:1337/api";

/// Shared runtime of the generated client: response and result shapes, the
/// request options and the fetch wrapper. `{base_url}` is substituted.
const RUNTIME: &str = r#"export type ApiResponse<T> = { status: number; data: T };

export type Normalized<T> = { kind: "recognized"; value: T } | { kind: "unrecognized" };

export type RequestOptions = {
  baseUrl?: string;
  headers?: Record<string, string>;
  fetch?: typeof fetch;
};

export const defaults: RequestOptions = {
  baseUrl: "{base_url}",
  headers: {},
};

function appendQuery(search: URLSearchParams, key: string, value: unknown): void {
  if (value === undefined || value === null) {
    return;
  }
  if (Array.isArray(value)) {
    value.forEach((item, index) => appendQuery(search, `${key}[${index}]`, item));
  } else if (typeof value === "object") {
    for (const [name, item] of Object.entries(value as Record<string, unknown>)) {
      appendQuery(search, `${key}[${name}]`, item);
    }
  } else {
    search.append(key, String(value));
  }
}

function buildUrl(path: string, query: Record<string, unknown>, options?: RequestOptions): string {
  const search = new URLSearchParams();
  for (const [key, value] of Object.entries(query)) {
    appendQuery(search, key, value);
  }
  const qs = search.toString();
  const base = options?.baseUrl ?? defaults.baseUrl ?? "";
  return qs ? `${base}${path}?${qs}` : `${base}${path}`;
}

async function request<T>(
  method: string,
  url: string,
  body: unknown,
  options?: RequestOptions
): Promise<ApiResponse<T>> {
  const headers: Record<string, string> = { ...defaults.headers, ...options?.headers };
  if (body !== undefined) {
    headers["Content-Type"] = "application/json";
  }
  const doFetch = options?.fetch ?? defaults.fetch ?? fetch;
  const response = await doFetch(url, {
    method,
    headers,
    body: body === undefined ? undefined : JSON.stringify(body),
  });
  const text = await response.text();
  let data: unknown = undefined;
  if (text) {
    try {
      data = JSON.parse(text);
    } catch {
      data = text;
    }
  }
  return { status: response.status, data: data as T };
}"#;

/// Name of the exported operation registry.
pub const OPERATIONS_CONST: &str = "operations";

/// Name of the exported map from operation to path template.
pub const OPERATION_PATHS_CONST: &str = "operationPaths";

/// Build the client module: runtime, component types, one async function per
/// operation, the `operations` registry and the `operationPaths` map.
pub fn codegen_module(ir: &ClientIr) -> TsModule {
    let base_url = ir.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let registry = TsExpr::Object(
        ir.operations
            .iter()
            .map(|op| TsObjectProp::Shorthand(op.name.clone()))
            .collect(),
    );

    let paths = TsExpr::Object(
        ir.operations
            .iter()
            .map(|op| TsObjectProp::KeyValue(op.name.clone(), TsExpr::string(&op.path)))
            .collect(),
    );

    TsModule {
        preamble: vec![RUNTIME.replace("{base_url}", &escape_js_string(base_url))],
        types: ir.types.clone(),
        functions: ir.operations.iter().map(codegen_operation).collect(),
        constants: vec![
            (OPERATIONS_CONST.to_string(), registry),
            (OPERATION_PATHS_CONST.to_string(), paths),
        ],
        ..TsModule::default()
    }
}

fn params_type(params: &[&ParamIr]) -> TsType {
    TsType::Object(
        params
            .iter()
            .map(|p| TsProp {
                name: p.name.clone(),
                ty: p.ty.clone(),
                optional: !p.required,
            })
            .collect(),
    )
}

/// `export async function <op>(params, body?, options?): Promise<ApiResponse<T>>`
fn codegen_operation(op: &OperationIr) -> TsFunction {
    let all: Vec<&ParamIr> = op.path_params.iter().chain(&op.query_params).collect();
    let params_required = op.params_required();
    let params = TsExpr::ident("params");
    let access = |name: &str| {
        if params_required {
            params.clone().member(name)
        } else {
            params.clone().optional_member(name)
        }
    };

    let mut params_param = TsParam::new("params", params_type(&all));
    if !params_required {
        params_param = params_param.optional();
    }
    let body_ty = op
        .body
        .clone()
        .unwrap_or(TsType::Primitive(TsPrimitive::Undefined));

    let path = TsExpr::Template(path_template(&op.path, |name| {
        TsExpr::call(
            "encodeURIComponent",
            vec![TsExpr::call("String", vec![access(name)])],
        )
    }));
    let query = TsExpr::Object(
        op.query_params
            .iter()
            .map(|p| TsObjectProp::KeyValue(p.name.clone(), access(&p.name)))
            .collect(),
    );
    let url = TsExpr::call(
        "buildUrl",
        vec![path, query, TsExpr::ident("options")],
    );
    let call = TsExpr::Call {
        callee: Box::new(TsExpr::ident("request")),
        type_args: vec![op.response.clone()],
        args: vec![
            TsExpr::string(op.method.as_str()),
            TsExpr::ident("url"),
            TsExpr::ident("body"),
            TsExpr::ident("options"),
        ],
    };

    let mut function = TsFunction::exported(
        &op.name,
        vec![
            params_param,
            TsParam::new("body", body_ty).optional(),
            TsParam::new("options", TsType::named("RequestOptions")).optional(),
        ],
        TsType::generic(
            "Promise",
            vec![TsType::generic("ApiResponse", vec![op.response.clone()])],
        ),
    )
    .with_doc(op.summary.clone())
    .with_body(vec![
        TsStmt::Const {
            name: "url".into(),
            ty: None,
            init: url,
        },
        TsStmt::Return(Some(call)),
    ]);
    function.is_async = true;
    function
}

/// Split `/tags/{id}` into static text and placeholder expressions.
fn path_template(path: &str, placeholder: impl Fn(&str) -> TsExpr) -> Vec<TemplatePart> {
    let mut parts = Vec::new();
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        if start > 0 {
            parts.push(TemplatePart::Static(rest[..start].to_string()));
        }
        parts.push(TemplatePart::Dynamic(placeholder(&rest[start + 1..start + len])));
        rest = &rest[start + len + 1..];
    }
    if !rest.is_empty() {
        parts.push(TemplatePart::Static(rest.to_string()));
    }
    parts
}
