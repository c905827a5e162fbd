//! Source text for TypeScript nodes.

use super::ast::{
    BinOp, ImportItem, TemplatePart, TsExport, TsExpr, TsFunction, TsImport, TsLiteral, TsModule,
    TsObjectProp, TsParam, TsPrimitive, TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind,
};
use super::ident::{escape_js_string, property_access, quote_if_needed};

/// Convert a node to TypeScript source.
pub trait Emit {
    /// Source text of the node.
    fn emit(&self) -> String;
}

fn join<T: Emit>(items: &[T], sep: &str) -> String {
    items.iter().map(Emit::emit).collect::<Vec<_>>().join(sep)
}

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Null => "null",
            TsPrimitive::Undefined => "undefined",
            TsPrimitive::Void => "void",
            TsPrimitive::Unknown => "unknown",
            TsPrimitive::Any => "any",
        }
        .to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Number(n) => n.to_string(),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
            TsLiteral::Undefined => "undefined".to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => match **inner {
                TsType::Union(_) | TsType::Intersection(_) => format!("({})[]", inner.emit()),
                _ => format!("{}[]", inner.emit()),
            },
            TsType::Union(types) => join(types, " | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| match t {
                    TsType::Union(_) => format!("({})", t.emit()),
                    _ => t.emit(),
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object(props) if props.is_empty() => "{}".to_string(),
            TsType::Object(props) => format!("{{ {} }}", join(props, "; ")),
            TsType::Record { key, value } => format!("Record<{}, {}>", key.emit(), value.emit()),
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
            TsType::Generic { name, args } => format!("{name}<{}>", join(args, ", ")),
            TsType::Predicate { param, ty } => format!("{param} is {}", ty.emit()),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        format!("{}{opt}: {}", quote_if_needed(&self.name), self.ty.emit())
    }
}

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        match &self.kind {
            TypeDefKind::Interface { properties } => {
                let mut output = format!("export interface {} {{\n", self.name);
                for prop in properties {
                    output.push_str(&format!("  {};\n", prop.emit()));
                }
                output.push_str("}\n");
                output
            }
            TypeDefKind::TypeAlias { ty } => format!("export type {} = {};\n", self.name, ty.emit()),
        }
    }
}

impl Emit for BinOp {
    fn emit(&self) -> String {
        match self {
            BinOp::StrictEqual => "===",
            BinOp::StrictNotEqual => "!==",
            BinOp::LooseNotEqual => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
        .to_string()
    }
}

impl Emit for TsObjectProp {
    fn emit(&self) -> String {
        match self {
            TsObjectProp::KeyValue(key, value) => {
                format!("{}: {}", quote_if_needed(key), value.emit())
            }
            TsObjectProp::Shorthand(key) => key.clone(),
            TsObjectProp::Spread(expr) => format!("...{}", expr.emit()),
        }
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Call {
                callee,
                type_args,
                args,
            } => {
                let type_args = if type_args.is_empty() {
                    String::new()
                } else {
                    format!("<{}>", join(type_args, ", "))
                };
                format!("{}{type_args}({})", callee.emit(), join(args, ", "))
            }
            TsExpr::Object(props) if props.is_empty() => "{}".to_string(),
            TsExpr::Object(props) => format!("{{ {} }}", join(props, ", ")),
            TsExpr::Member { object, prop } => property_access(&object.emit(), prop, false),
            TsExpr::OptionalMember { object, prop } => property_access(&object.emit(), prop, true),
            TsExpr::Template(parts) => {
                let content: String = parts
                    .iter()
                    .map(|part| match part {
                        TemplatePart::Static(s) => s.replace('`', "\\`"),
                        TemplatePart::Dynamic(e) => format!("${{{}}}", e.emit()),
                    })
                    .collect();
                format!("`{content}`")
            }
            TsExpr::Await(expr) => format!("await {}", expr.emit()),
            TsExpr::BinOp { left, op, right } => {
                format!("{} {} {}", left.emit(), op.emit(), right.emit())
            }
            TsExpr::Not(expr) => format!("!{}", expr.emit()),
            TsExpr::Paren(expr) => format!("({})", expr.emit()),
            TsExpr::Array(items) => format!("[{}]", join(items, ", ")),
            TsExpr::Cast { expr, ty } => format!("{} as {}", expr.emit(), ty.emit()),
            TsExpr::Raw(code) => code.clone(),
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        let opt = if self.optional { "?" } else { "" };
        match &self.ty {
            Some(ty) => format!("{}{opt}: {}", self.name, ty.emit()),
            None => format!("{}{opt}", self.name),
        }
    }
}

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl TsStmt {
    /// Two spaces per level.
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            TsStmt::Const { name, ty, init } => {
                let ty = ty.as_ref().map(|t| format!(": {}", t.emit())).unwrap_or_default();
                format!("{prefix}const {name}{ty} = {};\n", init.emit())
            }
            TsStmt::Expr(expr) => format!("{prefix}{};\n", expr.emit()),
            TsStmt::Return(Some(expr)) => format!("{prefix}return {};\n", expr.emit()),
            TsStmt::Return(None) => format!("{prefix}return;\n"),
            TsStmt::If { cond, then_body } => {
                let mut output = format!("{prefix}if ({}) {{\n", cond.emit());
                for stmt in then_body {
                    output.push_str(&stmt.emit_indented(indent + 1));
                }
                output.push_str(&format!("{prefix}}}\n"));
                output
            }
            TsStmt::Raw(code) => code
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        "\n".to_string()
                    } else {
                        format!("{prefix}{line}\n")
                    }
                })
                .collect(),
        }
    }
}

impl Emit for TsFunction {
    fn emit(&self) -> String {
        let export = if self.is_export { "export " } else { "" };
        let async_kw = if self.is_async { "async " } else { "" };
        let type_params = if self.type_params.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.type_params.join(", "))
        };
        let return_type = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();

        let mut output = self
            .doc
            .as_deref()
            .map(|doc| format!("/** {} */\n", doc.replace("*/", "*\\/").replace('\n', " ")))
            .unwrap_or_default();
        output.push_str(&format!(
            "{export}{async_kw}function {}{type_params}({}){return_type}",
            self.name,
            join(&self.params, ", ")
        ));
        if self.body.is_empty() {
            output.push_str(" {}\n");
        } else {
            output.push_str(" {\n");
            for stmt in &self.body {
                output.push_str(&stmt.emit_indented(1));
            }
            output.push_str("}\n");
        }
        output
    }
}

impl Emit for ImportItem {
    fn emit(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {alias}", self.name),
            None => self.name.clone(),
        }
    }
}

impl Emit for TsImport {
    fn emit(&self) -> String {
        let type_kw = if self.type_only { "type " } else { "" };
        format!("import {type_kw}{{ {} }} from \"{}\";\n", join(&self.items, ", "), self.from)
    }
}

impl Emit for TsExport {
    fn emit(&self) -> String {
        let type_kw = if self.type_only { "type " } else { "" };
        format!("export {type_kw}{{ {} }} from \"{}\";\n", join(&self.items, ", "), self.from)
    }
}

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut output = String::new();

        for import in &self.imports {
            output.push_str(&import.emit());
        }
        if !self.imports.is_empty() {
            output.push('\n');
        }

        for block in &self.preamble {
            output.push_str(block.trim_end());
            output.push_str("\n\n");
        }

        for type_def in &self.types {
            output.push_str(&type_def.emit());
            output.push('\n');
        }

        for func in &self.functions {
            output.push_str(&func.emit());
            output.push('\n');
        }

        for (name, value) in &self.constants {
            output.push_str(&format!("export const {name} = {};\n\n", value.emit()));
        }

        for export in &self.exports {
            output.push_str(&export.emit());
        }

        output
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn emits_types() {
        let record = TsType::unknown_record();
        assert_eq!(record.emit(), "Record<string, unknown>");

        let union_array = TsType::Array(Box::new(TsType::named("Tag").nullable()));
        assert_eq!(union_array.emit(), "(Tag | null)[]");

        let promise = TsType::generic(
            "Promise",
            vec![TsType::generic("ApiResponse", vec![TsType::named("Article")])],
        );
        assert_eq!(promise.emit(), "Promise<ApiResponse<Article>>");

        let predicate = TsType::Predicate {
            param: "o".into(),
            ty: Box::new(TsType::named("Article")),
        };
        assert_eq!(predicate.emit(), "o is Article");
    }

    #[test]
    fn emits_interface_with_quoted_keys() {
        let def = TsTypeDef {
            name: "Article".into(),
            kind: TypeDefKind::Interface {
                properties: vec![
                    TsProp {
                        name: "title".into(),
                        ty: TsType::Primitive(TsPrimitive::String),
                        optional: false,
                    },
                    TsProp {
                        name: "meta-data".into(),
                        ty: TsType::unknown_record(),
                        optional: true,
                    },
                ],
            },
        };
        assert_eq!(
            def.emit(),
            "export interface Article {\n  title: string;\n  \"meta-data\"?: Record<string, unknown>;\n}\n"
        );
    }

    #[test]
    fn emits_guard_expression() {
        let o = TsExpr::ident("o");
        let any_key = TsExpr::chain(
            BinOp::Or,
            ["title", "slug"].map(|name| {
                o.clone()
                    .member(name)
                    .binary(BinOp::StrictNotEqual, TsExpr::Literal(TsLiteral::Undefined))
            }),
        )
        .unwrap();
        let guard = o
            .binary(BinOp::LooseNotEqual, TsExpr::Literal(TsLiteral::Null))
            .binary(BinOp::And, any_key.paren());
        assert_eq!(
            guard.emit(),
            "o != null && (o.title !== undefined || o.slug !== undefined)"
        );
    }

    #[test]
    fn emits_object_with_spread() {
        let data = TsExpr::ident("data");
        let value = TsExpr::Object(vec![
            TsObjectProp::KeyValue("id".into(), data.clone().member("id")),
            TsObjectProp::Spread(data.member("attributes")),
        ]);
        assert_eq!(value.emit(), "{ id: data.id, ...data.attributes }");
    }

    #[test]
    fn emits_function_and_module() {
        let func = TsFunction::exported(
            "isTag",
            vec![TsParam::new("o", TsType::Primitive(TsPrimitive::Any))],
            TsType::Predicate {
                param: "o".into(),
                ty: Box::new(TsType::named("Tag")),
            },
        )
        .with_body(vec![TsStmt::Return(Some(TsExpr::Literal(TsLiteral::Bool(false))))]);

        let module = TsModule {
            imports: vec![TsImport::types(["Tag"], "./client")],
            functions: vec![func],
            exports: vec![TsExport::named("TagList", "./TagList")],
            ..TsModule::default()
        };

        assert_eq!(
            module.emit(),
            "import type { Tag } from \"./client\";\n\n\
             export function isTag(o: any): o is Tag {\n  return false;\n}\n\n\
             export { TagList } from \"./TagList\";\n"
        );
    }

    #[test]
    fn emits_nested_if() {
        let stmt = TsStmt::If {
            cond: TsExpr::call("isTag", vec![TsExpr::ident("data")]),
            then_body: vec![TsStmt::Return(Some(TsExpr::ident("data")))],
        };
        assert_eq!(stmt.emit_indented(1), "  if (isTag(data)) {\n    return data;\n  }\n");
    }
}
