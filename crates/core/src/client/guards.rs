//! Per-entity guards and response normalizers appended to the client.

use crate::context::EntityNames;
use crate::schema::Entity;
use crate::ts::{
    BinOp, TsExpr, TsFunction, TsLiteral, TsObjectProp, TsParam, TsPrimitive, TsProp, TsStmt,
    TsType,
};

fn any() -> TsType {
    TsType::Primitive(TsPrimitive::Any)
}

fn undefined() -> TsExpr {
    TsExpr::Literal(TsLiteral::Undefined)
}

/// `o != null`
fn present(expr: TsExpr) -> TsExpr {
    expr.binary(BinOp::LooseNotEqual, TsExpr::Literal(TsLiteral::Null))
}

/// `<P> & { id?: number }`
fn identified(names: &EntityNames) -> TsType {
    TsType::Intersection(vec![
        TsType::named(&names.pascal),
        TsType::Object(vec![TsProp {
            name: "id".into(),
            ty: TsType::Primitive(TsPrimitive::Number),
            optional: true,
        }]),
    ])
}

fn predicate(ty: &str) -> TsType {
    TsType::Predicate {
        param: "o".into(),
        ty: Box::new(TsType::named(ty)),
    }
}

/// `is<P>`: any declared attribute key is present.
pub fn is_entity(entity: &Entity, names: &EntityNames) -> TsFunction {
    let o = TsExpr::ident("o");
    let any_key = TsExpr::chain(
        BinOp::Or,
        entity.attributes.iter().map(|attribute| {
            o.clone()
                .member(&attribute.name)
                .binary(BinOp::StrictNotEqual, undefined())
        }),
    );
    let body = match any_key {
        Some(any_key) => present(o).binary(BinOp::And, any_key.paren()),
        None => TsExpr::Literal(TsLiteral::Bool(false)),
    };

    TsFunction::exported(
        format!("is{}", names.pascal),
        vec![TsParam::new("o", any())],
        predicate(&names.pascal),
    )
    .with_body(vec![TsStmt::Return(Some(body))])
}

/// `is<P>Response`: `id` present and the attributes recognized.
pub fn is_response(names: &EntityNames) -> TsFunction {
    let o = TsExpr::ident("o");
    let body = TsExpr::chain(
        BinOp::And,
        [
            present(o.clone()),
            o.clone()
                .member("id")
                .binary(BinOp::StrictNotEqual, undefined()),
            TsExpr::call(format!("is{}", names.pascal), vec![o.member("attributes")]),
        ],
    );

    TsFunction::exported(
        format!("is{}", names.response),
        vec![TsParam::new("o", any())],
        predicate(&names.response),
    )
    .with_body(vec![TsStmt::Return(body)])
}

fn recognized(value: TsExpr) -> TsExpr {
    TsExpr::Object(vec![
        TsObjectProp::KeyValue("kind".into(), TsExpr::string("recognized")),
        TsObjectProp::KeyValue("value".into(), value),
    ])
}

/// `from<P>Response`: flattens a response envelope, passes a bare entity
/// through, and tags anything else as unrecognized.
///
/// The flattened value spreads the same `attributes` object `is<P>Response`
/// checked with `is<P>`, so a recognized value always satisfies `is<P>`.
pub fn from_response(names: &EntityNames) -> TsFunction {
    let data = TsExpr::ident("data");
    let flattened = TsExpr::Object(vec![
        TsObjectProp::KeyValue("id".into(), data.clone().member("id")),
        TsObjectProp::Spread(data.clone().member("attributes")),
    ]);

    TsFunction::exported(
        format!("from{}", names.response),
        vec![TsParam::new("data", any())],
        TsType::generic("Normalized", vec![identified(names)]),
    )
    .with_body(vec![
        TsStmt::If {
            cond: TsExpr::call(format!("is{}", names.response), vec![data.clone()]),
            then_body: vec![TsStmt::Return(Some(recognized(flattened)))],
        },
        TsStmt::If {
            cond: TsExpr::call(format!("is{}", names.pascal), vec![data.clone()]),
            then_body: vec![TsStmt::Return(Some(recognized(data)))],
        },
        TsStmt::Return(Some(TsExpr::Object(vec![TsObjectProp::KeyValue(
            "kind".into(),
            TsExpr::string("unrecognized"),
        )]))),
    ])
}

/// All three functions for one entity.
pub fn entity_guards(entity: &Entity, names: &EntityNames) -> [TsFunction; 3] {
    [
        is_entity(entity, names),
        is_response(names),
        from_response(names),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::parse_entity;
    use crate::ts::{Emit, TsModule};

    fn article() -> (Entity, EntityNames) {
        let entity = parse_entity(
            "article",
            r#"{
                "info": { "singularName": "article", "pluralName": "articles" },
                "attributes": {
                    "title": { "type": "string" },
                    "meta-data": { "type": "json" }
                }
            }"#,
        )
        .unwrap();
        let names = EntityNames::new(&entity);
        (entity, names)
    }

    #[test]
    fn entity_guard_accepts_any_declared_key() {
        let (entity, names) = article();
        assert_eq!(
            is_entity(&entity, &names).emit(),
            "export function isArticle(o: any): o is Article {\n  return o != null && (o.title !== undefined || o[\"meta-data\"] !== undefined);\n}\n"
        );
    }

    #[test]
    fn entity_without_attributes_is_never_recognized() {
        let entity = parse_entity(
            "empty",
            r#"{ "info": { "singularName": "empty", "pluralName": "empties" } }"#,
        )
        .unwrap();
        let names = EntityNames::new(&entity);
        assert!(is_entity(&entity, &names).emit().contains("  return false;\n"));
    }

    #[test]
    fn response_guard_checks_id_and_attributes() {
        let (_, names) = article();
        assert_eq!(
            is_response(&names).emit(),
            "export function isArticleResponse(o: any): o is ArticleResponse {\n  return o != null && o.id !== undefined && isArticle(o.attributes);\n}\n"
        );
    }

    #[test]
    fn from_response_returns_tagged_result() {
        let (_, names) = article();
        let source = from_response(&names).emit();

        assert!(source.starts_with(
            "export function fromArticleResponse(data: any): Normalized<Article & { id?: number }> {\n"
        ));
        assert!(source.contains(
            "  if (isArticleResponse(data)) {\n    return { kind: \"recognized\", value: { id: data.id, ...data.attributes } };\n  }\n"
        ));
        assert!(source.contains(
            "  if (isArticle(data)) {\n    return { kind: \"recognized\", value: data };\n  }\n"
        ));
        assert!(source.ends_with("  return { kind: \"unrecognized\" };\n}\n"));
    }

    /// Keys `is<P>` tests, in emission order.
    fn checked_keys(guard: &str) -> Vec<String> {
        guard
            .split(" !== undefined")
            .filter_map(|part| {
                let access = part.rsplit([' ', '(']).next()?;
                access.strip_prefix("o.").or_else(|| {
                    access.strip_prefix("o[\"")?.strip_suffix("\"]")
                })
            })
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn flattened_response_value_passes_the_entity_guard() {
        let (entity, names) = article();
        let mut module = TsModule::default();
        module.functions.extend(entity_guards(&entity, &names));
        let source = module.emit();

        let is_article = source
            .split("export function ")
            .find(|f| f.starts_with("isArticle("))
            .unwrap();
        assert_eq!(checked_keys(is_article), ["title", "meta-data"]);

        // `value` spreads the object `isArticleResponse` vetted with `isArticle`.
        assert!(source.contains("o.id !== undefined && isArticle(o.attributes);"));
        assert!(source.contains(
            "if (isArticleResponse(data)) {\n    return { kind: \"recognized\", value: { id: data.id, ...data.attributes } };"
        ));
        assert!(
            source.find("export function isArticle(").unwrap()
                < source.find("export function fromArticleResponse(").unwrap()
        );
    }
}
