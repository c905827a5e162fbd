//! Form, main, list and index artifacts of one entity.

use std::collections::{BTreeMap, BTreeSet};

use crate::context::{EntityNames, GenerationContext};
use crate::resolve::{Primitive, RelationTarget, TypeSignature};
use crate::schema::Entity;
use crate::ts::ident::property_access;
use crate::ts::{
    Emit, TsExport, TsImport, TsModule, TsPrimitive, TsProp, TsType, TsTypeDef, TypeDefKind,
};

use super::template::{ComponentNode, Markup, js_string};

/// Named imports grouped by module, values and types kept apart.
#[derive(Debug, Default)]
pub(crate) struct ImportSet {
    values: BTreeMap<String, BTreeSet<String>>,
    types: BTreeMap<String, BTreeSet<String>>,
}

impl ImportSet {
    pub fn value(&mut self, name: impl Into<String>, from: impl Into<String>) {
        self.values.entry(from.into()).or_default().insert(name.into());
    }

    pub fn ty(&mut self, name: impl Into<String>, from: impl Into<String>) {
        self.types.entry(from.into()).or_default().insert(name.into());
    }

    pub fn into_imports(self) -> Vec<TsImport> {
        let values = self
            .values
            .into_iter()
            .map(|(from, names)| TsImport::named(names, from));
        let types = self
            .types
            .into_iter()
            .map(|(from, names)| TsImport::types(names, from));
        values.chain(types).collect()
    }
}

fn attribute_module(component: &str) -> String {
    format!("./Attributes/{component}")
}

/// `<P>Form`: every scalar input, each behind its own `hide` test.
pub(crate) fn form_node(entity: &Entity, names: &EntityNames) -> ComponentNode {
    let mut imports = ImportSet::default();
    imports.value("Form", "solid-bootstrap");
    imports.ty(&names.type_name, format!("./{}", names.pascal));

    let mut markup = Markup::new();
    markup.open("<Form>").line("<Form.Text>{props.label}</Form.Text>");
    for attribute in entity.scalar_attributes() {
        let input = names.attribute_input(&attribute.name);
        imports.value(&input, attribute_module(&input));
        markup.shown_unless_hidden(&attribute.name, None, |m| {
            m.line(format!(
                "<{input} {camel}={{props.{camel}}} onChange={{(value) => props.onChange?.({name}, value)}} />",
                camel = names.camel,
                name = js_string(&attribute.name),
            ));
        });
    }
    markup.line("{props.children}").close("</Form>");

    let mut node = ComponentNode::new(&names.form)
        .solid(&["Show"])
        .imports(&imports.into_imports())
        .prop(format!("{}?: {}", names.camel, names.type_name))
        .prop("label?: string")
        .prop("onChange?: (name: string, value: unknown) => void")
        .prop("hide?: string[]");
    node.content = markup.finish();
    node
}

/// Declared type of the entity: every attribute optional, plus `id`.
pub fn entity_type(ctx: &GenerationContext, entity: &Entity, names: &EntityNames) -> TsTypeDef {
    let mut props = vec![TsProp {
        name: "id".into(),
        ty: TsType::Primitive(TsPrimitive::Number),
        optional: true,
    }];
    props.extend(entity.attributes.iter().map(|attribute| TsProp {
        name: attribute.name.clone(),
        ty: ctx.ts_type(&ctx.signature(attribute)),
        optional: true,
    }));

    TsTypeDef {
        name: names.type_name.clone(),
        kind: TypeDefKind::TypeAlias {
            ty: TsType::Object(props),
        },
    }
}

/// Rendered form of an attribute value inside its display node.
fn display_value(signature: &TypeSignature, access: &str) -> String {
    match signature {
        TypeSignature::Primitive(Primitive::Map) => format!("{{JSON.stringify({access} ?? {{}})}}"),
        _ => format!("{{String({access} ?? \"\")}}"),
    }
}

/// `<P>`: declares `<P>T`, renders every scalar through its display node and
/// embeds the target node of every relation.
pub(crate) fn main_node(ctx: &GenerationContext, entity: &Entity, names: &EntityNames) -> ComponentNode {
    let mut imports = ImportSet::default();
    let camel = &names.camel;
    let value = format!("props.{camel}");

    let mut markup = Markup::new();
    markup.open(format!("<div class=\"{}-container\">", names.kebab));

    for attribute in entity.scalar_attributes() {
        let component = names.attribute_component(&attribute.name);
        imports.value(&component, attribute_module(&component));
        let access = property_access(&value, &attribute.name, true);
        let rendered = display_value(&ctx.signature(attribute), &access);
        markup.shown_unless_hidden(&attribute.name, Some(&value), |m| {
            m.open(format!("<{component} {camel}={{{value}}} hide={{props.hide}}>"))
                .line(rendered)
                .close(format!("</{component}>"));
        });
    }

    markup.line("{/* relations */}");
    for (attribute, _) in entity.relation_attributes() {
        let signature = ctx.signature(attribute);
        let Some(target) = signature.target() else {
            continue;
        };
        let access = property_access(&value, &attribute.name, true);
        if let RelationTarget::Unresolved(_) = target {
            // No component exists for targets outside the graph.
            markup.shown_unless_hidden(&attribute.name, None, |m| {
                m.line(format!("{{JSON.stringify({access} ?? {{}})}}"));
            });
            continue;
        }
        let target_names = ctx.target_names(target);
        let own = target_names.pascal == names.pascal;
        let dir = if own {
            ".".to_string()
        } else {
            format!("../{}", target_names.pascal)
        };

        let (component, prop) = if signature.is_array() {
            (target_names.list.clone(), target_names.plural_camel.clone())
        } else {
            (target_names.pascal.clone(), target_names.camel.clone())
        };
        if !(own && component == names.pascal) {
            imports.value(&component, format!("{dir}/{component}"));
        }
        if !own {
            imports.ty(&target_names.type_name, format!("{dir}/{}", target_names.pascal));
        }

        markup.shown_unless_hidden(&attribute.name, None, |m| {
            m.line(format!("<{component} {prop}={{{access}}} />"));
        });
    }
    markup.line("{props.children}").close("</div>");

    let declared = entity_type(ctx, entity, names);
    let mut node = ComponentNode::new(&names.pascal)
        .solid(&["Show"])
        .imports(&imports.into_imports())
        .prop(format!("{camel}?: {}", names.type_name))
        .prop("hide?: string[]");
    node.pre_code = declared.emit();
    node.content = markup.finish();
    node
}

/// `<P>List`: one main node per item.
pub(crate) fn list_node(names: &EntityNames) -> ComponentNode {
    let mut imports = ImportSet::default();
    let main_module = format!("./{}", names.pascal);
    imports.value(&names.pascal, &main_module);
    imports.ty(&names.type_name, &main_module);

    let item = format!("{}Item", names.camel);
    let mut markup = Markup::new();
    markup
        .open(format!("<div class=\"{}-list-container\">", names.kebab))
        .open("<ul>")
        .open(format!("<For each={{props.{} ?? []}}>", names.plural_camel))
        .open(format!("{{({item}) => ("))
        .open("<li>")
        .line(format!(
            "<{} {}={{{item}}} hide={{props.hide}} />",
            names.pascal, names.camel
        ))
        .close("</li>")
        .close(")}")
        .close("</For>")
        .close("</ul>")
        .line("{props.children}")
        .close("</div>");

    let mut node = ComponentNode::new(&names.list)
        .solid(&["For"])
        .imports(&imports.into_imports())
        .prop(format!("{}?: {}[]", names.plural_camel, names.type_name))
        .prop("hide?: string[]");
    node.content = markup.finish();
    node
}

/// `index.tsx` re-exporting every artifact of the entity.
pub(crate) fn index_module(entity: &Entity, names: &EntityNames) -> TsModule {
    let mut exports = Vec::new();
    for attribute in entity.scalar_attributes() {
        let display = names.attribute_component(&attribute.name);
        let input = names.attribute_input(&attribute.name);
        exports.push(TsExport::named(&display, attribute_module(&display)));
        exports.push(TsExport::named(&input, attribute_module(&input)));
    }
    exports.push(TsExport::named(&names.form, format!("./{}", names.form)));
    exports.push(TsExport::named(&names.list, format!("./{}", names.list)));
    exports.push(TsExport::named(&names.pascal, format!("./{}", names.pascal)));
    exports.push(TsExport::types(&names.type_name, format!("./{}", names.pascal)));

    TsModule {
        exports,
        ..TsModule::default()
    }
}
