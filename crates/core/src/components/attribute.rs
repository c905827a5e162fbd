//! Display and input nodes for one scalar attribute.

use crate::context::EntityNames;
use crate::resolve::InputControl;
use crate::schema::Attribute;
use crate::ts::TsImport;
use crate::ts::ident::property_access;

use super::template::{ComponentNode, Markup, Signal, js_string, jsx_text};

/// Import path of the entity's main node, seen from `Attributes/`.
fn main_module(names: &EntityNames) -> String {
    format!("../{}", names.pascal)
}

/// `<P><Attr>`: wraps whatever the parent renders for the attribute.
pub(crate) fn display_node(names: &EntityNames, attribute: &Attribute) -> ComponentNode {
    let name = names.attribute_component(&attribute.name);

    let mut markup = Markup::new();
    markup.shown_unless_hidden(&attribute.name, None, |m| {
        m.open(format!(
            "<div class=\"{}-{}\">",
            names.kebab,
            contentgen_common::param_case(&attribute.name)
        ))
        .line("{props.children}")
        .close("</div>");
    });

    let mut node = ComponentNode::new(name)
        .solid(&["Show"])
        .imports(&[TsImport::types([names.type_name.as_str()], main_module(names))])
        .prop(format!("{}?: {}", names.camel, names.type_name))
        .prop("hide?: string[]");
    node.content = markup.finish();
    node
}

/// `<P><Attr>Input`: labelled form control seeded from the entity value.
pub(crate) fn input_node(names: &EntityNames, attribute: &Attribute) -> ComponentNode {
    let name = names.attribute_input(&attribute.name);
    let control_name = names.attribute_component(&attribute.name);
    let getter = format!("{control_name}Value");
    let rule = attribute.kind.rule();

    let mut markup = Markup::new();
    markup.shown_unless_hidden(&attribute.name, None, |m| {
        m.open("<Form.Group>").line("<h3>{props.title}</h3>");
        if rule.labelled {
            m.line(format!("<Form.Label>{}</Form.Label>", jsx_text(&attribute.name)));
        }
        control(m, rule.input, &control_name, &getter, attribute);
        m.line("{props.children}").close("</Form.Group>");
    });

    let seed = property_access(&format!("props.{}", names.camel), &attribute.name, true);
    let mut node = ComponentNode::new(name)
        .solid(&["Show", "createSignal"])
        .imports(&[
            TsImport::named(["Form"], "solid-bootstrap"),
            TsImport::types([names.type_name.as_str()], main_module(names)),
        ])
        .prop(format!("{}?: {}", names.camel, names.type_name))
        .prop("title?: string")
        .prop("onChange?: (value: unknown) => void")
        .prop("hide?: string[]");
    node.signals.push(Signal::new(getter, Some("unknown"), seed));
    node.content = markup.finish();
    node
}

fn control(m: &mut Markup, input: InputControl, name: &str, getter: &str, attribute: &Attribute) {
    let setter = format!("set{getter}");
    let value = format!("value={{String({getter}() ?? \"\")}}");
    let on_input = format!(
        "onInput={{(e) => {{ {setter}(e.currentTarget.value); props.onChange?.(e.currentTarget.value); }}}}"
    );
    let text_control = |kind: &str| {
        format!("<Form.Control type=\"{kind}\" name=\"{name}\" {value} {on_input} />")
    };

    match input {
        InputControl::None => {}
        InputControl::Date => {
            m.line(text_control("date"));
        }
        InputControl::Email => {
            m.line(text_control("email"));
        }
        InputControl::Password => {
            m.line(text_control("password"));
        }
        InputControl::Text => {
            m.line(text_control("text"));
        }
        InputControl::TextArea => {
            m.line(format!(
                "<Form.Control as=\"textarea\" name=\"{name}\" {value} {on_input} />"
            ));
        }
        InputControl::Checkbox => {
            m.line(format!(
                "<Form.Check type=\"checkbox\" name=\"{name}\" label={} checked={{Boolean({getter}())}} onChange={{(e) => {{ {setter}(e.currentTarget.checked); props.onChange?.(e.currentTarget.checked); }}}} />",
                js_string(&attribute.name)
            ));
        }
        InputControl::Select => {
            m.open(format!(
                "<Form.Select name=\"{name}\" {value} onChange={{(e) => {{ {setter}(e.currentTarget.value); props.onChange?.(e.currentTarget.value); }}}}>"
            ));
            for option in &attribute.enum_values {
                let option = jsx_text(option);
                m.line(format!("<option value=\"{option}\">{option}</option>"));
            }
            m.close("</Form.Select>");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::schema::parse_entity;

    fn article() -> (EntityNames, crate::schema::Entity) {
        let entity = parse_entity(
            "article",
            r#"{
                "info": { "singularName": "article", "pluralName": "articles" },
                "attributes": {
                    "publishedAt": { "type": "datetime" },
                    "featured": { "type": "boolean" },
                    "status": { "type": "enumeration", "enum": ["draft", "live"] },
                    "meta": { "type": "json" },
                    "body": { "type": "richtext" }
                }
            }"#,
        )
        .unwrap();
        (EntityNames::new(&entity), entity)
    }

    fn input(name: &str) -> String {
        let (names, entity) = article();
        input_node(&names, entity.attribute(name).unwrap()).render().unwrap()
    }

    #[test]
    fn display_node_is_named_from_singular_and_attribute() {
        let (names, entity) = article();
        let source = display_node(&names, entity.attribute("publishedAt").unwrap())
            .render()
            .unwrap();

        assert!(source.contains("export function ArticlePublishedAt(props: ArticlePublishedAtProps)"));
        assert!(source.contains("import type { ArticleT } from \"../Article\";"));
        assert!(source.contains("<Show when={!props.hide?.includes(\"publishedAt\")}>"));
        assert!(source.contains("<div class=\"article-published-at\">"));
    }

    #[test]
    fn temporal_attributes_get_a_labelled_date_input() {
        let source = input("publishedAt");
        assert!(source.contains("export function ArticlePublishedAtInput("));
        assert!(source.contains("<Form.Label>publishedAt</Form.Label>"));
        assert!(source.contains("<Form.Control type=\"date\" name=\"ArticlePublishedAt\""));
        assert!(source.contains("createSignal<unknown>(props.article?.publishedAt)"));
    }

    #[test]
    fn booleans_get_an_unlabelled_checkbox() {
        let source = input("featured");
        assert!(source.contains("<Form.Check type=\"checkbox\""));
        assert!(!source.contains("<Form.Label>"));
    }

    #[test]
    fn enumerations_get_a_select_over_their_values() {
        let source = input("status");
        assert!(source.contains("<Form.Select name=\"ArticleStatus\""));
        assert!(source.contains("<option value=\"draft\">draft</option>"));
        assert!(source.contains("<option value=\"live\">live</option>"));
    }

    #[test]
    fn json_has_no_control_and_richtext_a_textarea() {
        let meta = input("meta");
        assert!(!meta.contains("<Form.Control"));
        assert!(!meta.contains("<Form.Label>"));

        assert!(input("body").contains("<Form.Control as=\"textarea\""));
    }
}
