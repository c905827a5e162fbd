//! The single component template and the values it is rendered with.

use serde::Serialize;
use tera::Context;

use crate::error::GenerateError;
use crate::ts::{Emit, TsImport};

const COMPONENT_TEMPLATE: &str = include_str!("../../templates/component.tsx.jinja2");

/// `const [getter, setter] = createSignal<ty>(init);`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Signal {
    pub getter: String,
    pub setter: String,
    pub ty: Option<String>,
    pub init: String,
}

impl Signal {
    pub fn new(getter: impl Into<String>, ty: Option<&str>, init: impl Into<String>) -> Self {
        let getter = getter.into();
        Signal {
            setter: format!("set{getter}"),
            getter,
            ty: ty.map(str::to_string),
            init: init.into(),
        }
    }
}

/// Description of one Solid component.
#[derive(Debug, Default, Serialize)]
pub(crate) struct ComponentNode {
    pub name: String,
    pub solid_imports: Vec<&'static str>,
    /// Emitted import statements.
    pub imports: String,
    /// Declarations placed between the imports and the props type.
    pub pre_code: String,
    /// Members of the props type, e.g. `article?: ArticleT`.
    pub props: Vec<String>,
    pub signals: Vec<Signal>,
    /// JSX returned by the component.
    pub content: String,
}

impl ComponentNode {
    pub fn new(name: impl Into<String>) -> Self {
        ComponentNode {
            name: name.into(),
            solid_imports: vec!["ParentProps"],
            ..ComponentNode::default()
        }
    }

    pub fn solid(mut self, names: &[&'static str]) -> Self {
        self.solid_imports.extend_from_slice(names);
        self
    }

    pub fn imports(mut self, imports: &[TsImport]) -> Self {
        self.imports = imports.iter().map(Emit::emit).collect();
        self
    }

    pub fn prop(mut self, prop: impl Into<String>) -> Self {
        self.props.push(prop.into());
        self
    }

    pub fn render(&self) -> Result<String, GenerateError> {
        let template_err = |source| GenerateError::Template {
            component: self.name.clone(),
            source,
        };
        let context = Context::from_serialize(self).map_err(template_err)?;
        tera::Tera::one_off(COMPONENT_TEMPLATE, &context, false).map_err(template_err)
    }
}

/// Indented JSX builder; two spaces per level, starting inside `return (`.
#[derive(Debug)]
pub(crate) struct Markup {
    out: String,
    depth: usize,
}

impl Markup {
    pub fn new() -> Self {
        Markup {
            out: String::new(),
            depth: 2,
        }
    }

    pub fn line(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.out.push_str(&"  ".repeat(self.depth));
        self.out.push_str(line.as_ref());
        self.out.push('\n');
        self
    }

    pub fn open(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.line(line);
        self.depth += 1;
        self
    }

    pub fn close(&mut self, line: impl AsRef<str>) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(line)
    }

    /// `<Show when={!props.hide?.includes("name")}>` around `body`.
    pub fn shown_unless_hidden(
        &mut self,
        attribute: &str,
        extra_condition: Option<&str>,
        body: impl FnOnce(&mut Self),
    ) -> &mut Self {
        let condition = match extra_condition {
            Some(extra) => format!("!props.hide?.includes({}) && {extra}", js_string(attribute)),
            None => format!("!props.hide?.includes({})", js_string(attribute)),
        };
        self.open(format!("<Show when={{{condition}}}>"));
        body(self);
        self.close("</Show>")
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Double-quoted JS string literal.
pub(crate) fn js_string(value: &str) -> String {
    format!("\"{}\"", crate::ts::ident::escape_js_string(value))
}

/// Text safe inside JSX children and attribute values.
pub(crate) fn jsx_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('{', "&#123;")
        .replace('}', "&#125;")
        .replace('"', "&quot;")
}
