//! SolidJS component tree synthesis.
//!
//! Every entity yields, under `<Pascal>/`:
//! - `Attributes/<P><Attr>.tsx` and `Attributes/<P><Attr>Input.tsx` per scalar attribute
//! - `<P>Form.tsx`, `<P>.tsx` (which also declares `<P>T`) and `<P>List.tsx`
//! - `index.tsx` re-exporting all of the above

mod aggregate;
mod attribute;
mod template;

use contentgen_common::layout::{ATTRIBUTES_DIR, INDEX_FILE};
use tracing::debug;

use crate::context::{EntityNames, GenerationContext};
use crate::error::GenerateError;
use crate::schema::Entity;
use crate::ts::Emit;

pub use aggregate::entity_type;

/// Generated source file, relative to the components root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFile {
    /// `Article/Article.tsx`
    pub path: String,
    /// TSX source.
    pub contents: String,
}

fn tsx(dir: &str, name: &str) -> String {
    format!("{dir}/{name}.tsx")
}

/// All component files of one entity, attribute nodes first.
pub fn entity_components(
    ctx: &GenerationContext,
    entity: &Entity,
    names: &EntityNames,
) -> Result<Vec<ComponentFile>, GenerateError> {
    let root = names.pascal.as_str();
    let attributes_dir = format!("{root}/{ATTRIBUTES_DIR}");
    let mut files = Vec::new();

    for attr in entity.scalar_attributes() {
        let display = attribute::display_node(names, attr);
        let input = attribute::input_node(names, attr);
        files.push(ComponentFile {
            path: tsx(&attributes_dir, &display.name),
            contents: display.render()?,
        });
        files.push(ComponentFile {
            path: tsx(&attributes_dir, &input.name),
            contents: input.render()?,
        });
    }

    for node in [
        aggregate::form_node(entity, names),
        aggregate::main_node(ctx, entity, names),
        aggregate::list_node(names),
    ] {
        files.push(ComponentFile {
            path: tsx(root, &node.name),
            contents: node.render()?,
        });
    }

    files.push(ComponentFile {
        path: format!("{root}/{INDEX_FILE}"),
        contents: aggregate::index_module(entity, names).emit(),
    });

    debug!(entity = %entity.key, files = files.len(), "Synthesized component tree.");
    Ok(files)
}
