//! TypeScript syntax tree and its emission.
//!
//! Emitters build these nodes instead of concatenating strings so that every
//! identifier goes through the same quoting rules:
//!
//! - `ast`: types, expressions, statements, functions, imports/exports
//! - `emit`: nodes to source text via the [`Emit`] trait
//! - `ident`: identifier sanitizing and property access helpers

mod ast;
mod emit;
pub mod ident;

pub use ast::{
    BinOp, ImportItem, TsExport, TsExpr, TsFunction, TsImport, TsLiteral, TsModule, TsObjectProp,
    TemplatePart, TsParam, TsPrimitive, TsProp, TsStmt, TsType, TsTypeDef, TypeDefKind,
};
pub use emit::Emit;
