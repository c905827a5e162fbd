//! Identifier rules for generated TypeScript.

use std::collections::HashSet;
use std::sync::LazyLock;

use contentgen_common::camel_case;

/// Words that cannot be used as bare identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// Whether `name` must be quoted as an object key or accessed with brackets.
pub fn needs_quoting(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    !starts_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape backslashes and double quotes for a `"..."` literal.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `foo` stays `foo`, `foo-bar` becomes `"foo-bar"`.
pub fn quote_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// `o.title`, or `o["foo-bar"]` for names that are not identifiers.
pub fn property_access(object: &str, prop: &str, optional: bool) -> String {
    match (needs_quoting(prop), optional) {
        (false, false) => format!("{object}.{prop}"),
        (false, true) => format!("{object}?.{prop}"),
        (true, false) => format!("{object}[\"{}\"]", escape_js_string(prop)),
        (true, true) => format!("{object}?.[\"{}\"]", escape_js_string(prop)),
    }
}

/// Camel-cased, valid TypeScript identifier for an operation or parameter.
///
/// Leading digits get an `_` prefix, as do reserved words.
pub fn sanitize_identifier(name: &str) -> String {
    let mut ident = camel_case(name);
    if ident.is_empty() {
        return "_empty".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if TS_RESERVED_WORDS.contains(ident.as_str()) {
        ident.insert(0, '_');
    }
    ident
}
