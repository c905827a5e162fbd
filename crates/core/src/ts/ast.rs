//! TypeScript nodes used by the client, guard and component emitters.

/// TypeScript type.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// `string`, `number`, ...
    Primitive(TsPrimitive),
    /// `T[]`
    Array(Box<TsType>),
    /// `A | B`
    Union(Vec<TsType>),
    /// `A & B`
    Intersection(Vec<TsType>),
    /// `{ a: string; b?: number }`
    Object(Vec<TsProp>),
    /// `Record<K, V>`
    Record {
        /// `K`
        key: Box<TsType>,
        /// `V`
        value: Box<TsType>,
    },
    /// `"draft"`, `1`
    Literal(TsLiteral),
    /// Named type: `Article`, `Date`
    Ref(String),
    /// `Promise<ApiResponse<T>>`
    Generic {
        /// `Promise`
        name: String,
        /// Type arguments.
        args: Vec<TsType>,
    },
    /// Type predicate in return position: `o is Article`
    Predicate {
        /// `o`
        param: String,
        /// `Article`
        ty: Box<TsType>,
    },
}

impl TsType {
    /// Reference to a named type.
    pub fn named(name: impl Into<String>) -> Self {
        TsType::Ref(name.into())
    }

    /// `name<args>`
    pub fn generic(name: impl Into<String>, args: Vec<TsType>) -> Self {
        TsType::Generic {
            name: name.into(),
            args,
        }
    }

    /// `Record<string, unknown>`
    pub fn unknown_record() -> Self {
        TsType::Record {
            key: Box::new(TsType::Primitive(TsPrimitive::String)),
            value: Box::new(TsType::Primitive(TsPrimitive::Unknown)),
        }
    }

    /// `T | null`
    pub fn nullable(self) -> Self {
        TsType::Union(vec![self, TsType::Primitive(TsPrimitive::Null)])
    }
}

/// Built-in TypeScript type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `void`
    Void,
    /// `unknown`
    Unknown,
    /// `any`
    Any,
}

/// Object type member.
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    /// Quoted on emission when not an identifier.
    pub name: String,
    /// Member type.
    pub ty: TsType,
    /// Emits `name?:`.
    pub optional: bool,
}

/// Literal value, usable as an expression or a type.
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    /// Double-quoted string.
    String(String),
    /// Floating point number.
    Number(f64),
    /// Integer.
    Int(i64),
    /// `true` or `false`
    Bool(bool),
    /// `null`
    Null,
    /// `undefined`
    Undefined,
}

/// TypeScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TsExpr {
    /// Bare identifier.
    Ident(String),
    /// Literal value.
    Literal(TsLiteral),
    /// `callee<type_args>(args)`
    Call {
        /// Called expression.
        callee: Box<TsExpr>,
        /// Explicit type arguments, often empty.
        type_args: Vec<TsType>,
        /// Call arguments.
        args: Vec<TsExpr>,
    },
    /// `{ a: 1, b, ...c }`
    Object(Vec<TsObjectProp>),
    /// `o.title`, or `o["foo-bar"]` when the name is not an identifier.
    Member {
        /// Receiver.
        object: Box<TsExpr>,
        /// Property name.
        prop: String,
    },
    /// `o?.title`
    OptionalMember {
        /// Receiver.
        object: Box<TsExpr>,
        /// Property name.
        prop: String,
    },
    /// `` `/articles/${id}` ``
    Template(Vec<TemplatePart>),
    /// `await expr`
    Await(Box<TsExpr>),
    /// `left op right`
    BinOp {
        /// Left operand.
        left: Box<TsExpr>,
        /// Operator.
        op: BinOp,
        /// Right operand.
        right: Box<TsExpr>,
    },
    /// `!expr`
    Not(Box<TsExpr>),
    /// `(expr)`
    Paren(Box<TsExpr>),
    /// `[a, b]`
    Array(Vec<TsExpr>),
    /// `expr as T`
    Cast {
        /// Expression being cast.
        expr: Box<TsExpr>,
        /// Target type.
        ty: TsType,
    },
    /// Emitted verbatim.
    Raw(String),
}

impl TsExpr {
    /// Identifier expression.
    pub fn ident(name: impl Into<String>) -> Self {
        TsExpr::Ident(name.into())
    }

    /// String literal.
    pub fn string(value: impl Into<String>) -> Self {
        TsExpr::Literal(TsLiteral::String(value.into()))
    }

    /// `self.prop`
    pub fn member(self, prop: impl Into<String>) -> Self {
        TsExpr::Member {
            object: Box::new(self),
            prop: prop.into(),
        }
    }

    /// `self?.prop`
    pub fn optional_member(self, prop: impl Into<String>) -> Self {
        TsExpr::OptionalMember {
            object: Box::new(self),
            prop: prop.into(),
        }
    }

    /// Call of a named function.
    pub fn call(callee: impl Into<String>, args: Vec<TsExpr>) -> Self {
        TsExpr::Call {
            callee: Box::new(TsExpr::Ident(callee.into())),
            type_args: Vec::new(),
            args,
        }
    }

    /// `self op right`
    pub fn binary(self, op: BinOp, right: TsExpr) -> Self {
        TsExpr::BinOp {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    /// Fold `exprs` with `op`; `None` when empty.
    pub fn chain(op: BinOp, exprs: impl IntoIterator<Item = TsExpr>) -> Option<Self> {
        exprs.into_iter().reduce(|acc, expr| acc.binary(op, expr))
    }

    /// Wrap in parentheses.
    pub fn paren(self) -> Self {
        TsExpr::Paren(Box::new(self))
    }
}

/// Member of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TsObjectProp {
    /// `key: value`
    KeyValue(String, TsExpr),
    /// `{ key }`
    Shorthand(String),
    /// `...expr`
    Spread(TsExpr),
}

/// Binary operators the emitters need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `===`
    StrictEqual,
    /// `!==`
    StrictNotEqual,
    /// `!=`, used for the `!= null` idiom.
    LooseNotEqual,
    /// `&&`
    And,
    /// `||`
    Or,
}

/// Piece of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Literal text, escaped on emission.
    Static(String),
    /// `${expr}`
    Dynamic(TsExpr),
}

/// Function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    /// Parameter name.
    pub name: String,
    /// Annotation, if any.
    pub ty: Option<TsType>,
    /// Emits `name?:`.
    pub optional: bool,
}

impl TsParam {
    /// Required, annotated parameter.
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        TsParam {
            name: name.into(),
            ty: Some(ty),
            optional: false,
        }
    }

    /// Mark the parameter optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// `import { a, b as c } from "x";`
#[derive(Debug, Clone, PartialEq)]
pub struct TsImport {
    /// Imported names.
    pub items: Vec<ImportItem>,
    /// Module specifier.
    pub from: String,
    /// Emits `import type`.
    pub type_only: bool,
}

impl TsImport {
    /// Value import of `items`.
    pub fn named<I, S>(items: I, from: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TsImport {
            items: items.into_iter().map(ImportItem::new).collect(),
            from: from.into(),
            type_only: false,
        }
    }

    /// `import type` of `items`.
    pub fn types<I, S>(items: I, from: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TsImport {
            type_only: true,
            ..TsImport::named(items, from)
        }
    }
}

/// `export { a } from "./a";`
#[derive(Debug, Clone, PartialEq)]
pub struct TsExport {
    /// Re-exported names.
    pub items: Vec<ImportItem>,
    /// Module specifier.
    pub from: String,
    /// Emits `export type`.
    pub type_only: bool,
}

impl TsExport {
    /// Value re-export of one name.
    pub fn named(item: impl Into<String>, from: impl Into<String>) -> Self {
        TsExport {
            items: vec![ImportItem::new(item)],
            from: from.into(),
            type_only: false,
        }
    }

    /// Type-only re-export of one name.
    pub fn types(item: impl Into<String>, from: impl Into<String>) -> Self {
        TsExport {
            type_only: true,
            ..TsExport::named(item, from)
        }
    }
}

/// `name` or `name as alias`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportItem {
    /// Exported name.
    pub name: String,
    /// Local name, if different.
    pub alias: Option<String>,
}

impl ImportItem {
    /// Item without alias.
    pub fn new(name: impl Into<String>) -> Self {
        ImportItem {
            name: name.into(),
            alias: None,
        }
    }
}

/// Shape of a type declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// `export interface Foo { ... }`
    Interface {
        /// Members in declaration order.
        properties: Vec<TsProp>,
    },
    /// `export type Foo = ...;`
    TypeAlias {
        /// Aliased type.
        ty: TsType,
    },
}

/// Exported type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    /// Declared name.
    pub name: String,
    /// Interface or alias.
    pub kind: TypeDefKind,
}

/// Statement in a function body.
#[derive(Debug, Clone, PartialEq)]
pub enum TsStmt {
    /// `const name: ty = init;`
    Const {
        /// Binding name.
        name: String,
        /// Annotation, if any.
        ty: Option<TsType>,
        /// Initializer.
        init: TsExpr,
    },
    /// Expression statement.
    Expr(TsExpr),
    /// `return;` or `return expr;`
    Return(Option<TsExpr>),
    /// `if (cond) { ... }` without an else branch.
    If {
        /// Condition.
        cond: TsExpr,
        /// Statements run when it holds.
        then_body: Vec<TsStmt>,
    },
    /// Emitted line by line at the current indentation.
    Raw(String),
}

/// Function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TsFunction {
    /// Emitted as a `/** ... */` comment above the declaration.
    pub doc: Option<String>,
    /// Function name.
    pub name: String,
    /// Generic parameters, emitted as `<T, U>`.
    pub type_params: Vec<String>,
    /// Parameters in order.
    pub params: Vec<TsParam>,
    /// Return annotation, if any.
    pub return_type: Option<TsType>,
    /// Body statements.
    pub body: Vec<TsStmt>,
    /// Emits `async`.
    pub is_async: bool,
    /// Emits `export`.
    pub is_export: bool,
}

impl TsFunction {
    /// Exported, synchronous function with no type parameters.
    pub fn exported(name: impl Into<String>, params: Vec<TsParam>, return_type: TsType) -> Self {
        TsFunction {
            doc: None,
            name: name.into(),
            type_params: Vec::new(),
            params,
            return_type: Some(return_type),
            body: Vec::new(),
            is_async: false,
            is_export: true,
        }
    }

    /// Replace the body.
    pub fn with_body(mut self, body: Vec<TsStmt>) -> Self {
        self.body = body;
        self
    }

    /// Set or clear the doc comment.
    pub fn with_doc(mut self, doc: Option<String>) -> Self {
        self.doc = doc;
        self
    }
}

/// One generated source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsModule {
    /// Emitted first, in order.
    pub imports: Vec<TsImport>,
    /// Hand-written blocks emitted verbatim after the imports.
    pub preamble: Vec<String>,
    /// Type declarations.
    pub types: Vec<TsTypeDef>,
    /// Function declarations.
    pub functions: Vec<TsFunction>,
    /// Emitted last, one `const` per entry.
    pub constants: Vec<(String, TsExpr)>,
    /// Re-exports, emitted after everything else.
    pub exports: Vec<TsExport>,
}
