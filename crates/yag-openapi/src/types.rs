//! Type expressions and their rendering to TypeScript source text.
//!
//! A [`TypeExpr`] is an inspectable tree built by the translator and the
//! framework builders. Nothing is written until [`TypeExpr::render`] walks the
//! tree, so builders can be tested by structural equality and the renderer by
//! comparing output text.

use serde::{Serialize, Serializer};
use std::fmt;

pub const UNKNOWN: &str = "unknown";
pub const ANY: &str = "any";
pub const NEVER: &str = "never";
pub const EMPTY_OBJECT: &str = "{}";

/// Options for turning a [`TypeExpr`] into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Spaces per nesting level in block objects
    pub indent_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}

/// A renderable TypeScript type expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// Verbatim type text: keywords, type names, literal types
    Literal(String),
    Object(ObjectType),
    /// `A | B | C`
    Union(Vec<TypeExpr>),
    /// `A & B & C`
    Intersection(Vec<TypeExpr>),
    /// `Name<A, B>`
    Generic(GenericType),
    /// `T[]`
    Array(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    pub fn unknown() -> Self {
        Self::literal(UNKNOWN)
    }

    pub fn any() -> Self {
        Self::literal(ANY)
    }

    pub fn empty_object() -> Self {
        Self::literal(EMPTY_OBJECT)
    }

    /// A string literal type, quoted and escaped like a JSON string
    pub fn string_literal(value: &str) -> Self {
        Self::Literal(quote(value))
    }

    pub fn union(members: impl IntoIterator<Item = TypeExpr>) -> Self {
        Self::Union(members.into_iter().collect())
    }

    pub fn intersection(members: impl IntoIterator<Item = TypeExpr>) -> Self {
        Self::Intersection(members.into_iter().collect())
    }

    pub fn generic(name: impl Into<String>, args: impl IntoIterator<Item = TypeExpr>) -> Self {
        Self::Generic(GenericType {
            name: name.into(),
            args: args.into_iter().collect(),
        })
    }

    pub fn array_of(item: TypeExpr) -> Self {
        Self::Array(Box::new(item))
    }

    /// Render with default options
    pub fn render(&self) -> String {
        self.render_with(&RenderOptions::default())
    }

    pub fn render_with(&self, options: &RenderOptions) -> String {
        let mut writer = TypeWriter::new(options);
        writer.write(self);
        writer.finish()
    }

    /// Whether this expression needs parentheses when used as an array element
    /// or as a member of an intersection.
    fn is_compound(&self) -> bool {
        match self {
            TypeExpr::Union(members) | TypeExpr::Intersection(members) => match members.as_slice() {
                [single] => single.is_compound(),
                _ => members.len() > 1,
            },
            _ => false,
        }
    }

    fn is_union(&self) -> bool {
        match self {
            TypeExpr::Union(members) => match members.as_slice() {
                [single] => single.is_union(),
                _ => members.len() > 1,
            },
            _ => false,
        }
    }
}

impl From<ObjectType> for TypeExpr {
    fn from(object: ObjectType) -> Self {
        TypeExpr::Object(object)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Serialize for TypeExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

/// `Name<A, B>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericType {
    pub name: String,
    pub args: Vec<TypeExpr>,
}

/// How an object type is laid out when rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Layout {
    /// One member per line, closing brace on its own line
    #[default]
    Block,
    /// `{ a: string; b?: number }`
    Inline,
}

/// Object member key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKey {
    /// Rendered bare when it is a valid identifier or integer, quoted otherwise
    Name(String),
    /// Always rendered as a string literal
    Quoted(String),
}

impl PropertyKey {
    pub fn as_str(&self) -> &str {
        match self {
            PropertyKey::Name(key) | PropertyKey::Quoted(key) => key,
        }
    }

    fn render(&self) -> String {
        match self {
            PropertyKey::Name(key) if is_identifier(key) || is_integer_key(key) => key.clone(),
            PropertyKey::Name(key) | PropertyKey::Quoted(key) => quote(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub key: PropertyKey,
    pub optional: bool,
    pub ty: TypeExpr,
}

/// An object type whose members keep insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectType {
    layout: Layout,
    members: Vec<Member>,
}

impl ObjectType {
    pub fn block() -> Self {
        Self {
            layout: Layout::Block,
            members: Vec::new(),
        }
    }

    pub fn inline() -> Self {
        Self {
            layout: Layout::Inline,
            members: Vec::new(),
        }
    }

    pub fn field(mut self, key: impl Into<String>, ty: TypeExpr) -> Self {
        self.insert(PropertyKey::Name(key.into()), false, ty);
        self
    }

    pub fn optional_field(mut self, key: impl Into<String>, ty: TypeExpr) -> Self {
        self.insert(PropertyKey::Name(key.into()), true, ty);
        self
    }

    pub fn quoted_field(mut self, key: impl Into<String>, ty: TypeExpr) -> Self {
        self.insert(PropertyKey::Quoted(key.into()), false, ty);
        self
    }

    /// Insert a member. An existing member with the same key keeps its
    /// position and takes the new value.
    pub fn insert(&mut self, key: PropertyKey, optional: bool, ty: TypeExpr) {
        let member = Member { key, optional, ty };
        match self
            .members
            .iter_mut()
            .find(|existing| existing.key.as_str() == member.key.as_str())
        {
            Some(existing) => *existing = member,
            None => self.members.push(member),
        }
    }

    pub fn into_members(self) -> Vec<Member> {
        self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Streams a [`TypeExpr`] into a string, tracking block indentation
struct TypeWriter {
    out: String,
    indent: String,
    depth: usize,
}

impl TypeWriter {
    fn new(options: &RenderOptions) -> Self {
        Self {
            out: String::new(),
            indent: " ".repeat(options.indent_width),
            depth: 0,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn write(&mut self, expr: &TypeExpr) {
        match expr {
            TypeExpr::Literal(text) => self.out.push_str(text),
            TypeExpr::Object(object) => self.write_object(object),
            TypeExpr::Union(members) if members.is_empty() => self.out.push_str(NEVER),
            TypeExpr::Union(members) => self.write_joined(members, " | ", false),
            TypeExpr::Intersection(members) if members.is_empty() => self.out.push_str(UNKNOWN),
            TypeExpr::Intersection(members) => self.write_joined(members, " & ", true),
            TypeExpr::Generic(generic) => {
                self.out.push_str(&generic.name);
                self.out.push('<');
                for (i, arg) in generic.args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.write(arg);
                }
                self.out.push('>');
            }
            TypeExpr::Array(item) => {
                self.write_grouped(item, item.is_compound());
                self.out.push_str("[]");
            }
        }
    }

    fn write_joined(&mut self, members: &[TypeExpr], separator: &str, group_unions: bool) {
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                self.out.push_str(separator);
            }
            self.write_grouped(member, group_unions && member.is_union());
        }
    }

    fn write_grouped(&mut self, expr: &TypeExpr, parenthesize: bool) {
        if parenthesize {
            self.out.push('(');
            self.write(expr);
            self.out.push(')');
        } else {
            self.write(expr);
        }
    }

    fn write_object(&mut self, object: &ObjectType) {
        if object.is_empty() {
            self.out.push_str(EMPTY_OBJECT);
            return;
        }

        match object.layout {
            Layout::Inline => {
                self.out.push_str("{ ");
                for (i, member) in object.members.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str("; ");
                    }
                    self.write_member(member);
                }
                self.out.push_str(" }");
            }
            Layout::Block => {
                self.out.push_str("{\n");
                self.depth += 1;
                let last = object.members.len() - 1;
                for (i, member) in object.members.iter().enumerate() {
                    self.push_indent();
                    self.write_member(member);
                    if i < last {
                        self.out.push(';');
                    }
                    self.out.push('\n');
                }
                self.depth -= 1;
                self.push_indent();
                self.out.push('}');
            }
        }
    }

    fn write_member(&mut self, member: &Member) {
        self.out.push_str(&member.key.render());
        if member.optional {
            self.out.push('?');
        }
        self.out.push_str(": ");
        self.write(&member.ty);
    }

    fn push_indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(&self.indent);
        }
    }
}

/// Quote a string as a JSON/TypeScript string literal
pub fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

/// Whether `name` can be written as a bare TypeScript identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

fn is_integer_key(key: &str) -> bool {
    !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'))
}

/// Words that cannot name a type alias
const RESERVED_TYPE_NAMES: &[&str] = &[
    "any", "bigint", "boolean", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "export", "extends", "false",
    "finally", "for", "function", "if", "import", "in", "instanceof", "never", "new", "null",
    "number", "object", "return", "string", "super", "switch", "symbol", "this", "throw",
    "true", "try", "typeof", "undefined", "unknown", "var", "void", "while", "with",
];

/// Sanitize a string so it can name a TypeScript type.
///
/// Valid identifiers pass through unchanged.
pub fn sanitize_type_name(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }

    let mut sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        sanitized = format!("_{}", sanitized);
    }

    if RESERVED_TYPE_NAMES.contains(&sanitized.as_str()) {
        sanitized.push('_');
    }

    if sanitized != name {
        tracing::debug!(original = name, sanitized = %sanitized, "sanitized type name");
    }

    sanitized
}
