//! Content-type model: entities, attributes and the resolved schema graph.

mod graph;
mod loader;
mod raw;

use crate::error::SchemaError;
use raw::{RawAttribute, RawSchema};

pub use graph::{SchemaGraph, trailing_segment};
pub use loader::{PathFragments, load_graph, load_path_fragments};

/// Relation multiplicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// `oneToOne`, `oneWay`
    OneToOne,
    /// `oneToMany`, `manyWay`
    OneToMany,
    /// `manyToOne`
    ManyToOne,
    /// `manyToMany`
    ManyToMany,
}

impl Cardinality {
    /// Parse a Strapi relation name.
    ///
    /// Only the shape matters: a `…Many` suffix (or `manyWay`) is to-many, a
    /// `one…` prefix is one-sided. This keeps morph and one-way relations
    /// deterministic without listing every variant.
    pub fn parse(raw: &str) -> Option<Self> {
        let to_many = match raw {
            "oneWay" => false,
            "manyWay" => true,
            _ if raw.ends_with("Many") => true,
            _ if raw.ends_with("One") => false,
            _ => return None,
        };
        let from_one = raw.starts_with("one") || raw == "manyWay";

        Some(match (from_one, to_many) {
            (true, false) => Cardinality::OneToOne,
            (true, true) => Cardinality::OneToMany,
            (false, false) => Cardinality::ManyToOne,
            (false, true) => Cardinality::ManyToMany,
        })
    }

    /// One-to-many and many-to-many resolve to collections.
    pub fn is_to_many(self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }
}

/// Broad class of an attribute kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindClass {
    /// Text of any flavour, including unknown kinds.
    StringLike,
    /// Integers and decimals.
    Numeric,
    /// Dates and times.
    Temporal,
    /// `boolean`
    Boolean,
    /// Free-form JSON.
    Json,
    /// Uploaded files.
    Media,
    /// One of a fixed set of strings.
    Enumeration,
    /// Reference to another entity.
    Relation,
}

/// Concrete Strapi attribute type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    /// `string`
    String,
    /// `text`
    Text,
    /// `richtext`
    RichText,
    /// `email`
    Email,
    /// `password`
    Password,
    /// `uid`
    Uid,
    /// `integer`
    Integer,
    /// `biginteger`
    BigInteger,
    /// `decimal`
    Decimal,
    /// `float`
    Float,
    /// `date`
    Date,
    /// `time`
    Time,
    /// `datetime`
    DateTime,
    /// `timestamp`
    Timestamp,
    /// `boolean`
    Boolean,
    /// `json`
    Json,
    /// `media`
    Media,
    /// `enumeration`
    Enumeration,
    /// `relation`
    Relation,
    /// Anything else; treated as string-like.
    Other(String),
}

impl AttributeKind {
    /// Map a Strapi `type`. Unknown names become [`AttributeKind::Other`].
    pub fn parse(raw: &str) -> Self {
        match raw {
            "string" => AttributeKind::String,
            "text" => AttributeKind::Text,
            "richtext" => AttributeKind::RichText,
            "email" => AttributeKind::Email,
            "password" => AttributeKind::Password,
            "uid" => AttributeKind::Uid,
            "integer" => AttributeKind::Integer,
            "biginteger" => AttributeKind::BigInteger,
            "decimal" => AttributeKind::Decimal,
            "float" => AttributeKind::Float,
            "date" => AttributeKind::Date,
            "time" => AttributeKind::Time,
            "datetime" => AttributeKind::DateTime,
            "timestamp" => AttributeKind::Timestamp,
            "boolean" => AttributeKind::Boolean,
            "json" => AttributeKind::Json,
            "media" => AttributeKind::Media,
            "enumeration" => AttributeKind::Enumeration,
            "relation" => AttributeKind::Relation,
            other => AttributeKind::Other(other.to_string()),
        }
    }

    /// Class the kind belongs to.
    pub fn class(&self) -> KindClass {
        match self {
            AttributeKind::String
            | AttributeKind::Text
            | AttributeKind::RichText
            | AttributeKind::Email
            | AttributeKind::Password
            | AttributeKind::Uid
            | AttributeKind::Other(_) => KindClass::StringLike,
            AttributeKind::Integer
            | AttributeKind::BigInteger
            | AttributeKind::Decimal
            | AttributeKind::Float => KindClass::Numeric,
            AttributeKind::Date
            | AttributeKind::Time
            | AttributeKind::DateTime
            | AttributeKind::Timestamp => KindClass::Temporal,
            AttributeKind::Boolean => KindClass::Boolean,
            AttributeKind::Json => KindClass::Json,
            AttributeKind::Media => KindClass::Media,
            AttributeKind::Enumeration => KindClass::Enumeration,
            AttributeKind::Relation => KindClass::Relation,
        }
    }
}

/// Relation details of a relation attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Multiplicity of the relation.
    pub cardinality: Cardinality,
    /// Raw reference, e.g. `api::category.category`.
    pub target_ref: String,
}

/// One named field of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Key in the schema's `attributes` object.
    pub name: String,
    /// Declared type.
    pub kind: AttributeKind,
    /// `required` flag.
    pub required: bool,
    /// `enum` values of an enumeration.
    pub enum_values: Vec<String>,
    /// Present iff `kind` is [`AttributeKind::Relation`].
    pub relation: Option<Relation>,
}

impl Attribute {
    /// True for relation attributes.
    pub fn is_relation(&self) -> bool {
        self.relation.is_some()
    }

    fn from_raw(entity: &str, name: &str, raw: RawAttribute) -> Result<Self, SchemaError> {
        let kind = AttributeKind::parse(&raw.kind);
        let invalid = |reason: String| SchemaError::InvalidAttribute {
            entity: entity.to_string(),
            attribute: name.to_string(),
            reason,
        };

        let relation = if kind == AttributeKind::Relation {
            let relation = raw
                .relation
                .ok_or_else(|| invalid("relation attribute without a `relation` field".into()))?;
            let cardinality = Cardinality::parse(&relation)
                .ok_or_else(|| invalid(format!("unknown relation `{relation}`")))?;
            Some(Relation {
                cardinality,
                target_ref: raw.target.unwrap_or_default(),
            })
        } else {
            None
        };

        Ok(Attribute {
            name: name.to_string(),
            kind,
            required: raw.required,
            enum_values: raw.enum_values,
            relation,
        })
    }
}

/// One content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Directory name the entity was loaded from.
    pub key: String,
    /// `kind`, e.g. `collectionType`.
    pub kind: Option<String>,
    /// `collectionName`
    pub collection_name: Option<String>,
    /// `info.singularName`
    pub singular_name: String,
    /// `info.pluralName`
    pub plural_name: String,
    /// `info.displayName`, or the singular name.
    pub display_name: String,
    /// Declaration order is preserved.
    pub attributes: Vec<Attribute>,
}

impl Entity {
    fn header(key: &str, raw: RawSchema) -> Self {
        Entity {
            key: key.to_string(),
            kind: raw.kind,
            collection_name: raw.collection_name,
            display_name: raw
                .info
                .display_name
                .unwrap_or_else(|| raw.info.singular_name.clone()),
            singular_name: raw.info.singular_name,
            plural_name: raw.info.plural_name,
            attributes: Vec::new(),
        }
    }

    pub(crate) fn from_raw(key: &str, mut raw: RawSchema) -> Result<Self, SchemaError> {
        let raw_attributes = std::mem::take(&mut raw.attributes);
        let mut entity = Self::header(key, raw);

        for (name, value) in raw_attributes {
            let raw_attr: RawAttribute =
                serde_json::from_value(value).map_err(|err| SchemaError::InvalidAttribute {
                    entity: key.to_string(),
                    attribute: name.clone(),
                    reason: err.to_string(),
                })?;
            entity
                .attributes
                .push(Attribute::from_raw(key, &name, raw_attr)?);
        }

        Ok(entity)
    }

    /// Attribute called `name`.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attributes that get their own display/input components.
    pub fn scalar_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| !a.is_relation())
    }

    /// Relation attributes with their relation details.
    pub fn relation_attributes(&self) -> impl Iterator<Item = (&Attribute, &Relation)> {
        self.attributes
            .iter()
            .filter_map(|a| a.relation.as_ref().map(|r| (a, r)))
    }
}

/// Parse a schema description; used by the loader and by tests.
pub fn parse_entity(key: &str, json: &str) -> Result<Entity, SchemaError> {
    let raw: RawSchema =
        serde_json::from_str(json).map_err(|source| SchemaError::InvalidSchema {
            path: key.into(),
            source,
        })?;
    Entity::from_raw(key, raw)
}
