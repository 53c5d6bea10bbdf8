//! # Schema Arena
//!
//! The output schema is loaded into an arena of nodes addressed by
//! [`NodeId`]. Structural children (`properties/*`, `items`,
//! `additionalProperties`, `definitions/*`, `$defs/*`) become arena edges;
//! every other keyword is carried verbatim on the node.
//!
//! Local `$ref` pointers are resolved against the arena into a
//! [`RefTarget`] (a node plus an optional residual pointer). Augmentation
//! moves every node to a new location, and references are re-emitted from
//! the target node's new location instead of by rewriting pointer strings,
//! which keeps recursive schemas resolvable after the extra `oneOf` layers
//! are introduced.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{json_type_name, SchemaError};
use crate::pointer::SchemaPath;

/// Keywords whose values are maps of named subschemas that are augmented.
pub const DEFINITION_KEYWORDS: [&str; 2] = ["definitions", "$defs"];

/// Index of a node in a [`SchemaArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A JSON Schema primitive type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl SchemaType {
    /// Keyword spelling of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

/// The `type` keyword: a single type or a union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    Single(SchemaType),
    Union(Vec<SchemaType>),
}

impl TypeSpec {
    /// True only for `"type": <ty>`, not for unions containing it.
    pub fn is_exactly(&self, ty: SchemaType) -> bool {
        matches!(self, Self::Single(t) if *t == ty)
    }

    /// True if a value of `ty` can satisfy this keyword.
    pub fn admits(&self, ty: SchemaType) -> bool {
        match self {
            Self::Single(t) => *t == ty,
            Self::Union(ts) => ts.contains(&ty),
        }
    }

    /// The keyword value as JSON.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Single(t) => Value::String(t.as_str().to_string()),
            Self::Union(ts) => ts
                .iter()
                .map(|t| Value::String(t.as_str().to_string()))
                .collect(),
        }
    }
}

/// Relationship between a node and one of its structural children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    Items,
    Property(String),
    AdditionalProperties,
    Definition { keyword: String, name: String },
}

impl Edge {
    /// Location of the child in the augmented document, given the
    /// augmented location of its parent.
    pub fn apply(&self, parent: &SchemaPath) -> SchemaPath {
        match self {
            Self::Items => parent.items(),
            Self::Property(name) => parent.property(name),
            Self::AdditionalProperties => parent.additional_properties(),
            Self::Definition { keyword, name } => parent.definition(keyword, name),
        }
    }

    /// Location of the child in the source document, given the source
    /// location of its parent.
    fn source_path(&self, parent: &SchemaPath) -> SchemaPath {
        match self {
            Self::Items => parent.push("items"),
            Self::Property(name) => parent.join(&["properties", name.as_str()]),
            Self::AdditionalProperties => parent.push("additionalProperties"),
            Self::Definition { keyword, name } => parent.join(&[keyword.as_str(), name.as_str()]),
        }
    }
}

/// An object-form schema node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    /// The `type` keyword.
    pub schema_type: Option<TypeSpec>,
    /// A string `description`; non-string descriptions stay in `keywords`.
    pub description: Option<String>,
    /// `properties`, when present (possibly empty).
    pub properties: Option<BTreeMap<String, NodeId>>,
    /// Single-schema `items`. Tuple-form `items` stays in `keywords`.
    pub items: Option<NodeId>,
    /// `additionalProperties`, schema or boolean.
    pub additional_properties: Option<NodeId>,
    /// `definitions` / `$defs` maps, keyed by keyword.
    pub definitions: BTreeMap<String, BTreeMap<String, NodeId>>,
    /// Every other keyword, verbatim.
    pub keywords: Map<String, Value>,
}

impl SchemaNode {
    /// Structural children in augmentation order.
    pub fn children(&self) -> Vec<(Edge, NodeId)> {
        let mut out = Vec::new();
        if let Some(items) = self.items {
            out.push((Edge::Items, items));
        }
        if let Some(properties) = &self.properties {
            for (name, id) in properties {
                out.push((Edge::Property(name.clone()), *id));
            }
        }
        if let Some(additional) = self.additional_properties {
            out.push((Edge::AdditionalProperties, additional));
        }
        for (keyword, defs) in &self.definitions {
            for (name, id) in defs {
                out.push((
                    Edge::Definition {
                        keyword: keyword.clone(),
                        name: name.clone(),
                    },
                    *id,
                ));
            }
        }
        out
    }

    /// The `$ref` string, if this node has one.
    pub fn reference(&self) -> Option<&str> {
        self.keywords.get("$ref").and_then(Value::as_str)
    }

    fn is_bare_reference(&self) -> bool {
        self.schema_type.is_none()
            && self.properties.is_none()
            && self.items.is_none()
            && self.additional_properties.is_none()
            && self.definitions.is_empty()
            && self.keywords.len() == 1
            && self.reference().is_some()
    }
}

/// A node: a boolean schema or an object schema.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Boolean(bool),
    Schema(SchemaNode),
}

/// Where a local `$ref` lands in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefTarget {
    /// Exactly a node.
    Node(NodeId),
    /// Somewhere inside the verbatim keywords of a node.
    Within { node: NodeId, rest: Vec<String> },
}

#[derive(Debug, Clone)]
struct Slot {
    kind: NodeKind,
    origin: SchemaPath,
}

/// Arena holding every structural node of one output schema.
#[derive(Debug, Clone)]
pub struct SchemaArena {
    slots: Vec<Slot>,
    root: NodeId,
    source: Value,
}

impl SchemaArena {
    /// Load a schema value into a new arena.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if a structural position holds a non-schema
    /// value or a structural keyword is malformed.
    pub fn from_value(source: &Value) -> Result<Self, SchemaError> {
        let mut arena = Self {
            slots: Vec::new(),
            root: NodeId(0),
            source: source.clone(),
        };
        arena.root = arena.insert(source, SchemaPath::root())?;
        Ok(arena)
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True if the arena has no nodes (never the case after `from_value`).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All node ids.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.slots.len()).map(NodeId)
    }

    /// The node stored at `id`.
    pub fn node(&self, id: NodeId) -> &NodeKind {
        &self.slots[id.0].kind
    }

    /// Where the node sat in the source schema.
    pub fn origin(&self, id: NodeId) -> &SchemaPath {
        &self.slots[id.0].origin
    }

    /// Structural children of `id`.
    pub fn children(&self, id: NodeId) -> Vec<(Edge, NodeId)> {
        match self.node(id) {
            NodeKind::Schema(node) => node.children(),
            NodeKind::Boolean(_) => Vec::new(),
        }
    }

    /// Resolve a source-document pointer to its place in the arena.
    ///
    /// Returns `None` when the pointer does not exist in the source schema.
    pub fn resolve(&self, path: &SchemaPath) -> Option<RefTarget> {
        let tokens = path.tokens();
        let mut current = self.root;
        let mut i = 0;
        while i < tokens.len() {
            let NodeKind::Schema(node) = self.node(current) else {
                break;
            };
            let next = match tokens[i].as_str() {
                "items" => node.items.map(|id| (id, 1)),
                "additionalProperties" => node.additional_properties.map(|id| (id, 1)),
                "properties" => tokens
                    .get(i + 1)
                    .and_then(|name| node.properties.as_ref()?.get(name))
                    .map(|id| (*id, 2)),
                keyword => tokens
                    .get(i + 1)
                    .and_then(|name| node.definitions.get(keyword)?.get(name))
                    .map(|id| (*id, 2)),
            };
            match next {
                Some((id, step)) => {
                    current = id;
                    i += step;
                }
                None => break,
            }
        }

        if i == tokens.len() {
            return Some(RefTarget::Node(current));
        }
        self.source.pointer(&path.to_json_pointer())?;
        Some(RefTarget::Within {
            node: current,
            rest: tokens[i..].to_vec(),
        })
    }

    /// If `id` is a node consisting only of a local `$ref` to another node,
    /// the referenced node.
    ///
    /// The root never counts, so a root `{"$ref": "#"}` cannot collapse
    /// into a reference to itself.
    pub fn alias_of(&self, id: NodeId) -> Option<NodeId> {
        if id == self.root {
            return None;
        }
        let NodeKind::Schema(node) = self.node(id) else {
            return None;
        };
        if !node.is_bare_reference() {
            return None;
        }
        let reference = node.reference()?;
        if !SchemaPath::is_local(reference) {
            return None;
        }
        match self.resolve(&SchemaPath::parse(reference).ok()?)? {
            RefTarget::Node(target) if target != id => Some(target),
            _ => None,
        }
    }

    fn insert(&mut self, value: &Value, origin: SchemaPath) -> Result<NodeId, SchemaError> {
        let kind = match value {
            Value::Bool(b) => NodeKind::Boolean(*b),
            Value::Object(map) => NodeKind::Schema(self.insert_object(map, &origin)?),
            other => {
                return Err(SchemaError::NotASchema {
                    pointer: origin.to_string(),
                    found: json_type_name(other),
                })
            }
        };
        let id = NodeId(self.slots.len());
        self.slots.push(Slot { kind, origin });
        Ok(id)
    }

    fn insert_object(
        &mut self,
        map: &Map<String, Value>,
        origin: &SchemaPath,
    ) -> Result<SchemaNode, SchemaError> {
        let mut node = SchemaNode::default();

        for (key, value) in map {
            match key.as_str() {
                "type" => {
                    let spec = serde_json::from_value(value.clone()).map_err(|e| {
                        SchemaError::InvalidKeyword {
                            pointer: origin.to_string(),
                            keyword: key.clone(),
                            reason: e.to_string(),
                        }
                    })?;
                    node.schema_type = Some(spec);
                }
                "description" => match value {
                    Value::String(s) => node.description = Some(s.clone()),
                    other => {
                        node.keywords.insert(key.clone(), other.clone());
                    }
                },
                "properties" => {
                    let entries = expect_object(value, origin, key)?;
                    let mut properties = BTreeMap::new();
                    for (name, child) in entries {
                        let edge = Edge::Property(name.clone());
                        let id = self.insert(child, edge.source_path(origin))?;
                        properties.insert(name.clone(), id);
                    }
                    node.properties = Some(properties);
                }
                "items" => match value {
                    Value::Array(_) => {
                        node.keywords.insert(key.clone(), value.clone());
                    }
                    _ => node.items = Some(self.insert(value, Edge::Items.source_path(origin))?),
                },
                "additionalProperties" => {
                    let path = Edge::AdditionalProperties.source_path(origin);
                    node.additional_properties = Some(self.insert(value, path)?);
                }
                k if DEFINITION_KEYWORDS.contains(&k) => {
                    let entries = expect_object(value, origin, key)?;
                    let mut defs = BTreeMap::new();
                    for (name, child) in entries {
                        let edge = Edge::Definition {
                            keyword: key.clone(),
                            name: name.clone(),
                        };
                        let id = self.insert(child, edge.source_path(origin))?;
                        defs.insert(name.clone(), id);
                    }
                    node.definitions.insert(key.clone(), defs);
                }
                _ => {
                    node.keywords.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(node)
    }
}

fn expect_object<'v>(
    value: &'v Value,
    origin: &SchemaPath,
    keyword: &str,
) -> Result<&'v Map<String, Value>, SchemaError> {
    value.as_object().ok_or_else(|| SchemaError::InvalidKeyword {
        pointer: origin.to_string(),
        keyword: keyword.to_string(),
        reason: format!("expected an object, found {}", json_type_name(value)),
    })
}
