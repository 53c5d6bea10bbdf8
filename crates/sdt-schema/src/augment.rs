//! # Schema Augmentation Engine
//!
//! Rewrites an output schema so that, at every position, a template may
//! hold either a literal value or a directive producing one.
//!
//! ## Algorithm
//!
//! Depth-first over the [`SchemaArena`]. For a node augmented at path `R`:
//!
//! 1. `items` is augmented at `R/oneOf/0/items`.
//! 2. each `properties/<name>` at `R/oneOf/0/properties/<name>`.
//! 3. a schema-valued `additionalProperties` at `R/oneOf/0/additionalProperties`
//!    (booleans are emitted unchanged).
//! 4. `definitions/<name>` and `$defs/<name>` likewise, so recursive
//!    schemas accept directives at every level.
//! 5. The node is wrapped as `{description, oneOf: [original, $if, ...]}`.
//!    Interpolation is appended unless the node's type admits strings;
//!    `$flatten` and `$for` are appended only for `type: array`.
//!
//! Child paths are computed before recursing, anticipating the wrap their
//! parent applies afterwards. The same arithmetic ([`Edge::apply`]) lays
//! out the location of every node up front, which is what local `$ref`s are
//! re-emitted against.
//!
//! ## Invariant
//!
//! Alternative 0 of every wrapped node is the original node with augmented
//! children, so every literal that conformed to the output schema still
//! conforms to the augmented one.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::arena::{Edge, NodeId, NodeKind, RefTarget, SchemaArena, SchemaNode, SchemaType};
use crate::directive::{Directive, SchemaRef};
use crate::error::SchemaError;
use crate::pointer::SchemaPath;

/// Keywords holding instance data rather than subschemas.
const DATA_KEYWORDS: [&str; 4] = ["enum", "const", "default", "examples"];

/// Keywords holding maps from names to subschemas.
const SCHEMA_MAP_KEYWORDS: [&str; 6] = [
    "properties",
    "patternProperties",
    "definitions",
    "$defs",
    "dependencies",
    "dependentSchemas",
];

/// A node wrapped in a directive-permitting alternation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AugmentedSchemaNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "oneOf")]
    pub one_of: Vec<Value>,
}

impl AugmentedSchemaNode {
    /// Serialize into a schema value.
    pub fn into_value(self) -> Value {
        let mut map = Map::new();
        if let Some(description) = self.description {
            map.insert("description".to_string(), Value::String(description));
        }
        map.insert("oneOf".to_string(), Value::Array(self.one_of));
        Value::Object(map)
    }
}

/// Result of augmenting one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Augmented {
    /// The usual case.
    Wrapped(AugmentedSchemaNode),
    /// Boolean schemas, and bare local references whose target is already
    /// augmented. Wrapping either would only create overlapping alternatives.
    Verbatim(Value),
}

impl Augmented {
    /// Serialize into a schema value.
    pub fn into_value(self) -> Value {
        match self {
            Self::Wrapped(node) => node.into_value(),
            Self::Verbatim(value) => value,
        }
    }
}

/// Augmented location of every arena node.
#[derive(Debug, Clone)]
pub struct Layout {
    locations: Vec<SchemaPath>,
}

impl Layout {
    /// Lay out `arena` with its root at `root`.
    pub fn compute(arena: &SchemaArena, root: &SchemaPath) -> Self {
        let mut locations = vec![SchemaPath::root(); arena.len()];
        locations[arena.root().index()] = root.clone();
        let mut stack = vec![arena.root()];
        while let Some(id) = stack.pop() {
            for (edge, child) in arena.children(id) {
                locations[child.index()] = edge.apply(&locations[id.index()]);
                stack.push(child);
            }
        }
        Self { locations }
    }

    /// Where node `id` lives in the augmented document.
    pub fn location(&self, id: NodeId) -> &SchemaPath {
        &self.locations[id.index()]
    }
}

/// Augments the nodes of one arena.
#[derive(Debug)]
pub struct Augmenter<'a> {
    arena: &'a SchemaArena,
    root: SchemaPath,
    layout: Layout,
}

impl<'a> Augmenter<'a> {
    /// Prepare to augment `arena` with its root placed at `root`.
    pub fn new(arena: &'a SchemaArena, root: &SchemaPath) -> Self {
        Self {
            arena,
            root: root.clone(),
            layout: Layout::compute(arena, root),
        }
    }

    /// The precomputed layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Augment the whole schema.
    pub fn augment_root(&self) -> Augmented {
        self.augment(self.arena.root(), &self.root)
    }

    /// Augment node `id`, which lives at `path` in the augmented document.
    ///
    /// `path` is what the node's own directives refer back to; it must be
    /// the node's laid-out location.
    pub fn augment(&self, id: NodeId, path: &SchemaPath) -> Augmented {
        debug_assert_eq!(path, self.layout.location(id), "path drifted from layout");

        match self.arena.node(id) {
            NodeKind::Boolean(b) => Augmented::Verbatim(Value::Bool(*b)),
            NodeKind::Schema(node) => match self.arena.alias_of(id) {
                Some(target) => Augmented::Verbatim(json!({
                    "$ref": self.layout.location(target).to_string()
                })),
                None => Augmented::Wrapped(self.wrap(node, path)),
            },
        }
    }

    fn wrap(&self, node: &SchemaNode, path: &SchemaPath) -> AugmentedSchemaNode {
        let mut original = Map::new();
        for (key, value) in &node.keywords {
            original.insert(key.clone(), self.rewrite_keyword(key, value));
        }
        if let Some(ty) = &node.schema_type {
            original.insert("type".to_string(), ty.to_value());
        }
        if let Some(description) = &node.description {
            original.insert("description".to_string(), Value::String(description.clone()));
        }

        if let Some(items) = node.items {
            original.insert(
                "items".to_string(),
                self.augment(items, &Edge::Items.apply(path)).into_value(),
            );
        }
        if let Some(properties) = &node.properties {
            let augmented: Map<String, Value> = properties
                .iter()
                .map(|(name, child)| {
                    let child_path = Edge::Property(name.clone()).apply(path);
                    (name.clone(), self.augment(*child, &child_path).into_value())
                })
                .collect();
            original.insert("properties".to_string(), Value::Object(augmented));
        }
        if let Some(additional) = node.additional_properties {
            original.insert(
                "additionalProperties".to_string(),
                self.augment(additional, &Edge::AdditionalProperties.apply(path))
                    .into_value(),
            );
        }
        for (keyword, defs) in &node.definitions {
            let augmented: Map<String, Value> = defs
                .iter()
                .map(|(name, child)| {
                    let edge = Edge::Definition {
                        keyword: keyword.clone(),
                        name: name.clone(),
                    };
                    (name.clone(), self.augment(*child, &edge.apply(path)).into_value())
                })
                .collect();
            original.insert(keyword.clone(), Value::Object(augmented));
        }

        let mut one_of = vec![
            Value::Object(original),
            Directive::conditional(path).to_schema(),
        ];

        let admits_string = node
            .schema_type
            .as_ref()
            .is_some_and(|t| t.admits(SchemaType::String));
        if !admits_string {
            one_of.push(Directive::Interpolation.to_schema());
        }

        let is_array = node
            .schema_type
            .as_ref()
            .is_some_and(|t| t.is_exactly(SchemaType::Array));
        if is_array {
            let item = match node.items {
                Some(_) => SchemaRef::Pointer(Edge::Items.apply(path)),
                None => SchemaRef::Any,
            };
            one_of.push(Directive::flatten(path).to_schema());
            one_of.push(Directive::for_loop(item).to_schema());
        }

        AugmentedSchemaNode {
            description: node.description.clone(),
            one_of,
        }
    }

    /// Follow bare-reference aliases to the node carrying the keywords.
    fn dealias(&self, mut id: NodeId) -> NodeId {
        for _ in 0..self.arena.len() {
            match self.arena.alias_of(id) {
                Some(target) => id = target,
                None => break,
            }
        }
        id
    }

    /// Location of the verbatim keywords of `id` in the augmented document.
    ///
    /// References found inside a wrapped node's own keywords land here
    /// rather than on the target's wrapper: the enclosing wrapper already
    /// offers the directives.
    fn body(&self, id: NodeId) -> SchemaPath {
        let location = self.layout.location(id);
        match self.arena.node(id) {
            NodeKind::Schema(_) if self.arena.alias_of(id).is_none() => location.original(),
            _ => location.clone(),
        }
    }

    fn rewrite_reference(&self, reference: &str) -> String {
        if !SchemaPath::is_local(reference) {
            return reference.to_string();
        }
        let target = SchemaPath::parse(reference)
            .ok()
            .and_then(|path| self.arena.resolve(&path));
        match target {
            Some(RefTarget::Node(id)) => self.body(self.dealias(id)).to_string(),
            Some(RefTarget::Within { node, rest }) => self.body(node).join(&rest).to_string(),
            None => {
                tracing::warn!(reference, "local $ref does not resolve; leaving it unchanged");
                reference.to_string()
            }
        }
    }

    fn rewrite_keyword(&self, key: &str, value: &Value) -> Value {
        if key == "$ref" {
            if let Value::String(reference) = value {
                return Value::String(self.rewrite_reference(reference));
            }
        }
        if DATA_KEYWORDS.contains(&key) {
            return value.clone();
        }
        if SCHEMA_MAP_KEYWORDS.contains(&key) {
            if let Value::Object(map) = value {
                return Value::Object(
                    map.iter()
                        .map(|(name, schema)| (name.clone(), self.rewrite_any(schema)))
                        .collect(),
                );
            }
        }
        self.rewrite_any(value)
    }

    fn rewrite_any(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, v)| (key.clone(), self.rewrite_keyword(key, v)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.rewrite_any(v)).collect()),
            other => other.clone(),
        }
    }
}

/// Load `schema`, augment it with its root at `root`, and serialize.
///
/// # Errors
///
/// Returns `SchemaError` if `schema` cannot be loaded into an arena.
pub fn augment_schema(schema: &Value, root: &SchemaPath) -> Result<Value, SchemaError> {
    let arena = SchemaArena::from_value(schema)?;
    let augmented = Augmenter::new(&arena, root).augment_root().into_value();
    tracing::debug!(nodes = arena.len(), root = %root, "augmented output schema");
    Ok(augmented)
}
