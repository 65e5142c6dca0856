//! Declared relationships between entity types.
//!
//! A [`RelationLink`] records how one entity's property relates to another
//! entity type. The shape of the link is a closed variant: either a plain
//! key equality, which can be inspected without running any code, or a
//! custom predicate callback for anything more involved.
//!
//! Links reference their target by [`EntityKey`]; the target's metadata is
//! looked up in the registry when the link is resolved, never embedded.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tablemap_core::TableMapResult;

use crate::model::{Entity, EntityKey};
use crate::query::expressions::Expression;
use crate::query::lookups::WhereExpressionBuilder;
use crate::value::Value;

/// How the parent side of a relation is supplied at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RelationKind {
    /// Resolved against a source record instance; yields bound literals.
    Foreign,
    /// Resolved against the parent's builder and alias; yields column-to-column predicates.
    Join,
}

/// A predicate callback: `(target builder, parent context) -> predicate`.
///
/// Callbacks must be pure. They are invoked once per resolution and may be
/// invoked concurrently from independent query constructions.
pub type PredicateFn = Arc<
    dyn Fn(&WhereExpressionBuilder<'_>, &RelationContext<'_>) -> TableMapResult<Expression>
        + Send
        + Sync,
>;

/// The shape of a relation predicate.
#[derive(Clone)]
pub enum RelationShape {
    /// `target.target_field = <parent>.source_field`.
    ///
    /// For `Foreign` links the right side is the source record's value; for
    /// `Join` links it is the parent's qualified column.
    KeyEquality {
        /// The property read from the parent side.
        source_field: String,
        /// The property resolved on the target entity.
        target_field: String,
    },
    /// An arbitrary predicate built by a callback.
    Custom(PredicateFn),
}

impl RelationShape {
    /// Creates a key-equality shape.
    pub fn key_equality(source_field: impl Into<String>, target_field: impl Into<String>) -> Self {
        Self::KeyEquality {
            source_field: source_field.into(),
            target_field: target_field.into(),
        }
    }

    /// Creates a custom shape from a callback.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&WhereExpressionBuilder<'_>, &RelationContext<'_>) -> TableMapResult<Expression>
            + Send
            + Sync
            + 'static,
    {
        Self::Custom(Arc::new(f))
    }
}

impl fmt::Debug for RelationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyEquality {
                source_field,
                target_field,
            } => f
                .debug_struct("KeyEquality")
                .field("source_field", source_field)
                .field("target_field", target_field)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A declared relation from one entity's property to another entity type.
#[derive(Debug, Clone)]
pub struct RelationLink {
    kind: RelationKind,
    target: EntityKey,
    shape: RelationShape,
}

impl RelationLink {
    /// Creates a link to entity type `T`.
    pub fn new<T: Entity>(kind: RelationKind, shape: RelationShape) -> Self {
        Self::with_target(kind, EntityKey::of::<T>(), shape)
    }

    /// Creates a link to the entity identified by `target`.
    pub const fn with_target(kind: RelationKind, target: EntityKey, shape: RelationShape) -> Self {
        Self {
            kind,
            target,
            shape,
        }
    }

    /// Foreign or Join.
    pub const fn kind(&self) -> RelationKind {
        self.kind
    }

    /// The target entity type.
    pub const fn target(&self) -> EntityKey {
        self.target
    }

    /// The predicate shape.
    pub const fn shape(&self) -> &RelationShape {
        &self.shape
    }
}

/// The parent side handed to a relation predicate.
pub enum RelationContext<'a> {
    /// The source record of a `Foreign` link.
    Record {
        /// The record, for typed downcasts.
        record: &'a dyn Any,
        /// The record's field values.
        values: &'a dyn Entity,
    },
    /// The parent builder of a `Join` link.
    Parent(&'a WhereExpressionBuilder<'a>),
}

impl<'a> RelationContext<'a> {
    /// Wraps a source record.
    pub fn record_of<E: Entity>(record: &'a E) -> Self {
        Self::Record {
            record,
            values: record,
        }
    }

    /// Returns the source record if it is of type `E`.
    pub fn record<E: Entity>(&self) -> Option<&E> {
        match self {
            Self::Record { record, .. } => record.downcast_ref::<E>(),
            Self::Parent(_) => None,
        }
    }

    /// Returns a field value of the source record.
    pub fn field_value(&self, name: &str) -> Option<Value> {
        match self {
            Self::Record { values, .. } => values.field_value(name),
            Self::Parent(_) => None,
        }
    }

    /// Returns the parent builder of a join.
    pub const fn parent(&self) -> Option<&WhereExpressionBuilder<'a>> {
        match self {
            Self::Parent(builder) => Some(*builder),
            Self::Record { .. } => None,
        }
    }

    /// The relation kind this context belongs to.
    pub const fn kind(&self) -> RelationKind {
        match self {
            Self::Record { .. } => RelationKind::Foreign,
            Self::Parent(_) => RelationKind::Join,
        }
    }
}

impl fmt::Debug for RelationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record { .. } => f.write_str("Record(..)"),
            Self::Parent(builder) => f.debug_tuple("Parent").field(builder).finish(),
        }
    }
}
