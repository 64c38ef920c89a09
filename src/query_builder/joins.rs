//! # Joins
//!
//! Every entity a query reaches is a join node: either a root (`from Person
//! hobj1`) or a property join below another node (`join hobj1.house hobj2`).
//! Join nodes belong to the query that declared them and are handed out as
//! [`EntityRef`]s.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use crate::constants::keywords;
use crate::error::{QueryError, Result};

use super::builder::QueryNode;
use super::conditions::{GroupNode, GroupRef, GroupScope, OnGoingRestriction, RestrictionsGroup};
use super::copy::{CopyContext, Copyable, DeepCopy};
use super::render::{RenderContext, WriteQuery};
use super::types::{Entity, QueryType};
use super::values::{IntoValue, Value, ValueNode};

/// How a property join is declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    /// `join`
    #[default]
    Default,
    /// `inner join`
    Inner,
    /// `left join`
    Left,
    /// `left join fetch`
    LeftFetch,
    /// Not declared at all; the property path is used inline
    None,
}

impl JoinType {
    /// Declaration keyword, absent for [`JoinType::None`]
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            JoinType::Default => Some("join"),
            JoinType::Inner => Some("inner join"),
            JoinType::Left => Some("left join"),
            JoinType::LeftFetch => Some("left join fetch"),
            JoinType::None => None,
        }
    }
}

pub(crate) type JoinRef = Rc<RefCell<JoinNode>>;

pub(crate) enum JoinSource {
    Root { entity: String },
    Property { parent: JoinRef, property: String },
}

pub(crate) struct JoinNode {
    pub(crate) owner: Weak<RefCell<QueryNode>>,
    pub(crate) source: JoinSource,
    pub(crate) join_type: JoinType,
    /// Absent for [`JoinType::None`] joins
    pub(crate) alias: Option<String>,
    /// Declaration order within the owning query
    pub(crate) ordinal: usize,
    /// `with` clause; only declared property joins have one
    pub(crate) with_group: Option<GroupRef>,
}

impl JoinNode {
    pub(crate) fn new_ref(
        owner: Weak<RefCell<QueryNode>>,
        source: JoinSource,
        join_type: JoinType,
        alias: Option<String>,
        ordinal: usize,
    ) -> JoinRef {
        Rc::new_cyclic(|this| {
            let declared_property =
                matches!(source, JoinSource::Property { .. }) && join_type != JoinType::None;
            let with_group =
                declared_property.then(|| GroupNode::new_ref(GroupScope::Join(this.clone())));
            RefCell::new(JoinNode {
                owner,
                source,
                join_type,
                alias,
                ordinal,
                with_group,
            })
        })
    }

    fn placeholder() -> Self {
        JoinNode {
            owner: Weak::new(),
            source: JoinSource::Root {
                entity: String::new(),
            },
            join_type: JoinType::Default,
            alias: None,
            ordinal: 0,
            with_group: None,
        }
    }

    pub(crate) fn is_root(&self) -> bool {
        matches!(self.source, JoinSource::Root { .. })
    }

    pub(crate) fn parent(&self) -> Option<&JoinRef> {
        match &self.source {
            JoinSource::Property { parent, .. } => Some(parent),
            JoinSource::Root { .. } => None,
        }
    }

    pub(crate) fn property(&self) -> Option<&str> {
        match &self.source {
            JoinSource::Property { property, .. } => Some(property),
            JoinSource::Root { .. } => None,
        }
    }

    /// The alias, or for an undeclared join the inline path below its parent
    pub(crate) fn path_expression(&self) -> String {
        if let Some(alias) = &self.alias {
            return alias.clone();
        }
        match &self.source {
            JoinSource::Property { parent, property } => {
                format!("{}.{}", parent.borrow().path_expression(), property)
            }
            JoinSource::Root { entity } => entity.clone(),
        }
    }

    /// Append this join's declaration to the `from` clause
    pub(crate) fn write_declaration(&self, ctx: &mut RenderContext<'_>) {
        match &self.source {
            JoinSource::Root { entity } => {
                ctx.push_str(entity);
                if let Some(alias) = &self.alias {
                    ctx.push_str(" ");
                    ctx.push_str(alias);
                }
            }
            JoinSource::Property { parent, property } => {
                let Some(keyword) = self.join_type.keyword() else {
                    return;
                };
                ctx.push_str(keyword);
                ctx.push_str(" ");
                ctx.push_str(&parent.borrow().path_expression());
                ctx.push_str(".");
                ctx.push_str(property);
                if let Some(alias) = &self.alias {
                    ctx.push_str(" ");
                    ctx.push_str(alias);
                }
                if let Some(group) = &self.with_group {
                    let group = group.borrow();
                    if group.applicable_len() > 0 {
                        ctx.push_str(" ");
                        ctx.push_str(keywords::WITH);
                        ctx.push_str(" ");
                        group.write_query(ctx);
                    }
                }
            }
        }
    }
}

/// The root join above `join`
pub(crate) fn root_of(join: &JoinRef) -> JoinRef {
    let mut current = join.clone();
    loop {
        let parent = current.borrow().parent().cloned();
        match parent {
            Some(parent) => current = parent,
            None => return current,
        }
    }
}

impl DeepCopy for JoinRef {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        ctx.copy_cell(self, JoinNode::placeholder, |original, ctx| JoinNode {
            owner: ctx.remap_weak(&original.owner),
            source: match &original.source {
                JoinSource::Root { entity } => JoinSource::Root {
                    entity: entity.clone(),
                },
                JoinSource::Property { parent, property } => JoinSource::Property {
                    parent: parent.deep_copy(ctx),
                    property: property.clone(),
                },
            },
            join_type: original.join_type,
            alias: original.alias.clone(),
            ordinal: original.ordinal,
            with_group: original.with_group.deep_copy(ctx),
        })
    }
}

/// Handle to an entity declared in a query
#[derive(Clone)]
pub struct EntityRef {
    pub(crate) node: JoinRef,
}

impl EntityRef {
    pub(crate) fn new(node: JoinRef) -> Self {
        Self { node }
    }

    /// A property path below this entity, such as `"name"` or `"address.city"`
    pub fn get<T: QueryType>(&self, path: &str) -> Value<T> {
        Value::from_node(ValueNode::Path {
            join: self.node.clone(),
            path: Some(path.to_string()),
        })
    }

    /// A typed property of this entity
    pub fn prop<T: QueryType>(&self, property: Property<T>) -> Value<T> {
        self.get(property.name())
    }

    /// The entity itself, rendered as its alias or inline path
    pub fn value(&self) -> Value<Entity> {
        Value::from_node(ValueNode::Path {
            join: self.node.clone(),
            path: None,
        })
    }

    pub fn alias(&self) -> Option<String> {
        self.node.borrow().alias.clone()
    }

    pub fn path_expression(&self) -> String {
        self.node.borrow().path_expression()
    }

    pub fn join_type(&self) -> JoinType {
        self.node.borrow().join_type
    }

    pub fn is_root(&self) -> bool {
        self.node.borrow().is_root()
    }

    /// Entity name of a root, `None` for property joins
    pub fn entity_name(&self) -> Option<String> {
        match &self.node.borrow().source {
            JoinSource::Root { entity } => Some(entity.clone()),
            JoinSource::Property { .. } => None,
        }
    }

    /// Joined property name, `None` for roots
    pub fn property(&self) -> Option<String> {
        self.node.borrow().property().map(str::to_string)
    }

    pub fn parent(&self) -> Option<EntityRef> {
        self.node.borrow().parent().cloned().map(EntityRef::new)
    }

    /// Restrictions rendered in this join's `with` clause
    pub fn with_group(&self) -> Result<RestrictionsGroup> {
        let node = self.node.borrow();
        match &node.with_group {
            Some(group) => Ok(RestrictionsGroup::new(group.clone())),
            None => Err(QueryError::invalid_join(format!(
                "'{}' does not declare a join and cannot take a with clause",
                node.path_expression()
            ))),
        }
    }

    /// Start a restriction in this join's `with` clause
    pub fn with<T: QueryType>(&self, value: impl IntoValue<T>) -> Result<OnGoingRestriction<T>> {
        Ok(self.with_group()?.and(value))
    }

    /// Whether both handles refer to the same join node
    pub fn same_entity(&self, other: &EntityRef) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.same_entity(other)
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node.borrow();
        f.debug_struct("EntityRef")
            .field("path", &node.path_expression())
            .field("join_type", &node.join_type)
            .finish()
    }
}

impl Copyable for EntityRef {
    fn copy_in(&self, ctx: &mut CopyContext) -> Self {
        EntityRef::new(self.node.deep_copy(ctx))
    }

    fn lookup_copy(&self, ctx: &CopyContext) -> Option<Self> {
        ctx.lookup(&self.node).map(EntityRef::new)
    }
}

/// A named, typed property of an entity
///
/// ```rust
/// use typesafe_query::prelude::*;
///
/// struct Person;
///
/// impl Person {
///     const AGE: Property<i32> = Property::new("age");
/// }
///
/// let query = TypeSafeQuery::new();
/// let person = query.from("Person");
/// let age = person.prop(Person::AGE);
/// assert_eq!(age.render(&Default::default()).text, "hobj1.age");
/// ```
pub struct Property<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Property<T> {}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&self.name).finish()
    }
}
