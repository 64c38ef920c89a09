//! # Query Assembly
//!
//! [`TypeSafeQuery`] is a root query; [`SubQuery`] is a query nested inside
//! another one. Both expose the building operations of [`QueryScope`] and
//! render through the same clause writer:
//!
//! `select [distinct] ... from <roots and their joins> where ... group by ...
//! having ... order by ...`
//!
//! Empty clauses are omitted and clauses are separated by a single space.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use tracing::{debug, instrument};

use crate::config::RenderConfig;
use crate::constants::keywords;
use crate::error::{QueryError, Result};
use crate::logging::log_render_operation;

use super::aliases::{AliasRegistry, AliasRegistryRef};
use super::conditions::{
    GroupNode, GroupRef, GroupScope, OnGoingRestriction, RestrictionChain, RestrictionsGroup,
};
use super::copy::{CopyContext, Copyable, DeepCopy};
use super::functions::CaseBuilder;
use super::joins::{root_of, EntityRef, JoinNode, JoinRef, JoinSource, JoinType};
use super::ordering::{Direction, OrderBy, OrderItem};
use super::pagination::Pagination;
use super::predicate::RestrictionPredicate;
use super::render::{QueryFragment, RenderContext, RenderedQuery, WriteQuery};
use super::scope::{is_same_or_ancestor, reject, validate_acyclic_in_query, validate_value};
use super::templates::QueryFunction;
use super::types::{Param, QueryType};
use super::values::{IntoValue, Value, ValueNode, ValueRef};

pub(crate) type QueryRef = Rc<RefCell<QueryNode>>;

pub(crate) struct SelectItem {
    pub(crate) value: ValueRef,
    pub(crate) alias: Option<String>,
}

pub(crate) struct QueryNode {
    pub(crate) parent: Option<Weak<RefCell<QueryNode>>>,
    pub(crate) config: Rc<RenderConfig>,
    pub(crate) aliases: AliasRegistryRef,
    /// Roots and property joins, in declaration order
    pub(crate) joins: Vec<JoinRef>,
    pub(crate) selection: Vec<SelectItem>,
    pub(crate) distinct: bool,
    pub(crate) where_group: GroupRef,
    pub(crate) group_by: Vec<ValueRef>,
    pub(crate) having_group: GroupRef,
    pub(crate) order_by: Vec<OrderItem>,
    pub(crate) subqueries: Vec<QueryRef>,
    /// Only read on the root query
    pub(crate) default_predicate: Option<Rc<dyn RestrictionPredicate>>,
    pub(crate) pagination: Pagination,
}

impl QueryNode {
    fn new_ref(
        parent: Option<Weak<RefCell<QueryNode>>>,
        config: Rc<RenderConfig>,
        aliases: AliasRegistryRef,
    ) -> QueryRef {
        Rc::new_cyclic(|this| {
            RefCell::new(QueryNode {
                parent,
                config,
                aliases,
                joins: Vec::new(),
                selection: Vec::new(),
                distinct: false,
                where_group: GroupNode::new_ref(GroupScope::Query(this.clone())),
                group_by: Vec::new(),
                having_group: GroupNode::new_ref(GroupScope::Query(this.clone())),
                order_by: Vec::new(),
                subqueries: Vec::new(),
                default_predicate: None,
                pagination: Pagination::default(),
            })
        })
    }

    fn placeholder() -> Self {
        QueryNode {
            parent: None,
            config: Rc::new(RenderConfig::default()),
            aliases: AliasRegistry::new_ref(""),
            joins: Vec::new(),
            selection: Vec::new(),
            distinct: false,
            where_group: GroupNode::new_ref(GroupScope::Query(Weak::new())),
            group_by: Vec::new(),
            having_group: GroupNode::new_ref(GroupScope::Query(Weak::new())),
            order_by: Vec::new(),
            subqueries: Vec::new(),
            default_predicate: None,
            pagination: Pagination::default(),
        }
    }

    pub(crate) fn parent(&self) -> Option<QueryRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }
}

fn root_query(query: &QueryRef) -> QueryRef {
    let mut current = query.clone();
    loop {
        let parent = current.borrow().parent();
        match parent {
            Some(parent) => current = parent,
            None => return current,
        }
    }
}

/// The default predicate configured on the root of `query`'s tree
pub(crate) fn default_predicate_of(query: &QueryRef) -> Option<Rc<dyn RestrictionPredicate>> {
    let root = root_query(query);
    let predicate = root.borrow().default_predicate.clone();
    predicate
}

fn start_clause(ctx: &mut RenderContext<'_>, first: &mut bool, keyword: &str) {
    if !*first {
        ctx.push_str(" ");
    }
    *first = false;
    ctx.push_str(keyword);
    ctx.push_str(" ");
}

fn write_list(ctx: &mut RenderContext<'_>, values: &[ValueRef]) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            ctx.push_str(", ");
        }
        value.write_query(ctx);
    }
}

impl WriteQuery for QueryNode {
    fn write_query(&self, ctx: &mut RenderContext<'_>) {
        let mut first = true;

        if !self.selection.is_empty() {
            start_clause(ctx, &mut first, keywords::SELECT);
            if self.distinct {
                ctx.push_str(keywords::DISTINCT);
                ctx.push_str(" ");
            }
            for (i, item) in self.selection.iter().enumerate() {
                if i > 0 {
                    ctx.push_str(", ");
                }
                item.value.write_query(ctx);
                if let Some(alias) = &item.alias {
                    ctx.push_str(" ");
                    ctx.push_str(keywords::AS);
                    ctx.push_str(" ");
                    ctx.push_str(alias);
                }
            }
        }

        let roots: Vec<&JoinRef> = self
            .joins
            .iter()
            .filter(|join| join.borrow().is_root())
            .collect();
        if !roots.is_empty() {
            start_clause(ctx, &mut first, keywords::FROM);
            for (i, root) in roots.into_iter().enumerate() {
                if i > 0 {
                    ctx.push_str(", ");
                }
                root.borrow().write_declaration(ctx);
                for join in &self.joins {
                    let node = join.borrow();
                    if node.is_root() || node.join_type == JoinType::None {
                        continue;
                    }
                    if Rc::ptr_eq(&root_of(join), root) {
                        ctx.push_str(" ");
                        node.write_declaration(ctx);
                    }
                }
            }
        }

        let where_group = self.where_group.borrow();
        if where_group.applicable_len() > 0 {
            start_clause(ctx, &mut first, keywords::WHERE);
            where_group.write_query(ctx);
        }

        if !self.group_by.is_empty() {
            start_clause(ctx, &mut first, keywords::GROUP_BY);
            write_list(ctx, &self.group_by);
        }

        let having_group = self.having_group.borrow();
        if having_group.applicable_len() > 0 {
            start_clause(ctx, &mut first, keywords::HAVING);
            having_group.write_query(ctx);
        }

        if !self.order_by.is_empty() {
            start_clause(ctx, &mut first, keywords::ORDER_BY);
            for (i, item) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ctx.push_str(", ");
                }
                item.value.write_query(ctx);
                if item.direction == Direction::Desc {
                    ctx.push_str(" ");
                    ctx.push_str(keywords::DESC);
                }
            }
        }
    }
}

impl DeepCopy for QueryRef {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        ctx.copy_cell(self, QueryNode::placeholder, |original, ctx| QueryNode {
            parent: original.parent.as_ref().map(|parent| ctx.remap_weak(parent)),
            config: original.config.clone(),
            aliases: original.aliases.deep_copy(ctx),
            joins: original.joins.deep_copy(ctx),
            selection: original
                .selection
                .iter()
                .map(|item| SelectItem {
                    value: item.value.deep_copy(ctx),
                    alias: item.alias.clone(),
                })
                .collect(),
            distinct: original.distinct,
            where_group: original.where_group.deep_copy(ctx),
            group_by: original.group_by.deep_copy(ctx),
            having_group: original.having_group.deep_copy(ctx),
            order_by: original
                .order_by
                .iter()
                .map(|item| OrderItem {
                    value: item.value.deep_copy(ctx),
                    direction: item.direction,
                })
                .collect(),
            subqueries: original.subqueries.deep_copy(ctx),
            default_predicate: original.default_predicate.clone(),
            pagination: original.pagination,
        })
    }
}

fn assign_alias(query: &QueryRef, requested: Option<&str>) -> Result<String> {
    let aliases = query.borrow().aliases.clone();
    let mut registry = aliases.borrow_mut();
    match requested {
        Some(alias) => {
            registry.claim(alias)?;
            Ok(alias.to_string())
        }
        None => Ok(registry.generate()),
    }
}

fn push_join(
    query: &QueryRef,
    source: JoinSource,
    join_type: JoinType,
    alias: Option<String>,
) -> JoinRef {
    let ordinal = query.borrow().joins.len();
    let join = JoinNode::new_ref(Rc::downgrade(query), source, join_type, alias, ordinal);
    query.borrow_mut().joins.push(join.clone());
    join
}

fn declare_root(query: &QueryRef, entity: &str, alias: Option<&str>) -> Result<EntityRef> {
    let alias = match assign_alias(query, alias) {
        Ok(alias) => alias,
        Err(error) => return reject("from", error),
    };
    Ok(push_root(query, entity, alias))
}

fn push_root(query: &QueryRef, entity: &str, alias: String) -> EntityRef {
    debug!(entity = %entity, alias = %alias, "Root entity declared");
    let join = push_join(
        query,
        JoinSource::Root {
            entity: entity.to_string(),
        },
        JoinType::Default,
        Some(alias),
    );
    EntityRef::new(join)
}

fn find_join(query: &QueryRef, parent: &JoinRef, property: &str, join_type: JoinType) -> Option<JoinRef> {
    query
        .borrow()
        .joins
        .iter()
        .find(|join| {
            let node = join.borrow();
            node.join_type == join_type
                && node.property() == Some(property)
                && node.parent().is_some_and(|candidate| Rc::ptr_eq(candidate, parent))
        })
        .cloned()
}

fn declare_join(
    query: &QueryRef,
    parent: &EntityRef,
    property: &str,
    join_type: JoinType,
    alias: Option<&str>,
    reuse: bool,
) -> Result<EntityRef> {
    let parent_owner = parent.node.borrow().owner.upgrade();
    if !parent_owner.is_some_and(|owner| Rc::ptr_eq(&owner, query)) {
        return reject(
            "join",
            QueryError::invalid_join(format!(
                "'{}' is not declared by the joining query",
                parent.path_expression()
            )),
        );
    }

    if reuse && alias.is_none() {
        if let Some(existing) = find_join(query, &parent.node, property, join_type) {
            return Ok(EntityRef::new(existing));
        }
    }

    let alias = match (join_type, alias) {
        (JoinType::None, Some(alias)) => {
            return reject(
                "join",
                QueryError::invalid_join(format!(
                    "undeclared join '{}.{}' cannot be aliased '{}'",
                    parent.path_expression(),
                    property,
                    alias
                )),
            )
        }
        (JoinType::None, None) => None,
        (_, requested) => match assign_alias(query, requested) {
            Ok(alias) => Some(alias),
            Err(error) => return reject("join", error),
        },
    };

    debug!(
        parent = %parent.path_expression(),
        property = %property,
        join_type = ?join_type,
        alias = ?alias,
        "Join declared"
    );
    let join = push_join(
        query,
        JoinSource::Property {
            parent: parent.node.clone(),
            property: property.to_string(),
        },
        join_type,
        alias,
    );
    Ok(EntityRef::new(join))
}

fn rename_join(query: &QueryRef, entity: &EntityRef, alias: &str) -> Result<()> {
    let (old, shares_registry) = {
        let node = entity.node.borrow();
        if node.alias.is_none() {
            return reject(
                "register_alias",
                QueryError::invalid_join(format!(
                    "undeclared join '{}' cannot be aliased",
                    node.path_expression()
                )),
            );
        }
        let shares_registry = node
            .owner
            .upgrade()
            .is_some_and(|owner| Rc::ptr_eq(&owner.borrow().aliases, &query.borrow().aliases));
        (node.alias.clone(), shares_registry)
    };
    if !shares_registry {
        return reject(
            "register_alias",
            QueryError::invalid_join("entity is not declared in this query tree"),
        );
    }
    if old.as_deref() == Some(alias) {
        return Ok(());
    }

    let aliases = query.borrow().aliases.clone();
    let mut registry = aliases.borrow_mut();
    if let Err(error) = registry.claim(alias) {
        return reject("register_alias", error);
    }
    if let Some(old) = &old {
        registry.release(old);
    }
    entity.node.borrow_mut().alias = Some(alias.to_string());
    debug!(old = ?old, alias = %alias, "Alias registered");
    Ok(())
}

fn find_alias(query: &QueryRef, alias: &str) -> Option<JoinRef> {
    let mut current = Some(query.clone());
    while let Some(node) = current {
        let found = node
            .borrow()
            .joins
            .iter()
            .find(|join| join.borrow().alias.as_deref() == Some(alias))
            .cloned();
        if found.is_some() {
            return found;
        }
        current = node.borrow().parent();
    }
    None
}

/// Check that a value may be used inside `query`
pub(crate) fn validate_for_query(query: &QueryRef, operation: &str, value: &ValueRef) -> Result<()> {
    match validate_value(value, query, None) {
        Ok(()) => Ok(()),
        Err(error) => reject(operation, error),
    }
}

/// Validate a value about to be added to one of `query`'s own clauses
fn validate_for_clause(query: &QueryRef, operation: &str, value: &ValueRef) -> Result<()> {
    validate_for_query(query, operation, value)?;
    match validate_acyclic_in_query(value, query) {
        Ok(()) => Ok(()),
        Err(error) => reject(operation, error),
    }
}

pub(crate) fn add_order(query: &QueryRef, value: ValueRef, direction: Direction) -> Result<()> {
    validate_for_clause(query, "order_by", &value)?;
    query
        .borrow_mut()
        .order_by
        .push(OrderItem { value, direction });
    Ok(())
}

/// Whether `group` may be referenced from `query`
pub(crate) fn group_visible_from(group: &GroupRef, query: &QueryRef) -> bool {
    let resolved = group.borrow().scope.resolve();
    resolved.is_some_and(|(owner, _)| is_same_or_ancestor(&owner, query))
}

/// Opaque handle to a query node
#[derive(Clone)]
pub struct QueryHandle {
    pub(crate) node: QueryRef,
}

/// Building operations shared by root queries and subqueries
pub trait QueryScope {
    #[doc(hidden)]
    fn handle(&self) -> &QueryHandle;

    /// Declare a root entity with a generated alias
    fn from(&self, entity: &str) -> EntityRef {
        let query = &self.handle().node;
        let alias = query.borrow().aliases.borrow_mut().generate();
        push_root(query, entity, alias)
    }

    /// Declare a root entity with a custom alias
    fn from_as(&self, entity: &str, alias: &str) -> Result<EntityRef> {
        declare_root(&self.handle().node, entity, Some(alias))
    }

    /// Join a property of `parent`, reusing an identical earlier join
    fn join(&self, parent: &EntityRef, property: &str) -> Result<EntityRef> {
        declare_join(&self.handle().node, parent, property, JoinType::Default, None, true)
    }

    /// Join with an explicit join type, reusing an identical earlier join
    fn join_with(&self, parent: &EntityRef, property: &str, join_type: JoinType) -> Result<EntityRef> {
        declare_join(&self.handle().node, parent, property, join_type, None, true)
    }

    /// Join again even if an identical join exists
    fn join_additional(&self, parent: &EntityRef, property: &str, join_type: JoinType) -> Result<EntityRef> {
        declare_join(&self.handle().node, parent, property, join_type, None, false)
    }

    /// Join under a custom alias
    fn join_as(&self, parent: &EntityRef, property: &str, join_type: JoinType, alias: &str) -> Result<EntityRef> {
        declare_join(&self.handle().node, parent, property, join_type, Some(alias), false)
    }

    /// Replace an entity's alias
    fn register_alias(&self, entity: &EntityRef, alias: &str) -> Result<()> {
        rename_join(&self.handle().node, entity, alias)
    }

    /// Find an entity by alias in this query or an enclosing one
    fn entity_by_alias(&self, alias: &str) -> Option<EntityRef> {
        find_alias(&self.handle().node, alias).map(EntityRef::new)
    }

    /// Root entities, in declaration order
    fn roots(&self) -> Vec<EntityRef> {
        self.handle()
            .node
            .borrow()
            .joins
            .iter()
            .filter(|join| join.borrow().is_root())
            .cloned()
            .map(EntityRef::new)
            .collect()
    }

    /// Start a `where` restriction
    fn filter<T: QueryType>(&self, value: impl IntoValue<T>) -> OnGoingRestriction<T> {
        self.where_group().and(value)
    }

    fn filter_group(&self, group: &RestrictionsGroup) -> Result<RestrictionChain> {
        self.where_group().and_group(group)
    }

    fn filter_exists<U: QueryType>(&self, subquery: &SubQuery<U>) -> Result<RestrictionChain> {
        self.where_group().and_exists(subquery)
    }

    fn filter_not_exists<U: QueryType>(&self, subquery: &SubQuery<U>) -> Result<RestrictionChain> {
        self.where_group().and_not_exists(subquery)
    }

    /// Append custom `where` text
    fn filter_custom(&self, text: &str, params: Vec<Param>) -> Result<RestrictionChain> {
        self.where_group().and_custom(text, params)
    }

    fn where_group(&self) -> RestrictionsGroup {
        RestrictionsGroup::new(self.handle().node.borrow().where_group.clone())
    }

    /// Start a `having` restriction
    fn having<T: QueryType>(&self, value: impl IntoValue<T>) -> OnGoingRestriction<T> {
        self.having_group().and(value)
    }

    fn having_group(&self) -> RestrictionsGroup {
        RestrictionsGroup::new(self.handle().node.borrow().having_group.clone())
    }

    /// A detached group scoped to this query, for nesting with `and_group`
    /// or `or_group`
    fn new_group(&self) -> RestrictionsGroup {
        let scope = GroupScope::Query(Rc::downgrade(&self.handle().node));
        RestrictionsGroup::new(GroupNode::new_ref(scope))
    }

    fn select<T: QueryType>(&self, value: impl IntoValue<T>) -> Result<()> {
        let value = value.into_value().node;
        let query = &self.handle().node;
        validate_for_clause(query, "select", &value)?;
        query
            .borrow_mut()
            .selection
            .push(SelectItem { value, alias: None });
        Ok(())
    }

    fn select_as<T: QueryType>(&self, value: impl IntoValue<T>, alias: &str) -> Result<()> {
        let value = value.into_value().node;
        let query = &self.handle().node;
        validate_for_clause(query, "select", &value)?;
        query.borrow_mut().selection.push(SelectItem {
            value,
            alias: Some(alias.to_string()),
        });
        Ok(())
    }

    fn select_distinct(&self) {
        self.handle().node.borrow_mut().distinct = true;
    }

    fn group_by<T: QueryType>(&self, value: impl IntoValue<T>) -> Result<()> {
        let value = value.into_value().node;
        let query = &self.handle().node;
        validate_for_clause(query, "group_by", &value)?;
        query.borrow_mut().group_by.push(value);
        Ok(())
    }

    /// Append orderings with [`OrderBy::asc`] and [`OrderBy::desc`]
    fn order_by(&self) -> OrderBy {
        OrderBy::new(self.handle().node.clone())
    }

    /// Declare a subquery whose result is of type `U`
    fn subquery<U: QueryType>(&self) -> SubQuery<U> {
        let parent = &self.handle().node;
        let (config, aliases) = {
            let node = parent.borrow();
            (node.config.clone(), node.aliases.clone())
        };
        let node = QueryNode::new_ref(Some(Rc::downgrade(parent)), config, aliases);
        parent.borrow_mut().subqueries.push(node.clone());
        debug!(result_type = U::TYPE_NAME, "Subquery declared");
        SubQuery::new(node)
    }

    /// Build a `case when ... then ... else ... end` value
    fn case_when<U: QueryType>(&self) -> CaseBuilder<U> {
        CaseBuilder::new(self.handle().node.clone())
    }
}

/// A root query
pub struct TypeSafeQuery {
    handle: QueryHandle,
}

impl TypeSafeQuery {
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        let aliases = AliasRegistry::new_ref(&config.alias_prefix);
        let node = QueryNode::new_ref(None, Rc::new(config), aliases);
        Self {
            handle: QueryHandle { node },
        }
    }

    pub fn config(&self) -> RenderConfig {
        self.handle.node.borrow().config.as_ref().clone()
    }

    /// Predicate applied to every restriction without its own
    pub fn set_default_predicate(&self, predicate: impl RestrictionPredicate + 'static) {
        self.handle.node.borrow_mut().default_predicate = Some(Rc::new(predicate));
    }

    pub fn clear_default_predicate(&self) {
        self.handle.node.borrow_mut().default_predicate = None;
    }

    pub fn set_first_result(&self, first_result: u32) {
        self.handle.node.borrow_mut().pagination.first_result = Some(first_result);
    }

    pub fn set_max_results(&self, max_results: u32) {
        self.handle.node.borrow_mut().pagination.max_results = Some(max_results);
    }

    /// Window the results to a 1-indexed page
    pub fn paginate(&self, page: u32, per_page: u32) {
        self.set_pagination(Pagination::new(page, per_page));
    }

    pub fn set_pagination(&self, pagination: Pagination) {
        self.handle.node.borrow_mut().pagination = pagination;
    }

    pub fn pagination(&self) -> Pagination {
        self.handle.node.borrow().pagination
    }

    /// Run a reusable query function against this query
    pub fn apply(&self, function: &impl QueryFunction) -> Result<()> {
        function.apply(self)
    }

    /// Render text, parameters and pagination
    #[instrument(level = "debug", skip_all)]
    pub fn render(&self) -> RenderedQuery {
        let node = self.handle.node.borrow();
        let config = node.config.clone();
        let mut ctx = RenderContext::new(&config);
        node.write_query(&mut ctx);
        let QueryFragment { text, params } = ctx.finish();

        log_render_operation(
            "root",
            text.len(),
            params.len(),
            config.log_rendered_queries.then_some(text.as_str()),
        );

        RenderedQuery {
            text,
            params,
            first_result: node.pagination.first_result,
            max_results: node.pagination.max_results,
        }
    }
}

impl Default for TypeSafeQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryScope for TypeSafeQuery {
    fn handle(&self) -> &QueryHandle {
        &self.handle
    }
}

impl fmt::Debug for TypeSafeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSafeQuery")
            .field("text", &self.render().text)
            .finish()
    }
}

impl Copyable for TypeSafeQuery {
    fn copy_in(&self, ctx: &mut CopyContext) -> Self {
        Self {
            handle: QueryHandle {
                node: self.handle.node.deep_copy(ctx),
            },
        }
    }

    fn lookup_copy(&self, ctx: &CopyContext) -> Option<Self> {
        ctx.lookup(&self.handle.node).map(|node| Self {
            handle: QueryHandle { node },
        })
    }
}

/// A query nested in another query, producing values of type `T`
pub struct SubQuery<T> {
    handle: QueryHandle,
    _type: PhantomData<fn() -> T>,
}

impl<T: QueryType> SubQuery<T> {
    pub(crate) fn new(node: QueryRef) -> Self {
        Self {
            handle: QueryHandle { node },
            _type: PhantomData,
        }
    }

    /// This subquery as a value of its result type
    pub fn value(&self) -> Value<T> {
        Value::from_node(ValueNode::Subquery(self.handle.node.clone()))
    }

    /// Render this subquery on its own
    pub fn render(&self) -> QueryFragment {
        let node = self.handle.node.borrow();
        let config = node.config.clone();
        let mut ctx = RenderContext::new(&config);
        node.write_query(&mut ctx);
        let fragment = ctx.finish();
        log_render_operation("subquery", fragment.text.len(), fragment.params.len(), None);
        fragment
    }
}

impl<T: QueryType> QueryScope for SubQuery<T> {
    fn handle(&self) -> &QueryHandle {
        &self.handle
    }
}

impl<T: QueryType> fmt::Debug for SubQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubQuery")
            .field("type", &T::TYPE_NAME)
            .field("text", &self.render().text)
            .finish()
    }
}

impl<T: QueryType> Copyable for SubQuery<T> {
    fn copy_in(&self, ctx: &mut CopyContext) -> Self {
        SubQuery::new(self.handle.node.deep_copy(ctx))
    }

    fn lookup_copy(&self, ctx: &CopyContext) -> Option<Self> {
        ctx.lookup(&self.handle.node).map(SubQuery::new)
    }
}
