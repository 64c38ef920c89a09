//! # Restrictions
//!
//! A restriction compares a left value with a right value through an
//! [`Operator`]. Restrictions live in groups; each member of a group carries
//! the combinator joining it to the members before it. Groups nest, and a
//! nested group is wrapped in parentheses only when more than one of its
//! members is rendered.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::config::{CastLiteralPolicy, RenderConfig};
use crate::constants::{keywords, LIKE_WILDCARD};
use crate::error::{QueryError, Result};

use super::builder::{default_predicate_of, QueryNode, QueryRef, SubQuery};
use super::copy::{CopyContext, Copyable, DeepCopy};
use super::joins::{JoinNode, JoinRef};
use super::predicate::RestrictionPredicate;
use super::render::{check_fragment, QueryFragment, RenderContext, WriteQuery};
use super::scope::{reject, validate_in_group, validate_nested_group};
use super::types::{ComparableType, Literal, Param, QueryType, TemporalType, TextType};
use super::values::{IntoValue, Value, ValueNode, ValueRef, ValueView};

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Exists,
    NotExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    Both,
    LeftOnly,
    RightOnly,
}

impl Operator {
    pub fn token(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Like => "like",
            Operator::NotLike => "not like",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::IsNull => "is null",
            Operator::IsNotNull => "is not null",
            Operator::Exists => "exists",
            Operator::NotExists => "not exists",
        }
    }

    fn arity(self) -> Arity {
        match self {
            Operator::IsNull | Operator::IsNotNull => Arity::LeftOnly,
            Operator::Exists | Operator::NotExists => Arity::RightOnly,
            _ => Arity::Both,
        }
    }

    /// Reject side combinations this operator cannot render
    pub(crate) fn check_shape(self, has_left: bool, has_right: bool) -> Result<()> {
        let message = match self.arity() {
            Arity::Both if !has_left => "requires a left side",
            Arity::Both if !has_right => "requires a right side",
            Arity::LeftOnly if !has_left => "requires a left side",
            Arity::LeftOnly if has_right => "does not accept a right side",
            Arity::RightOnly if has_left => "does not accept a left side",
            Arity::RightOnly if !has_right => "requires a right side",
            _ => return Ok(()),
        };
        Err(QueryError::malformed_restriction(self.token(), message))
    }
}

/// How a group member joins the members before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn keyword(self) -> &'static str {
        match self {
            Combinator::And => keywords::AND,
            Combinator::Or => keywords::OR,
        }
    }
}

/// What a group's restrictions are scoped to
#[derive(Clone)]
pub(crate) enum GroupScope {
    Query(Weak<RefCell<QueryNode>>),
    /// The `with` clause of a join
    Join(Weak<RefCell<JoinNode>>),
}

impl GroupScope {
    /// The query whose joins are visible, and the join whose `with` clause
    /// this is
    pub(crate) fn resolve(&self) -> Option<(QueryRef, Option<JoinRef>)> {
        match self {
            GroupScope::Query(query) => query.upgrade().map(|query| (query, None)),
            GroupScope::Join(join) => {
                let join = join.upgrade()?;
                let owner = join.borrow().owner.upgrade()?;
                Some((owner, Some(join)))
            }
        }
    }

    fn remap(&self, ctx: &CopyContext) -> Self {
        match self {
            GroupScope::Query(query) => GroupScope::Query(ctx.remap_weak(query)),
            GroupScope::Join(join) => GroupScope::Join(ctx.remap_weak(join)),
        }
    }
}

pub(crate) type RestrictionRef = Rc<RefCell<RestrictionNode>>;
pub(crate) type GroupRef = Rc<RefCell<GroupNode>>;

pub(crate) struct RestrictionNode {
    pub(crate) group: Weak<RefCell<GroupNode>>,
    pub(crate) left: Option<ValueRef>,
    pub(crate) operator: Operator,
    pub(crate) right: Option<ValueRef>,
    /// Overrides the query's default predicate
    pub(crate) predicate: Option<Rc<dyn RestrictionPredicate>>,
}

impl RestrictionNode {
    fn placeholder() -> Self {
        RestrictionNode {
            group: Weak::new(),
            left: None,
            operator: Operator::Eq,
            right: None,
            predicate: None,
        }
    }

    pub(crate) fn is_applicable(&self, default: Option<&dyn RestrictionPredicate>) -> bool {
        let Some(predicate) = self.predicate.as_deref().or(default) else {
            return true;
        };
        self.left
            .iter()
            .chain(self.right.iter())
            .all(|value| predicate.is_value_applicable(ValueView::new(value)))
    }

    fn default_predicate(&self) -> Option<Rc<dyn RestrictionPredicate>> {
        let group = self.group.upgrade()?;
        let predicate = group.borrow().default_predicate();
        predicate
    }
}

fn write_side(ctx: &mut RenderContext<'_>, value: &ValueNode, inline_literals: bool) {
    if inline_literals {
        ctx.with_literals(|ctx| value.write_query(ctx));
    } else {
        value.write_query(ctx);
    }
}

impl WriteQuery for RestrictionNode {
    fn write_query(&self, ctx: &mut RenderContext<'_>) {
        let inline_opposite = ctx.config().cast_literal_policy == CastLiteralPolicy::InlineOpposite;
        let left_cast = self.left.as_ref().is_some_and(|value| value.is_cast());
        let right_cast = self.right.as_ref().is_some_and(|value| value.is_cast());

        if let Some(left) = &self.left {
            write_side(ctx, left, inline_opposite && right_cast);
            ctx.push_str(" ");
        }
        let token = self
            .right
            .as_ref()
            .and_then(|right| right.operator_token(self.operator))
            .unwrap_or(self.operator.token());
        ctx.push_str(token);
        if let Some(right) = &self.right {
            ctx.push_str(" ");
            write_side(ctx, right, inline_opposite && left_cast);
        }
    }
}

impl DeepCopy for RestrictionRef {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        ctx.copy_cell(self, RestrictionNode::placeholder, |original, ctx| RestrictionNode {
            group: ctx.remap_weak(&original.group),
            left: original.left.deep_copy(ctx),
            operator: original.operator,
            right: original.right.deep_copy(ctx),
            predicate: original.predicate.clone(),
        })
    }
}

pub(crate) struct GroupMember {
    pub(crate) combinator: Combinator,
    pub(crate) kind: MemberKind,
}

pub(crate) enum MemberKind {
    Restriction(RestrictionRef),
    Group(GroupRef),
    /// Custom text, rendered as given
    Fragment { text: String, params: Vec<Param> },
}

impl GroupMember {
    fn is_applicable(&self, default: Option<&dyn RestrictionPredicate>) -> bool {
        match &self.kind {
            MemberKind::Restriction(restriction) => restriction.borrow().is_applicable(default),
            MemberKind::Group(group) => group.borrow().count_applicable(default) > 0,
            MemberKind::Fragment { .. } => true,
        }
    }
}

pub(crate) struct GroupNode {
    pub(crate) scope: GroupScope,
    pub(crate) members: Vec<GroupMember>,
}

impl GroupNode {
    pub(crate) fn new_ref(scope: GroupScope) -> GroupRef {
        Rc::new(RefCell::new(GroupNode {
            scope,
            members: Vec::new(),
        }))
    }

    fn placeholder() -> Self {
        GroupNode {
            scope: GroupScope::Query(Weak::new()),
            members: Vec::new(),
        }
    }

    /// The default predicate of the query tree this group belongs to
    pub(crate) fn default_predicate(&self) -> Option<Rc<dyn RestrictionPredicate>> {
        let (query, _) = self.scope.resolve()?;
        default_predicate_of(&query)
    }

    /// Number of members that would be rendered
    pub(crate) fn applicable_len(&self) -> usize {
        let default = self.default_predicate();
        self.count_applicable(default.as_deref())
    }

    fn count_applicable(&self, default: Option<&dyn RestrictionPredicate>) -> usize {
        self.members
            .iter()
            .filter(|member| member.is_applicable(default))
            .count()
    }

    fn write_members(&self, ctx: &mut RenderContext<'_>, default: Option<&dyn RestrictionPredicate>) {
        let mut first = true;
        for member in &self.members {
            if !member.is_applicable(default) {
                continue;
            }
            if !first {
                ctx.push_str(" ");
                ctx.push_str(member.combinator.keyword());
                ctx.push_str(" ");
            }
            first = false;
            match &member.kind {
                MemberKind::Restriction(restriction) => restriction.borrow().write_query(ctx),
                MemberKind::Group(group) => {
                    let group = group.borrow();
                    let parenthesize = group.count_applicable(default) > 1;
                    if parenthesize {
                        ctx.push_str("(");
                    }
                    group.write_members(ctx, default);
                    if parenthesize {
                        ctx.push_str(")");
                    }
                }
                MemberKind::Fragment { text, params } => ctx.push_fragment(text, params),
            }
        }
    }
}

impl WriteQuery for GroupNode {
    fn write_query(&self, ctx: &mut RenderContext<'_>) {
        let default = self.default_predicate();
        self.write_members(ctx, default.as_deref());
    }
}

impl DeepCopy for GroupRef {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        ctx.copy_cell(self, GroupNode::placeholder, |original, ctx| GroupNode {
            scope: original.scope.remap(ctx),
            members: original
                .members
                .iter()
                .map(|member| GroupMember {
                    combinator: member.combinator,
                    kind: match &member.kind {
                        MemberKind::Restriction(restriction) => {
                            MemberKind::Restriction(restriction.deep_copy(ctx))
                        }
                        MemberKind::Group(group) => MemberKind::Group(group.deep_copy(ctx)),
                        MemberKind::Fragment { text, params } => MemberKind::Fragment {
                            text: text.clone(),
                            params: params.clone(),
                        },
                    },
                })
                .collect(),
        })
    }
}

/// Validate a restriction against its group and append it
fn add_restriction(
    group: &GroupRef,
    combinator: Combinator,
    left: Option<ValueRef>,
    operator: Operator,
    right: Option<ValueRef>,
) -> Result<RestrictionRef> {
    if let Err(error) = operator.check_shape(left.is_some(), right.is_some()) {
        return reject("add_restriction", error);
    }
    for value in left.iter().chain(right.iter()) {
        if let Err(error) = validate_in_group(value, group) {
            return reject("add_restriction", error);
        }
    }

    let restriction = Rc::new(RefCell::new(RestrictionNode {
        group: Rc::downgrade(group),
        left,
        operator,
        right,
        predicate: None,
    }));
    group.borrow_mut().members.push(GroupMember {
        combinator,
        kind: MemberKind::Restriction(restriction.clone()),
    });
    debug!(operator = operator.token(), combinator = ?combinator, "Restriction added");
    Ok(restriction)
}

fn add_group(parent: &GroupRef, combinator: Combinator, child: &GroupRef) -> Result<()> {
    if let Err(error) = validate_nested_group(child, parent) {
        return reject("add_group", error);
    }
    parent.borrow_mut().members.push(GroupMember {
        combinator,
        kind: MemberKind::Group(child.clone()),
    });
    Ok(())
}

fn add_fragment(group: &GroupRef, combinator: Combinator, text: String, params: Vec<Param>) -> Result<()> {
    if let Err(error) = check_fragment(&text, &params) {
        return reject("add_fragment", error);
    }
    group.borrow_mut().members.push(GroupMember {
        combinator,
        kind: MemberKind::Fragment { text, params },
    });
    Ok(())
}

/// Handle to a restriction added to a group
#[derive(Clone)]
pub struct Restriction {
    pub(crate) node: RestrictionRef,
}

impl Restriction {
    pub(crate) fn new(node: RestrictionRef) -> Self {
        Self { node }
    }

    pub fn operator(&self) -> Operator {
        self.node.borrow().operator
    }

    pub fn has_left(&self) -> bool {
        self.node.borrow().left.is_some()
    }

    pub fn has_right(&self) -> bool {
        self.node.borrow().right.is_some()
    }

    /// Check a replacement of one side, or of the operator, before applying it
    fn check_update(&self, operator: Operator, left: Option<&ValueRef>, right: Option<&ValueRef>) -> Result<()> {
        operator.check_shape(left.is_some(), right.is_some())?;
        let group = self.node.borrow().group.upgrade().ok_or_else(|| {
            QueryError::out_of_scope("restriction no longer belongs to a live group")
        })?;
        for value in left.into_iter().chain(right) {
            validate_in_group(value, &group)?;
        }
        Ok(())
    }

    fn update(&self, operator: Operator, left: Option<ValueRef>, right: Option<ValueRef>) -> Result<()> {
        if let Err(error) = self.check_update(operator, left.as_ref(), right.as_ref()) {
            return reject("update_restriction", error);
        }
        let mut node = self.node.borrow_mut();
        node.operator = operator;
        node.left = left;
        node.right = right;
        Ok(())
    }

    pub fn set_operator(&self, operator: Operator) -> Result<()> {
        let (left, right) = {
            let node = self.node.borrow();
            (node.left.clone(), node.right.clone())
        };
        self.update(operator, left, right)
    }

    pub fn set_left<T: QueryType>(&self, value: impl IntoValue<T>) -> Result<()> {
        let (operator, right) = {
            let node = self.node.borrow();
            (node.operator, node.right.clone())
        };
        self.update(operator, Some(value.into_value().node), right)
    }

    pub fn set_right<T: QueryType>(&self, value: impl IntoValue<T>) -> Result<()> {
        let (operator, left) = {
            let node = self.node.borrow();
            (node.operator, node.left.clone())
        };
        self.update(operator, left, Some(value.into_value().node))
    }

    /// Replace the operator and right side together, e.g. turning an
    /// `is null` check into a comparison
    pub fn set_comparison<T: QueryType>(&self, operator: Operator, value: impl IntoValue<T>) -> Result<()> {
        let left = self.node.borrow().left.clone();
        self.update(operator, left, Some(value.into_value().node))
    }

    /// Drop the right side, switching to an operator that takes none
    pub fn set_null_check(&self, operator: Operator) -> Result<()> {
        let left = self.node.borrow().left.clone();
        self.update(operator, left, None)
    }

    pub fn set_predicate(&self, predicate: impl RestrictionPredicate + 'static) {
        self.node.borrow_mut().predicate = Some(Rc::new(predicate));
    }

    pub fn clear_predicate(&self) {
        self.node.borrow_mut().predicate = None;
    }

    /// Whether this restriction passes its predicate, or the default one
    pub fn is_applicable(&self) -> bool {
        let node = self.node.borrow();
        let default = node.default_predicate();
        node.is_applicable(default.as_deref())
    }

    pub fn render(&self, config: &RenderConfig) -> QueryFragment {
        let mut ctx = RenderContext::new(config);
        self.node.borrow().write_query(&mut ctx);
        ctx.finish()
    }
}

impl fmt::Debug for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Restriction")
            .field("operator", &self.operator())
            .field("text", &self.render(&RenderConfig::default()).text)
            .finish()
    }
}

impl Copyable for Restriction {
    fn copy_in(&self, ctx: &mut CopyContext) -> Self {
        Restriction::new(self.node.deep_copy(ctx))
    }

    fn lookup_copy(&self, ctx: &CopyContext) -> Option<Self> {
        ctx.lookup(&self.node).map(Restriction::new)
    }
}

/// Handle to a group of restrictions
#[derive(Clone)]
pub struct RestrictionsGroup {
    pub(crate) node: GroupRef,
}

impl RestrictionsGroup {
    pub(crate) fn new(node: GroupRef) -> Self {
        Self { node }
    }

    pub fn and<T: QueryType>(&self, value: impl IntoValue<T>) -> OnGoingRestriction<T> {
        OnGoingRestriction::new(self.node.clone(), Combinator::And, value.into_value())
    }

    pub fn or<T: QueryType>(&self, value: impl IntoValue<T>) -> OnGoingRestriction<T> {
        OnGoingRestriction::new(self.node.clone(), Combinator::Or, value.into_value())
    }

    pub fn and_group(&self, group: &RestrictionsGroup) -> Result<RestrictionChain> {
        add_group(&self.node, Combinator::And, &group.node)?;
        Ok(RestrictionChain::new(self.node.clone(), None))
    }

    pub fn or_group(&self, group: &RestrictionsGroup) -> Result<RestrictionChain> {
        add_group(&self.node, Combinator::Or, &group.node)?;
        Ok(RestrictionChain::new(self.node.clone(), None))
    }

    pub fn and_exists<U: QueryType>(&self, subquery: &SubQuery<U>) -> Result<RestrictionChain> {
        self.exists(Combinator::And, Operator::Exists, subquery)
    }

    pub fn and_not_exists<U: QueryType>(&self, subquery: &SubQuery<U>) -> Result<RestrictionChain> {
        self.exists(Combinator::And, Operator::NotExists, subquery)
    }

    pub fn or_exists<U: QueryType>(&self, subquery: &SubQuery<U>) -> Result<RestrictionChain> {
        self.exists(Combinator::Or, Operator::Exists, subquery)
    }

    pub fn or_not_exists<U: QueryType>(&self, subquery: &SubQuery<U>) -> Result<RestrictionChain> {
        self.exists(Combinator::Or, Operator::NotExists, subquery)
    }

    fn exists<U: QueryType>(
        &self,
        combinator: Combinator,
        operator: Operator,
        subquery: &SubQuery<U>,
    ) -> Result<RestrictionChain> {
        let restriction = add_restriction(
            &self.node,
            combinator,
            None,
            operator,
            Some(subquery.value().node),
        )?;
        Ok(RestrictionChain::new(self.node.clone(), Some(restriction)))
    }

    /// Append custom text; each `?` outside quotes binds exactly one parameter
    pub fn and_custom(&self, text: impl Into<String>, params: Vec<Param>) -> Result<RestrictionChain> {
        add_fragment(&self.node, Combinator::And, text.into(), params)?;
        Ok(RestrictionChain::new(self.node.clone(), None))
    }

    pub fn or_custom(&self, text: impl Into<String>, params: Vec<Param>) -> Result<RestrictionChain> {
        add_fragment(&self.node, Combinator::Or, text.into(), params)?;
        Ok(RestrictionChain::new(self.node.clone(), None))
    }

    /// Number of members, rendered or not
    pub fn len(&self) -> usize {
        self.node.borrow().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.borrow().members.is_empty()
    }

    /// Number of members that pass their predicates
    pub fn applicable_len(&self) -> usize {
        self.node.borrow().applicable_len()
    }

    /// Restrictions added directly to this group
    pub fn restrictions(&self) -> Vec<Restriction> {
        self.node
            .borrow()
            .members
            .iter()
            .filter_map(|member| match &member.kind {
                MemberKind::Restriction(restriction) => Some(Restriction::new(restriction.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn render(&self, config: &RenderConfig) -> QueryFragment {
        let mut ctx = RenderContext::new(config);
        self.node.borrow().write_query(&mut ctx);
        ctx.finish()
    }

    pub fn same_group(&self, other: &RestrictionsGroup) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Debug for RestrictionsGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestrictionsGroup")
            .field("members", &self.len())
            .field("text", &self.render(&RenderConfig::default()).text)
            .finish()
    }
}

impl Copyable for RestrictionsGroup {
    fn copy_in(&self, ctx: &mut CopyContext) -> Self {
        RestrictionsGroup::new(self.node.deep_copy(ctx))
    }

    fn lookup_copy(&self, ctx: &CopyContext) -> Option<Self> {
        ctx.lookup(&self.node).map(RestrictionsGroup::new)
    }
}

/// A restriction with its left side chosen, waiting for an operator
#[must_use = "a restriction is only added once an operator is applied"]
pub struct OnGoingRestriction<T> {
    group: GroupRef,
    combinator: Combinator,
    left: ValueRef,
    _type: PhantomData<fn() -> T>,
}

impl<T: QueryType> OnGoingRestriction<T> {
    pub(crate) fn new(group: GroupRef, combinator: Combinator, left: Value<T>) -> Self {
        Self {
            group,
            combinator,
            left: left.node,
            _type: PhantomData,
        }
    }

    fn complete(self, operator: Operator, right: Option<ValueRef>) -> Result<RestrictionChain> {
        let restriction = add_restriction(&self.group, self.combinator, Some(self.left), operator, right)?;
        Ok(RestrictionChain::new(self.group, Some(restriction)))
    }

    fn compare(self, operator: Operator, value: impl IntoValue<T>) -> Result<RestrictionChain> {
        let right = value.into_value().node;
        self.complete(operator, Some(right))
    }

    pub fn eq(self, value: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.compare(Operator::Eq, value)
    }

    pub fn not_eq(self, value: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.compare(Operator::NotEq, value)
    }

    pub fn is_null(self) -> Result<RestrictionChain> {
        self.complete(Operator::IsNull, None)
    }

    pub fn is_not_null(self) -> Result<RestrictionChain> {
        self.complete(Operator::IsNotNull, None)
    }

    /// `in (?)` with the items bound as one collection parameter
    pub fn in_values<I>(self, values: I) -> Result<RestrictionChain>
    where
        T: Literal,
        I: IntoIterator,
        I::Item: Into<T>,
    {
        let right = Value::<T>::collection(values).node;
        self.complete(Operator::In, Some(right))
    }

    pub fn not_in_values<I>(self, values: I) -> Result<RestrictionChain>
    where
        T: Literal,
        I: IntoIterator,
        I::Item: Into<T>,
    {
        let right = Value::<T>::collection(values).node;
        self.complete(Operator::NotIn, Some(right))
    }

    pub fn in_subquery(self, subquery: &SubQuery<T>) -> Result<RestrictionChain> {
        self.complete(Operator::In, Some(subquery.value().node))
    }

    pub fn not_in_subquery(self, subquery: &SubQuery<T>) -> Result<RestrictionChain> {
        self.complete(Operator::NotIn, Some(subquery.value().node))
    }

    /// Complete with an explicit operator
    pub fn compare_with(self, operator: Operator, value: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.compare(operator, value)
    }
}

impl<T: ComparableType> OnGoingRestriction<T> {
    pub fn gt(self, value: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.compare(Operator::Gt, value)
    }

    pub fn ge(self, value: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.compare(Operator::Ge, value)
    }

    pub fn lt(self, value: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.compare(Operator::Lt, value)
    }

    pub fn le(self, value: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.compare(Operator::Le, value)
    }

    pub fn between(self, low: impl IntoValue<T>, high: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.compare(Operator::Eq, Value::range(low, high))
    }

    pub fn not_between(self, low: impl IntoValue<T>, high: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.compare(Operator::NotEq, Value::range(low, high))
    }
}

impl<T: TextType> OnGoingRestriction<T> {
    pub fn like(self, pattern: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.compare(Operator::Like, pattern)
    }

    pub fn not_like(self, pattern: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.compare(Operator::NotLike, pattern)
    }
}

impl OnGoingRestriction<String> {
    pub fn starts_with(self, prefix: &str) -> Result<RestrictionChain> {
        self.like(format!("{prefix}{LIKE_WILDCARD}"))
    }

    pub fn ends_with(self, suffix: &str) -> Result<RestrictionChain> {
        self.like(format!("{LIKE_WILDCARD}{suffix}"))
    }

    pub fn contains(self, infix: &str) -> Result<RestrictionChain> {
        self.like(format!("{LIKE_WILDCARD}{infix}{LIKE_WILDCARD}"))
    }
}

impl OnGoingRestriction<bool> {
    pub fn is_true(self) -> Result<RestrictionChain> {
        self.eq(true)
    }

    pub fn is_false(self) -> Result<RestrictionChain> {
        self.eq(false)
    }
}

impl<T: TemporalType + ComparableType> OnGoingRestriction<T> {
    pub fn before(self, value: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.lt(value)
    }

    pub fn after(self, value: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.gt(value)
    }

    pub fn not_before(self, value: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.ge(value)
    }

    pub fn not_after(self, value: impl IntoValue<T>) -> Result<RestrictionChain> {
        self.le(value)
    }
}

/// Continues a group after a restriction was added
pub struct RestrictionChain {
    group: GroupRef,
    last: Option<RestrictionRef>,
}

impl RestrictionChain {
    pub(crate) fn new(group: GroupRef, last: Option<RestrictionRef>) -> Self {
        Self { group, last }
    }

    pub fn and<T: QueryType>(self, value: impl IntoValue<T>) -> OnGoingRestriction<T> {
        OnGoingRestriction::new(self.group, Combinator::And, value.into_value())
    }

    pub fn or<T: QueryType>(self, value: impl IntoValue<T>) -> OnGoingRestriction<T> {
        OnGoingRestriction::new(self.group, Combinator::Or, value.into_value())
    }

    pub fn and_group(self, group: &RestrictionsGroup) -> Result<Self> {
        self.group().and_group(group)
    }

    pub fn or_group(self, group: &RestrictionsGroup) -> Result<Self> {
        self.group().or_group(group)
    }

    pub fn and_exists<U: QueryType>(self, subquery: &SubQuery<U>) -> Result<Self> {
        self.group().and_exists(subquery)
    }

    pub fn and_not_exists<U: QueryType>(self, subquery: &SubQuery<U>) -> Result<Self> {
        self.group().and_not_exists(subquery)
    }

    pub fn or_exists<U: QueryType>(self, subquery: &SubQuery<U>) -> Result<Self> {
        self.group().or_exists(subquery)
    }

    pub fn or_not_exists<U: QueryType>(self, subquery: &SubQuery<U>) -> Result<Self> {
        self.group().or_not_exists(subquery)
    }

    pub fn and_custom(self, text: impl Into<String>, params: Vec<Param>) -> Result<Self> {
        self.group().and_custom(text, params)
    }

    pub fn or_custom(self, text: impl Into<String>, params: Vec<Param>) -> Result<Self> {
        self.group().or_custom(text, params)
    }

    /// Attach a predicate to the restriction just added
    pub fn with_predicate(self, predicate: impl RestrictionPredicate + 'static) -> Self {
        if let Some(restriction) = &self.last {
            restriction.borrow_mut().predicate = Some(Rc::new(predicate));
        }
        self
    }

    /// The restriction just added, if the last step added one
    pub fn restriction(&self) -> Option<Restriction> {
        self.last.clone().map(Restriction::new)
    }

    pub fn group(&self) -> RestrictionsGroup {
        RestrictionsGroup::new(self.group.clone())
    }
}
