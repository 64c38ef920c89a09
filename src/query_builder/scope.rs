//! Scope validation.
//!
//! A value may only reference joins declared by the query using it or by one
//! of that query's enclosing queries. Inside a join's `with` clause, joins of
//! the same query must hang under the same root and have been declared no
//! later than that join. Subquery values must belong to the using query or an
//! enclosing one.
//!
//! Values, groups and subqueries also form a render graph: a group renders
//! its restrictions' values, a `case` value renders its condition groups and
//! a subquery value renders the subquery. Nothing may be attached where it
//! would end up rendering itself.

use std::collections::HashSet;
use std::rc::{Rc, Weak};

use crate::error::{QueryError, Result};
use crate::logging::log_build_rejection;

use super::builder::QueryRef;
use super::conditions::{GroupRef, GroupScope, MemberKind};
use super::joins::{root_of, JoinRef};
use super::values::{ScopeRef, ValueNode, ValueRef};

/// Whether `candidate` is `query` or one of its enclosing queries
pub(crate) fn is_same_or_ancestor(candidate: &QueryRef, query: &QueryRef) -> bool {
    let mut current = Some(query.clone());
    while let Some(node) = current {
        if Rc::ptr_eq(&node, candidate) {
            return true;
        }
        current = node.borrow().parent.as_ref().and_then(Weak::upgrade);
    }
    false
}

/// Log and return a rejected build operation
pub(crate) fn reject<T>(operation: &str, error: QueryError) -> Result<T> {
    log_build_rejection(operation, &error);
    Err(error)
}

/// Check every reference inside `value` against `query`, and against
/// `with_join` when the value appears in that join's `with` clause
pub(crate) fn validate_value(
    value: &ValueNode,
    query: &QueryRef,
    with_join: Option<&JoinRef>,
) -> Result<()> {
    let mut refs = Vec::new();
    value.collect_scope_refs(&mut refs);
    for scope_ref in refs {
        match scope_ref {
            ScopeRef::Join(join) => validate_join(&join, query, with_join)?,
            ScopeRef::Query(subquery) => validate_subquery(&subquery, query)?,
            ScopeRef::Group(group) => validate_group_owner(&group, query)?,
        }
    }
    Ok(())
}

fn validate_join(join: &JoinRef, query: &QueryRef, with_join: Option<&JoinRef>) -> Result<()> {
    let node = join.borrow();
    let Some(owner) = node.owner.upgrade() else {
        return Err(QueryError::out_of_scope(format!(
            "'{}' belongs to a query that no longer exists",
            node.path_expression()
        )));
    };
    if !is_same_or_ancestor(&owner, query) {
        return Err(QueryError::out_of_scope(format!(
            "'{}' is not declared in this query or an enclosing query",
            node.path_expression()
        )));
    }
    if let Some(with_join) = with_join {
        if !Rc::ptr_eq(&owner, query) {
            return Ok(());
        }
        let with_node = with_join.borrow();
        if node.ordinal > with_node.ordinal {
            return Err(QueryError::out_of_scope(format!(
                "'{}' is joined after '{}' and cannot appear in its with clause",
                node.path_expression(),
                with_node.path_expression()
            )));
        }
        // joins are declared root by root
        if !Rc::ptr_eq(&root_of(join), &root_of(with_join)) {
            return Err(QueryError::out_of_scope(format!(
                "'{}' is joined under another root and cannot appear in the with clause of '{}'",
                node.path_expression(),
                with_node.path_expression()
            )));
        }
    }
    Ok(())
}

fn validate_subquery(subquery: &QueryRef, query: &QueryRef) -> Result<()> {
    if is_same_or_ancestor(subquery, query) {
        return Err(QueryError::out_of_scope(
            "a query cannot be used as a value inside itself",
        ));
    }
    let parent = subquery.borrow().parent.as_ref().and_then(Weak::upgrade);
    match parent {
        Some(parent) if is_same_or_ancestor(&parent, query) => Ok(()),
        _ => Err(QueryError::out_of_scope(
            "subquery is not declared by this query or an enclosing query",
        )),
    }
}

fn validate_group_owner(group: &GroupRef, query: &QueryRef) -> Result<()> {
    let resolved = group.borrow().scope.resolve();
    match resolved {
        Some((owner, _)) if is_same_or_ancestor(&owner, query) => Ok(()),
        _ => Err(QueryError::out_of_scope(
            "restriction group belongs to a query that is not this query or an enclosing query",
        )),
    }
}

/// Check a value against the scope of `group`, and that rendering it never
/// renders `group` again
pub(crate) fn validate_in_group(value: &ValueNode, group: &GroupRef) -> Result<()> {
    let scope = group.borrow().scope.clone();
    validate_in_scope(value, &scope)?;
    if RenderWalk::new(RenderTarget::Group(group)).value_reaches(value) {
        return Err(render_cycle());
    }
    Ok(())
}

/// Check that rendering a value attached to `query` never renders `query` again
pub(crate) fn validate_acyclic_in_query(value: &ValueNode, query: &QueryRef) -> Result<()> {
    if RenderWalk::new(RenderTarget::Query(query)).value_reaches(value) {
        return Err(render_cycle());
    }
    Ok(())
}

fn validate_in_scope(value: &ValueNode, scope: &GroupScope) -> Result<()> {
    match scope.resolve() {
        Some((query, with_join)) => validate_value(value, &query, with_join.as_ref()),
        None => Err(QueryError::out_of_scope(
            "restriction group no longer belongs to a live query",
        )),
    }
}

/// Check a group being nested into `parent`
pub(crate) fn validate_nested_group(child: &GroupRef, parent: &GroupRef) -> Result<()> {
    if RenderWalk::new(RenderTarget::Group(parent)).group_reaches(child) {
        return Err(QueryError::out_of_scope(
            "a restriction group cannot be nested inside itself",
        ));
    }
    let scope = parent.borrow().scope.clone();
    let mut values = Vec::new();
    collect_group_values(child, &mut values);
    for value in &values {
        validate_in_scope(value, &scope)?;
    }
    Ok(())
}

fn render_cycle() -> QueryError {
    QueryError::out_of_scope("value would render the clause or query it is added to")
}

/// The node a value or group is about to be attached to
enum RenderTarget<'a> {
    Query(&'a QueryRef),
    Group(&'a GroupRef),
}

/// Depth-first walk over everything a node renders, looking for the target
struct RenderWalk<'a> {
    target: RenderTarget<'a>,
    visited: HashSet<usize>,
}

impl<'a> RenderWalk<'a> {
    fn new(target: RenderTarget<'a>) -> Self {
        Self {
            target,
            visited: HashSet::new(),
        }
    }

    fn first_visit<T>(&mut self, node: &Rc<T>) -> bool {
        self.visited.insert(Rc::as_ptr(node) as *const () as usize)
    }

    fn value_reaches(&mut self, value: &ValueNode) -> bool {
        let mut refs = Vec::new();
        value.collect_scope_refs(&mut refs);
        refs.iter().any(|scope_ref| match scope_ref {
            // paths render as aliases only
            ScopeRef::Join(_) => false,
            ScopeRef::Query(query) => self.query_reaches(query),
            ScopeRef::Group(group) => self.group_reaches(group),
        })
    }

    fn group_reaches(&mut self, group: &GroupRef) -> bool {
        if matches!(self.target, RenderTarget::Group(target) if Rc::ptr_eq(target, group)) {
            return true;
        }
        if !self.first_visit(group) {
            return false;
        }
        let mut values = Vec::new();
        let mut nested = Vec::new();
        for member in &group.borrow().members {
            match &member.kind {
                MemberKind::Restriction(restriction) => {
                    let restriction = restriction.borrow();
                    values.extend(restriction.left.iter().cloned());
                    values.extend(restriction.right.iter().cloned());
                }
                MemberKind::Group(inner) => nested.push(inner.clone()),
                MemberKind::Fragment { .. } => {}
            }
        }
        nested.iter().any(|inner| self.group_reaches(inner))
            || values.iter().any(|value| self.value_reaches(value))
    }

    fn query_reaches(&mut self, query: &QueryRef) -> bool {
        if matches!(self.target, RenderTarget::Query(target) if Rc::ptr_eq(target, query)) {
            return true;
        }
        if !self.first_visit(query) {
            return false;
        }
        let (values, groups) = {
            let node = query.borrow();
            let values: Vec<ValueRef> = node
                .selection
                .iter()
                .map(|item| item.value.clone())
                .chain(node.group_by.iter().cloned())
                .chain(node.order_by.iter().map(|item| item.value.clone()))
                .collect();
            let groups: Vec<GroupRef> = [node.where_group.clone(), node.having_group.clone()]
                .into_iter()
                .chain(node.joins.iter().filter_map(|join| join.borrow().with_group.clone()))
                .collect();
            (values, groups)
        };
        groups.iter().any(|group| self.group_reaches(group))
            || values.iter().any(|value| self.value_reaches(value))
    }
}

fn collect_group_values(group: &GroupRef, out: &mut Vec<ValueRef>) {
    for member in &group.borrow().members {
        match &member.kind {
            MemberKind::Restriction(restriction) => {
                let restriction = restriction.borrow();
                out.extend(restriction.left.iter().cloned());
                out.extend(restriction.right.iter().cloned());
            }
            MemberKind::Group(nested) => collect_group_values(nested, out),
            MemberKind::Fragment { .. } => {}
        }
    }
}
