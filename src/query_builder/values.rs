//! # Values
//!
//! Every expression in a query is a [`Value<T>`]: an immutable node shared by
//! reference between the places that use it. The type parameter carries the
//! value's category so restrictions only accept compatible operands; the node
//! graph underneath is untyped.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Sub};
use std::rc::Rc;

use crate::config::RenderConfig;
use crate::constants::keywords;
use crate::error::Result;

use super::builder::{QueryRef, SubQuery};
use super::conditions::{GroupRef, Operator};
use super::copy::{CopyContext, DeepCopy};
use super::joins::{EntityRef, JoinRef};
use super::render::{check_fragment, QueryFragment, RenderContext, WriteQuery};
use super::scope::reject;
use super::types::{Entity, Literal, NumericType, Param, QueryType};

pub(crate) type ValueRef = Rc<ValueNode>;

pub(crate) enum ValueNode {
    /// A join's alias, or a property path below it
    Path { join: JoinRef, path: Option<String> },
    Literal(Param),
    /// Raw text whose `?` placeholders consume `params` in order
    Custom { text: String, params: Vec<Param> },
    Cast { inner: ValueRef, type_name: &'static str },
    Arithmetic { left: ValueRef, op: ArithmeticOp, right: ValueRef },
    Function { name: String, distinct: bool, args: Vec<ValueRef> },
    Case { branches: Vec<CaseBranch>, otherwise: Option<ValueRef> },
    Subquery(QueryRef),
    /// Right side of `in` / `not in`
    Collection(Vec<Param>),
    /// Right side of `between` / `not between`
    Range { low: ValueRef, high: ValueRef },
}

pub(crate) struct CaseBranch {
    pub(crate) when: GroupRef,
    pub(crate) then: ValueRef,
}

/// Graph references a value depends on, checked against the using query
pub(crate) enum ScopeRef {
    Join(JoinRef),
    Query(QueryRef),
    Group(GroupRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub fn token(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
        }
    }
}

/// Shape of a value, as seen by restriction predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Path,
    Literal,
    Custom,
    Cast,
    Arithmetic,
    Function,
    Case,
    Subquery,
    Collection,
    Range,
}

impl ValueNode {
    pub(crate) fn kind(&self) -> ValueKind {
        match self {
            ValueNode::Path { .. } => ValueKind::Path,
            ValueNode::Literal(_) => ValueKind::Literal,
            ValueNode::Custom { .. } => ValueKind::Custom,
            ValueNode::Cast { .. } => ValueKind::Cast,
            ValueNode::Arithmetic { .. } => ValueKind::Arithmetic,
            ValueNode::Function { .. } => ValueKind::Function,
            ValueNode::Case { .. } => ValueKind::Case,
            ValueNode::Subquery(_) => ValueKind::Subquery,
            ValueNode::Collection(_) => ValueKind::Collection,
            ValueNode::Range { .. } => ValueKind::Range,
        }
    }

    pub(crate) fn is_cast(&self) -> bool {
        matches!(self, ValueNode::Cast { .. })
    }

    /// Operator text this value substitutes when it is the right side
    pub(crate) fn operator_token(&self, operator: Operator) -> Option<&'static str> {
        match (self, operator) {
            (ValueNode::Collection(_), Operator::Eq) => Some("in"),
            (ValueNode::Collection(_), Operator::NotEq) => Some("not in"),
            (ValueNode::Range { .. }, Operator::Eq) => Some("between"),
            (ValueNode::Range { .. }, Operator::NotEq) => Some("not between"),
            _ => None,
        }
    }

    pub(crate) fn collect_scope_refs(&self, out: &mut Vec<ScopeRef>) {
        match self {
            ValueNode::Path { join, .. } => out.push(ScopeRef::Join(join.clone())),
            ValueNode::Literal(_) | ValueNode::Custom { .. } | ValueNode::Collection(_) => {}
            ValueNode::Cast { inner, .. } => inner.collect_scope_refs(out),
            ValueNode::Arithmetic { left, right, .. } | ValueNode::Range { low: left, high: right } => {
                left.collect_scope_refs(out);
                right.collect_scope_refs(out);
            }
            ValueNode::Function { args, .. } => {
                for arg in args {
                    arg.collect_scope_refs(out);
                }
            }
            ValueNode::Case { branches, otherwise } => {
                for branch in branches {
                    out.push(ScopeRef::Group(branch.when.clone()));
                    branch.then.collect_scope_refs(out);
                }
                if let Some(otherwise) = otherwise {
                    otherwise.collect_scope_refs(out);
                }
            }
            ValueNode::Subquery(query) => out.push(ScopeRef::Query(query.clone())),
        }
    }
}

impl WriteQuery for ValueNode {
    fn write_query(&self, ctx: &mut RenderContext<'_>) {
        match self {
            ValueNode::Path { join, path } => {
                ctx.push_str(&join.borrow().path_expression());
                if let Some(path) = path {
                    ctx.push_str(".");
                    ctx.push_str(path);
                }
            }
            ValueNode::Literal(param) => ctx.push_param(param),
            ValueNode::Custom { text, params } => ctx.push_fragment(text, params),
            ValueNode::Cast { inner, type_name } => {
                ctx.push_str(keywords::CAST);
                ctx.push_str("(");
                inner.write_query(ctx);
                ctx.push_str(" ");
                ctx.push_str(keywords::AS);
                ctx.push_str(" ");
                ctx.push_str(type_name);
                ctx.push_str(")");
            }
            ValueNode::Arithmetic { left, op, right } => {
                ctx.push_str("(");
                left.write_query(ctx);
                ctx.push_str(" ");
                ctx.push_str(op.token());
                ctx.push_str(" ");
                right.write_query(ctx);
                ctx.push_str(")");
            }
            ValueNode::Function { name, distinct, args } => {
                ctx.push_str(name);
                ctx.push_str("(");
                if *distinct {
                    ctx.push_str(keywords::DISTINCT);
                    ctx.push_str(" ");
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ctx.push_str(", ");
                    }
                    arg.write_query(ctx);
                }
                ctx.push_str(")");
            }
            ValueNode::Case { branches, otherwise } => {
                let live: Vec<&CaseBranch> = branches
                    .iter()
                    .filter(|branch| branch.when.borrow().applicable_len() > 0)
                    .collect();
                // every condition vetoed: the expression is its fallback
                if live.is_empty() {
                    match otherwise {
                        Some(otherwise) => otherwise.write_query(ctx),
                        None => ctx.push_str(keywords::NULL),
                    }
                    return;
                }
                ctx.push_str("(");
                ctx.push_str(keywords::CASE);
                for branch in live {
                    ctx.push_str(" ");
                    ctx.push_str(keywords::WHEN);
                    ctx.push_str(" ");
                    branch.when.borrow().write_query(ctx);
                    ctx.push_str(" ");
                    ctx.push_str(keywords::THEN);
                    ctx.push_str(" ");
                    branch.then.write_query(ctx);
                }
                if let Some(otherwise) = otherwise {
                    ctx.push_str(" ");
                    ctx.push_str(keywords::ELSE);
                    ctx.push_str(" ");
                    otherwise.write_query(ctx);
                }
                ctx.push_str(" ");
                ctx.push_str(keywords::END);
                ctx.push_str(")");
            }
            ValueNode::Subquery(query) => {
                ctx.push_str("(");
                query.borrow().write_query(ctx);
                ctx.push_str(")");
            }
            ValueNode::Collection(items) => {
                ctx.push_str("(");
                ctx.push_param(&Param::List(items.clone()));
                ctx.push_str(")");
            }
            ValueNode::Range { low, high } => {
                low.write_query(ctx);
                ctx.push_str(" ");
                ctx.push_str(keywords::AND);
                ctx.push_str(" ");
                high.write_query(ctx);
            }
        }
    }
}

impl DeepCopy for ValueRef {
    fn deep_copy(&self, ctx: &mut CopyContext) -> Self {
        if let Some(existing) = ctx.lookup(self) {
            return existing;
        }
        let node = match &**self {
            ValueNode::Path { join, path } => ValueNode::Path {
                join: join.deep_copy(ctx),
                path: path.clone(),
            },
            ValueNode::Literal(param) => ValueNode::Literal(param.clone()),
            ValueNode::Custom { text, params } => ValueNode::Custom {
                text: text.clone(),
                params: params.clone(),
            },
            ValueNode::Cast { inner, type_name } => ValueNode::Cast {
                inner: inner.deep_copy(ctx),
                type_name: *type_name,
            },
            ValueNode::Arithmetic { left, op, right } => ValueNode::Arithmetic {
                left: left.deep_copy(ctx),
                op: *op,
                right: right.deep_copy(ctx),
            },
            ValueNode::Function { name, distinct, args } => ValueNode::Function {
                name: name.clone(),
                distinct: *distinct,
                args: args.deep_copy(ctx),
            },
            ValueNode::Case { branches, otherwise } => ValueNode::Case {
                branches: branches
                    .iter()
                    .map(|branch| CaseBranch {
                        when: branch.when.deep_copy(ctx),
                        then: branch.then.deep_copy(ctx),
                    })
                    .collect(),
                otherwise: otherwise.deep_copy(ctx),
            },
            ValueNode::Subquery(query) => ValueNode::Subquery(query.deep_copy(ctx)),
            ValueNode::Collection(items) => ValueNode::Collection(items.clone()),
            ValueNode::Range { low, high } => ValueNode::Range {
                low: low.deep_copy(ctx),
                high: high.deep_copy(ctx),
            },
        };
        let clone = Rc::new(node);
        ctx.register(self, &clone);
        clone
    }
}

/// Read-only view of a value, handed to restriction predicates
#[derive(Clone, Copy)]
pub struct ValueView<'a> {
    node: &'a ValueNode,
}

impl<'a> ValueView<'a> {
    pub(crate) fn new(node: &'a ValueNode) -> Self {
        Self { node }
    }

    pub fn kind(&self) -> ValueKind {
        self.node.kind()
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.node, ValueNode::Literal(_))
    }

    /// The bound parameter, when this value is a plain literal
    pub fn literal(&self) -> Option<&'a Param> {
        match self.node {
            ValueNode::Literal(param) => Some(param),
            _ => None,
        }
    }

    /// The items, when this value is a literal collection
    pub fn collection(&self) -> Option<&'a [Param]> {
        match self.node {
            ValueNode::Collection(items) => Some(items),
            _ => None,
        }
    }
}

/// A typed expression usable in selections, restrictions and orderings
pub struct Value<T> {
    pub(crate) node: ValueRef,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            _type: PhantomData,
        }
    }
}

impl<T: QueryType> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &T::TYPE_NAME)
            .field("kind", &self.node.kind())
            .finish()
    }
}

impl<T: QueryType> Value<T> {
    pub(crate) fn from_node(node: ValueNode) -> Self {
        Self::from_ref(Rc::new(node))
    }

    pub(crate) fn from_ref(node: ValueRef) -> Self {
        Self {
            node,
            _type: PhantomData,
        }
    }

    pub fn literal(value: T) -> Self
    where
        T: Literal,
    {
        Self::from_node(ValueNode::Literal(value.into_param()))
    }

    pub fn null() -> Self {
        Self::from_node(ValueNode::Literal(Param::Null))
    }

    /// A literal collection; compared with `eq` it renders as `in (?)`
    pub fn collection<I>(items: I) -> Self
    where
        T: Literal,
        I: IntoIterator,
        I::Item: Into<T>,
    {
        let items = items
            .into_iter()
            .map(|item| item.into().into_param())
            .collect();
        Self::from_node(ValueNode::Collection(items))
    }

    /// An inclusive range; compared with `eq` it renders as `between`
    pub fn range(low: impl IntoValue<T>, high: impl IntoValue<T>) -> Self {
        Self::from_node(ValueNode::Range {
            low: low.into_value().node,
            high: high.into_value().node,
        })
    }

    /// Raw query text; each `?` outside quotes binds the next parameter
    pub fn custom(text: impl Into<String>, params: Vec<Param>) -> Result<Self> {
        let text = text.into();
        if let Err(error) = check_fragment(&text, &params) {
            return reject("custom_value", error);
        }
        Ok(Self::from_node(ValueNode::Custom { text, params }))
    }

    /// Cast this value to another query type
    pub fn cast<U: QueryType>(&self) -> Value<U> {
        Value::from_node(ValueNode::Cast {
            inner: self.node.clone(),
            type_name: U::TYPE_NAME,
        })
    }

    pub fn kind(&self) -> ValueKind {
        self.node.kind()
    }

    pub fn view(&self) -> ValueView<'_> {
        ValueView::new(&self.node)
    }

    /// Whether both handles refer to the same value node
    pub fn same_node(&self, other: &Value<T>) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    /// Render this value on its own
    pub fn render(&self, config: &RenderConfig) -> QueryFragment {
        let mut ctx = RenderContext::new(config);
        self.node.write_query(&mut ctx);
        ctx.finish()
    }
}

/// Conversion into a typed value
///
/// Implemented for plain literals, optional literals (`None` binds null),
/// values, entities and subqueries.
pub trait IntoValue<T: QueryType> {
    fn into_value(self) -> Value<T>;
}

impl<T: Literal> IntoValue<T> for T {
    fn into_value(self) -> Value<T> {
        Value::literal(self)
    }
}

impl<T: Literal> IntoValue<T> for Option<T> {
    fn into_value(self) -> Value<T> {
        match self {
            Some(value) => Value::literal(value),
            None => Value::null(),
        }
    }
}

impl IntoValue<String> for &str {
    fn into_value(self) -> Value<String> {
        Value::literal(self.to_string())
    }
}

impl<T: QueryType> IntoValue<T> for Value<T> {
    fn into_value(self) -> Value<T> {
        self
    }
}

impl<T: QueryType> IntoValue<T> for &Value<T> {
    fn into_value(self) -> Value<T> {
        self.clone()
    }
}

impl IntoValue<Entity> for EntityRef {
    fn into_value(self) -> Value<Entity> {
        EntityRef::value(&self)
    }
}

impl IntoValue<Entity> for &EntityRef {
    fn into_value(self) -> Value<Entity> {
        self.value()
    }
}

impl<T: QueryType> IntoValue<T> for SubQuery<T> {
    fn into_value(self) -> Value<T> {
        self.value()
    }
}

impl<T: QueryType> IntoValue<T> for &SubQuery<T> {
    fn into_value(self) -> Value<T> {
        self.value()
    }
}

pub(crate) fn arithmetic<T: QueryType>(left: &Value<T>, op: ArithmeticOp, right: Value<T>) -> Value<T> {
    Value::from_node(ValueNode::Arithmetic {
        left: left.node.clone(),
        op,
        right: right.node,
    })
}

macro_rules! arithmetic_ops {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {
        $(
            impl<T: NumericType, R: IntoValue<T>> $trait<R> for Value<T> {
                type Output = Value<T>;

                fn $method(self, rhs: R) -> Value<T> {
                    arithmetic(&self, ArithmeticOp::$op, rhs.into_value())
                }
            }

            impl<T: NumericType, R: IntoValue<T>> $trait<R> for &Value<T> {
                type Output = Value<T>;

                fn $method(self, rhs: R) -> Value<T> {
                    arithmetic(self, ArithmeticOp::$op, rhs.into_value())
                }
            }
        )*
    };
}

arithmetic_ops! {
    Add::add => Add,
    Sub::sub => Subtract,
    Mul::mul => Multiply,
    Div::div => Divide,
}
