use chrono::NaiveDate;
use typesafe_query::prelude::*;
use typesafe_query::query_builder::{Restriction, ValueKind, ValueView};

use crate::common::{Person, Town};

fn person_query() -> (TypeSafeQuery, EntityRef) {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    (query, person)
}

#[test]
fn test_collection_and_range_operators() {
    let (query, person) = person_query();
    query
        .filter(person.prop(Person::AGE))
        .in_values([20, 30, 40])
        .expect("in")
        .and(person.prop(Person::NAME))
        .not_in_values(["Bob", "Carl"])
        .expect("not in")
        .and(person.prop(Person::WEIGHT))
        .between(50.0, 80.0)
        .expect("between")
        .and(person.prop(Person::ID))
        .not_between(1i64, 9i64)
        .expect("not between");

    let rendered = query.render();
    assert_eq!(
        rendered.text,
        "from Person hobj1 where hobj1.age in (?) and hobj1.name not in (?) \
         and hobj1.weight between ? and ? and hobj1.id not between ? and ?"
    );
    assert_eq!(
        rendered.params,
        vec![
            Param::List(vec![Param::Int(20), Param::Int(30), Param::Int(40)]),
            Param::List(vec![Param::Text("Bob".into()), Param::Text("Carl".into())]),
            Param::Float(50.0),
            Param::Float(80.0),
            Param::Int(1),
            Param::Int(9),
        ]
    );
}

#[test]
fn test_collection_value_overrides_equality_operator() {
    let (query, person) = person_query();
    query
        .filter(person.prop(Person::AGE))
        .eq(Value::collection([1, 2]))
        .expect("eq collection")
        .and(person.prop(Person::AGE))
        .not_eq(Value::range(3, 4))
        .expect("not eq range");

    assert_eq!(
        query.render().text,
        "from Person hobj1 where hobj1.age in (?) and hobj1.age not between ? and ?"
    );
}

#[test]
fn test_null_checks_and_patterns() {
    let (query, person) = person_query();
    query
        .filter(person.prop(Person::SEX))
        .is_null()
        .expect("is null")
        .or(person.prop(Person::NAME))
        .is_not_null()
        .expect("is not null")
        .and(person.prop(Person::NAME))
        .ends_with("son")
        .expect("ends with")
        .and(person.prop(Person::NAME))
        .contains("an")
        .expect("contains")
        .and(person.prop(Person::NAME))
        .not_like("X%")
        .expect("not like");

    let rendered = query.render();
    assert_eq!(
        rendered.text,
        "from Person hobj1 where hobj1.sex is null or hobj1.name is not null \
         and hobj1.name like ? and hobj1.name like ? and hobj1.name not like ?"
    );
    assert_eq!(
        rendered.params,
        vec![
            Param::Text("%son".into()),
            Param::Text("%an%".into()),
            Param::Text("X%".into()),
        ]
    );
}

#[test]
fn test_temporal_comparisons() {
    let (query, person) = person_query();
    let start = NaiveDate::from_ymd_opt(1980, 1, 1).expect("valid date");
    let end = NaiveDate::from_ymd_opt(1990, 12, 31).expect("valid date");
    query
        .filter(person.prop(Person::BIRTH_DATE))
        .after(start)
        .expect("after")
        .and(person.prop(Person::BIRTH_DATE))
        .not_after(end)
        .expect("not after");

    let rendered = query.render();
    assert_eq!(
        rendered.text,
        "from Person hobj1 where hobj1.birthDate > ? and hobj1.birthDate <= ?"
    );
    assert_eq!(rendered.params, vec![Param::Date(start), Param::Date(end)]);
}

#[test]
fn test_single_member_group_is_not_parenthesized() {
    let (query, person) = person_query();
    let group = query.new_group();
    group
        .and(person.prop(Person::AGE))
        .gt(18)
        .expect("only member");
    query
        .filter(person.prop(Person::MARRIED))
        .is_false()
        .expect("married")
        .or_group(&group)
        .expect("group");

    assert_eq!(
        query.render().text,
        "from Person hobj1 where hobj1.married = ? or hobj1.age > ?"
    );
}

#[test]
fn test_deeply_nested_groups() {
    let (query, person) = person_query();
    let inner = query.new_group();
    inner
        .and(person.prop(Person::AGE))
        .gt(1)
        .expect("a")
        .or(person.prop(Person::AGE))
        .lt(2)
        .expect("b");
    let outer = query.new_group();
    outer
        .and(person.prop(Person::NAME))
        .eq("x")
        .expect("c")
        .and_group(&inner)
        .expect("inner");
    query.filter_group(&outer).expect("outer");
    query.filter(person.prop(Person::SEX)).eq("M").expect("d");

    assert_eq!(
        query.render().text,
        "from Person hobj1 where (hobj1.name = ? and (hobj1.age > ? or hobj1.age < ?)) and hobj1.sex = ?"
    );
}

#[test]
fn test_group_cannot_contain_itself() {
    let (query, person) = person_query();
    let outer = query.new_group();
    let inner = query.new_group();
    inner.and(person.prop(Person::AGE)).gt(1).expect("member");
    outer.and_group(&inner).expect("nest");

    assert!(matches!(
        inner.and_group(&outer),
        Err(QueryError::OutOfScope { .. })
    ));
    assert!(matches!(
        outer.and_group(&outer),
        Err(QueryError::OutOfScope { .. })
    ));
}

#[test]
fn test_empty_where_group_is_omitted() {
    let (query, person) = person_query();
    let empty = query.new_group();
    query.filter_group(&empty).expect("empty group");
    query.select(person.prop(Person::NAME)).expect("select");

    assert_eq!(query.render().text, "select hobj1.name from Person hobj1");
}

#[test]
fn test_default_predicate_vetoes_null_values() {
    let (query, person) = person_query();
    query.set_default_predicate(IgnoreNull);
    query
        .filter(person.prop(Person::AGE))
        .gt(None::<i32>)
        .expect("vetoed")
        .and(person.prop(Person::NAME))
        .eq("")
        .expect("kept: empty is not null");

    let rendered = query.render();
    assert_eq!(rendered.text, "from Person hobj1 where hobj1.name = ?");
    assert_eq!(rendered.params, vec![Param::Text(String::new())]);
}

#[test]
fn test_all_vetoed_group_renders_nothing() {
    let (query, person) = person_query();
    query.set_default_predicate(IgnoreNull);
    let group = query.new_group();
    group
        .and(person.prop(Person::AGE))
        .eq(None::<i32>)
        .expect("vetoed")
        .or(person.prop(Person::NAME))
        .eq(None::<String>)
        .expect("vetoed");
    query.filter_group(&group).expect("group");

    let rendered = query.render();
    assert_eq!(rendered.text, "from Person hobj1");
    assert!(rendered.params.is_empty());
    assert_eq!(group.len(), 2);
    assert_eq!(group.applicable_len(), 0);
}

#[test]
fn test_partially_vetoed_group_drops_parentheses() {
    let (query, person) = person_query();
    query.set_default_predicate(IgnoreNullOrEmpty);
    let group = query.new_group();
    group
        .and(person.prop(Person::NAME))
        .eq("")
        .expect("vetoed")
        .or(person.prop(Person::AGE))
        .gt(3)
        .expect("kept");
    query
        .filter(person.prop(Person::MARRIED))
        .is_true()
        .expect("married")
        .and_group(&group)
        .expect("group");

    assert_eq!(
        query.render().text,
        "from Person hobj1 where hobj1.married = ? and hobj1.age > ?"
    );
}

#[test]
fn test_restriction_predicate_overrides_default() {
    let (query, person) = person_query();
    query.set_default_predicate(IgnoreNull);
    let chain = query
        .filter(person.prop(Person::SEX))
        .eq(None::<String>)
        .expect("null comparison")
        .with_predicate(|_: ValueView<'_>| true);

    let restriction = chain.restriction().expect("restriction added");
    assert!(restriction.is_applicable());
    assert_eq!(query.render().text, "from Person hobj1 where hobj1.sex = ?");
    assert_eq!(query.render().params, vec![Param::Null]);

    restriction.clear_predicate();
    assert!(!restriction.is_applicable());
    assert_eq!(query.render().text, "from Person hobj1");
}

#[test]
fn test_closure_predicate_inspects_values() {
    let (query, person) = person_query();
    let only_positive = |value: ValueView<'_>| match value.literal() {
        Some(Param::Int(n)) => *n > 0,
        _ => true,
    };
    query.set_default_predicate(only_positive);
    query
        .filter(person.prop(Person::AGE))
        .gt(0)
        .expect("vetoed")
        .and(person.prop(Person::AGE))
        .lt(65)
        .expect("kept");

    assert_eq!(query.render().text, "from Person hobj1 where hobj1.age < ?");
}

#[test]
fn test_empty_collection_vetoed_by_ignore_null_or_empty() {
    let (query, person) = person_query();
    query.set_default_predicate(|value: ValueView<'_>| {
        value.kind() != ValueKind::Collection || value.collection().is_some_and(|c| !c.is_empty())
    });
    query
        .filter(person.prop(Person::AGE))
        .in_values(Vec::<i32>::new())
        .expect("empty collection");
    assert_eq!(query.render().text, "from Person hobj1");

    query.set_default_predicate(IgnoreNullOrEmpty);
    assert_eq!(query.render().text, "from Person hobj1");

    query.clear_default_predicate();
    assert_eq!(query.render().text, "from Person hobj1 where hobj1.age in (?)");
}

#[test]
fn test_restriction_mutation() {
    let (query, person) = person_query();
    let restriction: Restriction = query
        .filter(person.prop(Person::AGE))
        .gt(18)
        .expect("filter")
        .restriction()
        .expect("restriction");

    restriction.set_operator(Operator::Le).expect("operator");
    restriction.set_right(21).expect("right");
    assert_eq!(
        query.render().text,
        "from Person hobj1 where hobj1.age <= ?"
    );
    assert_eq!(query.render().params, vec![Param::Int(21)]);

    restriction.set_null_check(Operator::IsNull).expect("null check");
    assert_eq!(query.render().text, "from Person hobj1 where hobj1.age is null");
    assert!(!restriction.has_right());

    restriction
        .set_comparison(Operator::Ge, 30)
        .expect("comparison");
    assert_eq!(query.render().text, "from Person hobj1 where hobj1.age >= ?");
}

#[test]
fn test_malformed_restriction_changes_are_rejected() {
    let (query, person) = person_query();
    let restriction = query
        .filter(person.prop(Person::AGE))
        .gt(18)
        .expect("filter")
        .restriction()
        .expect("restriction");

    assert!(matches!(
        restriction.set_operator(Operator::IsNull),
        Err(QueryError::MalformedRestriction { .. })
    ));
    assert!(matches!(
        restriction.set_operator(Operator::Exists),
        Err(QueryError::MalformedRestriction { .. })
    ));
    assert!(matches!(
        restriction.set_null_check(Operator::Eq),
        Err(QueryError::MalformedRestriction { .. })
    ));
    // the restriction is unchanged after rejected updates
    assert_eq!(restriction.operator(), Operator::Gt);
    assert_eq!(query.render().text, "from Person hobj1 where hobj1.age > ?");
}

#[test]
fn test_mutation_revalidates_scope() {
    let (query, person) = person_query();
    let other = TypeSafeQuery::new();
    let town = other.from(Town::ENTITY);
    let restriction = query
        .filter(person.prop(Person::NAME))
        .eq("x")
        .expect("filter")
        .restriction()
        .expect("restriction");

    assert!(matches!(
        restriction.set_right(town.prop(Town::NAME)),
        Err(QueryError::OutOfScope { .. })
    ));
    assert!(matches!(
        restriction.set_left(town.prop(Town::NAME)),
        Err(QueryError::OutOfScope { .. })
    ));
}

#[test]
fn test_foreign_entity_in_filter_is_rejected() {
    let (query, _) = person_query();
    let other = TypeSafeQuery::new();
    let town = other.from(Town::ENTITY);

    let result = query.filter(town.prop(Town::NAME)).eq("Lyon");
    assert!(matches!(result, Err(QueryError::OutOfScope { .. })));
    assert_eq!(query.render().text, "from Person hobj1");
}

#[test]
fn test_compare_with_explicit_operator() {
    let (query, person) = person_query();
    query
        .filter(person.prop(Person::NAME))
        .compare_with(Operator::NotEq, "Zed")
        .expect("filter");

    assert_eq!(
        query.render().text,
        "from Person hobj1 where hobj1.name <> ?"
    );
}

#[test]
fn test_group_render_on_its_own() {
    let (query, person) = person_query();
    let group = query.where_group();
    group
        .and(person.prop(Person::AGE))
        .ge(18)
        .expect("a")
        .or(person.prop(Person::AGE))
        .is_null()
        .expect("b");

    let fragment = group.render(&RenderConfig::default());
    assert_eq!(fragment.text, "hobj1.age >= ? or hobj1.age is null");
    assert_eq!(fragment.params, vec![Param::Int(18)]);
    assert_eq!(group.restrictions().len(), 2);
    assert!(group.same_group(&query.where_group()));
}
