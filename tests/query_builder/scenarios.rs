use typesafe_query::prelude::*;
use typesafe_query::query_builder::functions;

use crate::common::{Person, Relation};

#[test]
fn test_root_entity_with_one_filter() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    query.filter(person.prop(Person::AGE)).gt(50).expect("filter");

    let rendered = query.render();
    assert_eq!(rendered.text, "from Person hobj1 where hobj1.age > ?");
    assert_eq!(rendered.params, vec![Param::Int(50)]);
}

#[test]
fn test_nested_or_group_is_parenthesized() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    let name = person.prop(Person::NAME);

    let names = query.new_group();
    names
        .or(&name)
        .starts_with("Jef")
        .expect("first name")
        .or(&name)
        .starts_with("John")
        .expect("second name");

    query
        .filter(person.prop(Person::MARRIED))
        .is_true()
        .expect("married")
        .and_group(&names)
        .expect("group");

    let rendered = query.render();
    assert_eq!(
        rendered.text,
        "from Person hobj1 where hobj1.married = ? and (hobj1.name like ? or hobj1.name like ?)"
    );
    assert_eq!(
        rendered.params,
        vec![
            Param::Bool(true),
            Param::Text("Jef%".into()),
            Param::Text("John%".into()),
        ]
    );
}

#[test]
fn test_subquery_value_splices_params_at_its_position() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);

    let relations = query.subquery::<i64>();
    let relation = relations.from(Relation::ENTITY);
    relations.select(functions::count()).expect("count");
    relations
        .filter(relation.get::<Entity>(Relation::PERSON))
        .eq(&person)
        .expect("correlation")
        .and(relation.prop(Relation::NAME))
        .eq("parent")
        .expect("relation name");

    query.select(person.prop(Person::NAME)).expect("select name");
    query.select(&relations).expect("select subquery");
    query.filter(person.prop(Person::AGE)).gt(18).expect("filter");

    let rendered = query.render();
    assert_eq!(
        rendered.text,
        "select hobj1.name, (select count(*) from Relation hobj2 \
         where hobj2.person = hobj1 and hobj2.name = ?) \
         from Person hobj1 where hobj1.age > ?"
    );
    assert_eq!(
        rendered.params,
        vec![Param::Text("parent".into()), Param::Int(18)]
    );
}

#[test]
fn test_cast_comparison_inlines_only_its_own_literal() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    query
        .filter(person.prop(Person::AGE).cast::<String>())
        .eq("42")
        .expect("cast comparison")
        .and(person.prop(Person::NAME))
        .eq("42")
        .expect("plain comparison");

    let rendered = query.render();
    assert_eq!(
        rendered.text,
        "from Person hobj1 where cast(hobj1.age as string) = '42' and hobj1.name = ?"
    );
    assert_eq!(rendered.params, vec![Param::Text("42".into())]);
}

#[test]
fn test_optional_search_form() {
    let query = TypeSafeQuery::new();
    query.set_default_predicate(IgnoreNullOrEmpty);
    let person = query.from(Person::ENTITY);

    let min_age: Option<i32> = None;
    let name: Option<String> = Some("Ann".to_string());
    let sex: Option<String> = Some(String::new());

    query
        .filter(person.prop(Person::AGE))
        .ge(min_age)
        .expect("age")
        .and(person.prop(Person::NAME))
        .eq(name)
        .expect("name")
        .and(person.prop(Person::SEX))
        .eq(sex)
        .expect("sex");

    let rendered = query.render();
    assert_eq!(rendered.text, "from Person hobj1 where hobj1.name = ?");
    assert_eq!(rendered.params, vec![Param::Text("Ann".into())]);
}
