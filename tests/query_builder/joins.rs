use typesafe_query::prelude::*;

use crate::common::{House, Person, Relation, Town};

#[test]
fn test_join_type_keywords() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    query.join(&person, Person::TOWN).expect("default");
    query
        .join_with(&person, Person::CHILDREN, JoinType::Inner)
        .expect("inner");
    query
        .join_with(&person, Person::RELATIONS, JoinType::Left)
        .expect("left");
    query
        .join_with(&person, "house", JoinType::LeftFetch)
        .expect("left fetch");

    assert_eq!(
        query.render().text,
        "from Person hobj1 join hobj1.town hobj2 inner join hobj1.children hobj3 \
         left join hobj1.relations hobj4 left join fetch hobj1.house hobj5"
    );
}

#[test]
fn test_undeclared_join_renders_as_path() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    let town = query
        .join_with(&person, Person::TOWN, JoinType::None)
        .expect("path join");
    query
        .filter(town.prop(Town::NAME))
        .eq("Lyon")
        .expect("filter");

    assert_eq!(town.alias(), None);
    assert_eq!(town.path_expression(), "hobj1.town");
    assert_eq!(
        query.render().text,
        "from Person hobj1 where hobj1.town.name = ?"
    );
}

#[test]
fn test_undeclared_join_below_declared_join() {
    let query = TypeSafeQuery::new();
    let house = query.from(House::ENTITY);
    let owner = query.join(&house, House::OWNER).expect("owner");
    let town = query
        .join_with(&owner, Person::TOWN, JoinType::None)
        .expect("path join");
    query.select(town.prop(Town::INHABITANTS)).expect("select");

    assert_eq!(
        query.render().text,
        "select hobj2.town.inhabitants from House hobj1 join hobj1.owner hobj2"
    );
}

#[test]
fn test_undeclared_join_rejects_with_clause_and_alias() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    let town = query
        .join_with(&person, Person::TOWN, JoinType::None)
        .expect("path join");

    assert!(matches!(
        town.with_group(),
        Err(QueryError::InvalidJoin { .. })
    ));
    assert!(matches!(
        query.join_as(&person, Person::TOWN, JoinType::None, "t"),
        Err(QueryError::InvalidJoin { .. })
    ));
    assert!(matches!(
        query.register_alias(&town, "t"),
        Err(QueryError::InvalidJoin { .. })
    ));
}

#[test]
fn test_identical_join_is_reused() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    let first = query.join(&person, Person::TOWN).expect("join");
    let second = query.join(&person, Person::TOWN).expect("join");
    let left = query
        .join_with(&person, Person::TOWN, JoinType::Left)
        .expect("left join");
    let additional = query
        .join_additional(&person, Person::TOWN, JoinType::Default)
        .expect("additional join");

    assert_eq!(first, second);
    assert_ne!(first, left);
    assert_ne!(first, additional);
    assert_eq!(
        query.render().text,
        "from Person hobj1 join hobj1.town hobj2 left join hobj1.town hobj3 join hobj1.town hobj4"
    );
}

#[test]
fn test_nested_joins() {
    let query = TypeSafeQuery::new();
    let relation = query.from(Relation::ENTITY);
    let person = query.join(&relation, Relation::PERSON).expect("person");
    let town = query.join(&person, Person::TOWN).expect("town");

    assert_eq!(town.parent(), Some(person.clone()));
    assert_eq!(town.property().as_deref(), Some(Person::TOWN));
    assert_eq!(relation.entity_name().as_deref(), Some(Relation::ENTITY));
    assert_eq!(
        query.render().text,
        "from Relation hobj1 join hobj1.person hobj2 join hobj2.town hobj3"
    );
}

#[test]
fn test_with_clause_on_join() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    let children = query
        .join_with(&person, Person::CHILDREN, JoinType::Left)
        .expect("children");
    children
        .with(children.prop(Person::AGE))
        .expect("with group")
        .lt(12)
        .expect("child age")
        .and(children.prop(Person::SEX))
        .eq("F")
        .expect("child sex");
    query
        .filter(person.prop(Person::MARRIED))
        .is_true()
        .expect("filter");

    let rendered = query.render();
    assert_eq!(
        rendered.text,
        "from Person hobj1 left join hobj1.children hobj2 with hobj2.age < ? and hobj2.sex = ? \
         where hobj1.married = ?"
    );
    assert_eq!(
        rendered.params,
        vec![Param::Int(12), Param::Text("F".into()), Param::Bool(true)]
    );
}

#[test]
fn test_with_clause_rejects_later_join() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    let town = query.join(&person, Person::TOWN).expect("town");
    let children = query.join(&person, Person::CHILDREN).expect("children");

    let result = town
        .with(children.prop(Person::AGE))
        .expect("with group")
        .gt(3);
    assert!(matches!(result, Err(QueryError::OutOfScope { .. })));

    // earlier joins are visible
    children
        .with(town.prop(Town::NAME))
        .expect("with group")
        .eq("Paris")
        .expect("earlier join");
}

#[test]
fn test_with_clause_rejects_join_under_another_root() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    let house = query.from(House::ENTITY);
    let owner = query.join(&house, House::OWNER).expect("owner");
    let town = query.join(&person, Person::TOWN).expect("town");

    // owner is declared earlier but rendered after the Person joins
    let result = town
        .with(town.prop(Town::NAME))
        .expect("with group")
        .eq(owner.prop(Person::NAME));
    assert!(matches!(result, Err(QueryError::OutOfScope { .. })));

    town.with(town.prop(Town::NAME))
        .expect("with group")
        .eq(person.prop(Person::NAME))
        .expect("same root");
    assert_eq!(
        query.render().text,
        "from Person hobj1 join hobj1.town hobj4 with hobj4.name = hobj1.name, \
         House hobj2 join hobj2.owner hobj3"
    );
}

#[test]
fn test_custom_aliases() {
    let query = TypeSafeQuery::new();
    let person = query.from_as(Person::ENTITY, "person").expect("root alias");
    let town = query
        .join_as(&person, Person::TOWN, JoinType::Inner, "town")
        .expect("join alias");
    let house = query.from(House::ENTITY);

    assert_eq!(house.alias().as_deref(), Some("hobj1"));
    assert_eq!(query.entity_by_alias("town"), Some(town.clone()));
    assert_eq!(
        query.render().text,
        "from Person person inner join person.town town, House hobj1"
    );

    assert!(matches!(
        query.from_as(Town::ENTITY, "town"),
        Err(QueryError::DuplicateAlias { .. })
    ));
    assert!(matches!(
        query.from_as(Town::ENTITY, "not valid"),
        Err(QueryError::InvalidJoin { .. })
    ));
}

#[test]
fn test_register_alias_renames_entity() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    query
        .filter(person.prop(Person::AGE))
        .gt(18)
        .expect("filter");
    query.register_alias(&person, "p").expect("rename");

    assert_eq!(query.render().text, "from Person p where p.age > ?");
    assert!(query.entity_by_alias("hobj1").is_none());

    // the released alias can be claimed again
    let town = query.from_as(Town::ENTITY, "hobj1").expect("released alias");
    assert_eq!(town.alias().as_deref(), Some("hobj1"));
}

#[test]
fn test_join_from_foreign_entity_is_rejected() {
    let first = TypeSafeQuery::new();
    let second = TypeSafeQuery::new();
    let person = first.from(Person::ENTITY);

    assert!(matches!(
        second.join(&person, Person::TOWN),
        Err(QueryError::InvalidJoin { .. })
    ));
}

#[test]
fn test_roots_in_declaration_order() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    query.join(&person, Person::TOWN).expect("town");
    let house = query.from(House::ENTITY);

    assert_eq!(query.roots(), vec![person, house]);
}
