use typesafe_query::prelude::*;

use crate::common::{Person, Relation, Town};

fn base_query() -> (TypeSafeQuery, EntityRef, EntityRef) {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    let town = query.join(&person, Person::TOWN).expect("town");
    query
        .filter(person.prop(Person::AGE))
        .gt(30)
        .expect("filter");
    (query, person, town)
}

#[test]
fn test_clone_is_isolated_from_original() {
    let (query, person, _) = base_query();
    let original = query.render();

    let mut ctx = CopyContext::new();
    let copy = ctx.copy(&query);
    let person_copy = ctx.get(&person).expect("person copied");
    copy.filter(person_copy.prop(Person::NAME))
        .eq("Ann")
        .expect("filter on copy");

    assert_eq!(query.render(), original);
    assert_eq!(
        copy.render().text,
        "from Person hobj1 join hobj1.town hobj2 where hobj1.age > ? and hobj1.name = ?"
    );

    // and the other way round
    query
        .filter(person.prop(Person::SEX))
        .eq("F")
        .expect("filter on original");
    assert_eq!(copy.render().params.len(), 2);
    assert_eq!(query.render().params, vec![Param::Int(30), Param::Text("F".into())]);
}

#[test]
fn test_copied_handles_point_into_the_copy() {
    let (query, person, town) = base_query();
    let mut ctx = CopyContext::new();
    let copy = ctx.copy(&query);

    let person_copy = ctx.get(&person).expect("person");
    let town_copy = ctx.get(&town).expect("town");
    assert_ne!(person_copy, person);
    assert_eq!(town_copy.parent(), Some(person_copy.clone()));
    assert_eq!(copy.roots(), vec![person_copy]);

    // the copied entity belongs to the copy, not to the original
    assert!(copy.join(&town_copy, "mayor").is_ok());
    assert!(matches!(
        query.join(&town_copy, "mayor"),
        Err(QueryError::InvalidJoin { .. })
    ));
    assert!(matches!(
        query.filter(town_copy.prop(Town::NAME)).eq("Lyon"),
        Err(QueryError::OutOfScope { .. })
    ));
}

#[test]
fn test_restriction_mutation_on_copy() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    let restriction = query
        .filter(person.prop(Person::AGE))
        .gt(30)
        .expect("filter")
        .restriction()
        .expect("restriction");

    let mut ctx = CopyContext::new();
    let copy = ctx.copy(&query);
    let restriction_copy = ctx.get(&restriction).expect("restriction copied");
    restriction_copy
        .set_operator(Operator::Lt)
        .expect("operator");

    assert_eq!(query.render().text, "from Person hobj1 where hobj1.age > ?");
    assert_eq!(copy.render().text, "from Person hobj1 where hobj1.age < ?");
}

#[test]
fn test_alias_registry_is_copied() {
    let (query, _, _) = base_query();
    let copy = query.deep_clone();

    let relation_copy = copy.from(Relation::ENTITY);
    let relation = query.from(Relation::ENTITY);
    assert_eq!(relation_copy.alias().as_deref(), Some("hobj3"));
    assert_eq!(relation.alias().as_deref(), Some("hobj3"));

    copy.from_as(Town::ENTITY, "t").expect("alias free in copy");
    query.from_as(Town::ENTITY, "t").expect("alias free in original");
}

#[test]
fn test_correlated_subquery_is_relinked() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    let relations = query.subquery::<Entity>();
    let relation = relations.from(Relation::ENTITY);
    relations.select(&relation).expect("select");
    relations
        .filter(relation.get::<Entity>(Relation::PERSON))
        .eq(&person)
        .expect("correlation");
    query.filter_exists(&relations).expect("exists");

    let mut ctx = CopyContext::new();
    let copy = ctx.copy(&query);
    let person_copy = ctx.get(&person).expect("person");
    let relations_copy = ctx.get(&relations).expect("subquery");

    copy.register_alias(&person_copy, "p").expect("rename in copy");
    assert!(matches!(
        relations_copy.filter(relation.prop(Relation::NAME)).eq("x"),
        Err(QueryError::OutOfScope { .. })
    ));
    let relation_copy = ctx.get(&relation).expect("relation");
    relations_copy
        .filter(relation_copy.prop(Relation::NAME))
        .eq("parent")
        .expect("copied entity in scope");

    assert_eq!(
        copy.render().text,
        "from Person p where exists (select hobj2 from Relation hobj2 \
         where hobj2.person = p and hobj2.name = ?)"
    );
    assert_eq!(
        query.render().text,
        "from Person hobj1 where exists (select hobj2 from Relation hobj2 where hobj2.person = hobj1)"
    );
}

#[test]
fn test_with_clause_referencing_its_join_is_relinked() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    let town = query
        .join_with(&person, Person::TOWN, JoinType::Left)
        .expect("town");
    town.with(town.prop(Town::INHABITANTS))
        .expect("with group")
        .gt(1000i64)
        .expect("with restriction");

    let mut ctx = CopyContext::new();
    let copy = ctx.copy(&query);
    let town_copy = ctx.get(&town).expect("town");
    copy.register_alias(&town_copy, "t").expect("rename");

    assert_eq!(
        copy.render().text,
        "from Person hobj1 left join hobj1.town t with t.inhabitants > ?"
    );
    assert_eq!(
        query.render().text,
        "from Person hobj1 left join hobj1.town hobj2 with hobj2.inhabitants > ?"
    );
}

#[test]
fn test_copy_keeps_default_predicate_and_pagination() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    query.set_default_predicate(IgnoreNull);
    query.paginate(2, 10);
    query
        .filter(person.prop(Person::NAME))
        .eq(None::<String>)
        .expect("vetoed");

    let copy = query.deep_clone();
    let rendered = copy.render();
    assert_eq!(rendered.text, "from Person hobj1");
    assert_eq!(rendered.first_result, Some(10));
    assert_eq!(rendered.max_results, Some(10));

    copy.clear_default_predicate();
    assert_eq!(copy.render().text, "from Person hobj1 where hobj1.name = ?");
    assert_eq!(query.render().text, "from Person hobj1");
}

#[test]
fn test_one_context_shares_clones() {
    let (query, person, _) = base_query();
    let mut ctx = CopyContext::new();
    let copy = ctx.copy(&query);
    let person_first = ctx.copy(&person);
    let person_again = ctx.copy(&person);

    assert_eq!(person_first, person_again);
    assert_eq!(copy.roots(), vec![person_first]);
    assert!(!ctx.is_empty());
}

#[test]
fn test_group_copy_follows_its_query() {
    let query = TypeSafeQuery::new();
    let person = query.from(Person::ENTITY);
    let group = query.new_group();
    group
        .and(person.prop(Person::AGE))
        .gt(1)
        .expect("a")
        .or(person.prop(Person::AGE))
        .lt(0)
        .expect("b");
    query.filter_group(&group).expect("group");

    let mut ctx = CopyContext::new();
    let copy = ctx.copy(&query);
    let group_copy = ctx.get(&group).expect("group copied");
    let person_copy = ctx.get(&person).expect("person copied");
    group_copy
        .or(person_copy.prop(Person::NAME))
        .is_null()
        .expect("extend copied group");

    assert!(!group_copy.same_group(&group));
    assert_eq!(
        copy.render().text,
        "from Person hobj1 where (hobj1.age > ? or hobj1.age < ? or hobj1.name is null)"
    );
    assert_eq!(
        query.render().text,
        "from Person hobj1 where (hobj1.age > ? or hobj1.age < ?)"
    );
}

fn adults_with_town(query: &TypeSafeQuery) -> typesafe_query::Result<()> {
    let person = query.from(Person::ENTITY);
    query.join(&person, Person::TOWN)?;
    query.filter(person.prop(Person::AGE)).ge(18)?;
    Ok(())
}

#[test]
fn test_template_instances_are_independent() {
    let template = QueryTemplate::from_function(RenderConfig::default(), &adults_with_town)
        .expect("template");

    let mut ctx = CopyContext::new();
    let first = template.instantiate_with(&mut ctx);
    let roots = template.prototype().roots();
    let person = ctx.get(&roots[0]).expect("root copied");
    first
        .filter(person.prop(Person::MARRIED))
        .is_true()
        .expect("specialize");

    let second = template.instantiate();
    assert_eq!(
        first.render().text,
        "from Person hobj1 join hobj1.town hobj2 where hobj1.age >= ? and hobj1.married = ?"
    );
    assert_eq!(
        second.render().text,
        "from Person hobj1 join hobj1.town hobj2 where hobj1.age >= ?"
    );
}
