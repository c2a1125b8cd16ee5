//! End-to-end SQL generation tests: build plans through the fluent surface
//! and check the emitted T-SQL text.

use insta::assert_snapshot;

use fluq::{AggregateFunc, QueryContext, Reason, Scalar, SortDirection, Variables};

#[test]
fn test_aggregation_with_filter() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sql = users
        .filter("u => u.age > 18")
        .unwrap()
        .avg("u => u.age")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT AVG([u].[age]) AS [avg]
    FROM [users] AS [u]
    WHERE ([u].[age] > 18)
    ");
}

#[test]
fn test_membership_via_bound_variable() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let vars = Variables::from([(
        "allowed".to_string(),
        Scalar::from(vec!["active", "pending"]),
    )]);
    let sql = users
        .with_variables(vars)
        .filter("(u, p) => p.allowed.includes(u.status)")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT *
    FROM [users] AS [u]
    WHERE [u].[status] IN (N'active', N'pending')
    ");
}

#[test]
fn test_join_with_nested_selection() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let orders = ctx.table("orders").unwrap();
    let sql = users
        .join(&orders, "u => u.id", "o => o.userId", "(u, o) => ({u, o})")
        .unwrap()
        .select("j => ({userName: j.u.name, orderAmount: j.o.amount})")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT [u].[name] AS [userName], [o].[amount] AS [orderAmount]
    FROM [users] AS [u]
      INNER JOIN [orders] AS [o] ON ([u].[id] = [o].[userId])
    ");
}

#[test]
fn test_paging() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sql = users
        .order_by("u => u.age")
        .unwrap()
        .limit(15)
        .offset(30)
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT *
    FROM [users] AS [u]
    ORDER BY [u].[age] ASC
    OFFSET 30 ROWS
    FETCH NEXT 15 ROWS ONLY
    ");
}

#[test]
fn test_top_via_limit_only() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    assert_snapshot!(users.limit(10).to_sql(), @r"
    SELECT TOP 10 *
    FROM [users] AS [u]
    ");
}

#[test]
fn test_grouping_with_aggregate_having() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sql = users
        .group_by("u => [u.age]")
        .unwrap()
        .having_count("c => c > 5")
        .unwrap()
        .select("g => ({age: g.age})")
        .unwrap()
        .count()
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT [u].[age] AS [age], COUNT(*) AS [count]
    FROM [users] AS [u]
    GROUP BY [u].[age]
    HAVING (COUNT(*) > 5)
    ");
}

#[test]
fn test_scalar_subquery_comparison() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sub = users
        .select("u => ({s: u.salary})")
        .unwrap()
        .avg("u => u.s")
        .unwrap()
        .limit(1);
    let sql = users.filter_gt("u => u.salary", &sub).unwrap().to_sql();
    assert_eq!(
        sql,
        "SELECT *\n\
         FROM [users] AS [u]\n\
         WHERE ([u].[salary] > \n\
         \x20\x20(SELECT TOP 1\n\
         \x20\x20\x20\x20[u].[salary] AS [s], AVG([u].[s]) AS [avg]\n\
         \x20\x20\x20\x20FROM [users] AS [u]))"
    );
}

#[test]
fn test_filters_and_combine() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sql = users
        .filter("u => u.age > 18")
        .unwrap()
        .filter("u => u.name == 'J'")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT *
    FROM [users] AS [u]
    WHERE (([u].[age] > 18) AND ([u].[name] = N'J'))
    ");
}

#[test]
fn test_orderings_accumulate_without_dedup() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sql = users
        .order_by("u => u.age")
        .unwrap()
        .order_by_desc("u => u.age")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT *
    FROM [users] AS [u]
    ORDER BY [u].[age] ASC, [u].[age] DESC
    ");
}

#[test]
fn test_operators_do_not_mutate() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let before = users.clone();
    let _ = users.filter("u => u.age > 18").unwrap();
    let _ = users.limit(5);
    let _ = users.select("u => ({a: u.age})").unwrap();
    assert_eq!(users, before);
}

#[test]
fn test_clone_emits_identically() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let plan = users
        .filter("u => u.age > 18")
        .unwrap()
        .order_by_desc("u => u.name")
        .unwrap();
    assert_eq!(plan.to_sql(), plan.clone().to_sql());
}

#[test]
fn test_serialization_idempotence() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let orders = ctx.table("orders").unwrap();
    let plan = users
        .join(&orders, "u => u.id", "o => o.userId", "(u, o) => ({u, o})")
        .unwrap()
        .filter("j => j.o.amount > 100")
        .unwrap()
        .limit(20);

    let restored = fluq::json::from_value(fluq::json::to_value(&plan).unwrap()).unwrap();
    assert_eq!(restored.to_sql(), plan.to_sql());
}

#[test]
fn test_boolean_equality_normalizes() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sql = users.filter("u => u.isActive === true").unwrap().to_sql();
    assert_snapshot!(sql, @r"
    SELECT *
    FROM [users] AS [u]
    WHERE ([u].[isActive] = 1)
    ");
}

#[test]
fn test_substring_search() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sql = users.filter("u => u.name.includes('J')").unwrap().to_sql();
    assert_snapshot!(sql, @r"
    SELECT *
    FROM [users] AS [u]
    WHERE [u].[name] LIKE CONCAT(N'%', N'J', N'%')
    ");
}

#[test]
fn test_negated_membership() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let vars = Variables::from([(
        "allowed".to_string(),
        Scalar::from(vec!["active", "pending"]),
    )]);
    let sql = users
        .with_variables(vars)
        .filter("(u, p) => !p.allowed.includes(u.status)")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT *
    FROM [users] AS [u]
    WHERE NOT ([u].[status] IN (N'active', N'pending'))
    ");
}

#[test]
fn test_empty_bound_list() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let vars = Variables::from([("allowed".to_string(), Scalar::List(vec![]))]);
    let sql = users
        .with_variables(vars)
        .filter("(u, p) => p.allowed.includes(u.status)")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT *
    FROM [users] AS [u]
    WHERE 1 = 0
    ");
}

#[test]
fn test_missing_bound_variable_becomes_null() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sql = users
        .filter("(u, p) => u.id == p.missing")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT *
    FROM [users] AS [u]
    WHERE ([u].[id] = NULL)
    ");
}

#[test]
fn test_trim_family() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sql = users
        .select("u => ({name: u.name.trim(), left: u.name.trimStart(), right: u.name.trimEnd()})")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT LTRIM(RTRIM([u].[name])) AS [name], LTRIM([u].[name]) AS [left],
      RTRIM([u].[name]) AS [right]
    FROM [users] AS [u]
    ");
}

#[test]
fn test_spread_of_joined_object() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let orders = ctx.table("orders").unwrap();
    let sql = users
        .join(&orders, "u => u.id", "o => o.userId", "(u, o) => ({u, o})")
        .unwrap()
        .select("j => ({...j.u, orderAmount: j.o.amount})")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT [u].*, [o].[amount] AS [orderAmount]
    FROM [users] AS [u]
      INNER JOIN [orders] AS [o] ON ([u].[id] = [o].[userId])
    ");
}

#[test]
fn test_path_registration_resolves_nesting() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let orders = ctx.table("orders").unwrap();
    // only a single column of `o` is registered, through its dotted path
    let plan = users
        .join(
            &orders,
            "u => u.id",
            "o => o.userId",
            "(u, o) => ({total: o.amount})",
        )
        .unwrap();
    let sql = plan.filter("j => j.o.amount > 10").unwrap().to_sql();
    assert_snapshot!(sql, @r"
    SELECT *
    FROM [users] AS [u]
      INNER JOIN [orders] AS [o] ON ([u].[id] = [o].[userId])
    WHERE ([o].[amount] > 10)
    ");
}

#[test]
fn test_three_level_nesting() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let orders = ctx.table("orders").unwrap();
    let items = ctx.table("items").unwrap();
    let sql = users
        .join(&orders, "u => u.id", "o => o.userId", "(u, o) => ({u, o})")
        .unwrap()
        .join(&items, "j => j.o.id", "i => i.orderId", "(j, i) => ({...j, i})")
        .unwrap()
        .select("x => ({amount: x.o.amount, itemName: x.i.name})")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT [o].[amount] AS [amount], [i].[name] AS [itemName]
    FROM [users] AS [u]
      INNER JOIN [orders] AS [o] ON ([u].[id] = [o].[userId])
      INNER JOIN [items] AS [i] ON ([o].[id] = [i].[orderId])
    ");
}

#[test]
fn test_left_outer_join() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let orders = ctx.table("orders").unwrap();
    let sql = users
        .join_kind(
            &orders,
            "u => u.id",
            "o => o.userId",
            "(u, o) => ({u, o})",
            fluq::JoinKind::LeftOuter,
        )
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT *
    FROM [users] AS [u]
      LEFT OUTER JOIN [orders] AS [o] ON ([u].[id] = [o].[userId])
    ");
}

#[test]
fn test_order_by_aggregate() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sql = users
        .group_by("u => [u.city]")
        .unwrap()
        .select("g => ({city: g.city})")
        .unwrap()
        .order_by_aggregate(AggregateFunc::Count, None, SortDirection::Desc)
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT [u].[city] AS [city]
    FROM [users] AS [u]
    GROUP BY [u].[city]
    ORDER BY COUNT(*) DESC
    ");
}

#[test]
fn test_having_avg() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sql = users
        .group_by("u => [u.city]")
        .unwrap()
        .having_avg("g => g.age", "a => a > 30")
        .unwrap()
        .select("g => ({city: g.city})")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT [u].[city] AS [city]
    FROM [users] AS [u]
    GROUP BY [u].[city]
    HAVING (AVG([u].[age]) > 30)
    ");
}

#[test]
fn test_membership_subquery() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let orders = ctx.table("orders").unwrap();
    let sub = orders.select("o => o.userId").unwrap();
    let sql = users.filter_in("u => u.id", &sub).unwrap().to_sql();
    assert_eq!(
        sql,
        "SELECT *\n\
         FROM [users] AS [u]\n\
         WHERE [u].[id] IN \n\
         \x20\x20(SELECT\n\
         \x20\x20\x20\x20[o].[userId] AS [userId]\n\
         \x20\x20\x20\x20FROM [orders] AS [o])"
    );
}

#[test]
fn test_correlated_exists() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let orders = ctx.table("orders").unwrap();
    let sql = users
        .filter_exists_correlated(&orders, "o => o.userId", "u => u.id")
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT *\n\
         FROM [users] AS [u]\n\
         WHERE EXISTS \n\
         \x20\x20(SELECT *\n\
         \x20\x20\x20\x20FROM [orders] AS [o]\n\
         \x20\x20\x20\x20WHERE ([o].[userId] = [u].[id]))"
    );
}

#[test]
fn test_correlated_scalar_comparison() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let orders = ctx.table("orders").unwrap();
    let sub = orders.avg("o => o.amount").unwrap();
    let sql = users
        .filter_gt_correlated("u => u.salary", &sub, "o => o.userId", "u => u.id")
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT *\n\
         FROM [users] AS [u]\n\
         WHERE ([u].[salary] > \n\
         \x20\x20(SELECT\n\
         \x20\x20\x20\x20AVG([o].[amount]) AS [avg]\n\
         \x20\x20\x20\x20FROM [orders] AS [o]\n\
         \x20\x20\x20\x20WHERE ([o].[userId] = [u].[id])))"
    );
}

#[test]
fn test_named_subquery_projection() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let orders = ctx.table("orders").unwrap();
    let sql = users
        .with_subquery("orderCount", &orders, "u => u.id", "o => o.userId", |sub| {
            sub.count()
        })
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT \n\
         \x20\x20(SELECT\n\
         \x20\x20\x20\x20COUNT(*) AS [count]\n\
         \x20\x20\x20\x20FROM [orders] AS [o]\n\
         \x20\x20\x20\x20WHERE ([o].[userId] = [u].[id])) AS [orderCount]\n\
         FROM [users] AS [u]"
    );
}

#[test]
fn test_unresolved_property() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let err = users.filter("u => x.name == 1").unwrap_err();
    assert!(matches!(err.reason, Reason::UnresolvedProperty { .. }));
    assert_eq!(err.code, Some("E0002"));
}

#[test]
fn test_unsupported_operator() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let err = users.filter("u => u.flags & 1").unwrap_err();
    assert!(matches!(err.reason, Reason::UnsupportedOperator { .. }));
    assert_eq!(err.code, Some("E0003"));
}

#[test]
fn test_unparseable_lambda() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let err = users.filter("nonsense").unwrap_err();
    assert!(matches!(err.reason, Reason::Unparseable { .. }));
    assert_eq!(err.code, Some("E0001"));
}

#[test]
fn test_arithmetic_and_precedence() {
    let ctx = QueryContext::new();
    let users = ctx.table("users").unwrap();
    let sql = users
        .filter("u => u.salary * 12 + u.bonus > 100000")
        .unwrap()
        .to_sql();
    assert_snapshot!(sql, @r"
    SELECT *
    FROM [users] AS [u]
    WHERE ((([u].[salary] * 12) + [u].[bonus]) > 100000)
    ");
}
