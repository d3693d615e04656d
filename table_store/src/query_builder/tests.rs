//! SQL generation tests
//!
//! These check the rendered statements end to end: clause order, quoting,
//! placeholder counts and bind order.

#[cfg(test)]
mod tests {
    use crate::errors::StoreError;
    use crate::query_builder::{
        Filters, GroupBy, JoinClause, JoinType, Page, QueryFilter, QuerySpec, SqlGenerator,
    };
    use crate::validation::ValidatedTableName;
    use type_mapping::{SqlValue, Values};

    fn members() -> ValidatedTableName {
        ValidatedTableName::new("members").unwrap()
    }

    // ========================================
    // SELECT
    // ========================================

    #[test]
    fn test_select_without_anything() {
        let stmt = SqlGenerator::select(&members(), &QuerySpec::new()).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM `members`");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_select_with_filters_order_and_page() {
        let spec = QuerySpec::new()
            .filter("level", "gold")
            .filter("age > ?", 18)
            .order_by("id DESC")
            .page(Page::new(2, 10).unwrap());

        let stmt = SqlGenerator::select(&members(), &spec).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM `members` WHERE (age > ?) AND `level` = ? ORDER BY `id` DESC LIMIT 10 OFFSET 10"
        );
        assert_eq!(
            stmt.params,
            vec![SqlValue::Int(18), SqlValue::Text("gold".to_string())]
        );
    }

    #[test]
    fn test_filter_insertion_order_does_not_change_sql() {
        let a = QuerySpec::new().filter("level", "gold").filter("region", "eu");
        let b = QuerySpec::new().filter("region", "eu").filter("level", "gold");

        assert_eq!(
            SqlGenerator::select(&members(), &a).unwrap(),
            SqlGenerator::select(&members(), &b).unwrap()
        );
    }

    #[test]
    fn test_select_limit_without_page() {
        let spec = QuerySpec::new().filter("id", 7).limit(1);
        let stmt = SqlGenerator::select(&members(), &spec).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM `members` WHERE `id` = ? LIMIT 1");
    }

    #[test]
    fn test_select_distinct_fields() {
        let spec = QuerySpec::new().fields(&["level"]).distinct();
        let stmt = SqlGenerator::select(&members(), &spec).unwrap();
        assert_eq!(stmt.sql, "SELECT DISTINCT `level` FROM `members`");
    }

    #[test]
    fn test_select_with_raw_join_and_qualified_fields() {
        let spec = QuerySpec::new()
            .fields(&["members.*, o.amount AS amount"])
            .join("LEFT JOIN orders o ON o.member_id = members.id")
            .filter("o.status", "paid");

        let stmt = SqlGenerator::select(&members(), &spec).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT `members`.*, `o`.`amount` AS `amount` FROM `members` \
             LEFT JOIN orders o ON o.member_id = members.id WHERE `o`.`status` = ?"
        );
    }

    #[test]
    fn test_select_with_typed_join() {
        let join = JoinClause::on(JoinType::Inner, "orders", "orders.member_id", "members.id");
        let spec = QuerySpec::new().join(join);

        let stmt = SqlGenerator::select(&members(), &spec).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM `members` INNER JOIN `orders` ON `orders`.`member_id` = `members`.`id`"
        );
    }

    #[test]
    fn test_group_by_with_having() {
        let spec = QuerySpec::new()
            .fields(&["level", "COUNT(1) AS total"])
            .filter("deleted_at", SqlValue::Null)
            .group_by(GroupBy::parse("level").having(QueryFilter::gt("COUNT(*)", 5)))
            .order_by("level");

        let stmt = SqlGenerator::select(&members(), &spec).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT `level`, COUNT(*) AS `total` FROM `members` WHERE `deleted_at` IS NULL \
             GROUP BY `level` HAVING COUNT(*) > ? ORDER BY `level` ASC"
        );
        assert_eq!(stmt.params, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn test_group_and_order_expressions_must_be_columns() {
        let grouped = QuerySpec::new().group_by("DATE(created_at)");
        assert!(matches!(
            SqlGenerator::select(&members(), &grouped),
            Err(StoreError::InvalidArgument(_))
        ));

        let ordered = QuerySpec::new().order_by("FIELD(id, 3, 1, 2)");
        assert!(matches!(
            SqlGenerator::select(&members(), &ordered),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    // ========================================
    // WHERE
    // ========================================

    #[test]
    fn test_in_list_expansion() {
        let spec = QuerySpec::new().filter("id", vec![1i64, 2, 3]);
        let stmt = SqlGenerator::select(&members(), &spec).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM `members` WHERE `id` IN (?, ?, ?)");
        assert_eq!(stmt.params.len(), 3);
    }

    #[test]
    fn test_empty_in_and_not_in() {
        let spec = QuerySpec::new()
            .condition(QueryFilter::in_values("id", Vec::<i64>::new()))
            .condition(QueryFilter::not_in_values("id", Vec::<i64>::new()));
        let stmt = SqlGenerator::select(&members(), &spec).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM `members` WHERE 1=0 AND 1=1");
    }

    #[test]
    fn test_or_only_through_explicit_groups() {
        let spec = QuerySpec::new().filter("region", "eu").condition(QueryFilter::or(vec![
            QueryFilter::eq("level", "gold"),
            QueryFilter::eq("level", "silver"),
        ]));

        let stmt = SqlGenerator::select(&members(), &spec).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM `members` WHERE `region` = ? AND (`level` = ? OR `level` = ?)"
        );
        assert_eq!(
            stmt.params,
            vec![
                SqlValue::from("eu"),
                SqlValue::from("gold"),
                SqlValue::from("silver")
            ]
        );
    }

    #[test]
    fn test_raw_condition_is_parenthesized() {
        let spec = QuerySpec::new().filter("level = ? OR vip = 1", "gold");
        let stmt = SqlGenerator::select(&members(), &spec).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM `members` WHERE (level = ? OR vip = 1)"
        );
    }

    #[test]
    fn test_raw_placeholder_mismatch_is_rejected() {
        let spec = QuerySpec::new().condition(QueryFilter::raw("a = ? AND b = ?", vec![1.into()]));
        assert!(matches!(
            SqlGenerator::select(&members(), &spec),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_null_comparisons() {
        let spec = QuerySpec::new()
            .condition(QueryFilter::eq("a", SqlValue::Null))
            .condition(QueryFilter::ne("b", SqlValue::Null))
            .condition(QueryFilter::is_not_null("c"));
        let stmt = SqlGenerator::select(&members(), &spec).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM `members` WHERE `a` IS NULL AND `b` IS NOT NULL AND `c` IS NOT NULL"
        );
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_injection_in_identifiers_is_rejected() {
        let bad_order = QuerySpec::new().order_by("id; DROP TABLE members");
        assert!(SqlGenerator::select(&members(), &bad_order).is_err());

        let bad_field = QuerySpec::new().fields(&["(SELECT password FROM admins)"]);
        assert!(SqlGenerator::select(&members(), &bad_field).is_err());

        let bad_group = QuerySpec::new().group_by("level) OR (1");
        assert!(SqlGenerator::select(&members(), &bad_group).is_err());
    }

    // ========================================
    // Aggregates
    // ========================================

    #[test]
    fn test_count_ignores_order_and_page() {
        let spec = QuerySpec::new()
            .filter("level", "gold")
            .order_by("id")
            .page(Page::new(3, 2).unwrap());

        let stmt = SqlGenerator::count(&members(), &spec).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT COUNT(1) AS count FROM `members` WHERE `level` = ?"
        );
    }

    #[test]
    fn test_count_with_join() {
        let spec = QuerySpec::new().join("JOIN orders o ON o.member_id = members.id");
        let stmt = SqlGenerator::count(&members(), &spec).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT COUNT(1) AS count FROM `members` JOIN orders o ON o.member_id = members.id"
        );
    }

    #[test]
    fn test_count_of_grouped_select_uses_subquery() {
        let spec = QuerySpec::new()
            .fields(&["level"])
            .group_by("level")
            .page(Page::default());

        let stmt = SqlGenerator::count(&members(), &spec).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT COUNT(1) AS count FROM (SELECT `level` FROM `members` GROUP BY `level`) AS counted"
        );
    }

    #[test]
    fn test_sum() {
        let spec = QuerySpec::new().filter("level", "gold");
        let stmt = SqlGenerator::sum(&members(), "points", &spec).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT CAST(IFNULL(SUM(`points`), 0) AS DOUBLE) AS total FROM `members` WHERE `level` = ?"
        );
        assert!(SqlGenerator::sum(&members(), "points + 1", &spec).is_err());
    }

    #[test]
    fn test_distinct_count() {
        let stmt =
            SqlGenerator::distinct_count(&members(), &["level", "region"], &QuerySpec::new()).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT COUNT(DISTINCT `level`, `region`) AS count FROM `members`"
        );

        let empty: [&str; 0] = [];
        assert!(matches!(
            SqlGenerator::distinct_count(&members(), &empty, &QuerySpec::new()),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    // ========================================
    // Writes
    // ========================================

    #[test]
    fn test_insert() {
        let mut row = Values::new();
        row.insert("name".to_string(), SqlValue::from("alice"));
        row.insert("level".to_string(), SqlValue::from("gold"));
        row.insert("tags".to_string(), SqlValue::from(vec!["a"]));

        let stmt = SqlGenerator::insert(&members(), &row).unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO `members` (`level`, `name`, `tags`) VALUES (?, ?, ?)"
        );
        assert_eq!(stmt.params[2], SqlValue::Json(serde_json::json!(["a"])));
    }

    #[test]
    fn test_update_binds_data_before_filters() {
        let mut data = Values::new();
        data.insert("level".to_string(), SqlValue::from("platinum"));

        let spec = QuerySpec::new().filters(Filters::new().with("id", 42));
        let stmt = SqlGenerator::update(&members(), &data, &spec, Some(1)).unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE `members` SET `level` = ? WHERE `id` = ? LIMIT 1"
        );
        assert_eq!(
            stmt.params,
            vec![SqlValue::from("platinum"), SqlValue::Int(42)]
        );
    }

    #[test]
    fn test_update_rejects_empty_inputs() {
        let spec = QuerySpec::new().filter("id", 1);
        assert!(matches!(
            SqlGenerator::update(&members(), &Values::new(), &spec, None),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_delete() {
        let stmt = SqlGenerator::delete(&members(), &QuerySpec::new().filter("id", 3)).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM `members` WHERE `id` = ?");

        let all = SqlGenerator::delete(&members(), &QuerySpec::new()).unwrap();
        assert_eq!(all.sql, "DELETE FROM `members`");
    }
}
