#[cfg(test)]
mod tests {
    use yelp_insights::catalog::{ReportCatalog, TableNames, RECENT_REVIEWS_LIMIT};
    use yelp_insights::render::{RenderError, ResultSink};
    use yelp_insights::runner::{RenderableResult, ReportError, ReportRunner};
    use yelp_insights::model::Report;
    use yelp_insights::source::{DataSource, SqliteSource, YELP_SCHEMA_DDL};
    use yelp_insights::sql::Dialect;
    use yelp_insights::table::{ResultTable, Series, Value};

    fn seeded(rows: &str) -> SqliteSource {
        let source = SqliteSource::open_in_memory().unwrap();
        source.execute_batch(YELP_SCHEMA_DDL).unwrap();
        source.execute_batch(rows).unwrap();
        source
    }

    fn catalog() -> ReportCatalog {
        ReportCatalog::yelp(Dialect::Sqlite, &TableNames::default()).unwrap()
    }

    fn business(id: &str, name: &str, city: &str, categories: &str) -> String {
        format!(
            "INSERT INTO businesses VALUES ('{}', '{}', '{}', '{}');\n",
            id, name, city, categories
        )
    }

    /// `count` reviews of one business by distinct users.
    fn reviews(business: &str, count: usize, stars: i64, sentiment: &str) -> String {
        (0..count)
            .map(|i| {
                format!(
                    "INSERT INTO reviews VALUES ('{b}_u{i}', '{b}', '2021-{m:02}-{d:02}', {stars}, '{sentiment}');\n",
                    b = business,
                    i = i,
                    m = i % 12 + 1,
                    d = i % 28 + 1,
                    stars = stars,
                    sentiment = sentiment,
                )
            })
            .collect()
    }

    fn run(source: &SqliteSource, id: &str) -> RenderableResult {
        let catalog = catalog();
        let report = catalog.get(id).unwrap();
        ReportRunner::new(source).run(report).unwrap()
    }

    fn series(result: RenderableResult) -> Series {
        match result {
            RenderableResult::Series(s) => s,
            other => panic!("expected series, got {:?}", other.kind()),
        }
    }

    fn table(result: RenderableResult) -> ResultTable {
        match result {
            RenderableResult::Table(t) => t,
            other => panic!("expected table, got {:?}", other.kind()),
        }
    }

    fn text_column(table: &ResultTable, name: &str) -> Vec<String> {
        let idx = table.column_index(name).unwrap();
        table.rows().map(|row| row[idx].to_string()).collect()
    }

    #[test]
    fn test_category_counts_split_lists() {
        let mut rows = business("b1", "The Pub", "Reno", "Bars, Nightlife");
        rows += &reviews("b1", 1, 4, "Positive");
        let source = seeded(&rows);
        let s = series(run(&source, "category_business_counts"));

        assert_eq!(s.len(), 2);
        assert_eq!(s.get("Bars"), Some(1.0));
        assert_eq!(s.get("Nightlife"), Some(1.0));
        assert_eq!(s.get(""), None);
    }

    #[test]
    fn test_category_review_counts() {
        let mut rows = business("b1", "The Pub", "Reno", "Bars, Nightlife");
        rows += &business("b2", "Taqueria", "Reno", "Mexican, Restaurants");
        rows += &reviews("b1", 3, 4, "Positive");
        rows += &reviews("b2", 2, 5, "Positive");
        let s = series(run(&seeded(&rows), "category_review_counts"));

        assert_eq!(s.get("Bars"), Some(3.0));
        assert_eq!(s.get("Nightlife"), Some(3.0));
        assert_eq!(s.get("Restaurants"), Some(2.0));
        assert_eq!(s.keys().next(), Some("Bars"));
    }

    #[test]
    fn test_restaurant_reviewers_count_distinct_restaurants() {
        let mut rows = business("b1", "Taqueria", "Reno", "Mexican, Restaurants");
        rows += &business("b2", "Noodles", "Reno", "restaurants, Asian");
        rows += &business("b3", "The Pub", "Reno", "Bars");
        rows += "INSERT INTO reviews VALUES
            ('alice', 'b1', '2021-01-01', 5, 'Positive'),
            ('alice', 'b1', '2021-02-01', 4, 'Positive'),
            ('alice', 'b2', '2021-03-01', 4, 'Positive'),
            ('alice', 'b3', '2021-03-01', 4, 'Positive'),
            ('bob', 'b1', '2021-01-05', 2, 'Negative');";
        let s = series(run(&seeded(&rows), "top_restaurant_reviewers"));

        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["alice", "bob"]);
        assert_eq!(s.get("alice"), Some(2.0));
        assert_eq!(s.get("bob"), Some(1.0));
    }

    #[test]
    fn test_top_businesses_per_city_ranks_within_city() {
        let mut rows = String::new();
        for (id, count) in [("r1", 10), ("r2", 3), ("r3", 5), ("r4", 4), ("r5", 1)] {
            rows += &business(id, &format!("Reno {}", id), "Reno", "Food");
            rows += &reviews(id, count, 4, "Positive");
        }
        for i in 0..7 {
            let id = format!("v{}", i);
            rows += &business(&id, &format!("Vegas {}", i), "Las Vegas", "Food");
            rows += &reviews(&id, i + 1, 3, "Neutral");
        }
        let t = table(run(&seeded(&rows), "top_businesses_per_city"));

        assert_eq!(
            t.column_names(),
            vec!["city", "business_id", "name", "total_reviews"]
        );
        let cities = text_column(&t, "city");
        let ids = text_column(&t, "business_id");
        let totals = text_column(&t, "total_reviews");

        let vegas: Vec<&str> = cities
            .iter()
            .zip(&ids)
            .filter(|(c, _)| c.as_str() == "Las Vegas")
            .map(|(_, id)| id.as_str())
            .collect();
        assert_eq!(vegas, vec!["v6", "v5", "v4", "v3", "v2"]);

        let reno: Vec<(&str, &str)> = cities
            .iter()
            .zip(ids.iter().zip(&totals))
            .filter(|(c, _)| c.as_str() == "Reno")
            .map(|(_, (id, n))| (id.as_str(), n.as_str()))
            .collect();
        assert_eq!(
            reno,
            vec![("r1", "10"), ("r3", "5"), ("r4", "4"), ("r2", "3"), ("r5", "1")]
        );
    }

    #[test]
    fn test_avg_rating_requires_hundred_reviews() {
        let mut rows = business("b100", "Busy Diner", "Reno", "Restaurants");
        rows += &business("b99", "Almost Busy", "Reno", "Restaurants");
        rows += &reviews("b100", 100, 4, "Positive");
        rows += &reviews("b99", 99, 5, "Positive");
        let t = table(run(&seeded(&rows), "avg_rating_popular"));

        assert_eq!(t.row_count(), 1);
        assert_eq!(text_column(&t, "business_id"), vec!["b100"]);
        let idx = t.column_index("avg_rating").unwrap();
        assert_eq!(t.row(0).unwrap()[idx].as_f64(), Some(4.0));
    }

    #[test]
    fn test_monthly_reviews_skip_unparseable_dates() {
        let mut rows = business("b1", "The Pub", "Reno", "Bars");
        rows += "INSERT INTO reviews VALUES
            ('u1', 'b1', '2019-09-14', 4, 'Positive'),
            ('u2', 'b1', '2020-09-01', 4, 'Positive'),
            ('u3', 'b1', '2020-01-20', 2, 'Negative'),
            ('u4', 'b1', NULL, 3, 'Neutral'),
            ('u5', 'b1', '03/04/2021', 3, 'Neutral');";
        let s = series(run(&seeded(&rows), "monthly_reviews"));

        // The NULL and the non-ISO date are both skipped.
        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["Sep", "Jan"]);
        assert_eq!(s.get("Sep"), Some(2.0));
        assert_eq!(s.get("Jan"), Some(1.0));
    }

    #[test]
    fn test_recent_reviews_keep_three_newest_per_business() {
        let mut rows = business("b1", "The Pub", "Reno", "Bars");
        rows += &business("b2", "Taqueria", "Reno", "Mexican");
        rows += "INSERT INTO reviews VALUES
            ('u1', 'b1', '2021-01-01', 4, 'Positive'),
            ('u2', 'b1', '2021-03-01', 4, 'Positive'),
            ('u3', 'b1', '2021-02-01', 4, 'Positive'),
            ('u4', 'b1', '2021-04-01', 4, 'Positive'),
            ('u5', 'b2', '2021-01-01', 4, 'Positive');";
        let t = table(run(&seeded(&rows), "recent_reviews_per_business"));

        assert_eq!(text_column(&t, "user_id"), vec!["u4", "u2", "u3", "u5"]);
        assert!(t.column_index("name").is_some());
    }

    #[test]
    fn test_recent_reviews_capped() {
        // 3,400 businesses with three reviews each: 10,200 candidate rows.
        let rows = "
            WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 3400)
            INSERT INTO businesses SELECT printf('b%05d', i), 'Biz ' || i, 'Reno', 'Food' FROM n;
            WITH RECURSIVE k(j) AS (SELECT 1 UNION ALL SELECT j + 1 FROM k WHERE j < 3)
            INSERT INTO reviews
            SELECT 'u' || j, business_id, '2021-0' || j || '-01', 4, 'Positive'
            FROM businesses, k;";
        let t = table(run(&seeded(rows), "recent_reviews_per_business"));

        assert_eq!(t.row_count(), RECENT_REVIEWS_LIMIT);
    }

    #[test]
    fn test_five_star_share() {
        let mut rows = business("b1", "The Pub", "Reno", "Bars");
        rows += &reviews("b1", 3, 5, "Positive");
        rows += "INSERT INTO reviews VALUES ('late', 'b1', '2021-05-05', 1, 'Negative');";
        let t = table(run(&seeded(&rows), "five_star_share"));

        let row = t.row(0).unwrap();
        let idx = |name| t.column_index(name).unwrap();
        assert_eq!(row[idx("total_reviews")], &Value::Integer(4));
        assert_eq!(row[idx("star_5_reviews")], &Value::Integer(3));
        assert_eq!(row[idx("percent_5_star")].as_f64(), Some(75.0));
    }

    #[test]
    fn test_top_user_businesses_pairs() {
        let mut rows = business("b1", "The Pub", "Reno", "Bars");
        rows += &business("b2", "Taqueria", "Reno", "Mexican");
        rows += "INSERT INTO reviews VALUES
            ('alice', 'b1', '2021-01-01', 4, 'Positive'),
            ('alice', 'b1', '2021-02-01', 4, 'Positive'),
            ('alice', 'b2', '2021-02-01', 4, 'Positive'),
            ('bob', 'b2', '2021-02-01', 4, 'Positive');";
        let t = table(run(&seeded(&rows), "top_user_businesses"));

        assert_eq!(t.column_names(), vec!["user_id", "business_id"]);
        assert_eq!(text_column(&t, "user_id"), vec!["alice", "alice", "bob"]);
        assert_eq!(text_column(&t, "business_id"), vec!["b1", "b2", "b2"]);
    }

    #[test]
    fn test_positive_sentiment_leaders() {
        let mut rows = business("b1", "The Pub", "Reno", "Bars");
        rows += &business("b2", "Taqueria", "Reno", "Mexican");
        rows += &reviews("b1", 2, 5, "Positive");
        rows += &reviews("b2", 4, 5, "Positive");
        rows += "INSERT INTO reviews VALUES ('grump', 'b1', '2021-05-05', 1, 'Negative');";
        let s = series(run(&seeded(&rows), "positive_sentiment_leaders"));

        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["Taqueria", "The Pub"]);
        assert_eq!(s.get("The Pub"), Some(2.0));
    }

    #[test]
    fn test_duplicate_business_names_fail_reshape() {
        let mut rows = business("b1", "Starbucks", "Reno", "Coffee");
        rows += &business("b2", "Starbucks", "Reno", "Coffee");
        rows += &reviews("b1", 2, 5, "Positive");
        rows += &reviews("b2", 1, 5, "Positive");
        let source = seeded(&rows);
        let catalog = catalog();
        let report = catalog.get("positive_sentiment_leaders").unwrap();

        let err = ReportRunner::new(&source).run(report).unwrap_err();
        assert_eq!(err.kind(), "reshape");
    }

    #[test]
    fn test_empty_database_yields_empty_results() {
        let source = seeded("");
        let catalog = catalog();
        let runner = ReportRunner::new(&source);
        for report in catalog.list() {
            let result = runner.run(report).unwrap();
            assert!(result.is_empty(), "{} returned rows", report.id);
        }
    }

    #[test]
    fn test_self_test_passes_on_schema() {
        let mut rows = business("b1", "The Pub", "Reno", "Bars, Nightlife");
        rows += &reviews("b1", 2, 5, "Positive");
        let source = seeded(&rows);

        let results = catalog().self_test(&source);
        assert_eq!(results.len(), 10);
        for check in &results {
            assert!(check.outcome.is_ok(), "{}: {:?}", check.report, check.outcome);
        }
    }

    #[test]
    fn test_missing_table_is_query_error() {
        let source = SqliteSource::open_in_memory().unwrap();
        let catalog = catalog();
        let err = ReportRunner::new(&source)
            .run(&catalog.list()[0])
            .unwrap_err();
        assert!(matches!(err, ReportError::Query(_)));
    }

    #[test]
    fn test_custom_table_names() {
        let source = SqliteSource::open_in_memory().unwrap();
        source
            .execute_batch(
                &YELP_SCHEMA_DDL
                    .replace("TABLE businesses", "TABLE yelp_business")
                    .replace("TABLE reviews", "TABLE yelp_review")
                    .replace("REFERENCES businesses", "REFERENCES yelp_business"),
            )
            .unwrap();
        source
            .execute_batch("INSERT INTO yelp_business VALUES ('b1', 'The Pub', 'Reno', 'Bars');")
            .unwrap();
        let catalog =
            ReportCatalog::yelp(Dialect::Sqlite, &TableNames::new("yelp_business", "yelp_review"))
                .unwrap();

        let results = catalog.self_test(&source);
        assert!(results.iter().all(|c| c.outcome.is_ok()));
    }

    struct Ids(Vec<String>);

    impl ResultSink for Ids {
        fn render_series(&mut self, report: &Report, _: &Series) -> Result<(), RenderError> {
            self.0.push(report.id.clone());
            Ok(())
        }

        fn render_table(&mut self, report: &Report, _: &ResultTable) -> Result<(), RenderError> {
            self.0.push(report.id.clone());
            Ok(())
        }
    }

    #[test]
    fn test_run_all_in_catalog_order() {
        let source = seeded(&business("b1", "The Pub", "Reno", "Bars"));
        let catalog = catalog();
        let mut sink = Ids(Vec::new());

        let summary = ReportRunner::new(&source).run_all(&catalog, &mut sink).unwrap();
        assert!(summary.is_success());
        let expected: Vec<String> = catalog.list().iter().map(|r| r.id.clone()).collect();
        assert_eq!(sink.0, expected);
        assert_eq!(source.describe(), "sqlite::memory:");
    }
}
