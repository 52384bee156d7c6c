#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use yelp_insights::catalog::ReportCatalog;
    use yelp_insights::model::{Report, ResultKind};
    use yelp_insights::render::{RenderError, ResultSink};
    use yelp_insights::runner::{RenderableResult, ReportError, ReportRunner};
    use yelp_insights::source::{DataSource, SourceError};
    use yelp_insights::sql::Dialect;
    use yelp_insights::table::{ReshapeError, ResultTable, Series, Value};

    /// Answers canned SQL with canned tables; anything else is a missing table.
    #[derive(Default)]
    struct FakeSource {
        responses: HashMap<String, Result<ResultTable, SourceError>>,
        executed: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn with(mut self, sql: &str, response: Result<ResultTable, SourceError>) -> Self {
            self.responses.insert(sql.to_string(), response);
            self
        }
    }

    impl DataSource for FakeSource {
        fn dialect(&self) -> Dialect {
            Dialect::Sqlite
        }

        fn execute(&self, sql: &str) -> Result<ResultTable, SourceError> {
            self.executed.borrow_mut().push(sql.to_string());
            self.responses
                .get(sql)
                .cloned()
                .unwrap_or_else(|| Err(SourceError::Query(format!("no such table for: {}", sql))))
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }
    }

    /// Records what the runner handed over, in order.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ResultSink for Recorder {
        fn render_series(&mut self, report: &Report, series: &Series) -> Result<(), RenderError> {
            self.events.push(format!("series {} {}", report.id, series.len()));
            Ok(())
        }

        fn render_table(&mut self, report: &Report, table: &ResultTable) -> Result<(), RenderError> {
            self.events.push(format!("table {} {}", report.id, table.row_count()));
            Ok(())
        }

        fn render_failure(&mut self, report: &Report, error: &ReportError) -> Result<(), RenderError> {
            self.events.push(format!("failure {} {}", report.id, error.kind()));
            Ok(())
        }
    }

    fn table(names: &[&str], rows: Vec<Vec<Value>>) -> ResultTable {
        ResultTable::from_rows(names.iter().map(|s| s.to_string()).collect(), rows).unwrap()
    }

    fn category_counts() -> ResultTable {
        table(
            &["category", "n"],
            vec![
                vec![Value::from("Bars"), Value::Integer(3)],
                vec![Value::from("Nightlife"), Value::Integer(1)],
            ],
        )
    }

    #[test]
    fn test_series_report_reshaped_in_row_order() {
        let sql = "SELECT * FROM category_counts";
        let source = FakeSource::default().with(sql, Ok(category_counts()));
        let report = Report::series("cats", "Categories", sql, "category", "n");

        let result = ReportRunner::new(&source).run(&report).unwrap();
        let RenderableResult::Series(series) = result else {
            panic!("expected a series");
        };
        assert_eq!(series.keys().collect::<Vec<_>>(), vec!["Bars", "Nightlife"]);
        assert_eq!(series.get("Bars"), Some(3.0));
    }

    #[test]
    fn test_series_lookup_ignores_case() {
        let sql = "SELECT * FROM warehouse_counts";
        let upper = table(
            &["CATEGORY", "N"],
            vec![vec![Value::from("Bars"), Value::Integer(3)]],
        );
        let source = FakeSource::default().with(sql, Ok(upper));
        let report = Report::series("cats", "Categories", sql, "category", "n");

        let result = ReportRunner::new(&source).run(&report).unwrap();
        assert_eq!(result.kind(), ResultKind::Series);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_missing_value_column_is_reshape_error() {
        let sql = "SELECT * FROM category_counts";
        let source = FakeSource::default().with(sql, Ok(category_counts()));
        let report = Report::series("cats", "Categories", sql, "category", "total");

        let err = ReportRunner::new(&source).run(&report).unwrap_err();
        assert!(matches!(
            err,
            ReportError::Reshape(ReshapeError::MissingColumn { ref column, .. }) if column == "total"
        ));
    }

    #[test]
    fn test_duplicate_index_values_rejected() {
        let sql = "SELECT * FROM names";
        let dupes = table(
            &["name", "total_reviews"],
            vec![
                vec![Value::from("Starbucks"), Value::Integer(90)],
                vec![Value::from("Starbucks"), Value::Integer(75)],
            ],
        );
        let source = FakeSource::default().with(sql, Ok(dupes));
        let report = Report::series("names", "Names", sql, "name", "total_reviews");

        let err = ReportRunner::new(&source).run(&report).unwrap_err();
        assert_eq!(
            err,
            ReportError::Reshape(ReshapeError::DuplicateKey {
                column: "name".to_string(),
                key: "Starbucks".to_string(),
            })
        );
    }

    #[test]
    fn test_table_report_truncated_to_row_limit() {
        let sql = "SELECT * FROM recent";
        let rows: Vec<Vec<Value>> = (0..12_000)
            .map(|i| vec![Value::Integer(i), Value::from("text")])
            .collect();
        let source = FakeSource::default().with(sql, Ok(table(&["id", "text"], rows)));
        let report = Report::table("recent", "Recent", sql).with_row_limit(10_000);

        let result = ReportRunner::new(&source).run(&report).unwrap();
        let RenderableResult::Table(t) = result else {
            panic!("expected a table");
        };
        assert_eq!(t.row_count(), 10_000);
        assert_eq!(t.row(9_999).unwrap()[0], &Value::Integer(9_999));
    }

    #[test]
    fn test_table_under_limit_passes_through() {
        let sql = "SELECT * FROM category_counts";
        let source = FakeSource::default().with(sql, Ok(category_counts()));
        let report = Report::table("cats", "Categories", sql).with_row_limit(10_000);

        let result = ReportRunner::new(&source).run(&report).unwrap();
        assert_eq!(result, RenderableResult::Table(category_counts()));
    }

    #[test]
    fn test_connection_error_propagated_without_retry() {
        let sql = "SELECT * FROM category_counts";
        let source = FakeSource::default().with(
            sql,
            Err(SourceError::Connection("authentication failed".to_string())),
        );
        let report = Report::table("cats", "Categories", sql);

        let err = ReportRunner::new(&source).run(&report).unwrap_err();
        assert_eq!(err, ReportError::Connection("authentication failed".to_string()));
        assert_eq!(source.executed.borrow().len(), 1);
    }

    #[test]
    fn test_run_is_repeatable() {
        let sql = "SELECT * FROM category_counts";
        let source = FakeSource::default().with(sql, Ok(category_counts()));
        let report = Report::series("cats", "Categories", sql, "category", "n");
        let runner = ReportRunner::new(&source);

        let first = runner.run(&report).unwrap();
        let second = runner.run(&report).unwrap();
        assert_eq!(first, second);
        assert_eq!(source.executed.borrow().len(), 2);
    }

    #[test]
    fn test_run_all_skips_failures_and_keeps_order() {
        let source = FakeSource::default()
            .with("SELECT * FROM category_counts", Ok(category_counts()))
            .with(
                "SELECT * FROM pairs",
                Ok(table(
                    &["user_id", "business_id"],
                    vec![vec![Value::from("u1"), Value::from("b1")]],
                )),
            );
        let catalog = ReportCatalog::new(
            Dialect::Sqlite,
            vec![
                Report::series("first", "First", "SELECT * FROM category_counts", "category", "n"),
                Report::series("broken", "Broken", "SELECT * FROM category_counts", "category", "total"),
                Report::table("missing", "Missing", "SELECT * FROM nowhere"),
                Report::table("last", "Last", "SELECT * FROM pairs"),
            ],
        )
        .unwrap();

        let mut sink = Recorder::default();
        let summary = ReportRunner::new(&source)
            .run_all(&catalog, &mut sink)
            .unwrap();

        assert_eq!(
            sink.events,
            vec![
                "series first 2",
                "failure broken reshape",
                "failure missing query",
                "table last 1",
            ]
        );
        assert_eq!(summary.succeeded(), 2);
        assert!(!summary.is_success());
        let failed: Vec<&str> = summary.failed().map(|(id, _)| id).collect();
        assert_eq!(failed, vec!["broken", "missing"]);
        assert_eq!(source.executed.borrow().len(), 4);
    }
}
