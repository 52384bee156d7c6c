#[cfg(test)]
mod tests {
    use yelp_insights::catalog::ReportCatalog;
    use yelp_insights::model::{DefinitionError, Report, ResultKind};
    use yelp_insights::sql::Dialect;

    #[test]
    fn test_series_report_columns() {
        let report = Report::series(
            "monthly_reviews",
            "Month with Most Reviews",
            "SELECT review_month, COUNT(*) AS no_of_reviews FROM reviews GROUP BY 1",
            "review_month",
            "no_of_reviews",
        );

        assert_eq!(report.kind, ResultKind::Series);
        assert_eq!(report.series_columns().unwrap(), ("review_month", "no_of_reviews"));
        assert_eq!(report.referenced_columns(), vec!["review_month", "no_of_reviews"]);
        assert!(report.validate(Dialect::Sqlite).is_ok());
    }

    #[test]
    fn test_table_report_has_no_series_columns() {
        let report = Report::table("t", "Table", "SELECT * FROM reviews").with_row_limit(5);

        assert_eq!(report.row_limit, Some(5));
        assert!(report.referenced_columns().is_empty());
        assert!(matches!(
            report.series_columns(),
            Err(DefinitionError::MissingSeriesColumn { role: "index", .. })
        ));
        assert!(report.validate(Dialect::Snowflake).is_ok());
    }

    #[test]
    fn test_unknown_value_column_rejected_statically() {
        let report = Report::series(
            "cats",
            "Categories",
            "SELECT category, COUNT(*) AS n FROM business_categories GROUP BY category",
            "category",
            "no_of_businesses",
        );

        let err = report.validate(Dialect::Sqlite).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::UnknownColumn {
                report: "cats".to_string(),
                column: "no_of_businesses".to_string(),
                available: vec!["category".to_string(), "n".to_string()],
            }
        );
        assert_eq!(
            err.to_string(),
            "report 'cats' references column 'no_of_businesses' not produced by its SQL (produces: category, n)"
        );
    }

    #[test]
    fn test_check_columns_ignores_case() {
        let report = Report::series("s", "S", "SELECT 1", "name", "total_reviews");
        assert!(report.check_columns(&["NAME", "TOTAL_REVIEWS"]).is_ok());
        assert!(report.check_columns(&["NAME"]).is_err());
    }

    #[test]
    fn test_empty_definitions_rejected() {
        assert_eq!(
            Report::table(" ", "Blank", "SELECT 1").validate(Dialect::Sqlite),
            Err(DefinitionError::EmptyId)
        );
        assert_eq!(
            Report::table("t", "No SQL", "  ").validate(Dialect::Sqlite),
            Err(DefinitionError::EmptySql("t".to_string()))
        );
    }

    #[test]
    fn test_catalog_rejects_duplicate_ids() {
        let result = ReportCatalog::new(
            Dialect::Sqlite,
            vec![
                Report::table("same", "One", "SELECT 1 AS a"),
                Report::table("same", "Two", "SELECT 2 AS a"),
            ],
        );
        assert_eq!(result.unwrap_err(), DefinitionError::DuplicateId("same".to_string()));
    }

    #[test]
    fn test_report_serializes_for_listing() {
        let report = Report::series("s", "Chart", "SELECT k, v FROM t", "k", "v");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "series");
        assert_eq!(json["index_column"], "k");
        assert_eq!(json["row_limit"], serde_json::Value::Null);
    }
}
