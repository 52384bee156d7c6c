#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use yelp_insights::catalog::{ReportCatalog, TableNames};
    use yelp_insights::config::{Driver, Settings, SettingsError};

    fn write_config(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("yelp-insights-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_file_and_build_catalog() {
        let path = write_config(
            "full.toml",
            r#"
[connections.default]
driver = "sqlite"
connection_string = "./data/yelp.db"

[connections.warehouse]
driver = "snowflake"
connection_string = "analyst@acme/YELP/PUBLIC"

[tables]
businesses = "YELP.PUBLIC.YELP_BUSINESSES"
reviews = "YELP.PUBLIC.YELP_REVIEWS"

[dashboard]
title = "Reno Insights"
reports = ["monthly_reviews", "category_business_counts"]
display_rows = 10
"#,
        );
        let settings = Settings::from_file(&path).unwrap();

        let default = settings.resolve_connection(None).unwrap();
        assert_eq!(default.driver, Driver::Sqlite);
        let warehouse = settings.resolve_connection(Some("warehouse")).unwrap();
        assert_eq!(warehouse.driver, Driver::Snowflake);

        assert_eq!(settings.dashboard.title, "Reno Insights");
        assert_eq!(settings.dashboard.display_rows, 10);

        let catalog = ReportCatalog::yelp(warehouse.driver.dialect(), &settings.tables)
            .unwrap()
            .select(&settings.dashboard.reports)
            .unwrap();
        let ids: Vec<&str> = catalog.list().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["category_business_counts", "monthly_reviews"]);
        assert!(catalog.list()[0].sql.contains("YELP.PUBLIC.YELP_BUSINESSES"));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("yelp-insights-does-not-exist.toml");
        assert!(matches!(
            Settings::from_file(&path),
            Err(SettingsError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_report_selection() {
        let settings = Settings::from_toml(
            r#"
[dashboard]
reports = ["not_a_report"]
"#,
        )
        .unwrap();
        let catalog = ReportCatalog::yelp(Driver::Sqlite.dialect(), &TableNames::default()).unwrap();
        assert!(catalog.select(&settings.dashboard.reports).is_err());
    }

    #[test]
    fn test_injected_table_name_rejected() {
        let result = Settings::from_toml(
            r#"
[tables]
reviews = "reviews; DROP TABLE businesses"
"#,
        );
        assert!(matches!(result, Err(SettingsError::InvalidConfig(_))));
    }

    #[test]
    fn test_requested_reports_override_configured_subset() {
        let settings = Settings::from_toml(
            r#"
[dashboard]
reports = ["monthly_reviews"]
"#,
        )
        .unwrap();
        let catalog = ReportCatalog::yelp(Driver::Sqlite.dialect(), &TableNames::default()).unwrap();

        let configured = catalog.select(settings.dashboard.report_selection(&[])).unwrap();
        assert_eq!(configured.len(), 1);

        let requested = vec!["five_star_share".to_string()];
        let selected = catalog
            .select(settings.dashboard.report_selection(&requested))
            .unwrap();
        let ids: Vec<&str> = selected.list().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["five_star_share"]);
    }
}
