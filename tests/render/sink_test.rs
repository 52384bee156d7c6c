#[cfg(test)]
mod tests {
    use yelp_insights::model::Report;
    use yelp_insights::render::{JsonSink, ResultSink, TextSink};
    use yelp_insights::runner::ReportError;
    use yelp_insights::table::{ResultTable, Series, Value};

    fn categories() -> (Report, Series) {
        let table = ResultTable::from_rows(
            vec!["category".to_string(), "no_of_businesses".to_string()],
            vec![
                vec![Value::from("Bars"), Value::Integer(4)],
                vec![Value::from("Nightlife"), Value::Integer(2)],
                vec![Value::from("Pubs"), Value::Integer(1)],
            ],
        )
        .unwrap();
        let series = Series::from_table(&table, "category", "no_of_businesses").unwrap();
        let report = Report::series(
            "category_business_counts",
            "Categories",
            "SELECT category, no_of_businesses FROM t",
            "category",
            "no_of_businesses",
        );
        (report, series)
    }

    fn cities() -> (Report, ResultTable) {
        let table = ResultTable::from_rows(
            vec!["city".to_string(), "n".to_string()],
            vec![
                vec![Value::from("Reno"), Value::Integer(10)],
                vec![Value::from("Tampa"), Value::Integer(7)],
                vec![Value::from("Boise"), Value::Integer(2)],
            ],
        )
        .unwrap();
        (Report::table("cities", "Cities", "SELECT city, n FROM t"), table)
    }

    fn failed() -> (Report, ReportError) {
        (
            Report::table("reviews", "Reviews", "SELECT * FROM reviews"),
            ReportError::Query("no such table: reviews".to_string()),
        )
    }

    #[test]
    fn test_text_dashboard() {
        let mut sink = TextSink::new(Vec::new(), 2);
        let (series_report, series) = categories();
        let (table_report, table) = cities();
        let (failed_report, error) = failed();

        sink.render_series(&series_report, &series).unwrap();
        sink.render_table(&table_report, &table).unwrap();
        sink.render_failure(&failed_report, &error).unwrap();
        sink.finish().unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        insta::assert_snapshot!(out.trim_end(), @r"
== Categories ==
Bars       ########################################  4
Nightlife  ####################                      2
Pubs       ##########                                1

== Cities ==
city   n
-----  --
Reno   10
Tampa   7
(2 of 3 rows shown)

== Reviews ==
error: query error: no such table: reviews
");
    }

    #[test]
    fn test_text_empty_results() {
        let mut sink = TextSink::new(Vec::new(), 25);
        let empty = ResultTable::empty(vec!["category".to_string(), "n".to_string()]);
        let series = Series::from_table(&empty, "category", "n").unwrap();

        sink.render_series(&Report::series("s", "Empty Chart", "SELECT 1", "category", "n"), &series)
            .unwrap();
        sink.render_table(&Report::table("t", "Empty Table", "SELECT 1"), &empty)
            .unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        insta::assert_snapshot!(out.trim_end(), @r"
== Empty Chart ==
(no data)

== Empty Table ==
(no rows)
");
    }

    #[test]
    fn test_json_document() {
        let mut sink = JsonSink::new(Vec::new(), "Yelp Data Analysis Dashboard");
        let (series_report, series) = categories();
        let (table_report, table) = cities();
        let (failed_report, error) = failed();

        sink.render_series(&series_report, &series).unwrap();
        sink.render_table(&table_report, &table).unwrap();
        sink.render_failure(&failed_report, &error).unwrap();
        sink.finish().unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();
        assert_eq!(doc["title"], "Yelp Data Analysis Dashboard");

        let reports = doc["reports"].as_array().unwrap();
        assert_eq!(reports.len(), 3);

        assert_eq!(reports[0]["id"], "category_business_counts");
        assert_eq!(reports[0]["kind"], "series");
        assert_eq!(reports[0]["status"], "ok");
        assert_eq!(reports[0]["series"]["points"][0]["key"], "Bars");
        assert_eq!(reports[0]["series"]["points"][0]["value"], 4.0);

        assert_eq!(reports[1]["kind"], "table");
        assert_eq!(reports[1]["table"]["columns"][0]["name"], "city");
        assert_eq!(reports[1]["table"]["rows"].as_array().unwrap().len(), 3);
        assert_eq!(reports[1]["table"]["rows"][0][1], 10);

        assert_eq!(reports[2]["status"], "error");
        assert_eq!(reports[2]["error_kind"], "query");
        assert_eq!(reports[2]["error"], "query error: no such table: reviews");
    }
}
