//! Snowflake SQL dialect.
//!
//! Snowflake features used by reports:
//! - `LATERAL SPLIT_TO_TABLE` for list expansion
//! - `ILIKE` for case-insensitive matching
//! - `TO_CHAR` date formatting
//! - Native QUALIFY clause

use super::helpers;
use super::{ListSplit, SqlDialect};

/// Snowflake SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Snowflake;

impl SqlDialect for Snowflake {
    fn name(&self) -> &'static str {
        "snowflake"
    }

    fn split_list_cte(&self, split: &ListSplit<'_>) -> String {
        format!(
            "{cte} AS (\n        SELECT {key}, TRIM(parts.value) AS {item}\n        FROM {table},\n        LATERAL SPLIT_TO_TABLE({list}, ',') AS parts\n    )",
            cte = split.cte,
            key = split.key,
            item = split.item,
            table = split.table,
            list = split.list,
        )
    }

    fn contains_ignore_case(&self, expr: &str, needle: &str) -> String {
        format!("{} ILIKE {}", expr, helpers::like_contains_pattern(needle))
    }

    fn month_abbrev(&self, date_expr: &str) -> String {
        format!("TO_CHAR({}, 'Mon')", date_expr)
    }

    fn supports_qualify(&self) -> bool {
        true
    }
}
