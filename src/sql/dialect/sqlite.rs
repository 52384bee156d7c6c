//! SQLite SQL dialect.
//!
//! SQLite has no table-valued split function, no ILIKE, no TO_CHAR and no
//! QUALIFY. Lists are expanded with a recursive CTE that peels one item per
//! step; month names come from a fixed lookup string indexed by `%m`.

use super::helpers;
use super::{ListSplit, SqlDialect};

const MONTH_NAMES: &str = "JanFebMarAprMayJunJulAugSepOctNovDec";

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn with_keyword(&self) -> &'static str {
        "WITH RECURSIVE"
    }

    // The anchor row carries an empty item and the whole list plus a
    // trailing comma; each step moves one item out of `rest`.
    fn split_list_cte(&self, split: &ListSplit<'_>) -> String {
        format!(
            "{cte}({key}, {item}, rest) AS (\n        SELECT {key}, '', {list} || ','\n        FROM {table}\n        UNION ALL\n        SELECT {key},\n               TRIM(SUBSTR(rest, 1, INSTR(rest, ',') - 1)),\n               SUBSTR(rest, INSTR(rest, ',') + 1)\n        FROM {cte}\n        WHERE rest <> ''\n    )",
            cte = split.cte,
            key = split.key,
            item = split.item,
            table = split.table,
            list = split.list,
        )
    }

    fn contains_ignore_case(&self, expr: &str, needle: &str) -> String {
        format!(
            "LOWER({}) LIKE {}",
            expr,
            helpers::like_contains_pattern(&needle.to_lowercase())
        )
    }

    fn month_abbrev(&self, date_expr: &str) -> String {
        format!(
            "SUBSTR('{}', (CAST(STRFTIME('%m', {}) AS INTEGER) - 1) * 3 + 1, 3)",
            MONTH_NAMES, date_expr
        )
    }
}
