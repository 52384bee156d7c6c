//! SQL dialect definitions for report queries.
//!
//! Report SQL is authored once and rendered per target store. Each dialect
//! implements `SqlDialect` to supply the fragments that differ between stores:
//!
//! - Splitting a comma-separated list column into rows
//! - Case-insensitive substring matching
//! - Three-letter month names from a date
//! - Top-N per partition (`QUALIFY` vs. a ranked subquery)
//!
//! | Feature | Snowflake | SQLite |
//! |---------|-----------|--------|
//! | List split | `LATERAL SPLIT_TO_TABLE` | recursive CTE |
//! | Case-insensitive match | `ILIKE` | `LOWER(..) LIKE` |
//! | Month name | `TO_CHAR(d, 'Mon')` | `STRFTIME('%m')` lookup |
//! | QUALIFY | ✓ | ❌ |
//! | Window functions | ✓ | 3.25+ |

pub mod helpers;
mod snowflake;
mod sqlite;

pub use snowflake::Snowflake;
pub use sqlite::Sqlite;

use serde::{Deserialize, Serialize};

/// A comma-separated list column to expand into one row per item.
#[derive(Debug, Clone, Copy)]
pub struct ListSplit<'a> {
    /// Name of the CTE to define.
    pub cte: &'a str,
    /// Source table.
    pub table: &'a str,
    /// Key column carried through to every produced row.
    pub key: &'a str,
    /// Column holding the comma-separated list.
    pub list: &'a str,
    /// Output column name for the trimmed item.
    pub item: &'a str,
}

/// A top-N-per-partition selection over a named relation.
#[derive(Debug, Clone, Copy)]
pub struct TopPerGroup<'a> {
    /// Relation (table or CTE) to select from.
    pub source: &'a str,
    /// Output column list.
    pub columns: &'a str,
    pub partition_by: &'a str,
    pub order_by: &'a str,
    /// Rows kept per partition (`<= n`).
    pub n: u32,
}

/// SQL dialect trait - defines how dialect-specific report fragments render.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote a string literal.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Keyword that opens a WITH clause containing a list split.
    ///
    /// Dialects that split lists with a recursive CTE need `WITH RECURSIVE`.
    fn with_keyword(&self) -> &'static str {
        "WITH"
    }

    /// Define a CTE named `split.cte` with columns `(split.key, split.item)`.
    ///
    /// Items are trimmed. Empty items may be produced and are expected to be
    /// filtered by the caller with `item <> ''`.
    fn split_list_cte(&self, split: &ListSplit<'_>) -> String;

    /// Case-insensitive "expr contains needle" predicate.
    fn contains_ignore_case(&self, expr: &str, needle: &str) -> String;

    /// Three-letter English month name (`Jan`..`Dec`) of a date expression.
    fn month_abbrev(&self, date_expr: &str) -> String;

    /// Whether this dialect supports QUALIFY clause for window filtering.
    fn supports_qualify(&self) -> bool {
        false
    }

    /// Select the first `n` rows per partition of `top.source`.
    fn top_per_group(&self, top: &TopPerGroup<'_>) -> String {
        if self.supports_qualify() {
            format!(
                "SELECT {cols}\n    FROM {src}\n    QUALIFY ROW_NUMBER() OVER (PARTITION BY {part} ORDER BY {ord}) <= {n}",
                cols = top.columns,
                src = top.source,
                part = top.partition_by,
                ord = top.order_by,
                n = top.n,
            )
        } else {
            format!(
                "SELECT {cols}\n    FROM (\n        SELECT *, ROW_NUMBER() OVER (PARTITION BY {part} ORDER BY {ord}) AS rn\n        FROM {src}\n    ) ranked\n    WHERE rn <= {n}",
                cols = top.columns,
                src = top.source,
                part = top.partition_by,
                ord = top.order_by,
                n = top.n,
            )
        }
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Sqlite,
    Snowflake,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Sqlite => &Sqlite,
            Dialect::Snowflake => &Snowflake,
        }
    }

    /// Parse a dialect name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Some(Dialect::Sqlite),
            "snowflake" => Some(Dialect::Snowflake),
            _ => None,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn with_keyword(&self) -> &'static str {
        self.dialect().with_keyword()
    }

    fn split_list_cte(&self, split: &ListSplit<'_>) -> String {
        self.dialect().split_list_cte(split)
    }

    fn contains_ignore_case(&self, expr: &str, needle: &str) -> String {
        self.dialect().contains_ignore_case(expr, needle)
    }

    fn month_abbrev(&self, date_expr: &str) -> String {
        self.dialect().month_abbrev(date_expr)
    }

    fn supports_qualify(&self) -> bool {
        self.dialect().supports_qualify()
    }

    fn top_per_group(&self, top: &TopPerGroup<'_>) -> String {
        self.dialect().top_per_group(top)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
