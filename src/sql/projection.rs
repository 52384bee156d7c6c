//! Static analysis of a query's output columns.
//!
//! Parses report SQL with `sqlparser` and reads the names produced by the
//! top-level SELECT list. Used to reject report definitions that reference
//! columns their own SQL cannot produce, before anything is executed.

use sqlparser::ast::{Expr, SelectItem, SetExpr, Statement};
use sqlparser::dialect::{SQLiteDialect, SnowflakeDialect};
use sqlparser::parser::Parser;

use super::dialect::Dialect;

/// Output column names of `sql`'s top-level SELECT, in order.
///
/// Returns `None` when the names cannot be determined statically: the SQL does
/// not parse for the dialect, is not a single query, selects a wildcard, or
/// projects an unaliased expression.
pub fn output_columns(sql: &str, dialect: Dialect) -> Option<Vec<String>> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Sqlite => Box::new(SQLiteDialect {}),
        Dialect::Snowflake => Box::new(SnowflakeDialect {}),
    };

    let statements = Parser::parse_sql(parser_dialect.as_ref(), sql).ok()?;
    let [Statement::Query(query)] = statements.as_slice() else {
        return None;
    };

    let mut body = query.body.as_ref();
    let select = loop {
        match body {
            SetExpr::Select(select) => break select,
            SetExpr::Query(inner) => body = inner.body.as_ref(),
            _ => return None,
        }
    };

    select
        .projection
        .iter()
        .map(|item| match item {
            SelectItem::ExprWithAlias { alias, .. } => Some(alias.value.clone()),
            SelectItem::UnnamedExpr(Expr::Identifier(ident)) => Some(ident.value.clone()),
            SelectItem::UnnamedExpr(Expr::CompoundIdentifier(parts)) => {
                parts.last().map(|ident| ident.value.clone())
            }
            _ => None,
        })
        .collect()
}
