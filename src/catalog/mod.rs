//! The report catalog.
//!
//! An ordered, immutable list of [`Report`] definitions. The Yelp dashboard
//! catalog is built per dialect from [`TableNames`]; arbitrary catalogs can be
//! assembled with [`ReportCatalog::new`], which enforces unique ids and
//! validates each definition.

mod queries;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::{DefinitionError, Report};
use crate::runner::ReportError;
use crate::source::DataSource;
use crate::sql::Dialect;

/// Row cap of the recent-reviews report.
pub const RECENT_REVIEWS_LIMIT: usize = 10_000;

/// Minimum review count for the average-rating report.
pub const POPULAR_MIN_REVIEWS: u32 = 100;

/// Plain or schema-qualified identifier, up to `db.schema.table`.
static TABLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*(\.[A-Za-z_][A-Za-z0-9_$]*){0,2}$").unwrap()
});

/// Physical names of the two source tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub businesses: String,
    pub reviews: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            businesses: "businesses".to_string(),
            reviews: "reviews".to_string(),
        }
    }
}

impl TableNames {
    pub fn new(businesses: impl Into<String>, reviews: impl Into<String>) -> Self {
        Self {
            businesses: businesses.into(),
            reviews: reviews.into(),
        }
    }

    /// Reject anything that is not a plain identifier path.
    ///
    /// Table names are spliced into SQL text, so only identifier characters
    /// and dots are allowed.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for name in [&self.businesses, &self.reviews] {
            if !TABLE_NAME.is_match(name) {
                return Err(DefinitionError::InvalidTableName(name.clone()));
            }
        }
        Ok(())
    }
}

/// Outcome of checking one report against a live source.
#[derive(Debug)]
pub struct CheckResult {
    pub report: String,
    /// Number of rows returned on success.
    pub outcome: Result<usize, ReportError>,
}

/// An ordered collection of report definitions.
#[derive(Debug, Clone)]
pub struct ReportCatalog {
    dialect: Dialect,
    reports: Vec<Report>,
}

impl ReportCatalog {
    /// Build a catalog from definitions, validating each one.
    pub fn new(dialect: Dialect, reports: Vec<Report>) -> Result<Self, DefinitionError> {
        let mut ids = HashSet::with_capacity(reports.len());
        for report in &reports {
            report.validate(dialect)?;
            if !ids.insert(report.id.as_str()) {
                return Err(DefinitionError::DuplicateId(report.id.clone()));
            }
        }
        Ok(Self { dialect, reports })
    }

    /// The ten Yelp dashboard reports, in display order.
    pub fn yelp(dialect: Dialect, tables: &TableNames) -> Result<Self, DefinitionError> {
        tables.validate()?;
        let reports = vec![
            Report::series(
                "category_business_counts",
                "Number of Businesses per Category",
                queries::category_business_counts(dialect, tables),
                "category",
                "no_of_businesses",
            ),
            Report::series(
                "top_restaurant_reviewers",
                "Top 10 Users Who Reviewed Most Restaurants",
                queries::top_restaurant_reviewers(dialect, tables),
                "user_id",
                "restaurants_reviewed",
            ),
            Report::series(
                "category_review_counts",
                "Most Popular Categories by Number of Reviews",
                queries::category_review_counts(dialect, tables),
                "category",
                "no_of_reviews",
            ),
            Report::table(
                "recent_reviews_per_business",
                "Top 3 Most Recent Reviews per Business",
                queries::recent_reviews_per_business(dialect, tables),
            )
            .with_row_limit(RECENT_REVIEWS_LIMIT),
            Report::series(
                "monthly_reviews",
                "Month with Most Reviews",
                queries::monthly_reviews(dialect, tables),
                "review_month",
                "no_of_reviews",
            ),
            Report::table(
                "five_star_share",
                "Percentage of 5-Star Reviews per Business",
                queries::five_star_share(dialect, tables),
            ),
            Report::table(
                "top_businesses_per_city",
                "Top 5 Reviewed Businesses per City",
                queries::top_businesses_per_city(dialect, tables),
            ),
            Report::table(
                "top_user_businesses",
                "Top 10 Users and Their Reviewed Businesses",
                queries::top_user_businesses(dialect, tables),
            ),
            Report::table(
                "avg_rating_popular",
                "Average Rating for Businesses with 100+ Reviews",
                queries::avg_rating_popular(dialect, tables),
            ),
            Report::series(
                "positive_sentiment_leaders",
                "Top 10 Businesses with Positive Sentiment",
                queries::positive_sentiment_leaders(dialect, tables),
                "name",
                "total_reviews",
            ),
        ];
        Self::new(dialect, reports)
    }

    /// Reports in declared order.
    pub fn list(&self) -> &[Report] {
        &self.reports
    }

    pub fn get(&self, id: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == id)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Keep only the given ids, preserving catalog order.
    pub fn select(&self, ids: &[String]) -> Result<Self, DefinitionError> {
        if let Some(unknown) = ids.iter().find(|id| self.get(id).is_none()) {
            return Err(DefinitionError::UnknownReport(unknown.clone()));
        }
        let reports = self
            .reports
            .iter()
            .filter(|r| ids.iter().any(|id| *id == r.id))
            .cloned()
            .collect();
        Ok(Self {
            dialect: self.dialect,
            reports,
        })
    }

    /// Run every report once and confirm its SQL returns the columns the
    /// definition references.
    ///
    /// Failures are collected per report; one failing report does not stop
    /// the check of the rest.
    pub fn self_test(&self, source: &dyn DataSource) -> Vec<CheckResult> {
        self.reports
            .iter()
            .map(|report| {
                debug!(report = %report.id, "checking report columns");
                let outcome = source
                    .execute(&report.sql)
                    .map_err(ReportError::from)
                    .and_then(|table| {
                        report
                            .check_columns(&table.column_names())
                            .map(|_| table.row_count())
                            .map_err(ReportError::from)
                    });
                match &outcome {
                    Ok(rows) => info!(report = %report.id, rows, "report check passed"),
                    Err(e) => warn!(report = %report.id, error = %e, "report check failed"),
                }
                CheckResult {
                    report: report.id.clone(),
                    outcome,
                }
            })
            .collect()
    }
}
