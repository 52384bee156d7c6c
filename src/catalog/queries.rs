//! SQL text for the Yelp dashboard reports.
//!
//! Each function renders one report's query for a dialect. Dialect-specific
//! fragments come from [`SqlDialect`]; everything else is shared. Every
//! ORDER BY ends in a unique key so repeated runs return identical rows.

use super::TableNames;
use crate::sql::{Dialect, ListSplit, SqlDialect, TopPerGroup};

/// Category CTE name shared by the category reports.
const CATEGORY_CTE: &str = "business_categories";

fn category_split(dialect: Dialect, tables: &TableNames) -> String {
    dialect.split_list_cte(&ListSplit {
        cte: CATEGORY_CTE,
        table: &tables.businesses,
        key: "business_id",
        list: "categories",
        item: "category",
    })
}

pub(super) fn category_business_counts(dialect: Dialect, tables: &TableNames) -> String {
    format!(
        "{with} {split}
    SELECT category, COUNT(*) AS no_of_businesses
    FROM {cte}
    WHERE category <> ''
    GROUP BY category
    ORDER BY no_of_businesses DESC, category
    LIMIT 20",
        with = dialect.with_keyword(),
        split = category_split(dialect, tables),
        cte = CATEGORY_CTE,
    )
}

pub(super) fn top_restaurant_reviewers(dialect: Dialect, tables: &TableNames) -> String {
    format!(
        "SELECT r.user_id, COUNT(DISTINCT r.business_id) AS restaurants_reviewed
    FROM {reviews} r
    JOIN {businesses} b ON r.business_id = b.business_id
    WHERE {restaurant}
    GROUP BY r.user_id
    ORDER BY restaurants_reviewed DESC, r.user_id
    LIMIT 10",
        reviews = tables.reviews,
        businesses = tables.businesses,
        restaurant = dialect.contains_ignore_case("b.categories", "restaurant"),
    )
}

pub(super) fn category_review_counts(dialect: Dialect, tables: &TableNames) -> String {
    format!(
        "{with} {split}
    SELECT bc.category, COUNT(*) AS no_of_reviews
    FROM {cte} bc
    JOIN {reviews} r ON bc.business_id = r.business_id
    WHERE bc.category <> ''
    GROUP BY bc.category
    ORDER BY no_of_reviews DESC, bc.category
    LIMIT 20",
        with = dialect.with_keyword(),
        split = category_split(dialect, tables),
        cte = CATEGORY_CTE,
        reviews = tables.reviews,
    )
}

pub(super) fn recent_reviews_per_business(_dialect: Dialect, tables: &TableNames) -> String {
    format!(
        "WITH ranked AS (
        SELECT r.*, b.name,
               ROW_NUMBER() OVER (PARTITION BY r.business_id ORDER BY r.review_date DESC, r.user_id) AS rn
        FROM {reviews} r
        JOIN {businesses} b ON r.business_id = b.business_id
    )
    SELECT * FROM ranked
    WHERE rn <= 3
    ORDER BY business_id, rn
    LIMIT {limit}",
        reviews = tables.reviews,
        businesses = tables.businesses,
        limit = super::RECENT_REVIEWS_LIMIT,
    )
}

// Dates the store cannot parse yield no month and are left out.
pub(super) fn monthly_reviews(dialect: Dialect, tables: &TableNames) -> String {
    format!(
        "SELECT {month} AS review_month, COUNT(*) AS no_of_reviews
    FROM {reviews}
    WHERE {month} IS NOT NULL
    GROUP BY 1
    ORDER BY no_of_reviews DESC, review_month",
        month = dialect.month_abbrev("review_date"),
        reviews = tables.reviews,
    )
}

pub(super) fn five_star_share(_dialect: Dialect, tables: &TableNames) -> String {
    format!(
        "SELECT b.business_id, b.name,
           COUNT(*) AS total_reviews,
           COUNT(CASE WHEN r.review_stars = 5 THEN 1 END) AS star_5_reviews,
           ROUND(COUNT(CASE WHEN r.review_stars = 5 THEN 1 END) * 100.0 / COUNT(*), 2) AS percent_5_star
    FROM {reviews} r
    JOIN {businesses} b ON r.business_id = b.business_id
    GROUP BY b.business_id, b.name
    ORDER BY percent_5_star DESC, total_reviews DESC, b.business_id
    LIMIT 20",
        reviews = tables.reviews,
        businesses = tables.businesses,
    )
}

pub(super) fn top_businesses_per_city(dialect: Dialect, tables: &TableNames) -> String {
    let top = dialect.top_per_group(&TopPerGroup {
        source: "business_reviews",
        columns: "city, business_id, name, total_reviews",
        partition_by: "city",
        order_by: "total_reviews DESC, business_id",
        n: 5,
    });
    format!(
        "WITH business_reviews AS (
        SELECT b.city, b.business_id, b.name, COUNT(*) AS total_reviews
        FROM {reviews} r
        JOIN {businesses} b ON r.business_id = b.business_id
        GROUP BY b.city, b.business_id, b.name
    )
    {top}
    ORDER BY city, total_reviews DESC, business_id",
        reviews = tables.reviews,
        businesses = tables.businesses,
    )
}

pub(super) fn top_user_businesses(_dialect: Dialect, tables: &TableNames) -> String {
    format!(
        "WITH top_users AS (
        SELECT r.user_id, COUNT(*) AS total_reviews
        FROM {reviews} r
        JOIN {businesses} b ON r.business_id = b.business_id
        GROUP BY r.user_id
        ORDER BY total_reviews DESC, r.user_id
        LIMIT 10
    )
    SELECT user_id, business_id
    FROM {reviews}
    WHERE user_id IN (SELECT user_id FROM top_users)
    GROUP BY user_id, business_id
    ORDER BY user_id, business_id",
        reviews = tables.reviews,
        businesses = tables.businesses,
    )
}

pub(super) fn avg_rating_popular(_dialect: Dialect, tables: &TableNames) -> String {
    format!(
        "SELECT b.business_id, b.name, COUNT(*) AS total_reviews,
           ROUND(AVG(r.review_stars), 2) AS avg_rating
    FROM {reviews} r
    JOIN {businesses} b ON r.business_id = b.business_id
    GROUP BY b.business_id, b.name
    HAVING COUNT(*) >= {min}
    ORDER BY avg_rating DESC, b.business_id",
        reviews = tables.reviews,
        businesses = tables.businesses,
        min = super::POPULAR_MIN_REVIEWS,
    )
}

pub(super) fn positive_sentiment_leaders(dialect: Dialect, tables: &TableNames) -> String {
    format!(
        "SELECT b.business_id, b.name, COUNT(*) AS total_reviews
    FROM {reviews} r
    JOIN {businesses} b ON r.business_id = b.business_id
    WHERE r.sentiments = {positive}
    GROUP BY b.business_id, b.name
    ORDER BY total_reviews DESC, b.business_id
    LIMIT 10",
        reviews = tables.reviews,
        businesses = tables.businesses,
        positive = dialect.quote_string("Positive"),
    )
}
