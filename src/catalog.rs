//! Composable product filter: typed clauses folded into one boxed Diesel
//! query, conjunctive, parameterized.

use bigdecimal::BigDecimal;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::Deserialize;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::schema::products;

/// Raw query string as the client sends it. Parsing into [`ProductFilter`]
/// is lenient: malformed values disable the clause instead of failing the
/// whole request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CatalogParams {
    pub category: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Insertion order, the storefront's default listing.
    #[default]
    Oldest,
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortKey {
    /// Unknown sort keys fall back to the default order.
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("price_asc") => SortKey::PriceAsc,
            Some("price_desc") => SortKey::PriceDesc,
            Some("newest") => SortKey::Newest,
            _ => SortKey::Oldest,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_price: Option<BigDecimal>,
    pub max_price: Option<BigDecimal>,
    pub search: Option<String>,
    pub sort: SortKey,
}

fn parse_price(raw: Option<&String>) -> Option<BigDecimal> {
    raw.and_then(|s| BigDecimal::from_str(s.trim()).ok())
}

/// Escape LIKE metacharacters so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl ProductFilter {
    pub fn from_params(params: &CatalogParams) -> Self {
        let category = params
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != "All")
            .map(str::to_string);
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Self {
            category,
            min_price: parse_price(params.min_price.as_ref()),
            max_price: parse_price(params.max_price.as_ref()),
            search,
            sort: SortKey::parse(params.sort.as_deref()),
        }
    }

    /// Fold all active clauses into one boxed query against `products`.
    pub fn into_query(self) -> products::BoxedQuery<'static, Pg> {
        let mut query = products::table.into_boxed();

        if let Some(category) = self.category {
            query = query.filter(products::category.eq(category));
        }
        if let Some(min) = self.min_price {
            query = query.filter(products::price.ge(min));
        }
        if let Some(max) = self.max_price {
            query = query.filter(products::price.le(max));
        }
        if let Some(term) = self.search {
            let pattern = format!("%{}%", escape_like(&term));
            query = query.filter(
                products::name
                    .ilike(pattern.clone())
                    .or(products::description.ilike(pattern)),
            );
        }

        match self.sort {
            SortKey::Oldest => query.order((products::created_at.asc(), products::id.asc())),
            SortKey::Newest => query.order((products::created_at.desc(), products::id.desc())),
            SortKey::PriceAsc => query.order((products::price.asc(), products::id.asc())),
            SortKey::PriceDesc => query.order((products::price.desc(), products::id.asc())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(
        category: Option<&str>,
        min: Option<&str>,
        max: Option<&str>,
        search: Option<&str>,
        sort: Option<&str>,
    ) -> CatalogParams {
        CatalogParams {
            category: category.map(str::to_string),
            min_price: min.map(str::to_string),
            max_price: max.map(str::to_string),
            search: search.map(str::to_string),
            sort: sort.map(str::to_string),
        }
    }

    #[test]
    fn absent_params_disable_every_clause() {
        let filter = ProductFilter::from_params(&CatalogParams::default());
        assert!(filter.category.is_none());
        assert!(filter.min_price.is_none());
        assert!(filter.max_price.is_none());
        assert!(filter.search.is_none());
        assert_eq!(filter.sort, SortKey::Oldest);
    }

    #[test]
    fn all_is_the_same_as_no_category() {
        let filter = ProductFilter::from_params(&params(Some("All"), None, None, None, None));
        assert!(filter.category.is_none());

        let filter =
            ProductFilter::from_params(&params(Some("Electronics"), None, None, None, None));
        assert_eq!(filter.category.as_deref(), Some("Electronics"));
    }

    #[test]
    fn malformed_price_bound_is_treated_as_absent() {
        let filter =
            ProductFilter::from_params(&params(None, Some("abc"), Some("100"), None, None));
        assert!(filter.min_price.is_none());
        assert_eq!(filter.max_price, BigDecimal::from_str("100").ok());
    }

    #[test]
    fn price_bounds_parse_inclusive_decimals() {
        let filter =
            ProductFilter::from_params(&params(None, Some("50"), Some("99.99"), None, None));
        assert_eq!(filter.min_price, BigDecimal::from_str("50").ok());
        assert_eq!(filter.max_price, BigDecimal::from_str("99.99").ok());
    }

    #[test]
    fn unknown_sort_falls_back_to_default() {
        assert_eq!(SortKey::parse(Some("price_asc")), SortKey::PriceAsc);
        assert_eq!(SortKey::parse(Some("price_desc")), SortKey::PriceDesc);
        assert_eq!(SortKey::parse(Some("newest")), SortKey::Newest);
        assert_eq!(SortKey::parse(Some("by_rating")), SortKey::Oldest);
        assert_eq!(SortKey::parse(None), SortKey::Oldest);
    }

    #[test]
    fn blank_search_is_ignored() {
        let filter = ProductFilter::from_params(&params(None, None, None, Some("   "), None));
        assert!(filter.search.is_none());
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("100%_wool"), "100\\%\\_wool");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
