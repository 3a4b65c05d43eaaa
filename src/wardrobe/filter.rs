use serde::Deserialize;
use serde_json::Value;
use time::macros::format_description;
use time::Date;

/// Catalog categories recognized by clients. Stored items are not forced
/// into this list; it is the vocabulary the UI offers.
pub const ITEM_TYPES: &[&str] = &[
    "Shirt",
    "Pants",
    "Jacket",
    "Shoes",
    "Dress",
    "Sweater",
    "Coat",
    "Shorts",
    "Skirt",
    "Accessory",
];

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    Cost,
    PurchaseDate,
}

impl SortKey {
    /// Unknown keys fall back to creation time instead of erroring.
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("cost") => SortKey::Cost,
            Some("purchaseDate") => SortKey::PurchaseDate,
            _ => SortKey::CreatedAt,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Cost => "cost",
            SortKey::PurchaseDate => "purchase_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(raw: Option<&str>) -> Self {
        if raw == Some("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Raw query string of `GET /wardrobe`, before any interpretation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub search: Option<String>,
    pub types: Option<String>,
    pub colors: Option<String>,
    pub sizes: Option<String>,
    pub min_cost: Option<String>,
    pub max_cost: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// One field per filter dimension; `None`/empty means unconstrained.
/// Filter groups combine with AND, the search fields with OR.
#[derive(Debug, Clone)]
pub struct ItemFilter {
    pub search: Option<String>,
    pub types: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub min_cost: Option<f64>,
    pub max_cost: Option<f64>,
    pub date_from: Option<Date>,
    pub date_to: Option<Date>,
    pub sort: SortKey,
    pub order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ItemFilter {
    fn default() -> Self {
        Self {
            search: None,
            types: Vec::new(),
            colors: Vec::new(),
            sizes: Vec::new(),
            min_cost: None,
            max_cost: None,
            date_from: None,
            date_to: None,
            sort: SortKey::CreatedAt,
            order: SortOrder::Desc,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl ItemFilter {
    /// Malformed numeric/date values are dropped rather than rejected;
    /// the listing endpoint is lenient by contract.
    pub fn from_params(p: ListParams) -> Self {
        Self {
            search: p
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            types: split_csv(p.types),
            colors: split_csv(p.colors),
            sizes: split_csv(p.sizes),
            min_cost: p.min_cost.as_deref().and_then(parse_f64),
            max_cost: p.max_cost.as_deref().and_then(parse_f64),
            date_from: p.date_from.as_deref().and_then(parse_date),
            date_to: p.date_to.as_deref().and_then(parse_date),
            sort: SortKey::parse(p.sort.as_deref()),
            order: SortOrder::parse(p.order.as_deref()),
            limit: p
                .limit
                .as_deref()
                .and_then(parse_i64)
                .unwrap_or(DEFAULT_LIMIT)
                .clamp(1, MAX_LIMIT),
            offset: p.offset.as_deref().and_then(parse_i64).unwrap_or(0).max(0),
        }
    }
}

fn split_csv(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_i64(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

pub fn parse_date(raw: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(raw.trim(), &format).ok()
}

/// Coercion policy for optional create fields: anything that does not read
/// as a finite, non-negative number becomes NULL instead of an error.
pub fn coerce_cost(raw: Option<&Value>) -> Option<f64> {
    let value = match raw? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Same policy for purchase dates: only `YYYY-MM-DD` strings survive.
pub fn coerce_purchase_date(raw: Option<&Value>) -> Option<Date> {
    match raw? {
        Value::String(s) => parse_date(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn defaults_when_no_params() {
        let f = ItemFilter::from_params(ListParams::default());
        assert_eq!(f.search, None);
        assert!(f.types.is_empty());
        assert_eq!(f.sort, SortKey::CreatedAt);
        assert_eq!(f.order, SortOrder::Desc);
        assert_eq!(f.limit, DEFAULT_LIMIT);
        assert_eq!(f.offset, 0);
    }

    #[test]
    fn csv_params_split_and_drop_empties() {
        let f = ItemFilter::from_params(ListParams {
            types: Some("Jacket,Coat,".into()),
            colors: Some(" Navy , ,Black".into()),
            sizes: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(f.types, vec!["Jacket", "Coat"]);
        assert_eq!(f.colors, vec!["Navy", "Black"]);
        assert!(f.sizes.is_empty());
    }

    #[test]
    fn limit_is_clamped_to_ceiling() {
        let f = ItemFilter::from_params(ListParams {
            limit: Some("200".into()),
            ..Default::default()
        });
        assert_eq!(f.limit, MAX_LIMIT);
    }

    #[test]
    fn malformed_numbers_and_offsets_fall_back() {
        let f = ItemFilter::from_params(ListParams {
            limit: Some("lots".into()),
            offset: Some("-3".into()),
            min_cost: Some("cheap".into()),
            max_cost: Some("99.5".into()),
            ..Default::default()
        });
        assert_eq!(f.limit, DEFAULT_LIMIT);
        assert_eq!(f.offset, 0);
        assert_eq!(f.min_cost, None);
        assert_eq!(f.max_cost, Some(99.5));
    }

    #[test]
    fn unknown_sort_falls_back_to_created_at() {
        let f = ItemFilter::from_params(ListParams {
            sort: Some("price".into()),
            order: Some("asc".into()),
            ..Default::default()
        });
        assert_eq!(f.sort, SortKey::CreatedAt);
        assert_eq!(f.order, SortOrder::Asc);
    }

    #[test]
    fn known_sort_keys_map_to_columns() {
        assert_eq!(SortKey::parse(Some("cost")).column(), "cost");
        assert_eq!(
            SortKey::parse(Some("purchaseDate")).column(),
            "purchase_date"
        );
        assert_eq!(SortKey::parse(Some("createdAt")).column(), "created_at");
    }

    #[test]
    fn date_bounds_parse_or_drop() {
        let f = ItemFilter::from_params(ListParams {
            date_from: Some("2023-05-01".into()),
            date_to: Some("last tuesday".into()),
            ..Default::default()
        });
        assert_eq!(f.date_from, Some(date!(2023 - 05 - 01)));
        assert_eq!(f.date_to, None);
    }

    #[test]
    fn blank_search_is_no_constraint() {
        let f = ItemFilter::from_params(ListParams {
            search: Some("   ".into()),
            ..Default::default()
        });
        assert_eq!(f.search, None);
    }

    #[test]
    fn cost_coercion_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_cost(Some(&json!(12.5))), Some(12.5));
        assert_eq!(coerce_cost(Some(&json!("89.99"))), Some(89.99));
        assert_eq!(coerce_cost(Some(&json!(0))), Some(0.0));
    }

    #[test]
    fn cost_coercion_nulls_out_junk() {
        assert_eq!(coerce_cost(None), None);
        assert_eq!(coerce_cost(Some(&json!("not a price"))), None);
        assert_eq!(coerce_cost(Some(&json!(-5))), None);
        assert_eq!(coerce_cost(Some(&json!(true))), None);
        assert_eq!(coerce_cost(Some(&json!(null))), None);
    }

    #[test]
    fn purchase_date_coercion() {
        assert_eq!(
            coerce_purchase_date(Some(&json!("2024-03-05"))),
            Some(date!(2024 - 03 - 05))
        );
        assert_eq!(coerce_purchase_date(Some(&json!("03/05/2024"))), None);
        assert_eq!(coerce_purchase_date(Some(&json!(20240305))), None);
        assert_eq!(coerce_purchase_date(None), None);
    }

    #[test]
    fn category_list_is_stable() {
        assert!(ITEM_TYPES.contains(&"Jacket"));
        assert_eq!(ITEM_TYPES.len(), 10);
    }
}
