use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::repo::WardrobeItem;

/// Request body for the add-item flow. `cost` and `purchaseDate` arrive in
/// whatever shape the client sent; coercion happens in the handler, not here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub cost: Option<Value>,
    pub purchase_date: Option<Value>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
}

/// Item as rendered to clients. `purchaseDate` is a calendar date, never a
/// timestamp.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub cost: Option<f64>,
    pub purchase_date: Option<Date>,
    pub notes: Option<String>,
    pub image_url: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<WardrobeItem> for ItemResponse {
    fn from(item: WardrobeItem) -> Self {
        Self {
            id: item.id,
            user_id: item.user_id,
            name: item.name,
            brand: item.brand,
            item_type: item.item_type,
            size: item.size,
            color: item.color,
            cost: item.cost,
            purchase_date: item.purchase_date,
            notes: item.notes,
            image_url: item.image_url,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// `totalCount` covers the whole filtered set, not just this page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub items: Vec<ItemResponse>,
    pub total_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn sample(purchase_date: Option<Date>) -> ItemResponse {
        ItemResponse {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Blue jacket".into(),
            brand: None,
            item_type: "Jacket".into(),
            size: Some("M".into()),
            color: Some("Blue".into()),
            cost: Some(120.0),
            purchase_date,
            notes: None,
            image_url: "https://x/y.jpg".into(),
            created_at: datetime!(2024-03-05 12:00 UTC),
            updated_at: datetime!(2024-03-05 12:00 UTC),
        }
    }

    #[test]
    fn purchase_date_renders_as_calendar_date() {
        let json = serde_json::to_string(&sample(Some(date!(2024 - 03 - 05)))).unwrap();
        assert!(json.contains(r#""purchaseDate":"2024-03-05""#));
    }

    #[test]
    fn missing_purchase_date_renders_null() {
        let json = serde_json::to_string(&sample(None)).unwrap();
        assert!(json.contains(r#""purchaseDate":null"#));
    }

    #[test]
    fn field_names_are_camel_case() {
        let json = serde_json::to_string(&sample(None)).unwrap();
        assert!(json.contains(r#""imageUrl""#));
        assert!(json.contains(r#""userId""#));
        assert!(json.contains(r#""type":"Jacket""#));
        assert!(!json.contains("image_url"));
    }

    #[test]
    fn create_request_takes_loose_cost_shapes() {
        let req: CreateItemRequest = serde_json::from_value(serde_json::json!({
            "name": "Coat",
            "type": "Coat",
            "imageUrl": "/uploads/a.jpg",
            "cost": "45.50",
            "purchaseDate": 12345
        }))
        .unwrap();
        assert_eq!(req.cost, Some(Value::String("45.50".into())));
        assert!(req.purchase_date.is_some());
    }
}
