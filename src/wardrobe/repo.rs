use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::filter::ItemFilter;

const ITEM_COLUMNS: &str = "id, user_id, name, brand, type, size, color, cost, \
                            purchase_date, notes, image_url, created_at, updated_at";

/// Catalog entry as stored.
#[derive(Debug, Clone, FromRow)]
pub struct WardrobeItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    #[sqlx(rename = "type")]
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

/// Fields accepted by the add-item flow, already validated and coerced.
#[derive(Debug)]
pub struct NewItem {
    pub name: String,
    pub brand: Option<String>,
    pub item_type: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub cost: Option<f64>,
    pub purchase_date: Option<Date>,
    pub notes: Option<String>,
    pub image_url: String,
}

/// Appends the WHERE clause for a filter set. The owner predicate is
/// unconditional; every other clause is attached only when its dimension is
/// constrained. NULL costs and purchase dates never satisfy a bound.
fn push_filters(qb: &mut QueryBuilder<Postgres>, user_id: Uuid, filter: &ItemFilter) {
    qb.push(" WHERE user_id = ");
    qb.push_bind(user_id);

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR brand ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR notes ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    if !filter.types.is_empty() {
        qb.push(" AND type = ANY(");
        qb.push_bind(filter.types.clone());
        qb.push(")");
    }
    if !filter.colors.is_empty() {
        qb.push(" AND color = ANY(");
        qb.push_bind(filter.colors.clone());
        qb.push(")");
    }
    if !filter.sizes.is_empty() {
        qb.push(" AND size = ANY(");
        qb.push_bind(filter.sizes.clone());
        qb.push(")");
    }
    if let Some(min) = filter.min_cost {
        qb.push(" AND cost >= ");
        qb.push_bind(min);
    }
    if let Some(max) = filter.max_cost {
        qb.push(" AND cost <= ");
        qb.push_bind(max);
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND purchase_date >= ");
        qb.push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND purchase_date <= ");
        qb.push_bind(to);
    }
}

/// Sort column plus an id tie-break so page scans are stable.
fn order_clause(filter: &ItemFilter) -> String {
    format!(
        " ORDER BY {col} {dir}, id {dir}",
        col = filter.sort.column(),
        dir = filter.order.sql()
    )
}

/// Returns the requested page and the total count for the same filter set
/// ignoring pagination.
pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    filter: &ItemFilter,
) -> anyhow::Result<(Vec<WardrobeItem>, i64)> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM wardrobe_items", ITEM_COLUMNS));
    push_filters(&mut qb, user_id, filter);
    qb.push(order_clause(filter));
    qb.push(" LIMIT ");
    qb.push_bind(filter.limit);
    qb.push(" OFFSET ");
    qb.push_bind(filter.offset);

    let items = qb
        .build_query_as::<WardrobeItem>()
        .fetch_all(db)
        .await?;

    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM wardrobe_items");
    push_filters(&mut count_qb, user_id, filter);
    let (total_count,): (i64,) = count_qb.build_query_as().fetch_one(db).await?;

    Ok((items, total_count))
}

/// Missing and foreign-owned look the same from here.
pub async fn get(db: &PgPool, user_id: Uuid, item_id: Uuid) -> anyhow::Result<Option<WardrobeItem>> {
    let item = sqlx::query_as::<_, WardrobeItem>(&format!(
        r#"
        SELECT {}
        FROM wardrobe_items
        WHERE id = $1 AND user_id = $2
        "#,
        ITEM_COLUMNS
    ))
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(item)
}

pub async fn create(db: &PgPool, user_id: Uuid, item: NewItem) -> anyhow::Result<WardrobeItem> {
    let created = sqlx::query_as::<_, WardrobeItem>(&format!(
        r#"
        INSERT INTO wardrobe_items
            (user_id, name, brand, type, size, color, cost, purchase_date, notes, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {}
        "#,
        ITEM_COLUMNS
    ))
    .bind(user_id)
    .bind(&item.name)
    .bind(&item.brand)
    .bind(&item.item_type)
    .bind(&item.size)
    .bind(&item.color)
    .bind(item.cost)
    .bind(item.purchase_date)
    .bind(&item.notes)
    .bind(&item.image_url)
    .fetch_one(db)
    .await?;
    Ok(created)
}

/// Deletes at most one row; unknown or foreign ids are a no-op.
pub async fn delete(db: &PgPool, user_id: Uuid, item_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM wardrobe_items WHERE id = $1 AND user_id = $2"#)
        .bind(item_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}
