use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateRealtyPostParams, NewBedroom, NewImage, RealtyRepo, RealtyWriteRepo, RepoError,
    UpdateRealtyPostParams,
};
use crate::domain::entities::{BedroomRecord, PostImageRecord, RealtyPostRecord};
use crate::domain::types::{ListingKind, PricePeriod, RealtyCategory};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(Debug, FromRow)]
struct RealtyPostRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    price_cents: i64,
    price_period: PricePeriod,
    location: String,
    kind: ListingKind,
    category: RealtyCategory,
    living_room_sqm: Option<f64>,
    kitchen_sqm: Option<f64>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
struct ImageRow {
    id: Uuid,
    post_id: Uuid,
    url: String,
    display_order: i32,
    created_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
struct BedroomRow {
    id: Uuid,
    post_id: Uuid,
    name: String,
    sqm: f64,
    position: i32,
}

struct Children {
    images: HashMap<Uuid, Vec<PostImageRecord>>,
    bedrooms: HashMap<Uuid, Vec<BedroomRecord>>,
}

fn record_from(row: RealtyPostRow, children: &mut Children) -> RealtyPostRecord {
    RealtyPostRecord {
        images: children.images.remove(&row.id).unwrap_or_default(),
        bedrooms: children.bedrooms.remove(&row.id).unwrap_or_default(),
        id: row.id,
        title: row.title,
        description: row.description,
        price_cents: row.price_cents,
        price_period: row.price_period,
        location: row.location,
        kind: row.kind,
        category: row.category,
        living_room_sqm: row.living_room_sqm,
        kitchen_sqm: row.kitchen_sqm,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

impl PostgresRepositories {
    async fn realty_children_for(&self, post_ids: &[Uuid]) -> Result<Children, RepoError> {
        let mut children = Children {
            images: HashMap::new(),
            bedrooms: HashMap::new(),
        };
        if post_ids.is_empty() {
            return Ok(children);
        }

        let image_rows = sqlx::query_as::<_, ImageRow>(
            "SELECT id, post_id, url, display_order, created_at \
             FROM realty_images WHERE post_id = ANY($1) \
             ORDER BY display_order ASC, id ASC",
        )
        .bind(post_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        for row in image_rows {
            children
                .images
                .entry(row.post_id)
                .or_default()
                .push(PostImageRecord {
                    id: row.id,
                    url: row.url,
                    display_order: row.display_order,
                    created_at: row.created_at,
                });
        }

        let bedroom_rows = sqlx::query_as::<_, BedroomRow>(
            "SELECT id, post_id, name, sqm, position \
             FROM bedrooms WHERE post_id = ANY($1) \
             ORDER BY position ASC, id ASC",
        )
        .bind(post_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        for row in bedroom_rows {
            children
                .bedrooms
                .entry(row.post_id)
                .or_default()
                .push(BedroomRecord {
                    id: row.id,
                    name: row.name,
                    sqm: row.sqm,
                    position: row.position,
                });
        }

        Ok(children)
    }
}

const REALTY_COLUMNS: &str = "id, title, description, price_cents, price_period, location, \
                              kind, category, living_room_sqm, kitchen_sqm, created_at, updated_at";

#[async_trait]
impl RealtyRepo for PostgresRepositories {
    async fn list_posts(&self) -> Result<Vec<RealtyPostRecord>, RepoError> {
        let rows = sqlx::query_as::<_, RealtyPostRow>(&format!(
            "SELECT {REALTY_COLUMNS} FROM realty_posts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut children = self.realty_children_for(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| record_from(row, &mut children))
            .collect())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<RealtyPostRecord>, RepoError> {
        let row = sqlx::query_as::<_, RealtyPostRow>(&format!(
            "SELECT {REALTY_COLUMNS} FROM realty_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut children = self.realty_children_for(&[row.id]).await?;
        Ok(Some(record_from(row, &mut children)))
    }
}

async fn insert_children(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    post_id: Uuid,
    images: &[NewImage],
    bedrooms: &[NewBedroom],
    now: OffsetDateTime,
) -> Result<(), sqlx::Error> {
    for image in images {
        sqlx::query(
            "INSERT INTO realty_images (id, post_id, url, display_order, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(&image.url)
        .bind(image.display_order)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    for bedroom in bedrooms {
        sqlx::query(
            "INSERT INTO bedrooms (id, post_id, name, sqm, position) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(&bedroom.name)
        .bind(bedroom.sqm)
        .bind(bedroom.position)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl RealtyWriteRepo for PostgresRepositories {
    async fn create_post(
        &self,
        params: CreateRealtyPostParams,
    ) -> Result<RealtyPostRecord, RepoError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, RealtyPostRow>(&format!(
            "INSERT INTO realty_posts \
             (id, title, description, price_cents, price_period, location, kind, category, \
              living_room_sqm, kitchen_sqm, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11) \
             RETURNING {REALTY_COLUMNS}"
        ))
        .bind(id)
        .bind(&params.title)
        .bind(&params.description)
        .bind(params.price_cents)
        .bind(params.price_period)
        .bind(&params.location)
        .bind(params.kind)
        .bind(params.category)
        .bind(params.living_room_sqm)
        .bind(params.kitchen_sqm)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        insert_children(&mut tx, id, &params.images, &params.bedrooms, now)
            .await
            .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;

        let mut children = self.realty_children_for(&[id]).await?;
        Ok(record_from(row, &mut children))
    }

    async fn update_post(
        &self,
        params: UpdateRealtyPostParams,
    ) -> Result<RealtyPostRecord, RepoError> {
        let now = OffsetDateTime::now_utc();

        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, RealtyPostRow>(&format!(
            "UPDATE realty_posts \
             SET title = $2, description = $3, price_cents = $4, price_period = $5, \
                 location = $6, kind = $7, category = $8, living_room_sqm = $9, \
                 kitchen_sqm = $10, updated_at = $11 \
             WHERE id = $1 \
             RETURNING {REALTY_COLUMNS}"
        ))
        .bind(params.id)
        .bind(&params.title)
        .bind(&params.description)
        .bind(params.price_cents)
        .bind(params.price_period)
        .bind(&params.location)
        .bind(params.kind)
        .bind(params.category)
        .bind(params.living_room_sqm)
        .bind(params.kitchen_sqm)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        sqlx::query("DELETE FROM realty_images WHERE post_id = $1")
            .bind(params.id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        sqlx::query("DELETE FROM bedrooms WHERE post_id = $1")
            .bind(params.id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        insert_children(&mut tx, params.id, &params.images, &params.bedrooms, now)
            .await
            .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;

        let mut children = self.realty_children_for(&[params.id]).await?;
        Ok(record_from(row, &mut children))
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM realty_posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
