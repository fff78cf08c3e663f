use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateGalleryPostParams, GalleryRepo, GalleryWriteRepo, NewImage, RepoError,
    UpdateGalleryPostParams,
};
use crate::domain::entities::{GalleryPostRecord, PostImageRecord};
use crate::domain::types::GalleryCategory;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(Debug, FromRow)]
struct GalleryPostRow {
    id: Uuid,
    title: String,
    description: String,
    category: GalleryCategory,
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

impl ImageRow {
    fn into_record(self) -> PostImageRecord {
        PostImageRecord {
            id: self.id,
            url: self.url,
            display_order: self.display_order,
            created_at: self.created_at,
        }
    }
}

fn record_from(row: GalleryPostRow, images: Vec<PostImageRecord>) -> GalleryPostRecord {
    GalleryPostRecord {
        id: row.id,
        title: row.title,
        description: row.description,
        category: row.category,
        images,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn assemble(
    rows: Vec<GalleryPostRow>,
    mut images: HashMap<Uuid, Vec<PostImageRecord>>,
) -> Vec<GalleryPostRecord> {
    rows.into_iter()
        .map(|row| {
            let post_images = images.remove(&row.id).unwrap_or_default();
            record_from(row, post_images)
        })
        .collect()
}

impl PostgresRepositories {
    async fn gallery_images_for(
        &self,
        post_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<PostImageRecord>>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, ImageRow>(
            "SELECT id, post_id, url, display_order, created_at \
             FROM gallery_images WHERE post_id = ANY($1) \
             ORDER BY display_order ASC, id ASC",
        )
        .bind(post_ids)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut grouped: HashMap<Uuid, Vec<PostImageRecord>> = HashMap::new();
        for row in rows {
            grouped.entry(row.post_id).or_default().push(row.into_record());
        }
        Ok(grouped)
    }
}

#[async_trait]
impl GalleryRepo for PostgresRepositories {
    async fn list_posts(&self) -> Result<Vec<GalleryPostRecord>, RepoError> {
        let rows = sqlx::query_as::<_, GalleryPostRow>(
            "SELECT id, title, description, category, created_at, updated_at \
             FROM gallery_posts ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let images = self.gallery_images_for(&ids).await?;
        Ok(assemble(rows, images))
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<GalleryPostRecord>, RepoError> {
        let row = sqlx::query_as::<_, GalleryPostRow>(
            "SELECT id, title, description, category, created_at, updated_at \
             FROM gallery_posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut images = self.gallery_images_for(&[row.id]).await?;
        let post_images = images.remove(&row.id).unwrap_or_default();
        Ok(Some(record_from(row, post_images)))
    }
}

async fn insert_images(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    post_id: Uuid,
    images: &[NewImage],
    now: OffsetDateTime,
) -> Result<(), sqlx::Error> {
    for image in images {
        sqlx::query(
            "INSERT INTO gallery_images (id, post_id, url, display_order, created_at) \
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
    Ok(())
}

#[async_trait]
impl GalleryWriteRepo for PostgresRepositories {
    async fn create_post(
        &self,
        params: CreateGalleryPostParams,
    ) -> Result<GalleryPostRecord, RepoError> {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();

        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, GalleryPostRow>(
            "INSERT INTO gallery_posts (id, title, description, category, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             RETURNING id, title, description, category, created_at, updated_at",
        )
        .bind(id)
        .bind(&params.title)
        .bind(&params.description)
        .bind(params.category)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        insert_images(&mut tx, id, &params.images, now)
            .await
            .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;

        let mut images = self.gallery_images_for(&[id]).await?;
        let post_images = images.remove(&id).unwrap_or_default();
        Ok(record_from(row, post_images))
    }

    async fn update_post(
        &self,
        params: UpdateGalleryPostParams,
    ) -> Result<GalleryPostRecord, RepoError> {
        let now = OffsetDateTime::now_utc();

        let mut tx = self.pool().begin().await.map_err(map_sqlx_error)?;
        let row = sqlx::query_as::<_, GalleryPostRow>(
            "UPDATE gallery_posts \
             SET title = $2, description = $3, category = $4, updated_at = $5 \
             WHERE id = $1 \
             RETURNING id, title, description, category, created_at, updated_at",
        )
        .bind(params.id)
        .bind(&params.title)
        .bind(&params.description)
        .bind(params.category)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        sqlx::query("DELETE FROM gallery_images WHERE post_id = $1")
            .bind(params.id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        insert_images(&mut tx, params.id, &params.images, now)
            .await
            .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;

        let mut images = self.gallery_images_for(&[params.id]).await?;
        let post_images = images.remove(&params.id).unwrap_or_default();
        Ok(record_from(row, post_images))
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM gallery_posts WHERE id = $1")
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
