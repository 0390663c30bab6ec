use super::{ContentStore, StoreError, StoreResult};
use crate::content::{
    AdditionalImage, ContentItem, ContentKind, FieldSet, GroupId, ImageItem, NewContentItem, Page,
    SharedUpdate,
};
use crate::i18n::Language;
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;

/// Column list shared across content queries.
const COLUMNS: &str = "id, kind, lang, group_id, slug, fields, shared, lead_url, sort_order, \
    published, created_at, updated_at";

const IMAGE_COLUMNS: &str = "id, content_type, content_id, image_url, alt_text, sort_order";

#[derive(sqlx::FromRow)]
struct ContentRow {
    id: i64,
    kind: String,
    lang: String,
    group_id: Option<String>,
    slug: Option<String>,
    fields: Json<FieldSet>,
    shared: Json<FieldSet>,
    lead_url: Option<String>,
    sort_order: i32,
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for ContentItem {
    type Error = StoreError;

    fn try_from(row: ContentRow) -> StoreResult<Self> {
        let kind = row
            .kind
            .parse::<ContentKind>()
            .map_err(StoreError::Corrupt)?;
        let lang = Language::from_code(&row.lang)
            .map_err(|e| StoreError::Corrupt(format!("row {}: {}", row.id, e)))?;

        Ok(ContentItem {
            id: row.id,
            kind,
            lang,
            group_id: row.group_id.map(GroupId::new),
            slug: row.slug,
            fields: row.fields.0,
            shared: row.shared.0,
            lead_url: row.lead_url,
            sort_order: row.sort_order,
            published: row.published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PageRow {
    lang: String,
    slug: String,
    title: String,
    content: String,
    image_url: Option<String>,
}

impl TryFrom<PageRow> for Page {
    type Error = StoreError;

    fn try_from(row: PageRow) -> StoreResult<Self> {
        let lang = Language::from_code(&row.lang)
            .map_err(|e| StoreError::Corrupt(format!("page {}: {}", row.slug, e)))?;
        Ok(Page {
            lang,
            slug: row.slug,
            title: row.title,
            content: row.content,
            image_url: row.image_url,
        })
    }
}

fn into_items(rows: Vec<ContentRow>) -> StoreResult<Vec<ContentItem>> {
    rows.into_iter().map(ContentItem::try_from).collect()
}

/// Map unique-constraint violations to [`StoreError::Conflict`].
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return StoreError::Conflict(format!(
                "duplicate value violates unique constraint: {constraint}"
            ));
        }
    }
    StoreError::Database(err)
}

/// Transient connection failures worth another attempt.
fn is_transient(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Tls(_)
    )
}

/// Postgres backend over a single `content_items` table.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with retries, then apply pending migrations.
    pub async fn connect(database_url: &str, retry: &RetryConfig) -> Result<Self> {
        let pool = with_retry_if(
            retry,
            "Database connect",
            || PgPoolOptions::new().max_connections(5).connect(database_url),
            is_transient,
        )
        .await
        .context("Failed to connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        info!("Database connected and migrations applied");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn get(&self, kind: ContentKind, id: i64) -> StoreResult<Option<ContentItem>> {
        let query = format!("SELECT {COLUMNS} FROM content_items WHERE id = $1 AND kind = $2");
        sqlx::query_as::<_, ContentRow>(&query)
            .bind(id)
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(ContentItem::try_from)
            .transpose()
    }

    async fn get_by_group_and_lang(
        &self,
        kind: ContentKind,
        group_id: &GroupId,
        lang: Language,
    ) -> StoreResult<Option<ContentItem>> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_items
             WHERE kind = $1 AND group_id = $2 AND lang = $3
             ORDER BY id
             LIMIT 1"
        );
        sqlx::query_as::<_, ContentRow>(&query)
            .bind(kind.as_str())
            .bind(group_id.as_str())
            .bind(lang.code())
            .fetch_optional(&self.pool)
            .await?
            .map(ContentItem::try_from)
            .transpose()
    }

    async fn get_by_slug(
        &self,
        kind: ContentKind,
        lang: Language,
        slug: &str,
    ) -> StoreResult<Option<ContentItem>> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_items WHERE kind = $1 AND lang = $2 AND slug = $3"
        );
        sqlx::query_as::<_, ContentRow>(&query)
            .bind(kind.as_str())
            .bind(lang.code())
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .map(ContentItem::try_from)
            .transpose()
    }

    async fn list(&self, kind: ContentKind, lang: Option<Language>) -> StoreResult<Vec<ContentItem>> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_items
             WHERE kind = $1 AND ($2::TEXT IS NULL OR lang = $2)
             ORDER BY sort_order, id"
        );
        let rows = sqlx::query_as::<_, ContentRow>(&query)
            .bind(kind.as_str())
            .bind(lang.map(|l| l.code()))
            .fetch_all(&self.pool)
            .await?;
        into_items(rows)
    }

    async fn create(&self, item: NewContentItem) -> StoreResult<ContentItem> {
        let query = format!(
            "INSERT INTO content_items
                (kind, lang, group_id, slug, fields, shared, lead_url, sort_order, published)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ContentRow>(&query)
            .bind(item.kind.as_str())
            .bind(item.lang.code())
            .bind(item.group_id.as_ref().map(GroupId::as_str))
            .bind(&item.slug)
            .bind(Json(&item.fields))
            .bind(Json(&item.shared))
            .bind(&item.lead_url)
            .bind(item.sort_order)
            .bind(item.published)
            .fetch_one(&self.pool)
            .await
            .map_err(classify)?;
        row.try_into()
    }

    async fn update_fields(&self, id: i64, fields: &FieldSet) -> StoreResult<ContentItem> {
        let query = format!(
            "UPDATE content_items SET fields = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentRow>(&query)
            .bind(id)
            .bind(Json(fields))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::Missing(id))?
            .try_into()
    }

    async fn set_group(&self, kind: ContentKind, id: i64, group_id: &GroupId) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE content_items SET group_id = $3, updated_at = NOW()
             WHERE id = $1 AND kind = $2",
        )
        .bind(id)
        .bind(kind.as_str())
        .bind(group_id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(id));
        }
        Ok(())
    }

    async fn update_shared_for_group(
        &self,
        kind: ContentKind,
        group_id: &GroupId,
        update: &SharedUpdate,
    ) -> StoreResult<()> {
        // `||` merges JSONB objects with the right side winning, so absent keys keep their value.
        sqlx::query(
            "UPDATE content_items
             SET shared = shared || $3,
                 sort_order = COALESCE($4, sort_order),
                 published = COALESCE($5, published),
                 updated_at = NOW()
             WHERE kind = $1 AND group_id = $2",
        )
        .bind(kind.as_str())
        .bind(group_id.as_str())
        .bind(Json(&update.values))
        .bind(update.sort_order)
        .bind(update.published)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_lead_for_group(
        &self,
        kind: ContentKind,
        owner_id: i64,
        lead_url: Option<&str>,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE content_items SET lead_url = $3, updated_at = NOW()
             WHERE kind = $1
               AND (id = $2 OR group_id = (
                    SELECT group_id FROM content_items
                    WHERE id = $2 AND kind = $1 AND group_id IS NOT NULL))",
        )
        .bind(kind.as_str())
        .bind(owner_id)
        .bind(lead_url)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Missing(owner_id));
        }
        Ok(())
    }

    async fn delete(&self, kind: ContentKind, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM content_items WHERE id = $1 AND kind = $2")
            .bind(id)
            .bind(kind.as_str())
            .execute(&mut *tx)
            .await?;

        if let (Some(tag), true) = (kind.gallery_tag(), deleted.rows_affected() > 0) {
            sqlx::query("DELETE FROM additional_images WHERE content_type = $1 AND content_id = $2")
                .bind(tag)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_group(&self, kind: ContentKind, group_id: &GroupId) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        let ids: Vec<i64> = sqlx::query_scalar(
            "DELETE FROM content_items WHERE kind = $1 AND group_id = $2 RETURNING id",
        )
        .bind(kind.as_str())
        .bind(group_id.as_str())
        .fetch_all(&mut *tx)
        .await?;

        if let Some(tag) = kind.gallery_tag() {
            sqlx::query(
                "DELETE FROM additional_images WHERE content_type = $1 AND content_id = ANY($2)",
            )
            .bind(tag)
            .bind(&ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(ids.len() as u64)
    }

    async fn get_additional_images(
        &self,
        content_type: &str,
        owner_id: i64,
    ) -> StoreResult<Vec<AdditionalImage>> {
        let query = format!(
            "SELECT {IMAGE_COLUMNS} FROM additional_images
             WHERE content_type = $1 AND content_id = $2
             ORDER BY sort_order, id"
        );
        Ok(sqlx::query_as::<_, AdditionalImage>(&query)
            .bind(content_type)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn replace_additional_image_items(
        &self,
        content_type: &str,
        owner_id: i64,
        items: &[ImageItem],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM additional_images WHERE content_type = $1 AND content_id = $2")
            .bind(content_type)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO additional_images
                    (content_type, content_id, image_url, alt_text, sort_order)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(content_type)
            .bind(owner_id)
            .bind(&item.image_url)
            .bind(&item.alt_text)
            .bind(item.sort_order)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_pages(&self, lang: Language) -> StoreResult<Vec<Page>> {
        let rows = sqlx::query_as::<_, PageRow>(
            "SELECT lang, slug, title, content, image_url FROM pages WHERE lang = $1 ORDER BY id",
        )
        .bind(lang.code())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Page::try_from).collect()
    }

    async fn upsert_page(&self, page: &Page) -> StoreResult<Page> {
        let row = sqlx::query_as::<_, PageRow>(
            "INSERT INTO pages (lang, slug, title, content, image_url)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (lang, slug) DO UPDATE
             SET title = EXCLUDED.title,
                 content = EXCLUDED.content,
                 image_url = EXCLUDED.image_url
             RETURNING lang, slug, title, content, image_url",
        )
        .bind(page.lang.code())
        .bind(&page.slug)
        .bind(&page.title)
        .bind(&page.content)
        .bind(&page.image_url)
        .fetch_one(&self.pool)
        .await?;
        Page::try_from(row)
    }
}
