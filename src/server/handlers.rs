use super::auth::{AdminAuth, LangQuery};
use super::error::{AppErrorKind, AppResult, Localize};
use super::{AppState, DataResponse};
use crate::content::{
    apply_gallery_edit, build_menu, create_group, delete_group, find_by_slug, group_variants,
    list_resolved, resolve_gallery_owner, resolve_variant, save_page, update_group, AdditionalImage,
    ContentItem, ContentKind, CreatedGroup, GalleryEdit, GalleryOutcome, LanguageMap, Page,
    UpdatedGroup, Upload,
};
use crate::error::{ContentError, ContentResult};
use crate::form::{posted_content, posted_page_texts};
use crate::store::ContentStore;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn parse_kind(segment: &str) -> Result<ContentKind, AppErrorKind> {
    segment
        .parse()
        .map_err(|_| AppErrorKind::UnknownKind(segment.to_string()))
}

async fn load(store: &dyn ContentStore, kind: ContentKind, id: i64) -> ContentResult<ContentItem> {
    store
        .get(kind, id)
        .await?
        .ok_or(ContentError::NotFound { kind, id })
}

/// Images of the gallery owner of `item`'s group.
async fn gallery_of(store: &dyn ContentStore, item: &ContentItem) -> ContentResult<Vec<AdditionalImage>> {
    let Some(tag) = item.kind.gallery_tag() else {
        return Ok(Vec::new());
    };
    let owner = resolve_gallery_owner(store, item).await;
    Ok(store.get_additional_images(tag, owner).await?)
}

// ---------------------------------------------------------------------------
// Public reads
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store: &'static str,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store: state.backend,
    })
}

/// GET /api/menu?lang=
pub async fn menu(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> AppResult<Json<DataResponse<Vec<Page>>>> {
    let lang = query.language();
    let pages = state.store.list_pages(lang).await.localized(lang)?;
    Ok(Json(DataResponse {
        data: build_menu(pages),
    }))
}

/// GET /api/:kind?lang=
pub async fn list_items(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<LangQuery>,
) -> AppResult<Json<DataResponse<Vec<ContentItem>>>> {
    let lang = query.language();
    let kind = parse_kind(&kind).localized(lang)?;
    let items = list_resolved(state.store.as_ref(), kind, lang)
        .await
        .localized(lang)?;
    Ok(Json(DataResponse { data: items }))
}

#[derive(Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: ContentItem,
    pub gallery: Vec<AdditionalImage>,
}

/// GET /api/:kind/:id?lang=
pub async fn get_item(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
    Query(query): Query<LangQuery>,
) -> AppResult<Json<DataResponse<ItemView>>> {
    let lang = query.language();
    let kind = parse_kind(&kind).localized(lang)?;
    let store = state.store.as_ref();

    let base = load(store, kind, id).await.localized(lang)?;
    if !base.published {
        return Err(ContentError::NotFound { kind, id }).localized(lang);
    }
    let item = resolve_variant(store, base, lang).await.localized(lang)?;
    let gallery = gallery_of(store, &item).await.localized(lang)?;

    Ok(Json(DataResponse {
        data: ItemView { item, gallery },
    }))
}

/// GET /api/:kind/slug/:slug?lang=
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
    Query(query): Query<LangQuery>,
) -> AppResult<Json<DataResponse<ItemView>>> {
    let lang = query.language();
    let kind = parse_kind(&kind).localized(lang)?;
    let store = state.store.as_ref();

    let item = find_by_slug(store, kind, lang, &slug)
        .await
        .localized(lang)?
        .filter(|item| item.published)
        .ok_or(AppErrorKind::Missing(kind))
        .localized(lang)?;
    let gallery = gallery_of(store, &item).await.localized(lang)?;

    Ok(Json(DataResponse {
        data: ItemView { item, gallery },
    }))
}

// ---------------------------------------------------------------------------
// Admin writes
// ---------------------------------------------------------------------------

/// POST /admin/:kind
pub async fn create_item(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<LangQuery>,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedGroup>>)> {
    let lang = query.language();
    let kind = parse_kind(&kind).localized(lang)?;
    let posted = posted_content(kind, &form);

    let created = create_group(state.store.as_ref(), &posted)
        .await
        .localized(lang)?;
    info!(%kind, group_id = %created.group_id, "Created content group");

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// POST /admin/:kind/:id
pub async fn update_item(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
    Query(query): Query<LangQuery>,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Json<DataResponse<UpdatedGroup>>> {
    let lang = query.language();
    let kind = parse_kind(&kind).localized(lang)?;
    let posted = posted_content(kind, &form);

    let updated = update_group(state.store.as_ref(), kind, id, &posted)
        .await
        .localized(lang)?;
    info!(
        %kind,
        id,
        group_id = %updated.group_id,
        updated = updated.updated.len(),
        created = updated.created.len(),
        "Updated content group"
    );

    Ok(Json(DataResponse { data: updated }))
}

/// POST /admin/pages/:slug
pub async fn update_page(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<LangQuery>,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Json<DataResponse<Vec<Page>>>> {
    let lang = query.language();
    let texts = posted_page_texts(&form);

    let pages = save_page(state.store.as_ref(), &slug, &texts)
        .await
        .localized(lang)?;
    info!(%slug, languages = pages.len(), "Updated page");

    Ok(Json(DataResponse { data: pages }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

/// POST /admin/:kind/:id/delete
pub async fn delete_item(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
    Query(query): Query<LangQuery>,
) -> AppResult<Json<DataResponse<DeleteResponse>>> {
    let lang = query.language();
    let kind = parse_kind(&kind).localized(lang)?;

    let deleted = delete_group(state.store.as_ref(), kind, id)
        .await
        .localized(lang)?;
    info!(%kind, id, deleted, "Deleted content group");

    Ok(Json(DataResponse {
        data: DeleteResponse { deleted },
    }))
}

/// Read the gallery form: `additional_images*` files, `remove_image_ids`
/// (repeated or comma separated) and `lead_image_url`.
async fn read_gallery_form(multipart: &mut Multipart) -> AppResult<GalleryEdit> {
    let mut edit = GalleryEdit::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name.starts_with("additional_images") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await?;
            if !bytes.is_empty() {
                edit.uploads.push(Upload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else if name.starts_with("remove_image_ids") {
            let text = field.text().await?;
            for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let id = part.parse::<i64>().map_err(|_| {
                    AppErrorKind::BadRequest(format!("invalid image id '{part}'"))
                })?;
                edit.remove_ids.push(id);
            }
        } else if name == "lead_image_url" {
            let text = field.text().await?;
            edit.lead = Some(text.trim().to_string()).filter(|t| !t.is_empty());
        }
    }

    Ok(edit)
}

/// POST /admin/:kind/:id/gallery
pub async fn edit_gallery(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
    Query(query): Query<LangQuery>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<GalleryOutcome>>> {
    let lang = query.language();
    let kind = parse_kind(&kind).localized(lang)?;
    let store = state.store.as_ref();

    let base = load(store, kind, id).await.localized(lang)?;
    let edit = read_gallery_form(&mut multipart).await.localized(lang)?;
    let uploads = edit.uploads.len();

    let outcome = apply_gallery_edit(store, state.storage.as_ref(), &base, edit)
        .await
        .localized(lang)?;
    info!(
        %kind,
        id,
        owner_id = outcome.owner_id,
        uploads,
        images = outcome.images.len(),
        "Updated gallery"
    );

    Ok(Json(DataResponse { data: outcome }))
}

/// GET /admin/:kind/:id/variants
pub async fn list_variants(
    _auth: AdminAuth,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, i64)>,
    Query(query): Query<LangQuery>,
) -> AppResult<Json<DataResponse<LanguageMap<ContentItem>>>> {
    let lang = query.language();
    let kind = parse_kind(&kind).localized(lang)?;
    let store = state.store.as_ref();

    let base = load(store, kind, id).await.localized(lang)?;
    let variants = match &base.group_id {
        Some(group_id) => group_variants(store, kind, group_id).await.localized(lang)?,
        None => LanguageMap::from([(base.lang, base)]),
    };

    Ok(Json(DataResponse { data: variants }))
}
