//! Language-grouped content: resolution, replication, galleries, navigation.
//!
//! Nothing in here logs; callers decide what is worth recording.

mod gallery;
mod kind;
mod menu;
mod model;
mod pages;
mod replicate;
mod resolve;
mod slug;

pub use gallery::{apply_gallery_edit, choose_lead, plan_gallery, GalleryEdit, GalleryOutcome, Upload};
pub use kind::{ContentKind, TitleSource};
pub use menu::{build_menu, NAV_ORDER};
pub use model::{
    AdditionalImage, ContentItem, FieldSet, GroupId, ImageItem, LanguageMap, NewContentItem, Page,
    SharedUpdate,
};
pub use pages::{
    default_page, ensure_default_pages, save_page, DefaultPage, PageText, DEFAULT_PAGES,
};
pub use replicate::{
    create_group, delete_group, update_group, CreatedGroup, PostedContent, UpdatedGroup,
};
pub use resolve::{
    find_by_slug, group_variants, list_resolved, pick_variants, resolve_gallery_owner,
    resolve_variant,
};
pub use slug::{
    sanitize_location, slugify, unique_slug, unique_slug_for, MAX_SLUG_ATTEMPTS, MAX_SLUG_LEN,
};
