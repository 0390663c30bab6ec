use super::model::Page;

/// Preferred navigation order by page slug.
pub const NAV_ORDER: [&str; 10] = [
    "home",
    "about-us",
    "focus-areas",
    "themes",
    "events",
    "team",
    "gdpr",
    "contact",
    "news",
    "documents",
];

/// Order pages for the navigation menu.
///
/// Pages listed in [`NAV_ORDER`] come first in that order; the rest follow
/// sorted case-insensitively by title. A slug that appears twice keeps its
/// last occurrence.
pub fn build_menu(pages: Vec<Page>) -> Vec<Page> {
    let mut unique: Vec<Page> = Vec::with_capacity(pages.len());
    for page in pages {
        match unique.iter_mut().find(|p| p.slug == page.slug) {
            Some(existing) => *existing = page,
            None => unique.push(page),
        }
    }

    let (mut ordered, mut extras): (Vec<Page>, Vec<Page>) = unique
        .into_iter()
        .partition(|p| NAV_ORDER.contains(&p.slug.as_str()));

    ordered.sort_by_key(|p| NAV_ORDER.iter().position(|slug| *slug == p.slug));
    extras.sort_by_cached_key(|p| p.title.to_lowercase());

    ordered.extend(extras);
    ordered
}
