//! Pure listing logic for the public gallery and realty pages: category and
//! kind filters, free-text search for the admin lists, and the lightbox
//! carousel arithmetic.

use std::str::FromStr;

use crate::domain::entities::{GalleryPostRecord, RealtyPostRecord};
use crate::domain::types::{GalleryCategory, ListingKind};

/// Gallery category filter. `All` is the identity filter: it returns the
/// fetched list untouched, order preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GalleryFilter {
    #[default]
    All,
    Category(GalleryCategory),
}

impl GalleryFilter {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            None | Some("all") | Some("") => Self::All,
            Some(other) => GalleryCategory::from_str(other)
                .map(Self::Category)
                .unwrap_or(Self::All),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Category(category) => category.as_str(),
        }
    }

    pub fn matches(&self, post: &GalleryPostRecord) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => post.category == *category,
        }
    }
}

pub fn filter_gallery<'a>(
    posts: &'a [GalleryPostRecord],
    filter: GalleryFilter,
) -> Vec<&'a GalleryPostRecord> {
    posts.iter().filter(|post| filter.matches(post)).collect()
}

/// Realty sale/lease filter, same identity semantics as [`GalleryFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RealtyFilter {
    #[default]
    All,
    Kind(ListingKind),
}

impl RealtyFilter {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            None | Some("all") | Some("") => Self::All,
            Some(other) => ListingKind::from_str(other)
                .map(Self::Kind)
                .unwrap_or(Self::All),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Kind(kind) => kind.as_str(),
        }
    }

    pub fn matches(&self, post: &RealtyPostRecord) -> bool {
        match self {
            Self::All => true,
            Self::Kind(kind) => post.kind == *kind,
        }
    }
}

pub fn filter_realty<'a>(
    posts: &'a [RealtyPostRecord],
    filter: RealtyFilter,
) -> Vec<&'a RealtyPostRecord> {
    posts.iter().filter(|post| filter.matches(post)).collect()
}

/// Case-insensitive title search for the admin gallery list.
pub fn search_gallery<'a>(
    posts: &'a [GalleryPostRecord],
    query: &str,
) -> Vec<&'a GalleryPostRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return posts.iter().collect();
    }
    posts
        .iter()
        .filter(|post| post.title.to_lowercase().contains(&needle))
        .collect()
}

/// Case-insensitive title-or-location search for the admin realty list.
pub fn search_realty<'a>(posts: &'a [RealtyPostRecord], query: &str) -> Vec<&'a RealtyPostRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return posts.iter().collect();
    }
    posts
        .iter()
        .filter(|post| {
            post.title.to_lowercase().contains(&needle)
                || post.location.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Full-screen single-image viewer state over one post's image sequence.
/// Navigation wraps around; a single-image post exposes no navigation at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lightbox {
    index: usize,
    count: usize,
}

impl Lightbox {
    /// Open at `index`. Returns `None` when the post has no images or the
    /// index is out of range, which callers treat as "stay closed".
    pub fn open(count: usize, index: usize) -> Option<Self> {
        (index < count).then_some(Self { index, count })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn next(&self) -> Self {
        Self {
            index: (self.index + 1) % self.count,
            count: self.count,
        }
    }

    pub fn previous(&self) -> Self {
        Self {
            index: (self.index + self.count - 1) % self.count,
            count: self.count,
        }
    }

    /// Whether next/previous controls should exist at all.
    pub fn has_navigation(&self) -> bool {
        self.count > 1
    }

    /// Position indicator, one-based: `"2 / 5"`.
    pub fn position_label(&self) -> String {
        format!("{} / {}", self.index + 1, self.count)
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::domain::entities::PostImageRecord;
    use crate::domain::types::{PricePeriod, RealtyCategory};

    fn gallery_post(title: &str, category: GalleryCategory) -> GalleryPostRecord {
        let now = OffsetDateTime::now_utc();
        GalleryPostRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: "work".to_string(),
            category,
            images: vec![PostImageRecord {
                id: Uuid::new_v4(),
                url: "x.jpg".to_string(),
                display_order: 0,
                created_at: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    fn realty_post(title: &str, location: &str, kind: ListingKind) -> RealtyPostRecord {
        let now = OffsetDateTime::now_utc();
        RealtyPostRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            price_cents: 1_000_00,
            price_period: PricePeriod::Total,
            location: location.to_string(),
            kind,
            category: RealtyCategory::Residential,
            living_room_sqm: None,
            kitchen_sqm: None,
            bedrooms: Vec::new(),
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn all_filter_is_the_identity_and_preserves_order() {
        let posts = vec![
            gallery_post("a", GalleryCategory::Residential),
            gallery_post("b", GalleryCategory::Commercial),
            gallery_post("c", GalleryCategory::Renovation),
        ];
        let filtered = filter_gallery(&posts, GalleryFilter::Category(GalleryCategory::Commercial));
        assert_eq!(filtered.len(), 1);

        let reset = filter_gallery(&posts, GalleryFilter::All);
        let titles: Vec<_> = reset.iter().map(|post| post.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn unknown_filter_params_fall_back_to_all() {
        assert_eq!(GalleryFilter::from_param(Some("garage")), GalleryFilter::All);
        assert_eq!(
            GalleryFilter::from_param(Some("renovation")),
            GalleryFilter::Category(GalleryCategory::Renovation)
        );
        assert_eq!(RealtyFilter::from_param(None), RealtyFilter::All);
    }

    #[test]
    fn realty_search_matches_title_and_location() {
        let posts = vec![
            realty_post("Luxury Modern Villa", "Beverly Hills, CA", ListingKind::Sale),
            realty_post("Downtown Office Space", "Downtown LA", ListingKind::Lease),
        ];
        assert_eq!(search_realty(&posts, "villa").len(), 1);
        assert_eq!(search_realty(&posts, "downtown").len(), 1);
        assert_eq!(search_realty(&posts, "  ").len(), 2);
    }

    #[test]
    fn lightbox_navigation_is_cyclic() {
        let mut lightbox = Lightbox::open(4, 0).expect("opens");
        for _ in 0..4 {
            lightbox = lightbox.next();
        }
        assert_eq!(lightbox.index(), 0);
        assert_eq!(lightbox.previous().index(), 3);
        assert_eq!(lightbox.position_label(), "1 / 4");
    }

    #[test]
    fn single_image_lightbox_hides_navigation() {
        let lightbox = Lightbox::open(1, 0).expect("opens");
        assert!(!lightbox.has_navigation());
        // Wrap-around still behaves if asked.
        assert_eq!(lightbox.next().index(), 0);
        assert_eq!(lightbox.previous().index(), 0);
    }

    #[test]
    fn lightbox_rejects_out_of_range_opens() {
        assert!(Lightbox::open(0, 0).is_none());
        assert!(Lightbox::open(3, 3).is_none());
        assert!(Lightbox::open(3, 2).is_some());
    }
}
