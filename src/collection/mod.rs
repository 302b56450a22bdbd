use crate::models::{CatalogRecord, LocalEntry, Rating, SortKey};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

mod pagination;
mod view;

pub use pagination::Pagination;
pub use view::{CollectionView, ListMode};

pub trait Sortable {
    fn title(&self) -> &str;
    fn rating(&self) -> Option<Rating>;
    fn updated_at(&self) -> Option<&str>;
}

impl Sortable for LocalEntry {
    fn title(&self) -> &str {
        &self.title
    }

    fn rating(&self) -> Option<Rating> {
        self.rating
    }

    fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

impl Sortable for CatalogRecord {
    fn title(&self) -> &str {
        &self.title
    }

    fn rating(&self) -> Option<Rating> {
        self.local.as_ref().and_then(|l| l.rating)
    }

    fn updated_at(&self) -> Option<&str> {
        self.local.as_ref().and_then(|l| l.updated_at.as_deref())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionFilters {
    pub sort: SortKey,
    /// 0 disables the filter; 1 to 5 keeps only entries rated exactly that
    /// many whole stars.
    pub rating_filter: u8,
}

impl CollectionFilters {
    pub fn new(sort: SortKey, rating_filter: u8) -> Self {
        Self {
            sort,
            rating_filter,
        }
    }
}

/// Returns `items` ordered by `key`. The sort is stable, so ties keep their
/// original relative order.
pub fn sort_collection<T: Sortable + Clone>(items: &[T], key: SortKey) -> Vec<T> {
    let mut sorted = items.to_vec();

    match key {
        SortKey::LastModified => {
            sorted.sort_by(|a, b| {
                match (
                    a.updated_at().and_then(parse_timestamp),
                    b.updated_at().and_then(parse_timestamp),
                ) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (Some(a), Some(b)) => b.cmp(&a),
                }
            });
        }
        SortKey::Title => sorted.sort_by(|a, b| compare_titles(a.title(), b.title())),
        SortKey::RatingDesc => sorted.sort_by_key(|item| std::cmp::Reverse(rating_rank(item))),
        SortKey::RatingAsc => sorted.sort_by_key(rating_rank),
    }

    sorted
}

/// Keeps the entries rated exactly `rating_filter` stars, or all of them when
/// the filter is 0.
pub fn filter_collection<T: Sortable + Clone>(items: &[T], rating_filter: u8) -> Vec<T> {
    if rating_filter == 0 {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|item| item.rating().is_some_and(|r| r.is_exactly(rating_filter)))
        .cloned()
        .collect()
}

pub fn apply_filters<T: Sortable + Clone>(items: &[T], filters: &CollectionFilters) -> Vec<T> {
    let filtered = filter_collection(items, filters.rating_filter);
    sort_collection(&filtered, filters.sort)
}

fn rating_rank<T: Sortable>(item: &T) -> u8 {
    item.rating().map(Rating::half_stars).unwrap_or(0)
}

/// Parses backend timestamps: RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS`, or a
/// bare date. Anything else counts as missing.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Case- and accent-insensitive title comparison, so that "écran" sorts next
/// to "ecran" and "Œdipe" files under O.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}

fn collation_key(title: &str) -> String {
    let mut key = String::with_capacity(title.len());
    for c in title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
    {
        // Letters with no canonical decomposition.
        match c {
            'œ' => key.push_str("oe"),
            'æ' => key.push_str("ae"),
            'ß' => key.push_str("ss"),
            'ø' => key.push('o'),
            'đ' => key.push('d'),
            'ł' => key.push('l'),
            other => key.push(other),
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, title: &str, rating: Option<f64>, updated_at: Option<&str>) -> LocalEntry {
        LocalEntry {
            id,
            title: title.to_string(),
            tmdb_id: None,
            rating: rating.map(|r| Rating::new(r).unwrap()),
            wishlist: false,
            review: None,
            view_count: 0,
            watched: false,
            created_at: None,
            updated_at: updated_at.map(str::to_string),
            tmdb: None,
        }
    }

    fn ids(items: &[LocalEntry]) -> Vec<i64> {
        items.iter().map(|e| e.id).collect()
    }

    fn sample() -> Vec<LocalEntry> {
        vec![
            entry(1, "The Dark Knight", Some(5.0), Some("2024-01-10T10:00:00.000Z")),
            entry(2, "pulp Fiction", Some(4.5), None),
            entry(3, "Inception", Some(4.0), Some("2024-03-02T10:00:00.000Z")),
            entry(4, "Interstellar", None, Some("2024-02-01")),
            entry(5, "Seven", Some(4.0), None),
            entry(6, "Élysium", None, Some("not a date")),
        ]
    }

    #[test]
    fn test_last_modified_descending_missing_last_and_stable() {
        let sorted = sort_collection(&sample(), SortKey::LastModified);
        // Unparseable dates count as missing; missing keep input order.
        assert_eq!(ids(&sorted), vec![3, 4, 1, 2, 5, 6]);
    }

    #[test]
    fn test_title_ascending_ignores_case_and_accents() {
        let sorted = sort_collection(&sample(), SortKey::Title);
        assert_eq!(
            sorted.iter().map(|e| e.title.as_str()).collect::<Vec<_>>(),
            vec![
                "Élysium",
                "Inception",
                "Interstellar",
                "pulp Fiction",
                "Seven",
                "The Dark Knight"
            ]
        );
        for pair in sorted.windows(2) {
            assert_ne!(compare_titles(&pair[0].title, &pair[1].title), Ordering::Greater);
        }
    }

    #[test]
    fn test_title_ordering_folds_ligatures_and_diacritics() {
        assert_eq!(compare_titles("Œdipe roi", "Zorro"), Ordering::Less);
        assert_eq!(compare_titles("Æon Flux", "Batman"), Ordering::Less);
        assert_eq!(compare_titles("Tōkyō Story", "Tokyo Drift"), Ordering::Greater);
        assert_eq!(compare_titles("Œdipe", "oedipe"), Ordering::Equal);

        let titles = vec![
            entry(1, "Zorro", None, None),
            entry(2, "Œdipe roi", None, None),
            entry(3, "Tōkyō Story", None, None),
            entry(4, "Æon Flux", None, None),
            entry(5, "Ocean's Eleven", None, None),
        ];
        assert_eq!(ids(&sort_collection(&titles, SortKey::Title)), vec![4, 5, 2, 3, 1]);
    }

    #[test]
    fn test_rating_desc_treats_missing_as_zero_and_is_stable() {
        let sorted = sort_collection(&sample(), SortKey::RatingDesc);
        assert_eq!(ids(&sorted), vec![1, 2, 3, 5, 4, 6]);
        for pair in sorted.windows(2) {
            assert!(rating_rank(&pair[0]) >= rating_rank(&pair[1]));
        }
    }

    #[test]
    fn test_rating_asc() {
        let sorted = sort_collection(&sample(), SortKey::RatingAsc);
        assert_eq!(ids(&sorted), vec![4, 6, 3, 5, 2, 1]);
    }

    #[test]
    fn test_filter_zero_is_identity() {
        let items = sample();
        assert_eq!(filter_collection(&items, 0), items);
    }

    #[test]
    fn test_filter_is_exact_match_not_threshold() {
        let items = sample();
        assert_eq!(ids(&filter_collection(&items, 4)), vec![3, 5]);
        assert_eq!(ids(&filter_collection(&items, 5)), vec![1]);
        assert!(filter_collection(&items, 2).is_empty());
    }

    #[test]
    fn test_input_is_left_untouched() {
        let items = sample();
        let before = items.clone();
        let _ = apply_filters(&items, &CollectionFilters::new(SortKey::Title, 4));
        let _ = sort_collection(&items, SortKey::RatingAsc);
        assert_eq!(items, before);
    }

    #[test]
    fn test_apply_filters_filters_then_sorts() {
        let items = sample();
        let result = apply_filters(&items, &CollectionFilters::new(SortKey::Title, 4));
        assert_eq!(ids(&result), vec![3, 5]);
    }

    #[test]
    fn test_empty_input() {
        let empty: Vec<LocalEntry> = Vec::new();
        assert!(apply_filters(&empty, &CollectionFilters::default()).is_empty());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2023-12-25T10:30:00.000Z").is_some());
        assert!(parse_timestamp("2023-12-25T10:30:00").is_some());
        assert!(parse_timestamp("2023-12-25").is_some());
        assert!(parse_timestamp("25/12/2023").is_none());
    }
}
