use crate::collection::parse_timestamp;
use crate::models::{CastMember, MediaKind, Rating};
use chrono::Locale;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";
pub const DEFAULT_POSTER: &str = "/assets/img/movie/default.png";

const NARROW_NBSP: char = '\u{202f}';
const NBSP: char = '\u{a0}';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosterSize {
    W92,
    W154,
    W185,
    #[default]
    W342,
    W500,
    W780,
    Original,
}

impl PosterSize {
    pub fn as_str(self) -> &'static str {
        match self {
            PosterSize::W92 => "w92",
            PosterSize::W154 => "w154",
            PosterSize::W185 => "w185",
            PosterSize::W342 => "w342",
            PosterSize::W500 => "w500",
            PosterSize::W780 => "w780",
            PosterSize::Original => "original",
        }
    }
}

impl fmt::Display for PosterSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn poster_url(size: PosterSize, poster_path: Option<&str>) -> String {
    match poster_path.filter(|p| !p.is_empty()) {
        Some(path) => format!("{}{}{}", IMAGE_BASE_URL, size, path),
        None => DEFAULT_POSTER.to_string(),
    }
}

/// `2023-12-25T10:30:00.000Z` becomes `25 décembre 2023`. Input that is not a
/// date is returned unchanged.
pub fn format_date(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format_localized("%-d %B %Y", Locale::fr_FR).to_string(),
        None => value.to_string(),
    }
}

/// Four-digit year of a release date, empty when absent or unparseable.
pub fn release_year(value: Option<&str>) -> String {
    value
        .and_then(parse_timestamp)
        .map(|dt| dt.format("%Y").to_string())
        .unwrap_or_default()
}

/// Movie runtime: `135` becomes `2h15`.
pub fn format_duration(minutes: u32) -> String {
    format!("{}h{:02}", minutes / 60, minutes % 60)
}

/// Episode runtime: `90` becomes `1h 30min`, `45` becomes `45min`.
pub fn format_series_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    if hours > 0 {
        format!("{}h {}min", hours, minutes % 60)
    } else {
        format!("{}min", minutes)
    }
}

/// Whole US dollars with French digit grouping: `1 000 000 $US`.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 8);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(NARROW_NBSP);
        }
        grouped.push(c);
    }
    grouped.push(NBSP);
    grouped.push_str("$US");
    grouped
}

pub fn rating_label(rating: Option<Rating>) -> &'static str {
    match rating.map(Rating::half_stars) {
        Some(1) => "Nul",
        Some(2) => "Très Mauvais",
        Some(3) => "Mauvais",
        Some(4) => "Pas terrible",
        Some(5) => "Moyen",
        Some(6) => "Pas mal",
        Some(7) => "Bien",
        Some(8) => "Très bien",
        Some(9) => "Excellent",
        Some(10) => "Chef-d'œuvre",
        _ => "Aucune évaluation",
    }
}

/// `4 - Très bien`, or `Aucune évaluation` when unrated.
pub fn rating_tooltip(rating: Option<Rating>) -> String {
    match rating {
        Some(r) => format!("{} - {}", r, rating_label(Some(r))),
        None => rating_label(None).to_string(),
    }
}

pub fn watch_count_label(kind: MediaKind, view_count: u32, watched: bool) -> String {
    match (watched, kind) {
        (true, MediaKind::Movie) => format!("Vu {} fois", view_count.max(1)),
        (true, MediaKind::Series) => format!("Vue {} fois", view_count.max(1)),
        (false, MediaKind::Movie) => "Marquer comme vu".to_string(),
        (false, MediaKind::Series) => "Marquer comme vue".to_string(),
    }
}

/// The first billed actor followed by the two most popular of the others.
pub fn featured_actors(cast: &[CastMember]) -> Vec<CastMember> {
    let Some((first, rest)) = cast.split_first() else {
        return Vec::new();
    };

    let mut rest = rest.to_vec();
    rest.sort_by(|a, b| {
        b.popularity
            .unwrap_or(0.0)
            .total_cmp(&a.popularity.unwrap_or(0.0))
    });

    std::iter::once(first.clone())
        .chain(rest.into_iter().take(2))
        .collect()
}
