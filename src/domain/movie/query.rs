//! List query normalization: filter, sort and pagination.

use serde::Deserialize;
use std::cmp::Ordering;
use utoipa::IntoParams;

use super::Movie;
use crate::error::MovieError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Raw list query parameters, exactly as they arrive in the query string.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Case-insensitive substring match against the title.
    pub q: Option<String>,
    /// Exact title match. Takes precedence over `q`.
    pub title: Option<String>,
    /// Exact rating match.
    pub rating: Option<String>,
    /// Field to sort ascending by: title, rating, description, releaseDate or id.
    pub sort_by: Option<String>,
    /// 1-based page number (default 1).
    pub page: Option<String>,
    /// Page size (default 10).
    pub limit: Option<String>,
}

/// A validated list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
    pub filter: MovieFilter,
    pub sort: Option<SortField>,
    pub page: Page,
}

impl ListQuery {
    pub fn normalize(self) -> Result<ListParams, MovieError> {
        let q = non_empty(self.q);
        let title = non_empty(self.title);

        // Both target the title; an exact title replaces the substring search.
        let title = match (title, q) {
            (Some(exact), _) => Some(TitleFilter::Exact(exact)),
            (None, Some(needle)) => Some(TitleFilter::Contains(needle)),
            (None, None) => None,
        };

        let filter = MovieFilter {
            title,
            rating: non_empty(self.rating).map(|r| RatingFilter::new(&r)),
        };

        let sort = non_empty(self.sort_by)
            .map(|s| SortField::from_param(&s))
            .transpose()?;

        let page = Page::new(
            parse_positive("page", self.page, DEFAULT_PAGE)?,
            parse_positive("limit", self.limit, DEFAULT_LIMIT)?,
        )?;

        Ok(ListParams { filter, sort, page })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_positive(name: &str, raw: Option<String>, default: u32) -> Result<u32, MovieError> {
    let Some(raw) = non_empty(raw) else {
        return Ok(default);
    };
    match raw.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(MovieError::Validation(format!(
            "{} must be a positive integer, got {:?}",
            name, raw
        ))),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TitleFilter {
    Exact(String),
    Contains(String),
}

impl TitleFilter {
    pub fn matches(&self, title: Option<&str>) -> bool {
        let Some(title) = title else {
            return false;
        };
        match self {
            TitleFilter::Exact(exact) => title == exact,
            TitleFilter::Contains(needle) => title.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

/// Rating equality: text compares verbatim, numbers compare numerically.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingFilter {
    pub raw: String,
    pub numeric: Option<f64>,
}

impl RatingFilter {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            numeric: raw.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

/// Conditions a movie must satisfy to be listed. Unset conditions match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    pub title: Option<TitleFilter>,
    pub rating: Option<RatingFilter>,
}

impl MovieFilter {
    pub fn matches(&self, movie: &Movie) -> bool {
        if let Some(title) = &self.title {
            if !title.matches(movie.title.as_deref()) {
                return false;
            }
        }
        if let Some(rating) = &self.rating {
            match &movie.rating {
                Some(r) if r.matches(rating) => {}
                _ => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Rating,
    Description,
    ReleaseDate,
}

impl SortField {
    pub fn from_param(name: &str) -> Result<Self, MovieError> {
        match name {
            "id" | "_id" => Ok(SortField::Id),
            "title" => Ok(SortField::Title),
            "rating" => Ok(SortField::Rating),
            "description" => Ok(SortField::Description),
            "releaseDate" => Ok(SortField::ReleaseDate),
            other => Err(MovieError::Validation(format!(
                "sortBy: unknown field {:?} (expected one of id, title, rating, description, releaseDate)",
                other
            ))),
        }
    }

    /// Ascending comparison with absent values first.
    pub fn compare(&self, a: &Movie, b: &Movie) -> Ordering {
        match self {
            SortField::Id => a.id.as_uuid().cmp(&b.id.as_uuid()),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Description => a.description.cmp(&b.description),
            SortField::ReleaseDate => a.release_date.cmp(&b.release_date),
            SortField::Rating => match (&a.rating, &b.rating) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
            },
        }
    }
}

/// One page of results: 1-based page number and page size, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub limit: u32,
}

impl Page {
    /// Rejects zero values and pages whose offset does not fit a signed 64-bit skip.
    pub fn new(number: u32, limit: u32) -> Result<Self, MovieError> {
        if number == 0 || limit == 0 {
            return Err(MovieError::Validation(
                "page and limit must be at least 1".to_string(),
            ));
        }
        let page = Self { number, limit };
        if page.skip() > i64::MAX as u64 {
            return Err(MovieError::Validation(format!(
                "page {} with limit {} is out of range",
                number, limit
            )));
        }
        Ok(page)
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.limit)
    }

    pub fn total_pages(&self, count: u64) -> u64 {
        count.div_ceil(u64::from(self.limit))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ListQuery {
        let mut q = ListQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "q" => q.q = v,
                "title" => q.title = v,
                "rating" => q.rating = v,
                "sortBy" => q.sort_by = v,
                "page" => q.page = v,
                "limit" => q.limit = v,
                _ => unreachable!(),
            }
        }
        q
    }

    #[test]
    fn defaults_to_first_page_of_ten() {
        let params = ListQuery::default().normalize().unwrap();
        assert_eq!(params.page, Page::default());
        assert_eq!(params.filter, MovieFilter::default());
        assert_eq!(params.sort, None);
    }

    #[test]
    fn exact_title_overrides_substring_search() {
        let params = query(&[("q", "matrix"), ("title", "Heat")]).normalize().unwrap();
        assert_eq!(params.filter.title, Some(TitleFilter::Exact("Heat".to_string())));

        let params = query(&[("q", "matrix")]).normalize().unwrap();
        assert_eq!(params.filter.title, Some(TitleFilter::Contains("matrix".to_string())));
    }

    #[test]
    fn empty_values_are_ignored() {
        let params = query(&[("q", ""), ("rating", ""), ("page", "")]).normalize().unwrap();
        assert_eq!(params.filter, MovieFilter::default());
        assert_eq!(params.page.number, 1);
    }

    #[test]
    fn rejects_zero_and_non_numeric_paging() {
        for (k, v) in [("limit", "0"), ("page", "0"), ("page", "two"), ("limit", "-5")] {
            let err = query(&[(k, v)]).normalize().unwrap_err();
            assert!(matches!(err, MovieError::Validation(_)), "{}={}", k, v);
        }
    }

    #[test]
    fn rejects_unknown_sort_field() {
        let err = query(&[("sortBy", "budget")]).normalize().unwrap_err();
        assert!(matches!(err, MovieError::Validation(_)));

        let params = query(&[("sortBy", "releaseDate")]).normalize().unwrap();
        assert_eq!(params.sort, Some(SortField::ReleaseDate));
    }

    #[test]
    fn page_math() {
        let page = Page::new(3, 2).unwrap();
        assert_eq!(page.skip(), 4);
        assert_eq!(page.total_pages(5), 3);
        assert_eq!(page.total_pages(4), 2);
        assert_eq!(page.total_pages(0), 0);
    }

    #[test]
    fn rejects_offsets_past_i64() {
        assert!(matches!(Page::new(0, 10), Err(MovieError::Validation(_))));
        assert!(matches!(
            Page::new(u32::MAX, u32::MAX),
            Err(MovieError::Validation(_))
        ));

        let err = query(&[("page", "4294967295"), ("limit", "4294967295")])
            .normalize()
            .unwrap_err();
        assert!(matches!(err, MovieError::Validation(msg) if msg.contains("out of range")));

        let last = Page::new(u32::MAX, 1).unwrap();
        assert_eq!(last.skip(), u64::from(u32::MAX) - 1);
    }

    #[test]
    fn substring_search_ignores_case() {
        let filter = TitleFilter::Contains("MATRIX".to_string());
        assert!(filter.matches(Some("The Matrix Reloaded")));
        assert!(!filter.matches(Some("Inception")));
        assert!(!filter.matches(None));
    }
}
