use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

// Numbers arrive as strings: flattened query structs lose type hints.
#[derive(Deserialize, Debug, Default)]
pub struct PaginationParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}
impl PaginationParams {
    pub fn limit(&self) -> i64 {
        self.limit
            .as_ref()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(100)
    }
    pub fn offset(&self) -> i64 {
        self.offset
            .as_ref()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|n| *n >= 0)
            .unwrap_or(0)
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct SortParams<T> {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub sort: Option<T>,
    pub sort_by: Option<SortDirection>,
}

impl<T> SortParams<T> {
    pub fn limit(&self) -> i64 {
        self.pagination.limit()
    }
    pub fn offset(&self) -> i64 {
        self.pagination.offset()
    }
    pub fn sort(&self) -> Option<&T> {
        self.sort.as_ref()
    }
    pub fn sort_by(&self) -> Option<SortDirection> {
        self.sort_by
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchParams<T> {
    #[serde(flatten)]
    pub sortable: SortParams<T>,
    pub search: Option<String>,
}

impl<T> SearchParams<T> {
    pub fn limit(&self) -> i64 {
        self.sortable.limit()
    }
    pub fn offset(&self) -> i64 {
        self.sortable.offset()
    }
    pub fn sort(&self) -> Option<&T> {
        self.sortable.sort()
    }
    pub fn sort_by(&self) -> Option<SortDirection> {
        self.sortable.sort_by()
    }
    pub fn search(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }
}

#[derive(Deserialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorySort {
    #[default]
    Date,
    Title,
}

/// Query string of the public story feed.
#[derive(Deserialize, Debug, Default)]
pub struct StoryParams {
    #[serde(flatten)]
    pub base: SearchParams<StorySort>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub location: Option<String>,
}

impl StoryParams {
    pub fn from_date(&self) -> Result<Option<NaiveDate>, AppError> {
        parse_date(self.from.as_deref())
    }
    pub fn to_date(&self) -> Result<Option<NaiveDate>, AppError> {
        parse_date(self.to.as_deref())
    }
    pub fn location(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    non_blank(value)
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| AppError::validation(format!("Data inválida: {}", s)))
        })
        .transpose()
}
