use jiff::civil::Date;
use serde::{Deserialize, Deserializer, Serialize};

use crate::entities::{country, movie::MovieStatus};

#[derive(Clone, Debug, Deserialize)]
pub struct MovieCreateRequest {
    pub name: String,
    pub date: Date,
    pub score: f64,
    pub overview: String,
    pub status: MovieStatus,
    pub budget: f64,
    pub revenue: f64,
    pub country: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

/// Sparse update. `None` means the field was not supplied; an explicit JSON
/// `null` is rejected because no movie column is nullable.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MovieUpdateRequest {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub date: Option<Date>,
    #[serde(default, deserialize_with = "present")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<MovieStatus>,
    #[serde(default, deserialize_with = "present")]
    pub budget: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub revenue: Option<f64>,
}

fn present<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(de).map(Some)
}

impl MovieUpdateRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date.is_none()
            && self.score.is_none()
            && self.overview.is_none()
            && self.status.is_none()
            && self.budget.is_none()
            && self.revenue.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovieListItem {
    pub id: i32,
    pub name: String,
    pub date: Date,
    pub score: f64,
    pub overview: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct MovieListResponse {
    pub movies: Vec<MovieListItem>,
    pub prev_page: Option<String>,
    pub next_page: Option<String>,
    pub total_pages: u64,
    pub total_items: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CountryView {
    pub id: i32,
    pub code: String,
    pub name: Option<String>,
}

impl From<country::Model> for CountryView {
    fn from(m: country::Model) -> Self {
        Self { id: m.id, code: m.code, name: m.name }
    }
}

/// Genre, actor or language as it appears on a movie.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NamedView {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct MovieDetail {
    pub id: i32,
    pub name: String,
    pub date: Date,
    pub score: f64,
    pub overview: String,
    pub status: MovieStatus,
    pub budget: f64,
    pub revenue: f64,
    pub country: CountryView,
    pub genres: Vec<NamedView>,
    pub actors: Vec<NamedView>,
    pub languages: Vec<NamedView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Ack {
    pub detail: &'static str,
}
