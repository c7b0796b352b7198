use jiff::civil::Date;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, FromQueryResult, IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::{
    dimensions::{self, Dimension, Link},
    entities::{actor, country, genre, language, movie, movie_actor, movie_genre, movie_language},
    error::{AppError, AppResult},
    models::{
        CountryView, MovieCreateRequest, MovieDetail, MovieListItem, MovieListResponse,
        MovieUpdateRequest, NamedView,
    },
    pagination::{self, PageQuery, PageWindow},
};

/// How far ahead of today a release date may be.
pub const RELEASE_WINDOW_DAYS: i64 = 365;

pub const LIST_PATH: &str = "/movies/";

#[derive(Clone)]
pub struct MovieService {
    db: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct MovieListRow {
    id: i32,
    name: String,
    date: String,
    score: f64,
    overview: String,
}

impl MovieService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, query: PageQuery) -> AppResult<MovieListResponse> {
        let query = query.validate()?;
        let total_items = movie::Entity::find().count(&self.db).await?;

        let window = pagination::paginate(total_items, query.page(), query.per_page());
        let window = window.ensure_valid().inspect_err(|_| {
            debug!(page = window.page, total_pages = window.total_pages, "page out of range");
        })?;

        let rows = movie::Entity::find()
            .select_only()
            .columns([
                movie::Column::Id,
                movie::Column::Name,
                movie::Column::Date,
                movie::Column::Score,
                movie::Column::Overview,
            ])
            .order_by_desc(movie::Column::Id)
            .offset(window.offset)
            .limit(window.per_page)
            .into_model::<MovieListRow>()
            .all(&self.db)
            .await?;

        let movies = rows
            .into_iter()
            .map(|r| -> AppResult<MovieListItem> {
                Ok(MovieListItem {
                    id: r.id,
                    name: r.name,
                    date: r.date.parse()?,
                    score: r.score,
                    overview: r.overview,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(MovieListResponse {
            movies,
            prev_page: window.has_prev().then(|| page_link(&window, window.page - 1)),
            next_page: window.has_next().then(|| page_link(&window, window.page + 1)),
            total_pages: window.total_pages,
            total_items: window.total_items,
        })
    }

    pub async fn get(&self, id: i32) -> AppResult<MovieDetail> {
        let found = movie::Entity::find_by_id(id).one(&self.db).await?.ok_or(AppError::NotFound)?;
        hydrate(&self.db, found).await
    }

    pub async fn create(&self, req: MovieCreateRequest, today: Date) -> AppResult<MovieDetail> {
        check_release_date(req.date, today)?;
        let req = normalize_create(req)?;
        check_score(req.score)?;
        check_amount("budget", req.budget)?;
        check_amount("revenue", req.revenue)?;

        let txn = self.db.begin().await?;

        if find_by_name_date(&txn, &req.name, req.date, None).await?.is_some() {
            debug!(name = %req.name, date = %req.date, "duplicate movie rejected");
            return Err(AppError::DuplicateMovie { name: req.name, date: req.date });
        }

        let country_id = dimensions::resolve(&txn, Dimension::Country, &req.country).await?;

        let created = movie::ActiveModel {
            id: NotSet,
            name: Set(req.name.clone()),
            date: Set(req.date.to_string()),
            score: Set(req.score),
            overview: Set(req.overview),
            status: Set(req.status),
            budget: Set(req.budget),
            revenue: Set(req.revenue),
            country_id: Set(country_id),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::from_movie_write(e, &req.name, req.date))?;

        for (link, names) in
            Link::ALL.into_iter().zip([&req.genres, &req.actors, &req.languages])
        {
            for name in names {
                let target = dimensions::resolve(&txn, link.dimension(), name).await?;
                link.attach(&txn, created.id, target).await?;
            }
        }

        let detail = hydrate(&txn, created).await?;
        txn.commit().await?;

        info!(movie_id = detail.id, name = %detail.name, "created movie");
        Ok(detail)
    }

    pub async fn update(&self, id: i32, patch: MovieUpdateRequest, today: Date) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let existing = movie::Entity::find_by_id(id).one(&txn).await?.ok_or(AppError::NotFound)?;

        if let Some(date) = patch.date {
            check_release_date(date, today)?;
        }
        if let Some(score) = patch.score {
            check_score(score)?;
        }
        if let Some(budget) = patch.budget {
            check_amount("budget", budget)?;
        }
        if let Some(revenue) = patch.revenue {
            check_amount("revenue", revenue)?;
        }
        let name = patch.name.as_deref().map(required_name).transpose()?;

        if patch.is_empty() {
            return Ok(());
        }

        let effective_name = name.clone().unwrap_or_else(|| existing.name.clone());
        let effective_date = match patch.date {
            Some(date) => date,
            None => existing.date.parse()?,
        };

        if (name.is_some() || patch.date.is_some())
            && find_by_name_date(&txn, &effective_name, effective_date, Some(id)).await?.is_some()
        {
            debug!(
                movie_id = id,
                name = %effective_name,
                date = %effective_date,
                "duplicate movie rejected"
            );
            return Err(AppError::DuplicateMovie { name: effective_name, date: effective_date });
        }

        let mut active = existing.into_active_model();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(date) = patch.date {
            active.date = Set(date.to_string());
        }
        if let Some(score) = patch.score {
            active.score = Set(score);
        }
        if let Some(overview) = patch.overview {
            active.overview = Set(overview);
        }
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        if let Some(budget) = patch.budget {
            active.budget = Set(budget);
        }
        if let Some(revenue) = patch.revenue {
            active.revenue = Set(revenue);
        }

        active
            .update(&txn)
            .await
            .map_err(|e| AppError::from_movie_write(e, &effective_name, effective_date))?;
        txn.commit().await?;

        info!(movie_id = id, "updated movie");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let existing = movie::Entity::find_by_id(id).one(&txn).await?.ok_or(AppError::NotFound)?;

        let mut links = 0;
        for link in Link::ALL {
            links += link.detach_all(&txn, id).await?;
        }
        existing.delete(&txn).await?;
        txn.commit().await?;

        info!(movie_id = id, links, "deleted movie");
        Ok(())
    }
}

fn page_link(window: &PageWindow, page: u64) -> String {
    format!("{LIST_PATH}?page={page}&per_page={}", window.per_page)
}

pub fn today() -> Date {
    jiff::Zoned::now().date()
}

pub fn check_release_date(date: Date, today: Date) -> AppResult<()> {
    let latest = today.checked_add(jiff::Span::new().days(RELEASE_WINDOW_DAYS))?;
    if date > latest { Err(AppError::InvalidDate) } else { Ok(()) }
}

pub fn check_score(score: f64) -> AppResult<()> {
    if (0.0..=100.0).contains(&score) { Ok(()) } else { Err(AppError::InvalidScore) }
}

fn check_amount(field: &str, value: f64) -> AppResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AppError::invalid(format!("{field} must be greater than or equal to 0")))
    }
}

fn required_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::invalid("name must not be empty"));
    }
    Ok(name.to_string())
}

/// Trims names, upper-cases the country code and drops repeated association
/// names while keeping the first occurrence in place.
fn normalize_create(mut req: MovieCreateRequest) -> AppResult<MovieCreateRequest> {
    req.name = required_name(&req.name)?;

    let code = req.country.trim().to_uppercase();
    if code.chars().count() != 3 {
        return Err(AppError::invalid("country must be a 3-letter code"));
    }
    req.country = code;

    for (field, names) in [
        ("genres", &mut req.genres),
        ("actors", &mut req.actors),
        ("languages", &mut req.languages),
    ] {
        let mut seen = Vec::with_capacity(names.len());
        for raw in names.drain(..) {
            let name = raw.trim().to_string();
            if name.is_empty() {
                return Err(AppError::invalid(format!("{field} must not contain empty names")));
            }
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        *names = seen;
    }

    Ok(req)
}

async fn find_by_name_date<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    date: Date,
    exclude_id: Option<i32>,
) -> AppResult<Option<movie::Model>> {
    let mut query = movie::Entity::find()
        .filter(movie::Column::Name.eq(name))
        .filter(movie::Column::Date.eq(date.to_string()));
    if let Some(id) = exclude_id {
        query = query.filter(movie::Column::Id.ne(id));
    }
    Ok(query.one(conn).await?)
}

async fn hydrate<C: ConnectionTrait>(conn: &C, m: movie::Model) -> AppResult<MovieDetail> {
    let country = country::Entity::find_by_id(m.country_id).one(conn).await?.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("movie {} references missing country", m.id))
    })?;

    let genres = m
        .find_related(genre::Entity)
        .order_by_asc(movie_genre::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(|g| NamedView { id: g.id, name: g.name })
        .collect();

    let actors = m
        .find_related(actor::Entity)
        .order_by_asc(movie_actor::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(|a| NamedView { id: a.id, name: a.name })
        .collect();

    let languages = m
        .find_related(language::Entity)
        .order_by_asc(movie_language::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(|l| NamedView { id: l.id, name: l.name })
        .collect();

    Ok(MovieDetail {
        id: m.id,
        date: m.date.parse()?,
        name: m.name,
        score: m.score,
        overview: m.overview,
        status: m.status,
        budget: m.budget,
        revenue: m.revenue,
        country: CountryView::from(country),
        genres,
        actors,
        languages,
    })
}
