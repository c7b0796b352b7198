//! Get-or-create resolution of the shared lookup rows a movie points at
//! (country, genre, actor, language), plus the link tables that attach the
//! many-to-many ones to a movie.
//!
//! Everything here takes the caller's connection, which during a write is the
//! open transaction, so rows created on the way are rolled back with it.

use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};
use tracing::debug;

use crate::{
    entities::{actor, country, genre, language, movie_actor, movie_genre, movie_language},
    error::{AppError, AppResult},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dimension {
    Country,
    Genre,
    Actor,
    Language,
}

impl Dimension {
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Country => "country",
            Dimension::Genre => "genre",
            Dimension::Actor => "actor",
            Dimension::Language => "language",
        }
    }
}

/// Returns the id of the row keyed by `key` (country code, or name for the
/// other kinds), inserting it first if it does not exist yet.
///
/// Safe to repeat with the same key: the insert ignores a unique-key conflict
/// and the row is always read back by key.
pub async fn resolve<C: ConnectionTrait>(conn: &C, kind: Dimension, key: &str) -> AppResult<i32> {
    let found = match kind {
        Dimension::Country => resolve_country(conn, key).await?,
        Dimension::Genre => resolve_genre(conn, key).await?,
        Dimension::Actor => resolve_actor(conn, key).await?,
        Dimension::Language => resolve_language(conn, key).await?,
    };
    found.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("{} '{}' missing after insert", kind.as_str(), key))
    })
}

fn log_created(kind: Dimension, key: &str, rows: u64) {
    if rows > 0 {
        debug!(kind = kind.as_str(), key = %key, "created dimension row");
    }
}

async fn resolve_country<C: ConnectionTrait>(conn: &C, code: &str) -> AppResult<Option<i32>> {
    let find = || country::Entity::find().filter(country::Column::Code.eq(code)).one(conn);

    if let Some(existing) = find().await? {
        return Ok(Some(existing.id));
    }

    let row = country::ActiveModel { id: NotSet, code: Set(code.to_string()), name: Set(None) };
    let rows = country::Entity::insert(row)
        .on_conflict(OnConflict::column(country::Column::Code).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;
    log_created(Dimension::Country, code, rows);

    Ok(find().await?.map(|c| c.id))
}

async fn resolve_genre<C: ConnectionTrait>(conn: &C, name: &str) -> AppResult<Option<i32>> {
    let find = || genre::Entity::find().filter(genre::Column::Name.eq(name)).one(conn);

    if let Some(existing) = find().await? {
        return Ok(Some(existing.id));
    }

    let row = genre::ActiveModel { id: NotSet, name: Set(name.to_string()) };
    let rows = genre::Entity::insert(row)
        .on_conflict(OnConflict::column(genre::Column::Name).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;
    log_created(Dimension::Genre, name, rows);

    Ok(find().await?.map(|g| g.id))
}

async fn resolve_actor<C: ConnectionTrait>(conn: &C, name: &str) -> AppResult<Option<i32>> {
    let find = || actor::Entity::find().filter(actor::Column::Name.eq(name)).one(conn);

    if let Some(existing) = find().await? {
        return Ok(Some(existing.id));
    }

    let row = actor::ActiveModel { id: NotSet, name: Set(name.to_string()) };
    let rows = actor::Entity::insert(row)
        .on_conflict(OnConflict::column(actor::Column::Name).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;
    log_created(Dimension::Actor, name, rows);

    Ok(find().await?.map(|a| a.id))
}

async fn resolve_language<C: ConnectionTrait>(conn: &C, name: &str) -> AppResult<Option<i32>> {
    let find = || language::Entity::find().filter(language::Column::Name.eq(name)).one(conn);

    if let Some(existing) = find().await? {
        return Ok(Some(existing.id));
    }

    let row = language::ActiveModel { id: NotSet, name: Set(name.to_string()) };
    let rows = language::Entity::insert(row)
        .on_conflict(OnConflict::column(language::Column::Name).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;
    log_created(Dimension::Language, name, rows);

    Ok(find().await?.map(|l| l.id))
}

/// The many-to-many associations of a movie, each bound to its link table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Link {
    Genre,
    Actor,
    Language,
}

impl Link {
    pub const ALL: [Link; 3] = [Link::Genre, Link::Actor, Link::Language];

    pub fn dimension(self) -> Dimension {
        match self {
            Link::Genre => Dimension::Genre,
            Link::Actor => Dimension::Actor,
            Link::Language => Dimension::Language,
        }
    }

    pub async fn attach<C: ConnectionTrait>(
        self,
        conn: &C,
        movie_id: i32,
        target_id: i32,
    ) -> AppResult<()> {
        match self {
            Link::Genre => {
                let row = movie_genre::ActiveModel {
                    id: NotSet,
                    movie_id: Set(movie_id),
                    genre_id: Set(target_id),
                };
                movie_genre::Entity::insert(row).exec_without_returning(conn).await?;
            },
            Link::Actor => {
                let row = movie_actor::ActiveModel {
                    id: NotSet,
                    movie_id: Set(movie_id),
                    actor_id: Set(target_id),
                };
                movie_actor::Entity::insert(row).exec_without_returning(conn).await?;
            },
            Link::Language => {
                let row = movie_language::ActiveModel {
                    id: NotSet,
                    movie_id: Set(movie_id),
                    language_id: Set(target_id),
                };
                movie_language::Entity::insert(row).exec_without_returning(conn).await?;
            },
        }
        Ok(())
    }

    /// Removes every link row of `movie_id` in this association.
    pub async fn detach_all<C: ConnectionTrait>(self, conn: &C, movie_id: i32) -> AppResult<u64> {
        let res = match self {
            Link::Genre => {
                movie_genre::Entity::delete_many()
                    .filter(movie_genre::Column::MovieId.eq(movie_id))
                    .exec(conn)
                    .await?
            },
            Link::Actor => {
                movie_actor::Entity::delete_many()
                    .filter(movie_actor::Column::MovieId.eq(movie_id))
                    .exec(conn)
                    .await?
            },
            Link::Language => {
                movie_language::Entity::delete_many()
                    .filter(movie_language::Column::MovieId.eq(movie_id))
                    .exec(conn)
                    .await?
            },
        };
        Ok(res.rows_affected)
    }
}
