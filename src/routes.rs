use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{Ack, MovieCreateRequest, MovieDetail, MovieListResponse, MovieUpdateRequest},
    movies,
    pagination::PageQuery,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/movies/", get(list_movies).post(create_movie))
        .route("/movies/{id}/", get(get_movie).patch(update_movie).delete(delete_movie))
        .with_state(state)
}

fn movie_id(id: i32) -> AppResult<i32> {
    if id < 1 {
        return Err(AppError::invalid("movie id must be greater than or equal to 1"));
    }
    Ok(id)
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PageQuery>,
) -> AppResult<Json<MovieListResponse>> {
    Ok(Json(state.movies.list(q).await?))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MovieCreateRequest>,
) -> AppResult<(StatusCode, Json<MovieDetail>)> {
    let detail = state.movies.create(req, movies::today()).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<MovieDetail>> {
    Ok(Json(state.movies.get(movie_id(id)?).await?))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(patch): Json<MovieUpdateRequest>,
) -> AppResult<Json<Ack>> {
    state.movies.update(movie_id(id)?, patch, movies::today()).await?;
    Ok(Json(Ack { detail: "Movie updated successfully." }))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.movies.delete(movie_id(id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{db::connect_in_memory, movies::MovieService};

    async fn app() -> Router {
        let movies = MovieService::new(connect_in_memory().await);
        router(Arc::new(AppState { movies }))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value =
            if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    fn heat() -> Value {
        json!({
            "name": "Heat",
            "date": "1995-12-15",
            "score": 83,
            "overview": "A group of professional bank robbers feel the heat from police.",
            "status": "Released",
            "budget": 60000000,
            "revenue": 187436818,
            "country": "USA",
            "genres": ["Crime", "Drama"],
            "actors": ["Al Pacino", "Robert De Niro"],
            "languages": ["English", "Spanish"]
        })
    }

    #[tokio::test]
    async fn movie_lifecycle_over_http() {
        let app = app().await;

        let (status, created) = send(&app, Method::POST, "/movies/", Some(heat())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["country"]["code"], "USA");
        assert_eq!(created["genres"][1]["name"], "Drama");
        assert_eq!(created["status"], "Released");
        let id = created["id"].as_i64().unwrap();

        let (status, fetched) = send(&app, Method::GET, &format!("/movies/{id}/"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["actors"][0]["name"], "Al Pacino");

        let (status, ack) =
            send(&app, Method::PATCH, &format!("/movies/{id}/"), Some(json!({"score": 42}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["detail"], "Movie updated successfully.");

        let (_, fetched) = send(&app, Method::GET, &format!("/movies/{id}/"), None).await;
        assert_eq!(fetched["score"], 42.0);
        assert_eq!(fetched["name"], "Heat");

        let (status, body) = send(&app, Method::DELETE, &format!("/movies/{id}/"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, body) = send(&app, Method::GET, &format!("/movies/{id}/"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Movie with the given ID was not found.");
    }

    #[tokio::test]
    async fn business_errors_have_distinct_statuses() {
        let app = app().await;

        let (status, _) = send(&app, Method::POST, "/movies/", Some(heat())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, Method::POST, "/movies/", Some(heat())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["detail"],
            "A movie with the name 'Heat' and release date '1995-12-15' already exists."
        );

        let mut future = heat();
        future["date"] = json!("2999-01-01");
        let (status, _) = send(&app, Method::POST, "/movies/", Some(future)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, Method::PATCH, "/movies/1/", Some(json!({"score": 150}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, Method::PATCH, "/movies/77/", Some(json!({"score": 1}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, "/movies/77/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, "/movies/0/", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn list_endpoint_pages_and_bounds() {
        let app = app().await;

        let (status, empty) = send(&app, Method::GET, "/movies/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(empty["movies"], json!([]));
        assert_eq!(empty["total_pages"], 0);

        for year in 2001..2004 {
            let mut movie = heat();
            movie["date"] = json!(format!("{year}-05-01"));
            let (status, _) = send(&app, Method::POST, "/movies/", Some(movie)).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, page) = send(&app, Method::GET, "/movies/?page=1&per_page=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["movies"].as_array().unwrap().len(), 2);
        assert_eq!(page["movies"][0]["date"], "2003-05-01");
        assert!(page["movies"][0].get("genres").is_none());
        assert_eq!(page["next_page"], "/movies/?page=2&per_page=2");
        assert_eq!(page["prev_page"], Value::Null);
        assert_eq!(page["total_items"], 3);

        let (status, body) = send(&app, Method::GET, "/movies/?page=3&per_page=2", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "No movies found");

        let (status, _) = send(&app, Method::GET, "/movies/?per_page=50", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        for uri in ["/movies/?page=-1", "/movies/?page=0", "/movies/?per_page=-3"] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
            assert!(body["detail"].is_string());
        }
    }
}
