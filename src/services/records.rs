//! Record CRUD endpoints
//!
//! One generic router serves every [`Entity`] kind; it is nested under
//! `/patients` and `/students` by the server.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::ValidationError;
use crate::models::{Entity, Identified};
use crate::server::ServerError;
use crate::store::{Repository, SortSpec};

pub fn router<E: Entity>(repo: Arc<Repository<E>>) -> Router {
    Router::new()
        .route("/", get(list_handler::<E>).post(create_handler::<E>))
        .route(
            "/{id}",
            get(get_handler::<E>)
                .put(update_handler::<E>)
                .delete(delete_handler::<E>),
        )
        .with_state(repo)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    sort_by: Option<String>,
    order: Option<String>,
}

/// Whole store keyed by ID, or an ID-carrying array when `sort_by` is given.
async fn list_handler<E: Entity>(
    State(repo): State<Arc<Repository<E>>>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ServerError> {
    let Some(sort_by) = query.sort_by else {
        let store = repo.list().await?;
        return Ok(Json(store).into_response());
    };

    let spec = SortSpec::parse::<E>(&sort_by, query.order.as_deref())?;
    let rows = repo.sorted(&spec).await?;
    let body: Vec<Identified<'_, E>> = rows
        .iter()
        .map(|(id, record)| Identified { id, record })
        .collect();
    Ok(Json(body).into_response())
}

async fn get_handler<E: Entity>(
    State(repo): State<Arc<Repository<E>>>,
    Path(id): Path<String>,
) -> Result<Response, ServerError> {
    let record = repo.get(&id).await?;
    Ok(Json(Identified { id: &id, record: &record }).into_response())
}

/// Body: `{ "id": ..., <required attributes> }`.
async fn create_handler<E: Entity>(
    State(repo): State<Arc<Repository<E>>>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(mut body) = payload?;

    let id = match body.remove("id") {
        Some(Value::String(id)) => id,
        Some(_) => return Err(ValidationError::new("id", "must be a string").into()),
        None => return Err(ValidationError::required("id").into()),
    };
    let fields: E::Fields = serde_json::from_value(Value::Object(body))
        .map_err(|e| ServerError::Payload(e.to_string()))?;

    let record = repo.create(&id, fields).await?;
    Ok((StatusCode::CREATED, Json(Identified { id: &id, record: &record })).into_response())
}

/// Body: a patch; only the attributes present are changed.
async fn update_handler<E: Entity>(
    State(repo): State<Arc<Repository<E>>>,
    Path(id): Path<String>,
    payload: Result<Json<E::Patch>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(patch) = payload?;
    let record = repo.update(&id, patch).await?;
    Ok(Json(Identified { id: &id, record: &record }).into_response())
}

async fn delete_handler<E: Entity>(
    State(repo): State<Arc<Repository<E>>>,
    Path(id): Path<String>,
) -> Result<Response, ServerError> {
    repo.delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })).into_response())
}
