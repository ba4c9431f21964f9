use crate::http::request::RequestContext;
use crate::http::status::Status;
use crate::http::{Response, bad_request};
use crate::users::store::UserStore;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct UserPayload {
    name: String,
}

fn user_not_found(id: u32) -> Response {
    Response::text(Status::NOT_FOUND, format!("user {} not found", id))
}

/// The router only lets digits through, so the remaining failure is a value
/// too large for an id.
fn path_id(ctx: &RequestContext) -> Result<u32, Response> {
    let raw = ctx
        .get_var("id")
        .ok_or_else(|| bad_request("missing user id"))?;
    raw.parse()
        .map_err(|_| bad_request(format!("invalid user id {:?}", raw)))
}

fn payload_name(ctx: &RequestContext) -> Result<String, Response> {
    let payload: UserPayload = serde_json::from_slice(ctx.body())
        .map_err(|e| bad_request(format!("invalid user payload: {}", e)))?;
    if payload.name.trim().is_empty() {
        return Err(bad_request("name must not be empty"));
    }
    Ok(payload.name)
}

pub fn list(_ctx: &RequestContext, store: &UserStore) -> anyhow::Result<Response> {
    Response::json(Status::OK, &store.list())
}

pub fn get(ctx: &RequestContext, store: &UserStore) -> anyhow::Result<Response> {
    let id = match path_id(ctx) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    match store.get(id) {
        Some(user) => Response::json(Status::OK, &user),
        None => Ok(user_not_found(id)),
    }
}

pub fn create(ctx: &RequestContext, store: &UserStore) -> anyhow::Result<Response> {
    let name = match payload_name(ctx) {
        Ok(name) => name,
        Err(resp) => return Ok(resp),
    };

    let user = store.create(name)?;
    log::debug!("created user {}", user.id);
    Response::json(Status::CREATED, &user)
}

pub fn update(ctx: &RequestContext, store: &UserStore) -> anyhow::Result<Response> {
    let (id, name) = match path_id(ctx).and_then(|id| payload_name(ctx).map(|n| (id, n))) {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };

    match store.update(id, name) {
        Some(user) => Response::json(Status::OK, &user),
        None => Ok(user_not_found(id)),
    }
}

pub fn delete(ctx: &RequestContext, store: &UserStore) -> anyhow::Result<Response> {
    let id = match path_id(ctx) {
        Ok(id) => id,
        Err(resp) => return Ok(resp),
    };

    match store.delete(id) {
        Some(user) => Response::json(Status::OK, &user),
        None => Ok(user_not_found(id)),
    }
}
