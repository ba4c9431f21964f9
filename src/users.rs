use crate::http::method::Method;
use crate::http::server::Server;
use std::sync::Arc;
use store::UserStore;

pub mod handlers;
pub mod store;

pub const COLLECTION: &str = "/api/users/";
pub const MEMBER: &str = "/api/users/<id:int>";

/// Registers the user routes. Member routes come first so a numeric path can
/// never be taken by a collection route.
pub fn register_routes(server: &mut Server, store: Arc<UserStore>) -> anyhow::Result<()> {
    let s = Arc::clone(&store);
    server.add_handler(Method::GET, MEMBER, Box::new(move |r| handlers::get(r, &s)))?;

    let s = Arc::clone(&store);
    server.add_handler(Method::DELETE, MEMBER, Box::new(move |r| handlers::delete(r, &s)))?;

    let s = Arc::clone(&store);
    server.add_handler(Method::PUT, MEMBER, Box::new(move |r| handlers::update(r, &s)))?;

    let s = Arc::clone(&store);
    server.add_handler(Method::GET, COLLECTION, Box::new(move |r| handlers::list(r, &s)))?;

    let s = store;
    server.add_handler(Method::POST, COLLECTION, Box::new(move |r| handlers::create(r, &s)))?;

    Ok(())
}
