mod handlers;
mod routes;

pub use handlers::POST_AUTH_PATH;
pub use routes::create_router;
