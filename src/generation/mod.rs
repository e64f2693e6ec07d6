use crate::state::AppState;
use axum::Router;

pub mod adapter;
pub mod handlers;
pub mod normalize;
pub mod provider;
pub mod snapshot;

pub fn router() -> Router<AppState> {
    handlers::generate_routes()
}
