pub mod auth;
pub mod dashboard;
pub mod gallery;
pub mod pages;
pub mod settings;
pub mod stories;
pub mod theme;

use crate::AppState;
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/stories", story_routes())
        .nest("/api/pages", page_routes())
        .nest("/api/gallery", gallery_routes())
        .nest("/api/auth", auth_routes())
        .nest("/api/theme", theme_routes())
        .route("/api/profile", get(settings::get_profile))
        .route("/api/playlist", get(settings::get_playlist))
        .nest("/api/admin", admin_routes())
        .with_state(state)
}

pub fn story_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stories::get_stories))
        .route("/{id}", get(stories::get_one_story))
}

pub fn page_routes() -> Router<AppState> {
    Router::new().route("/our-story", get(pages::get_our_story))
}

pub fn gallery_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(gallery::get_categories))
        .route("/media", get(gallery::get_media))
        .route("/highlights", get(gallery::get_highlights))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-in", post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
        .route("/me", get(auth::me))
}

pub fn theme_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(theme::get_theme))
        .route("/mode", put(theme::set_mode))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/stories",
            get(stories::admin_list_stories).post(stories::create_story),
        )
        .route(
            "/stories/{id}",
            get(stories::admin_get_story)
                .put(stories::update_story)
                .delete(stories::delete_story),
        )
        .route("/stories/{id}/publish", post(stories::publish_story))
        .route("/gallery/categories", post(gallery::create_category))
        .route(
            "/gallery/categories/{id}",
            delete(gallery::delete_category),
        )
        .route(
            "/gallery/categories/{id}/home",
            post(gallery::toggle_show_on_home),
        )
        .route("/gallery/media", post(gallery::add_media))
        .route(
            "/gallery/media/{id}",
            patch(gallery::update_caption).delete(gallery::delete_media),
        )
        .route(
            "/profile",
            get(settings::admin_get_profile).put(settings::update_profile),
        )
        .route("/playlist", put(settings::update_playlist))
        .route("/pages/our-story", put(pages::update_our_story))
        .route("/users", get(settings::list_users))
        .route("/personas", get(settings::list_personas))
        .route(
            "/personas/{identity_id}",
            put(settings::assign_persona).delete(settings::unassign_persona),
        )
        .route("/dashboard", get(dashboard::get_dashboard))
}
