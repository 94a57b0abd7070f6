use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

// Above the 5 MiB upload cap so oversized files reach the handler and get
// a proper TooLarge response instead of a transport-level rejection.
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    // The admin console may be hosted elsewhere.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clients poll these endpoints; intermediaries must not cache them.
    let api = Router::new()
        .route(
            "/about",
            get(handlers::get_about)
                .put(handlers::merge_about)
                .post(handlers::mutate_about)
                .delete(handlers::delete_about_item),
        )
        .route(
            "/posts",
            get(handlers::list_posts)
                .post(handlers::create_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route(
            "/messages",
            get(handlers::list_messages)
                .post(handlers::create_message)
                .delete(handlers::delete_message),
        )
        .route(
            "/subscribe",
            get(handlers::list_subscribers)
                .post(handlers::subscribe)
                .delete(handlers::delete_subscriber),
        )
        .route(
            "/contact",
            get(handlers::list_contacts)
                .post(handlers::create_contact)
                .delete(handlers::delete_contact),
        )
        .route(
            "/settings",
            get(handlers::get_settings).post(handlers::merge_settings),
        )
        .route(
            "/admin",
            get(handlers::get_admin)
                .put(handlers::update_admin)
                .post(handlers::admin_action),
        )
        .route(
            "/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .merge(api)
        .route("/uploads/*path", get(handlers::serve_upload))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
