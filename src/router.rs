use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::db::Store;
use crate::handlers::{admin, catalog, faculty, session};
use crate::middleware::{require_admin, require_faculty, require_session};

/// Shared state handed to every route: the injected store and the name of
/// the cookie that may carry a session token.
#[derive(Clone)]
pub struct GatewayState<S> {
    pub store: S,
    pub session_cookie: Arc<str>,
}

impl<S: Store> GatewayState<S> {
    pub fn new(store: S, session_cookie: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            session_cookie: session_cookie.into(),
        }
    }
}

/// Build the gateway router. Each group carries exactly one authorization
/// layer; routes outside the groups are public.
pub fn gateway_router<S: Store>(state: GatewayState<S>) -> Router {
    let admin_routes = Router::new()
        .route("/stats", get(admin::stats::<S>))
        .route("/users", get(admin::faculty_users::<S>))
        .route("/users/{id}/approve", post(admin::approve_user::<S>))
        .route("/cleanup", delete(admin::cleanup::<S>))
        .route("/attendance", get(admin::recent_attendance::<S>))
        .route("/results", get(admin::recent_results::<S>))
        .route("/examination", get(admin::examination::<S>))
        .route("/publicsignup", get(admin::public_signups::<S>))
        .route("/datesheets", get(admin::datesheets::<S>))
        .route("/datesheets/{id}", get(admin::datesheet::<S>))
        .route(
            "/students/{id}/attendance",
            get(admin::student_attendance::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin::<S>,
        ));

    let faculty_routes = Router::new()
        .route("/assignments/list", get(faculty::list_assignments::<S>))
        .route("/assignments", post(faculty::create_assignment::<S>))
        .route("/webauthn/reset", post(faculty::reset_webauthn::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_faculty::<S>,
        ));

    let session_routes = Router::new()
        .route("/me", get(session::me))
        .route("/session", delete(session::logout::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session::<S>,
        ));

    Router::new()
        .route("/health", get(catalog::health))
        .route("/subjects", get(catalog::subjects_by_courses::<S>))
        .route("/publicsignup", post(catalog::create_public_signup::<S>))
        .nest("/admin", admin_routes)
        .nest("/faculty", faculty_routes)
        .nest("/auth", session_routes)
        .with_state(state)
}
