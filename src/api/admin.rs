//! `/api/admin/*`. Every handler takes [`AdminCaller`](super::AdminCaller) first, so the
//! allow-list check runs before any path, body, or store access.

mod categories;
mod coursework;
mod reports;
mod tutors;
mod users;

use super::AppState;
use axum::Router;
use axum::routing::{get, post};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(users::list_users))
        .route(
            "/api/admin/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/api/admin/subscriptions", get(users::list_subscriptions))
        .route(
            "/api/admin/subscriptions/{id}",
            get(users::get_subscription).put(users::update_subscription),
        )
        .route(
            "/api/admin/tutors",
            get(tutors::list_tutors).post(tutors::create_tutor),
        )
        .route(
            "/api/admin/tutors/{tutor_id}",
            get(tutors::get_tutor)
                .put(tutors::update_tutor)
                .delete(tutors::delete_tutor),
        )
        .route(
            "/api/admin/tutors/{tutor_id}/knowledge",
            post(tutors::add_knowledge),
        )
        .route(
            "/api/admin/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/api/admin/categories/{category_id}",
            get(categories::get_category)
                .put(categories::rename_category)
                .delete(categories::delete_category),
        )
        .route(
            "/api/admin/coursework-categories",
            get(coursework::list_coursework_categories)
                .post(coursework::create_coursework_category),
        )
        .route(
            "/api/admin/coursework",
            get(coursework::list_templates).post(coursework::create_template),
        )
        .route(
            "/api/admin/coursework/{template_id}",
            get(coursework::get_template)
                .put(coursework::update_template)
                .delete(coursework::delete_template),
        )
        .route("/api/admin/messages", get(reports::recent_messages))
        .route("/api/admin/ai-outputs", get(reports::recent_ai_outputs))
        .route("/api/admin/stats", get(reports::stats))
        .route("/api/admin/analytics", get(reports::analytics))
        .route("/api/admin/recent-activity", get(reports::recent_activity))
}
