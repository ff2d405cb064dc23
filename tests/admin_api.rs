mod common;

use axum::http::{Method, StatusCode};
use common::{ADMIN, MEMBER, Options, spawn_app};
use serde_json::json;
use tutor_admin::store::NewSubscription;

const ADMIN_READS: &[&str] = &[
    "/api/admin/users",
    "/api/admin/subscriptions",
    "/api/admin/tutors",
    "/api/admin/categories",
    "/api/admin/coursework-categories",
    "/api/admin/coursework",
    "/api/admin/messages",
    "/api/admin/ai-outputs",
    "/api/admin/stats",
    "/api/admin/analytics",
    "/api/admin/recent-activity",
];

#[tokio::test]
async fn test_health() {
    let app = spawn_app(Options::default()).await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_admin_reads_require_identity_and_allow_list() {
    let app = spawn_app(Options::default()).await;

    for uri in ADMIN_READS {
        let (status, body) = app.get(uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "Unauthorized");

        let (status, body) = app.get(uri, Some(MEMBER)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["error"], "Forbidden");

        let (status, _) = app.get(uri, Some(ADMIN)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn test_rejected_writes_do_not_mutate() {
    let app = spawn_app(Options::default()).await;
    let category = app.store.create_category("Math").await.unwrap();

    let attempts = [
        (Method::POST, "/api/admin/categories".to_string(), Some(json!({"name": "Art"}))),
        (
            Method::PUT,
            format!("/api/admin/categories/{}", category.id),
            Some(json!({"name": "Renamed"})),
        ),
        (Method::DELETE, format!("/api/admin/categories/{}", category.id), None),
        (
            Method::POST,
            "/api/admin/coursework".to_string(),
            Some(json!({"name": "Essay", "slug": "essay", "aiPrompt": "Write"})),
        ),
    ];

    for (method, uri, body) in attempts {
        let (status, _) = app.request(method.clone(), &uri, None, body.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");

        let (status, _) = app.request(method.clone(), &uri, Some(MEMBER), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
    }

    let categories = app.store.list_categories().await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Math");
    assert!(app.store.list_templates().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_category_in_use_cannot_be_deleted() {
    let app = spawn_app(Options::default()).await;

    let (status, category) = app
        .post("/api/admin/categories", Some(ADMIN), json!({"name": "  Math  "}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(category["name"], "Math");
    let category_id = category["id"].as_str().unwrap().to_string();

    let (status, tutor) = app
        .post(
            "/api/admin/tutors",
            Some(ADMIN),
            json!({
                "name": "Ada",
                "description": "patient math tutor",
                "instructions": "use simple examples",
                "categoryId": category_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let tutor_id = tutor["id"].as_str().unwrap().to_string();

    let uri = format!("/api/admin/categories/{}", category_id);
    let (status, body) = app.delete(&uri, Some(ADMIN)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot delete category with associated tutors");

    let (status, detail) = app.get(&uri, Some(ADMIN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["tutorsCount"], 1);

    let (status, _) = app
        .delete(&format!("/api/admin/tutors/{}", tutor_id), Some(ADMIN))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.delete(&uri, Some(ADMIN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = app.get(&uri, Some(ADMIN)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_name_is_required() {
    let app = spawn_app(Options::default()).await;
    let (status, body) = app
        .post("/api/admin/categories", Some(ADMIN), json!({"name": "   "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Category name is required");
    assert!(app.store.list_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_tutor_update_and_category_join() {
    let app = spawn_app(Options::default()).await;
    let category = app.store.create_category("Science").await.unwrap();

    let (_, tutor) = app
        .post(
            "/api/admin/tutors",
            Some(ADMIN),
            json!({"name": "Curie", "description": "chemist", "instructions": "be precise"}),
        )
        .await;
    let uri = format!("/api/admin/tutors/{}", tutor["id"].as_str().unwrap());

    let (status, updated) = app
        .put(&uri, Some(ADMIN), json!({"categoryId": category.id, "name": "Marie"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Marie");

    let (_, detail) = app.get(&uri, Some(ADMIN)).await;
    assert_eq!(detail["categoryName"], "Science");
    assert_eq!(detail["description"], "chemist");

    let (_, cleared) = app.put(&uri, Some(ADMIN), json!({"categoryId": ""})).await;
    assert!(cleared["categoryId"].is_null());

    let (status, _) = app
        .put("/api/admin/tutors/missing", Some(ADMIN), json!({"name": "x"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tutor_update_rejects_unknown_category() {
    let app = spawn_app(Options::default()).await;
    let category = app.store.create_category("Science").await.unwrap();
    let (_, tutor) = app
        .post(
            "/api/admin/tutors",
            Some(ADMIN),
            json!({"name": "Curie", "description": "chemist", "instructions": "be precise", "categoryId": category.id.clone()}),
        )
        .await;
    let uri = format!("/api/admin/tutors/{}", tutor["id"].as_str().unwrap());

    let (status, body) = app.put(&uri, Some(ADMIN), json!({"categoryId": "ghost"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown categoryId");

    let (status, _) = app.put(&uri, Some(ADMIN), json!({"name": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, detail) = app.get(&uri, Some(ADMIN)).await;
    assert_eq!(detail["categoryId"], category.id.as_str());
    assert_eq!(detail["name"], "Curie");
}

#[tokio::test]
async fn test_malformed_path_ids_answer_json() {
    let app = spawn_app(Options::default()).await;
    for uri in ["/api/admin/coursework/abc", "/api/admin/subscriptions/abc"] {
        let (status, body) = app.get(uri, Some(ADMIN)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(
            body["error"].as_str().unwrap().starts_with("Invalid path"),
            "{}",
            uri
        );
    }
}

#[tokio::test]
async fn test_knowledge_goes_to_tutor_namespace() {
    let app = spawn_app(Options::default()).await;
    let (_, tutor) = app
        .post(
            "/api/admin/tutors",
            Some(ADMIN),
            json!({"name": "Ada", "description": "math", "instructions": "be kind"}),
        )
        .await;
    let uri = format!(
        "/api/admin/tutors/{}/knowledge",
        tutor["id"].as_str().unwrap()
    );

    let (status, _) = app
        .post(&uri, Some(ADMIN), json!({"content": "Fractions are parts of a whole"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let documents = app.memory.documents.lock().unwrap().clone();
    assert_eq!(
        documents,
        vec![("Ada.txt".to_string(), "Fractions are parts of a whole".to_string())]
    );
}

#[tokio::test]
async fn test_subscription_management() {
    let app = spawn_app(Options::default()).await;
    let created = app
        .store
        .insert_subscription(NewSubscription {
            user_id: "user_7".into(),
            plan: "free".into(),
            credits: 5,
            stripe_status: "inactive".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let (status, user) = app
        .put(
            "/api/admin/users/user_7",
            Some(ADMIN),
            json!({"plan": "monthly", "stripeStatus": "active"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["plan"], "monthly");
    assert_eq!(user["credits"], 5);

    let uri = format!("/api/admin/subscriptions/{}", created.id);
    let (status, sub) = app
        .put(
            &uri,
            Some(ADMIN),
            json!({"credits": 100, "stripeCurrentPeriodEnd": "2030-01-01T00:00:00Z"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sub["credits"], 100);
    assert_eq!(sub["stripeCurrentPeriodEnd"], "2030-01-01T00:00:00+00:00");

    let (status, _) = app
        .put(&uri, Some(ADMIN), json!({"stripeCurrentPeriodEnd": "soon"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stats) = app.get("/api/admin/stats", Some(ADMIN)).await;
    assert_eq!(stats["totalSubscriptions"], 1);
    assert_eq!(stats["activeSubscriptions"], 1);

    let (status, _) = app.delete("/api/admin/users/user_7", Some(ADMIN)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get("/api/admin/users/user_7", Some(ADMIN)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_outputs_feed_activity_and_analytics() {
    let app = spawn_app(Options::default()).await;

    let (status, _) = app
        .post(
            "/api/ai-outputs",
            Some(MEMBER),
            json!({"templateSlug": "essay", "formData": {"topic": "rivers"}, "aiResponse": "Rivers flow."}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, history) = app.get("/api/history", Some(MEMBER)).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["createdBy"], "user_member@example.com");

    let (_, activity) = app.get("/api/admin/recent-activity", Some(ADMIN)).await;
    assert_eq!(activity[0]["type"], "ai_output");

    let (_, analytics) = app.get("/api/admin/analytics", Some(ADMIN)).await;
    assert_eq!(analytics["templateUsage"][0]["template"], "essay");
    assert_eq!(analytics["overview"]["activeUsers"], 1);

    let (_, users) = app.get("/api/admin/users", Some(ADMIN)).await;
    assert!(users.as_array().unwrap().is_empty());
}
