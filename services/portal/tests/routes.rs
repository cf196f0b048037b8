//! Drives the portal router end to end against the recording doubles.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Duration;
use manager_portal_core::domain::SessionUser;
use manager_portal_core::graphql::documents;
use manager_portal_core::ports::PortError;
use manager_portal_core::testing::{RecordingAssetStore, RecordingGateway};
use portal_lib::config::Config;
use portal_lib::web::{build_router, session::SessionSigner, state::AppState};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const SECRET: &str = "integration-test-session-secret-0123456789";

struct Harness {
    gateway: Arc<RecordingGateway>,
    assets: Arc<RecordingAssetStore>,
    state: Arc<AppState>,
}

impl Harness {
    fn new() -> Self {
        let gateway = Arc::new(RecordingGateway::new());
        let assets = Arc::new(RecordingAssetStore::succeeding("img-1"));
        let config = Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            graphql_api_url: "http://backend.invalid/api/graphql".to_string(),
            session_secret: SECRET.to_string(),
            session_ttl_hours: 1,
            api_token: None,
            upload_dir: std::env::temp_dir(),
            asset_base_url: None,
            cors_origin: "http://localhost:3000".to_string(),
            log_level: tracing::Level::INFO,
        };
        let state = Arc::new(AppState {
            config: Arc::new(config),
            gateway: gateway.clone(),
            assets: assets.clone(),
            sessions: SessionSigner::new(SECRET, Duration::hours(1)),
        });
        Self {
            gateway,
            assets,
            state,
        }
    }

    fn app(&self) -> Router {
        build_router(self.state.clone())
    }

    fn cookie_for(&self, role: &str) -> String {
        let user = SessionUser {
            id: "u1".into(),
            name: "Mia".into(),
            email: "mia@example.com".into(),
            role: role.into(),
        };
        let token = self.state.sessions.issue(&user).unwrap();
        format!("session={token}")
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.app().oneshot(request).await.unwrap()
    }
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn review(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "user": { "id": "c1", "name": format!("customer {id}") },
        "rating": 4,
        "content": "fine",
        "moderationStatus": status,
        "isAnonymous": "false",
        "createdAt": "2024-06-01T09:00:00Z"
    })
}

/// Serves the manager's reviews from shared state and deletes from it.
fn script_reviews(gateway: &RecordingGateway, reviews: Vec<Value>) {
    let store = Arc::new(Mutex::new(reviews));
    let listed = store.clone();
    gateway
        .respond_with(&documents::MANAGER_REVIEWS, move |_| {
            let reviews = listed.lock().unwrap().clone();
            Ok(json!({ "user": { "businesses": [ { "reviews": reviews } ] } }))
        })
        .respond_with(&documents::DELETE_REVIEW, move |vars| {
            let id = vars["where"]["id"].as_str().unwrap_or_default().to_string();
            store.lock().unwrap().retain(|r| r["id"] != id.as_str());
            Ok(json!({ "deleteReview": { "id": id } }))
        });
}

fn complaint(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "user": { "id": "c1", "name": "Cy" },
        "subject": "Cold coffee",
        "status": status,
        "isAnonymous": false,
        "createdAt": "2024-06-02T09:00:00Z"
    })
}

/// Serves every product as belonging to `business_id`, and the manager as owning `b1`.
fn script_products(gateway: &RecordingGateway, business_id: &'static str) {
    gateway
        .respond_with(&documents::PRODUCT, move |vars| {
            Ok(json!({ "product": {
                "id": vars["where"]["id"], "name": "Mug", "business": { "id": business_id },
                "images": [], "reviews": [], "complaints": []
            } }))
        })
        .respond(
            &documents::MANAGER_BUSINESS_NAMES,
            json!({ "user": { "businesses": [ { "id": "b1", "name": "Beans" } ] } }),
        );
}

//=========================================================================================
// Session Guard
//=========================================================================================

#[tokio::test]
async fn anonymous_visitors_are_sent_to_sign_in() {
    let harness = Harness::new();

    let response = harness.send(get("/dashboard", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/signin");
    assert!(harness.gateway.calls().is_empty());
}

#[tokio::test]
async fn customers_are_sent_to_unauthorized_without_any_fetch() {
    let harness = Harness::new();
    let cookie = harness.cookie_for("customer");

    for path in ["/reviews", "/business-profile", "/products", "/account"] {
        let response = harness.send(get(path, Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/unauthorized", "{path}");
    }
    assert!(harness.gateway.calls().is_empty());
}

#[tokio::test]
async fn forged_cookies_count_as_no_session() {
    let harness = Harness::new();

    let response = harness
        .send(get("/reviews", Some("session=eyJpZCI6InUxIn0.AAAA")))
        .await;

    assert_eq!(location(&response), "/auth/signin");
}

#[tokio::test]
async fn session_probe_reports_status() {
    let harness = Harness::new();

    let anonymous = json_body(harness.send(get("/api/session", None)).await).await;
    assert_eq!(anonymous, json!({ "status": "unauthenticated" }));

    let cookie = harness.cookie_for("manager");
    let signed_in = json_body(harness.send(get("/api/session", Some(&cookie))).await).await;
    assert_eq!(signed_in["status"], "authenticated");
    assert_eq!(signed_in["user"]["role"], "manager");
}

//=========================================================================================
// Sign-in
//=========================================================================================

#[tokio::test]
async fn managers_sign_in_and_receive_a_session_cookie() {
    let harness = Harness::new();
    harness.gateway.respond(
        &documents::AUTHENTICATE_USER,
        json!({ "authenticateUserWithPassword": {
            "__typename": "UserAuthenticationWithPasswordSuccess",
            "item": { "id": "u1", "email": "mia@example.com", "name": "Mia", "role": "manager" }
        } }),
    );

    let response = harness
        .send(with_json(
            "POST",
            "/auth/signin",
            None,
            json!({ "email": "mia@example.com", "password": "secret" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));

    let token = cookie.split(';').next().unwrap().to_string();
    let probe = json_body(harness.send(get("/api/session", Some(&token))).await).await;
    assert_eq!(probe["user"]["id"], "u1");
}

#[tokio::test]
async fn non_managers_are_refused_a_session() {
    let harness = Harness::new();
    harness.gateway.respond(
        &documents::AUTHENTICATE_USER,
        json!({ "authenticateUserWithPassword": {
            "__typename": "UserAuthenticationWithPasswordSuccess",
            "item": { "id": "c1", "email": "c@example.com", "name": "Cy", "role": "customer" }
        } }),
    );

    let response = harness
        .send(with_json(
            "POST",
            "/auth/signin",
            None,
            json!({ "email": "c@example.com", "password": "secret" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

//=========================================================================================
// Reviews
//=========================================================================================

#[tokio::test]
async fn review_list_shows_labels_in_fetch_order() {
    let harness = Harness::new();
    script_reviews(
        &harness.gateway,
        vec![review("r1", "0"), review("r2", "2"), review("r3", "1")],
    );
    let cookie = harness.cookie_for("manager");

    let body = json_body(harness.send(get("/reviews", Some(&cookie))).await).await;

    let labels: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["statusLabel"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Approved", "Pending Approval", "Denied"]);
    assert_eq!(body[0]["stars"], "⭐⭐⭐⭐");
}

#[tokio::test]
async fn confirmed_mass_delete_removes_only_the_selection() {
    let harness = Harness::new();
    script_reviews(
        &harness.gateway,
        vec![review("r1", "0"), review("r2", "2"), review("r3", "1")],
    );
    let cookie = harness.cookie_for("manager");

    let response = harness
        .send(with_json(
            "POST",
            "/reviews/delete",
            Some(&cookie),
            json!({ "ids": ["r2"], "confirmed": true }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(
        harness.gateway.calls_to(&documents::DELETE_REVIEW),
        vec![json!({ "where": { "id": "r2" } })]
    );
    assert_eq!(body["result"]["outcome"], "completed");
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unconfirmed_mass_delete_sends_nothing() {
    let harness = Harness::new();
    script_reviews(&harness.gateway, vec![review("r1", "0")]);
    let cookie = harness.cookie_for("manager");

    let body = json_body(
        harness
            .send(with_json(
                "POST",
                "/reviews/delete",
                Some(&cookie),
                json!({ "ids": ["r1"] }),
            ))
            .await,
    )
    .await;

    assert_eq!(body["result"]["outcome"], "cancelled");
    assert!(harness.gateway.calls_to(&documents::DELETE_REVIEW).is_empty());
}

#[tokio::test]
async fn unknown_moderation_token_is_rejected_before_any_call() {
    let harness = Harness::new();
    let cookie = harness.cookie_for("manager");

    let response = harness
        .send(with_json(
            "PUT",
            "/review/r1/status",
            Some(&cookie),
            json!({ "status": "Approved" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness.gateway.calls().is_empty());
}

#[tokio::test]
async fn review_status_change_returns_the_refetched_review() {
    let harness = Harness::new();
    script_reviews(&harness.gateway, vec![review("r1", "2")]);
    harness
        .gateway
        .respond(
            &documents::UPDATE_REVIEW,
            json!({ "updateReview": { "id": "r1", "moderationStatus": "0" } }),
        )
        .respond(&documents::REVIEW, json!({ "review": review("r1", "0") }));
    let cookie = harness.cookie_for("manager");

    let response = harness
        .send(with_json(
            "PUT",
            "/review/r1/status",
            Some(&cookie),
            json!({ "status": "0" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["statusLabel"], "Approved");
    assert_eq!(
        harness.gateway.calls_to(&documents::UPDATE_REVIEW),
        vec![json!({ "where": { "id": "r1" }, "data": { "moderationStatus": "0" } })]
    );
    assert_eq!(harness.gateway.calls_to(&documents::REVIEW).len(), 1);
}

#[tokio::test]
async fn reviews_of_other_managers_are_not_found() {
    let harness = Harness::new();
    script_reviews(&harness.gateway, vec![review("r1", "2")]);
    let cookie = harness.cookie_for("manager");

    let detail = harness.send(get("/review/r-foreign", Some(&cookie))).await;
    let moderate = harness
        .send(with_json(
            "PUT",
            "/review/r-foreign/status",
            Some(&cookie),
            json!({ "status": "1" }),
        ))
        .await;
    let reply = harness
        .send(with_json(
            "POST",
            "/review/r-foreign/replies",
            Some(&cookie),
            json!({ "content": "Thanks!" }),
        ))
        .await;

    assert_eq!(detail.status(), StatusCode::NOT_FOUND);
    assert_eq!(moderate.status(), StatusCode::NOT_FOUND);
    assert_eq!(reply.status(), StatusCode::NOT_FOUND);
    assert!(harness.gateway.calls_to(&documents::REVIEW).is_empty());
    assert!(harness.gateway.calls_to(&documents::UPDATE_REVIEW).is_empty());
    assert!(harness
        .gateway
        .calls_to(&documents::CREATE_REVIEW_REPLY)
        .is_empty());
}

#[tokio::test]
async fn empty_reply_is_a_bad_request() {
    let harness = Harness::new();
    let cookie = harness.cookie_for("manager");

    let response = harness
        .send(with_json(
            "POST",
            "/complaint/k1/replies",
            Some(&cookie),
            json!({ "content": "   " }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness.gateway.calls().is_empty());
}

//=========================================================================================
// Complaints
//=========================================================================================

#[tokio::test]
async fn confirmed_complaint_mass_delete_keeps_going_past_failures() {
    let harness = Harness::new();
    harness
        .gateway
        .respond(
            &documents::MANAGER_COMPLAINTS,
            json!({ "user": { "businesses": [ { "complaints": [
                complaint("k1", "1"), complaint("k2", "0")
            ] } ] } }),
        )
        .respond_once(
            &documents::DELETE_COMPLAINT,
            Err(PortError::Api(vec!["complaint is locked".to_string()])),
        )
        .respond(
            &documents::DELETE_COMPLAINT,
            json!({ "deleteComplaint": { "id": "k2" } }),
        );
    let cookie = harness.cookie_for("manager");

    let body = json_body(
        harness
            .send(with_json(
                "POST",
                "/complaints/delete",
                Some(&cookie),
                json!({ "ids": ["k1", "k2"], "confirmed": true }),
            ))
            .await,
    )
    .await;

    assert_eq!(
        harness.gateway.calls_to(&documents::DELETE_COMPLAINT),
        vec![
            json!({ "where": { "id": "k1" } }),
            json!({ "where": { "id": "k2" } })
        ]
    );
    assert_eq!(body["result"]["outcome"], "completed");
    assert_eq!(body["result"]["deleted"], json!(["k2"]));
    assert_eq!(body["result"]["failed"][0]["id"], "k1");
    assert_eq!(body["items"][0]["statusLabel"], "Unresolved");
}

#[tokio::test]
async fn complaints_of_other_managers_cannot_be_resolved() {
    let harness = Harness::new();
    harness.gateway.respond(
        &documents::MANAGER_COMPLAINTS,
        json!({ "user": { "businesses": [ { "complaints": [ complaint("k1", "1") ] } ] } }),
    );
    let cookie = harness.cookie_for("manager");

    let response = harness
        .send(with_json(
            "PUT",
            "/complaint/k-foreign/status",
            Some(&cookie),
            json!({ "status": "0" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(harness
        .gateway
        .calls_to(&documents::UPDATE_COMPLAINT)
        .is_empty());
}

//=========================================================================================
// Dashboard
//=========================================================================================

#[tokio::test]
async fn dashboard_counts_across_businesses() {
    let harness = Harness::new();
    harness.gateway.respond(
        &documents::MANAGER_DASHBOARD,
        json!({ "user": { "businesses": [
            {
                "products": [ { "id": "p1" }, { "id": "p2" } ],
                "jobListings": [ { "id": "j1" } ],
                "reviews": [ { "moderationStatus": "2" }, { "moderationStatus": "0" } ],
                "complaints": [ { "status": "1" } ]
            },
            {
                "products": [],
                "jobListings": [],
                "reviews": [ { "moderationStatus": "2" } ],
                "complaints": [ { "status": "0" }, { "status": "1" } ]
            }
        ] } }),
    );
    let cookie = harness.cookie_for("manager");

    let body = json_body(harness.send(get("/dashboard", Some(&cookie))).await).await;

    assert_eq!(
        body,
        json!({
            "businesses": 2,
            "products": 2,
            "jobListings": 1,
            "reviews": 3,
            "pendingReviews": 2,
            "complaints": 3,
            "unresolvedComplaints": 2
        })
    );
}

//=========================================================================================
// Business Profile
//=========================================================================================

#[tokio::test]
async fn business_patch_sends_only_the_edited_field() {
    let harness = Harness::new();
    harness
        .gateway
        .respond(
            &documents::MANAGER_BUSINESS_PROFILES,
            json!({ "user": { "businesses": [ {
                "id": "b1", "name": "Beans", "industry": "Food", "website": "https://beans.example"
            } ] } }),
        )
        .respond(
            &documents::UPDATE_BUSINESS,
            json!({ "updateBusiness": { "id": "b1" } }),
        );
    let cookie = harness.cookie_for("manager");

    let response = harness
        .send(with_json(
            "PATCH",
            "/business-profile",
            Some(&cookie),
            json!({ "industry": "Retail" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["changed"], true);
    assert_eq!(
        harness.gateway.calls_to(&documents::UPDATE_BUSINESS),
        vec![json!({ "where": { "id": "b1" }, "data": { "industry": "Retail" } })]
    );
}

#[tokio::test]
async fn unknown_panel_is_a_bad_request() {
    let harness = Harness::new();
    let cookie = harness.cookie_for("manager");

    let response = harness
        .send(with_json(
            "PATCH",
            "/business-profile/everything",
            Some(&cookie),
            json!({ "name": "x" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

//=========================================================================================
// Products and Images
//=========================================================================================

fn multipart(parts: &[(&str, Option<&str>, &str)]) -> (String, String) {
    let boundary = "portal-test-boundary";
    let mut body = String::new();
    for (name, file_name, content) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match file_name {
            Some(file_name) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            )),
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    (format!("multipart/form-data; boundary={boundary}"), body)
}

fn upload_request(uri: &str, cookie: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
    let (content_type, body) = multipart(parts);
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn image_upload_before_the_product_exists_uploads_nothing() {
    let harness = Harness::new();
    let cookie = harness.cookie_for("manager");

    let response = harness
        .send(upload_request(
            "/add-product/images",
            &cookie,
            &[("file", Some("mug.png"), "not really a png")],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness.assets.uploads().is_empty());
    assert!(harness.gateway.calls().is_empty());
}

#[tokio::test]
async fn image_upload_with_product_id_stores_and_links() {
    let harness = Harness::new();
    script_products(&harness.gateway, "b1");
    harness.gateway.respond(
        &documents::LINK_PRODUCT_IMAGE,
        json!({ "updateProduct": { "id": "p1" } }),
    );
    let cookie = harness.cookie_for("manager");

    let response = harness
        .send(upload_request(
            "/add-product/images",
            &cookie,
            &[("productId", None, "p1"), ("file", Some("mug.png"), "bytes")],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response).await,
        json!({ "assetId": "img-1", "productId": "p1" })
    );
    assert_eq!(
        harness.assets.uploads(),
        vec![("p1".to_string(), "mug.png".to_string())]
    );
}

#[tokio::test]
async fn products_of_other_businesses_are_not_found() {
    let harness = Harness::new();
    harness
        .gateway
        .respond(
            &documents::PRODUCT,
            json!({ "product": {
                "id": "p9", "name": "Rival mug", "business": { "id": "b-other" },
                "images": [], "reviews": [], "complaints": []
            } }),
        )
        .respond(
            &documents::MANAGER_BUSINESS_NAMES,
            json!({ "user": { "businesses": [ { "id": "b1", "name": "Beans" } ] } }),
        );
    let cookie = harness.cookie_for("manager");

    let response = harness.send(get("/edit-product/p9", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn products_cannot_move_to_a_foreign_business() {
    let harness = Harness::new();
    script_products(&harness.gateway, "b1");
    let cookie = harness.cookie_for("manager");

    let response = harness
        .send(with_json(
            "PATCH",
            "/edit-product/p1",
            Some(&cookie),
            json!({ "business": "b-foreign" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(harness.gateway.calls_to(&documents::UPDATE_PRODUCT).is_empty());
}

#[tokio::test]
async fn images_cannot_be_attached_to_foreign_products() {
    let harness = Harness::new();
    script_products(&harness.gateway, "b-other");
    let cookie = harness.cookie_for("manager");

    for uri in ["/add-product/images", "/api/upload"] {
        let response = harness
            .send(upload_request(
                uri,
                &cookie,
                &[("productId", None, "p-foreign"), ("file", Some("mug.png"), "bytes")],
            ))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
    assert!(harness.assets.uploads().is_empty());
    assert!(harness
        .gateway
        .calls_to(&documents::LINK_PRODUCT_IMAGE)
        .is_empty());
}

#[tokio::test]
async fn upload_endpoint_stores_for_owned_products() {
    let harness = Harness::new();
    script_products(&harness.gateway, "b1");
    let cookie = harness.cookie_for("manager");

    let response = harness
        .send(upload_request(
            "/api/upload",
            &cookie,
            &[("productId", None, "p1"), ("file", Some("mug.png"), "bytes")],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await, json!({ "id": "img-1" }));
    assert_eq!(
        harness.assets.uploads(),
        vec![("p1".to_string(), "mug.png".to_string())]
    );
}

#[tokio::test]
async fn product_list_carries_average_rating() {
    let harness = Harness::new();
    harness.gateway.respond(
        &documents::MANAGER_PRODUCTS,
        json!({ "user": { "businesses": [ { "products": [ {
            "id": "p1", "name": "Mug",
            "images": [ { "id": "i1", "file": { "url": "/images/mug.png" } } ],
            "reviews": [ { "rating": 5 }, { "rating": 4 } ]
        } ] } ] } }),
    );
    let cookie = harness.cookie_for("manager");

    let body = json_body(harness.send(get("/products", Some(&cookie))).await).await;

    assert_eq!(body[0]["averageRating"], json!(4.5));
    assert_eq!(body[0]["imageUrls"], json!(["/images/mug.png"]));
}

//=========================================================================================
// Job Listings
//=========================================================================================

#[tokio::test]
async fn non_numeric_salary_is_rejected() {
    let harness = Harness::new();
    harness.gateway.respond(
        &documents::MANAGER_JOB_LISTINGS,
        json!({ "user": { "businesses": [ { "jobListings": [ {
            "id": "j1", "title": "Cook", "salary": 38000
        } ] } ] } }),
    );
    let cookie = harness.cookie_for("manager");

    let response = harness
        .send(with_json(
            "PATCH",
            "/job-listings/j1",
            Some(&cookie),
            json!({ "salary": "plenty" }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness
        .gateway
        .calls_to(&documents::UPDATE_JOB_LISTING)
        .is_empty());
}

#[tokio::test]
async fn job_listing_mass_delete_ignores_foreign_ids() {
    let harness = Harness::new();
    harness
        .gateway
        .respond(
            &documents::MANAGER_JOB_LISTINGS,
            json!({ "user": { "businesses": [ { "jobListings": [
                { "id": "j1", "title": "Cook" }, { "id": "j2", "title": "Barista" }
            ] } ] } }),
        )
        .respond(
            &documents::DELETE_JOB_LISTING,
            json!({ "deleteJobListing": { "id": "j1" } }),
        );
    let cookie = harness.cookie_for("manager");

    let body = json_body(
        harness
            .send(with_json(
                "POST",
                "/job-listings/delete",
                Some(&cookie),
                json!({ "ids": ["j1", "j-foreign"], "confirmed": true }),
            ))
            .await,
    )
    .await;

    assert_eq!(
        harness.gateway.calls_to(&documents::DELETE_JOB_LISTING),
        vec![json!({ "where": { "id": "j1" } })]
    );
    assert_eq!(body["result"]["requested"], 1);
}
