mod common;

use axum::http::{header, Method, StatusCode};
use bikeshop_api::{entities::work_order, errors::ServiceError};
use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::EntityTrait;
use serde_json::{json, Value};

use common::{response_json, TestApp, OTHER_BIKE_ID, SEEDED_BIKE_ID, SEEDED_MECHANIC_ID};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, hour, 0, 0).unwrap()
}

async fn stored(app: &TestApp, id: i32) -> Option<work_order::Model> {
    work_order::Entity::find_by_id(id)
        .one(app.state.db.as_ref())
        .await
        .expect("query work order")
}

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .expect("list response")
        .iter()
        .map(|o| o["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn create_assigns_id_and_stamps_initiation_time() {
    let app = TestApp::new().await;
    let before = Utc::now();

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/work-orders",
            Some(json!({ "description": "Flat tire", "bikeId": SEEDED_BIKE_ID })),
        )
        .await;
    let after = Utc::now();

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("location header");

    let body = response_json(response).await;
    let id = body["id"].as_i64().expect("assigned id") as i32;
    assert_eq!(location, format!("/api/v1/work-orders/{}", id));
    assert_eq!(body["description"], "Flat tire");
    assert_eq!(body["bikeId"], SEEDED_BIKE_ID);
    assert!(body["dateCompleted"].is_null());
    assert!(body["userProfileId"].is_null());

    let saved = stored(&app, id).await.expect("persisted");
    assert!(saved.date_initiated >= before && saved.date_initiated <= after);
    assert!(saved.date_completed.is_none());
}

#[tokio::test]
async fn create_ignores_caller_supplied_dates_and_id() {
    let app = TestApp::new().await;
    let before = Utc::now();

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/work-orders",
            Some(json!({
                "id": 999,
                "description": "Brake bleed",
                "bikeId": SEEDED_BIKE_ID,
                "userProfileId": SEEDED_MECHANIC_ID,
                "dateInitiated": "2001-01-01T00:00:00Z",
                "dateCompleted": "2001-01-02T00:00:00Z"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let id = body["id"].as_i64().unwrap() as i32;
    assert_ne!(id, 999);

    let saved = stored(&app, id).await.unwrap();
    assert!(saved.date_initiated >= before);
    assert!(saved.date_completed.is_none());
    assert_eq!(saved.user_profile_id, Some(SEEDED_MECHANIC_ID));
}

#[tokio::test]
async fn create_with_unknown_bike_is_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/work-orders",
            Some(json!({ "description": "Ghost bike", "bikeId": 4242 })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        work_order::Entity::find()
            .all(app.state.db.as_ref())
            .await
            .unwrap()
            .len(),
        0
    );
}

#[tokio::test]
async fn list_incomplete_excludes_completed_and_joins_details() {
    let app = TestApp::new().await;
    let open = app
        .insert_work_order("Tune up", Some(SEEDED_MECHANIC_ID), at(9), None)
        .await;
    app.insert_work_order("Done already", None, at(8), Some(at(10)))
        .await;

    let response = app
        .request_authenticated(Method::GET, "/api/v1/work-orders/incomplete", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let list = response_json(response).await;
    assert_eq!(ids(&list), vec![open.id as i64]);

    let first = &list[0];
    assert_eq!(first["bike"]["id"], SEEDED_BIKE_ID);
    assert_eq!(first["bike"]["owner"]["name"], "Grace Hopper");
    assert_eq!(first["bike"]["bikeType"]["name"], "Road");
    assert_eq!(first["userProfile"]["firstName"], "Linus");
}

#[tokio::test]
async fn list_incomplete_orders_oldest_first_then_assigned_first() {
    let app = TestApp::new().await;
    let late = app.insert_work_order("Late", Some(SEEDED_MECHANIC_ID), at(12), None).await;
    let tie_unassigned = app.insert_work_order("Tie unassigned", None, at(9), None).await;
    let tie_assigned = app
        .insert_work_order("Tie assigned", Some(SEEDED_MECHANIC_ID), at(9), None)
        .await;
    let early = app.insert_work_order("Early", None, at(7), None).await;

    let response = app
        .request_authenticated(Method::GET, "/api/v1/work-orders/incomplete", None)
        .await;
    let list = response_json(response).await;

    assert_eq!(
        ids(&list),
        vec![
            early.id as i64,
            tie_assigned.id as i64,
            tie_unassigned.id as i64,
            late.id as i64
        ]
    );
    assert!(list[2]["userProfile"].is_null());
}

#[tokio::test]
async fn update_changes_only_editable_fields() {
    let app = TestApp::new().await;
    let original = app
        .insert_work_order("Squeaky chain", None, at(9), Some(at(11)))
        .await;

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/work-orders/{}", original.id),
            Some(json!({
                "id": original.id,
                "description": "Replace chain",
                "bikeId": OTHER_BIKE_ID,
                "userProfileId": SEEDED_MECHANIC_ID,
                "dateInitiated": "2030-01-01T00:00:00Z",
                "dateCompleted": null
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let saved = stored(&app, original.id).await.unwrap();
    assert_eq!(saved.description, "Replace chain");
    assert_eq!(saved.bike_id, OTHER_BIKE_ID);
    assert_eq!(saved.user_profile_id, Some(SEEDED_MECHANIC_ID));
    assert_eq!(saved.date_initiated, original.date_initiated);
    assert_eq!(saved.date_completed, original.date_completed);
}

#[tokio::test]
async fn update_with_mismatched_id_leaves_record_unchanged() {
    let app = TestApp::new().await;
    let original = app.insert_work_order("Wobbly wheel", None, at(9), None).await;

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/work-orders/{}", original.id),
            Some(json!({
                "id": original.id + 1,
                "description": "Changed",
                "bikeId": SEEDED_BIKE_ID
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"], "Bad Request");

    assert_eq!(stored(&app, original.id).await.unwrap(), original);
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::PUT,
            "/api/v1/work-orders/404",
            Some(json!({ "id": 404, "description": "Nope", "bikeId": SEEDED_BIKE_ID })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn complete_removes_order_from_incomplete_list() {
    let app = TestApp::new().await;

    let created = app
        .request_authenticated(
            Method::POST,
            "/api/v1/work-orders",
            Some(json!({ "description": "Flat tire", "bikeId": SEEDED_BIKE_ID })),
        )
        .await;
    let id = response_json(created).await["id"].as_i64().unwrap();

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/work-orders/{}/complete", id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let list = response_json(
        app.request_authenticated(Method::GET, "/api/v1/work-orders/incomplete", None)
            .await,
    )
    .await;
    assert!(!ids(&list).contains(&id));
}

#[tokio::test]
async fn complete_again_overwrites_completion_time() {
    let app = TestApp::new().await;
    let original = app
        .insert_work_order("Headset", None, at(9), Some(at(10)))
        .await;

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/work-orders/{}/complete", original.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let saved = stored(&app, original.id).await.unwrap();
    let completed = saved.date_completed.expect("still complete");
    assert!(completed > at(10));
    assert!(completed <= Utc::now() + Duration::seconds(1));
    assert_eq!(saved.date_initiated, original.date_initiated);
}

#[tokio::test]
async fn complete_unknown_id_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(Method::PUT, "/api/v1/work-orders/77/complete", None)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_record_and_lookup_is_not_found() {
    let app = TestApp::new().await;
    let original = app.insert_work_order("Bar tape", None, at(9), None).await;

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/work-orders/{}", original.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert!(stored(&app, original.id).await.is_none());
    let lookup = app.state.work_order_service().find_work_order(original.id).await;
    assert!(matches!(lookup, Err(ServiceError::NotFound(_))));

    let again = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/work-orders/{}", original.id),
            None,
        )
        .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn every_work_order_route_requires_a_token() {
    let app = TestApp::new().await;
    let existing = app.insert_work_order("Untouched", None, at(9), None).await;
    let item = format!("/api/v1/work-orders/{}", existing.id);
    let complete = format!("{}/complete", item);
    let body = json!({ "id": existing.id, "description": "x", "bikeId": SEEDED_BIKE_ID });

    let cases = [
        (Method::GET, "/api/v1/work-orders/incomplete", None),
        (Method::POST, "/api/v1/work-orders", Some(body.clone())),
        (Method::PUT, item.as_str(), Some(body)),
        (Method::PUT, complete.as_str(), None),
        (Method::DELETE, item.as_str(), None),
    ];

    for (method, uri, payload) in cases {
        let response = app.request(method.clone(), uri, payload, None).await;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{} {} should require auth",
            method,
            uri
        );
    }

    assert_eq!(stored(&app, existing.id).await.unwrap(), existing);
}

#[tokio::test]
async fn invalid_or_expired_tokens_are_rejected() {
    let app = TestApp::new().await;
    let expired = common::encode_token(&app.state.config, Duration::hours(-2));

    for token in ["not-a-jwt", expired.as_str()] {
        let response = app
            .request(
                Method::GET,
                "/api/v1/work-orders/incomplete",
                None,
                Some(token),
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = response_json(response).await;
        assert!(body["error"]["code"].as_str().unwrap().starts_with("AUTH_"));
    }
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(Method::PUT, "/api/v1/work-orders/31337/complete", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let header_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("request id header");

    let body = response_json(response).await;
    assert_eq!(body["request_id"], header_id);
}
