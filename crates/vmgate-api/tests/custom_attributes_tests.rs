//! Custom attribute subcollection integration tests.

mod common;

use axum::http::StatusCode;
use common::{instance_url, TestApp};
use serde_json::json;

const EDIT: &str = "instance_custom_attributes_edit";
const DELETE: &str = "instance_custom_attributes_delete";

fn ca_url(instance_id: u64, id: u64) -> String {
    format!("{}/custom_attributes/{}", instance_url(instance_id), id)
}

#[tokio::test]
async fn test_empty_listing() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    let auth = app.authorize(&[]).await;

    let (status, body) = app
        .get("/api/instances/1/custom_attributes", Some(&auth))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "custom_attributes");
    assert_eq!(body["count"], 0);
    assert_eq!(body["resources"], json!([]));
}

#[tokio::test]
async fn test_listing_and_expanded_listing() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    app.add_custom_attribute(1, 1, "name1", "value1").await;
    app.add_custom_attribute(1, 2, "name2", "value2").await;
    let auth = app.authorize(&[]).await;

    let (_, body) = app
        .get("/api/instances/1/custom_attributes", Some(&auth))
        .await;
    assert_eq!(body["count"], 2);
    assert_eq!(
        body["resources"],
        json!([{"href": ca_url(1, 1)}, {"href": ca_url(1, 2)}])
    );

    let (_, body) = app
        .get("/api/instances/1/custom_attributes?expand=resources", Some(&auth))
        .await;
    assert_eq!(body["resources"][0]["name"], "name1");
    assert_eq!(body["resources"][1]["name"], "name2");
    assert_eq!(body["resources"][1]["section"], "metadata");
}

#[tokio::test]
async fn test_add_without_name_is_bad_request() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    let auth = app.authorize(&[EDIT]).await;

    for body in [
        json!({"action": "add", "resource": {"value": "value1"}}),
        json!({"action": "add", "resources": [{"name": "ok", "value": "1"}, {"value": "value1"}]}),
    ] {
        let (status, response) = app
            .post("/api/instances/1/custom_attributes", Some(&auth), body)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["message"], "Must specify a name");
    }

    let (_, listing) = app
        .get("/api/instances/1/custom_attributes", Some(&auth))
        .await;
    assert_eq!(listing["count"], 0);
}

#[tokio::test]
async fn test_add_attributes() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    let auth = app.authorize(&[EDIT]).await;

    let (status, body) = app
        .post(
            "/api/instances/1/custom_attributes",
            Some(&auth),
            json!({
                "action": "add",
                "resources": [
                    {"name": "name1", "value": "value1"},
                    {"name": "name2", "value": "value2"}
                ]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["name1", "name2"]);

    let mut values: Vec<String> = app
        .stores
        .custom_attributes
        .list_for_instance(1)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.value)
        .collect();
    values.sort();
    assert_eq!(values, vec!["value1", "value2"]);
}

#[tokio::test]
async fn test_add_requires_edit_privilege() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    let auth = app.authorize(&[]).await;

    let (status, _) = app
        .post(
            "/api/instances/1/custom_attributes",
            Some(&auth),
            json!({"action": "add", "resource": {"name": "n", "value": "v"}}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_edit_by_name() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    app.add_custom_attribute(1, 1, "name1", "value1").await;
    let auth = app.authorize(&[EDIT]).await;

    let (status, body) = app
        .post(
            "/api/instances/1/custom_attributes",
            Some(&auth),
            json!({"action": "edit", "name": "name1", "value": "value one"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["value"], "value one");
}

#[tokio::test]
async fn test_edit_by_href() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    app.add_custom_attribute(1, 1, "name1", "value1").await;
    let auth = app.authorize(&[EDIT]).await;

    let (status, body) = app
        .post(
            "/api/instances/1/custom_attributes",
            Some(&auth),
            json!({"action": "edit", "resource": {"href": ca_url(1, 1), "value": "new value1"}}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["value"], "new value1");
}

#[tokio::test]
async fn test_edit_multiple() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    app.add_custom_attribute(1, 1, "name1", "value1").await;
    app.add_custom_attribute(1, 2, "name2", "value2").await;
    let auth = app.authorize(&[EDIT]).await;

    let (_, body) = app
        .post(
            "/api/instances/1/custom_attributes",
            Some(&auth),
            json!({
                "action": "edit",
                "resources": [
                    {"name": "name1", "value": "new value1"},
                    {"name": "name2", "value": "new value2"}
                ]
            }),
        )
        .await;

    assert_eq!(body["results"][0]["value"], "new value1");
    assert_eq!(body["results"][1]["value"], "new value2");
}

#[tokio::test]
async fn test_edit_unknown_attribute_is_not_found() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    let auth = app.authorize(&[EDIT]).await;

    let (status, _) = app
        .post(
            "/api/instances/1/custom_attributes",
            Some(&auth),
            json!({"action": "edit", "name": "ghost", "value": "x"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(
            "/api/instances/1/custom_attributes",
            Some(&auth),
            json!({"action": "edit", "resource": {"value": "x"}}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Must specify a name or href");
}

#[tokio::test]
async fn test_delete_without_role_is_forbidden() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    app.add_custom_attribute(1, 1, "name1", "value1").await;
    let auth = app.authorize(&[EDIT]).await;

    let (status, _) = app
        .post(
            "/api/instances/1/custom_attributes",
            Some(&auth),
            json!({"action": "delete", "resources": [{"href": instance_url(1)}]}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_action() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    app.add_custom_attribute(1, 1, "name1", "value1").await;
    let auth = app.authorize(&[DELETE]).await;

    let (status, body) = app
        .post(
            "/api/instances/1/custom_attributes",
            Some(&auth),
            json!({"action": "delete", "resources": [{"href": ca_url(1, 1)}, {"id": 9}]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["success"], true);
    assert_eq!(body["results"][1]["success"], false);
    assert_eq!(
        body["results"][1]["message"],
        "Couldn't find CustomAttribute with 'id'=9"
    );
    assert!(app
        .stores
        .custom_attributes
        .list_for_instance(1)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_delete_verb() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    app.add_custom_attribute(1, 1, "name1", "value1").await;
    let auth = app.authorize(&[DELETE]).await;

    let (status, body) = app
        .delete("/api/instances/1/custom_attributes/1", Some(&auth))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = app
        .delete("/api/instances/1/custom_attributes/1", Some(&auth))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_show_attribute() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    app.add_instance(2, "db", "ACTIVE").await;
    app.add_custom_attribute(1, 1, "name1", "value1").await;
    let auth = app.authorize(&[]).await;

    let (status, body) = app
        .get("/api/instances/1/custom_attributes/1", Some(&auth))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "1");
    assert_eq!(body["href"], ca_url(1, 1));

    let (status, _) = app
        .get("/api/instances/2/custom_attributes/1", Some(&auth))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
