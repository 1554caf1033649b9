//! Load balancer subcollection integration tests.

mod common;

use axum::http::StatusCode;
use common::{instance_url, TestApp};

const SHOW: &str = "instance_load_balancers_show";

#[tokio::test]
async fn test_list_load_balancers() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    app.link_load_balancer(1, 7, "public").await;
    app.link_load_balancer(1, 3, "internal").await;
    let auth = app.authorize(&[SHOW]).await;

    let (status, body) = app
        .get("/api/instances/1/load_balancers", Some(&auth))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "load_balancers");
    assert_eq!(body["count"], 2);
    assert_eq!(
        body["resources"][0]["href"],
        format!("{}/load_balancers/3", instance_url(1))
    );
    assert_eq!(
        body["resources"][1]["href"],
        format!("{}/load_balancers/7", instance_url(1))
    );
}

#[tokio::test]
async fn test_list_requires_role() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    let auth = app.authorize(&[]).await;

    let (status, _) = app
        .get("/api/instances/1/load_balancers", Some(&auth))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_show_load_balancer() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    app.link_load_balancer(1, 7, "public").await;
    let auth = app.authorize(&[SHOW]).await;

    let (status, body) = app
        .get("/api/instances/1/load_balancers/7", Some(&auth))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "7");
    assert_eq!(body["name"], "public");
}

#[tokio::test]
async fn test_show_requires_role() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    app.link_load_balancer(1, 7, "public").await;
    let auth = app.authorize(&[]).await;

    let (status, _) = app
        .get("/api/instances/1/load_balancers/7", Some(&auth))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_show_unlinked_load_balancer_is_not_found() {
    let app = TestApp::spawn();
    app.add_instance(1, "web", "ACTIVE").await;
    app.add_instance(2, "db", "ACTIVE").await;
    app.link_load_balancer(2, 7, "other").await;
    let auth = app.authorize(&[SHOW]).await;

    let (status, _) = app
        .get("/api/instances/1/load_balancers/7", Some(&auth))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
