//! Car Listing Page Tests
//!
//! Integration tests for the public listing page.

use std::sync::Arc;

use axum_test::{TestServer, TestServerConfig};

use carlot::db::{CarRepository, Database, NewCar};
use carlot::template::TemplateEngine;
use carlot::web::create_router;
use carlot::web::handlers::AppState;

async fn create_test_server() -> (TestServer, Arc<Database>) {
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let state = AppState::new(
        db.clone(),
        TemplateEngine::with_defaults().expect("Failed to load templates"),
    );

    let config = TestServerConfig {
        save_cookies: true,
        ..TestServerConfig::default()
    };
    let server =
        TestServer::new_with_config(create_router(state), config).expect("Failed to create test server");

    (server, db)
}

#[tokio::test]
async fn test_empty_listing() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/cars").await;
    response.assert_status_ok();
    assert!(response.text().contains("No cars listed yet"));
}

#[tokio::test]
async fn test_listing_shows_cars_newest_first() {
    let (server, db) = create_test_server().await;

    let repo = CarRepository::new(db.pool());
    repo.create(&NewCar::new("Peugeot", "208", 2021, 14500))
        .await
        .unwrap();
    repo.create(&NewCar::new("Renault", "Clio", 2019, 11200))
        .await
        .unwrap();

    let response = server.get("/cars").await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains("Peugeot"));
    assert!(html.contains("Renault"));
    assert!(html.contains("14500 €"));

    // Newest listing comes first in the table
    let renault = html.find("Renault").unwrap();
    let peugeot = html.find("Peugeot").unwrap();
    assert!(renault < peugeot);
}

#[tokio::test]
async fn test_root_serves_the_listing() {
    let (server, db) = create_test_server().await;

    let repo = CarRepository::new(db.pool());
    repo.create(&NewCar::new("Citroën", "C3", 2020, 12900))
        .await
        .unwrap();

    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("Citroën"));
}

#[tokio::test]
async fn test_anonymous_visitor_sees_login_prompt() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/cars").await;
    let html = response.text();
    assert!(html.contains("Log in"));
    assert!(!html.contains("Signed in as"));
}
