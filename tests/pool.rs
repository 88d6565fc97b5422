mod common;

use trackbot::db;

#[tokio::test]
async fn closed_pool_is_replaced_and_requests_keep_working() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let user = app.create_user("pool@example.com").await;
    let path = format!("/users/{}/workouts", user.id);
    assert_eq!(200, app.get(&user, &path).await.status().as_u16());

    let stale = app.pool_manager.get().await.expect("pool is available");
    stale.close().await;
    assert!(stale.is_closed());

    let fresh = app.pool_manager.get().await.expect("pool is recreated");
    assert!(!fresh.is_closed());
    db::pool::ping(&fresh).await.expect("recreated pool answers");

    // handlers ask the manager for the pool, so they pick up the replacement
    assert_eq!(200, app.get(&user, &path).await.status().as_u16());
    let created = app.post(&user, &path, serde_json::json!({})).await;
    assert_eq!(201, created.status().as_u16());
}

#[tokio::test]
async fn health_check_recovers_after_pool_close() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };

    app.pool_manager.get().await.unwrap().close().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!("healthy", body["components"]["database"]["status"]);
}
