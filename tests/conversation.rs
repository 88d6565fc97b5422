mod common;

use serde_json::json;

#[tokio::test]
async fn create_update_and_list_conversations() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let user = app.create_user("talker@example.com").await;
    let base = format!("/users/{}/conversations", user.id);

    let response = app.post(&user, &base, json!({ "title": "Leg day" })).await;
    assert_eq!(201, response.status().as_u16());
    let created: serde_json::Value = response.json().await.unwrap();
    assert_eq!("Leg day", created["title"]);
    assert_eq!(true, created["is_active"]);
    assert_eq!(user.id, created["user_id"].as_i64().unwrap());
    let item = format!("{base}/{}", created["id"]);

    let fetched: serde_json::Value = app.get(&user, &item).await.json().await.unwrap();
    assert_eq!(created, fetched);

    let response = app.put(&user, &item, json!({ "is_active": false })).await;
    assert_eq!(200, response.status().as_u16());
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!("Leg day", updated["title"]);
    assert_eq!(false, updated["is_active"]);

    let second = app.create_conversation(&user, "Cardio plan").await;
    app.post(
        &user,
        &format!("{base}/{second}/messages"),
        json!({ "content": "Plan ready", "message_type": "system" }),
    )
    .await;

    let listed: Vec<serde_json::Value> = app.get(&user, &base).await.json().await.unwrap();
    assert_eq!(2, listed.len());
    assert_eq!(second, listed[0]["id"].as_i64().unwrap());
    assert_eq!("Plan ready", listed[0]["last_message"]);
    assert!(listed[1].get("last_message").is_none());
}

#[tokio::test]
async fn blank_or_long_titles_are_rejected() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let user = app.create_user("talker@example.com").await;
    let base = format!("/users/{}/conversations", user.id);

    for body in [json!({ "title": "" }), json!({ "title": "x".repeat(256) }), json!({})] {
        let response = app.post(&user, &base, body).await;
        assert_eq!(400, response.status().as_u16());
    }
}

#[tokio::test]
async fn conversations_of_other_users_are_isolated() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let first = app.create_user("first@example.com").await;
    let second = app.create_user("second@example.com").await;
    let cid = app.create_conversation(&second, "Private").await;

    // addressing a foreign conversation under one's own user id
    let response = app
        .get(&first, &format!("/users/{}/conversations/{}", first.id, cid))
        .await;
    assert_eq!(404, response.status().as_u16());

    let response = app
        .delete(&first, &format!("/users/{}/conversations/{}", first.id, cid))
        .await;
    assert_eq!(404, response.status().as_u16());

    // addressing another user's id
    let response = app
        .get(&first, &format!("/users/{}/conversations/{}", second.id, cid))
        .await;
    assert_eq!(403, response.status().as_u16());

    let response = app
        .get(&second, &format!("/users/{}/conversations/{}", second.id, cid))
        .await;
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn deleting_conversation_removes_messages() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let user = app.create_user("talker@example.com").await;
    let cid = app.create_conversation(&user, "Short lived").await;
    let base = format!("/users/{}/conversations/{}", user.id, cid);

    let message: serde_json::Value = app
        .post(
            &user,
            &format!("{base}/messages"),
            json!({ "content": "Welcome", "message_type": "system" }),
        )
        .await
        .json()
        .await
        .unwrap();

    let response = app.delete(&user, &base).await;
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(cid, body["deleted_id"].as_i64().unwrap());
    assert_eq!(cid, body["id"].as_i64().unwrap());
    assert_eq!("Short lived", body["title"]);

    let response = app
        .get(&user, &format!("{base}/messages/{}", message["id"]))
        .await;
    assert_eq!(404, response.status().as_u16());

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();
    assert_eq!(0, remaining);
}
