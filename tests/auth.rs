mod common;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

fn google_claims(email: &str, verified: bool) -> serde_json::Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "sub": "110169484474386276334",
        "email": email,
        "email_verified": verified,
        "name": "Casey Runner",
        "iss": "https://accounts.google.com",
        "aud": common::GOOGLE_CLIENT_ID,
        "iat": now - 5,
        "exp": now + 3600,
    })
}

fn sign_google(key: &[u8], claims: &serde_json::Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(common::GOOGLE_KEY_ID.to_string());
    encode(&header, claims, &EncodingKey::from_rsa_pem(key).unwrap()).unwrap()
}

fn google_token(email: &str, verified: bool) -> String {
    sign_google(common::GOOGLE_SIGNING_KEY, &google_claims(email, verified))
}

fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("trackbot_auth_token="))
        .map(str::to_string)
}

#[tokio::test]
async fn google_login_sets_session_cookie_and_registers_user() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };

    let response = app
        .client
        .post(app.url("/auth/google"))
        .json(&json!({ "googleToken": google_token("casey@example.com", true) }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let cookie = session_cookie(&response).expect("session cookie is set");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=300"));

    let user: serde_json::Value = response.json().await.unwrap();
    assert_eq!("casey@example.com", user["email"]);

    let stored = trackbot::db::user::fetch_by_email(&app.db_pool, "casey@example.com")
        .await
        .unwrap()
        .expect("user was registered");
    assert_eq!(user["id"].as_i64(), Some(stored.id));

    // a second login reuses the same account
    let again = app
        .client
        .post(app.url("/auth/google"))
        .json(&json!({ "googleToken": google_token("casey@example.com", true) }))
        .send()
        .await
        .unwrap();
    let again: serde_json::Value = again.json().await.unwrap();
    assert_eq!(user["id"], again["id"]);
}

#[tokio::test]
async fn session_cookie_authenticates_me() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let user = app.create_user("me@example.com").await;
    let token = app.token_for(&user);

    let response = app
        .client
        .get(app.url("/auth/me"))
        .header(
            reqwest::header::COOKIE,
            format!("trackbot_auth_token={}", token),
        )
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(user.id, body["user_id"].as_i64().unwrap());
    assert_eq!("me@example.com", body["email"]);
}

#[tokio::test]
async fn unverified_or_garbage_google_token_is_rejected() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };

    for token in [
        google_token("casey@example.com", false),
        "not-a-token".to_string(),
    ] {
        let response = app
            .client
            .post(app.url("/auth/google"))
            .json(&json!({ "googleToken": token }))
            .send()
            .await
            .unwrap();
        assert_eq!(401, response.status().as_u16());
        assert!(session_cookie(&response).is_none());
    }
}

#[tokio::test]
async fn forged_google_tokens_do_not_sign_in() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };

    let mut no_expiry = google_claims("mallory@example.com", true);
    no_expiry.as_object_mut().unwrap().remove("exp");
    let mut other_audience = google_claims("mallory@example.com", true);
    other_audience["aud"] = json!("someone-elses-client");

    // {"alg":"none","typ":"JWT"} . {"sub":"1098"} . no signature
    let unsigned = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJzdWIiOiIxMDk4In0.".to_string();

    for token in [
        sign_google(common::UNTRUSTED_SIGNING_KEY, &google_claims("mallory@example.com", true)),
        sign_google(common::GOOGLE_SIGNING_KEY, &no_expiry),
        sign_google(common::GOOGLE_SIGNING_KEY, &other_audience),
        unsigned,
    ] {
        let response = app
            .client
            .post(app.url("/auth/google"))
            .json(&json!({ "googleToken": token }))
            .send()
            .await
            .unwrap();
        assert_eq!(401, response.status().as_u16());
        assert!(session_cookie(&response).is_none());
    }

    let registered = trackbot::db::user::fetch_by_email(&app.db_pool, "mallory@example.com")
        .await
        .unwrap();
    assert!(registered.is_none());
}

#[tokio::test]
async fn missing_google_token_is_invalid_input() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };

    let response = app
        .client
        .post(app.url("/auth/google"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn logout_expires_cookie() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };

    let response = app
        .client
        .post(app.url("/auth/logout"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let cookie = session_cookie(&response).expect("cookie is cleared");
    assert!(cookie.starts_with("trackbot_auth_token=;"));
    assert!(cookie.contains("Max-Age=-1") || cookie.contains("Max-Age=0"));
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json!({ "success": true }), body);
}

#[tokio::test]
async fn requests_without_valid_session_are_unauthorized() {
    let app = match common::spawn_app().await {
        Some(app) => app,
        None => return,
    };
    let user = app.create_user("nobody@example.com").await;

    let anonymous = app
        .client
        .get(app.url(&format!("/users/{}/workouts", user.id)))
        .send()
        .await
        .unwrap();
    assert_eq!(401, anonymous.status().as_u16());

    let forged = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth("eyJhbGciOiJIUzI1NiJ9.eyJ1c2VyX2lkIjoxfQ.AAAA")
        .send()
        .await
        .unwrap();
    assert_eq!(401, forged.status().as_u16());
    let body: serde_json::Value = forged.json().await.unwrap();
    assert_eq!("Unauthorized", body["error"]);
}
