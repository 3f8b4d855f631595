//! Seeded test users. Registration flows live outside this service, so tests
//! insert users and their areas directly.

use sqlx::PgPool;
use uuid::Uuid;

pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

/// Insert a user with the given exchange areas and return its bearer token.
pub async fn seed_user(pool: &PgPool, username: &str, areas: &[&str]) -> TestUser {
    let id = Uuid::new_v4();
    let token = format!("test-token-{}", id);

    sqlx::query(
        r#"
        INSERT INTO users (id, username, contact_email, api_token)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(format!("{}@example.com", username))
    .bind(&token)
    .execute(pool)
    .await
    .expect("Failed to seed user");

    for area in areas {
        sqlx::query("INSERT INTO user_locations (user_id, area) VALUES ($1, $2)")
            .bind(id)
            .bind(area)
            .execute(pool)
            .await
            .expect("Failed to seed user location");
    }

    TestUser {
        id,
        username: username.to_string(),
        token,
    }
}

/// Authorization header value for a seeded user.
pub fn bearer(user: &TestUser) -> String {
    format!("Bearer {}", user.token)
}
