use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use fake::{
    faker::{internet::en::SafeEmail, name::en::Name},
    Fake,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use parkslot_api::{app, middleware::auth::Claims, ApiState};
use parkslot_core::{
    billing::SessionBilling,
    models::{
        slot::{NewParkingSlot, ParkingSlot},
        user::{NewUser, Role, User},
    },
    registry,
    store::{memory::MemoryStore, ParkingStore, UserStore},
};

pub const TEST_SECRET: &str = "parkslot-test-secret";
pub const TEST_RATE: f64 = 0.15;

/// A server wired to a fresh in-memory store.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub server: TestServer,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let server = server_for(store.clone());
        Self { store, server }
    }

    pub async fn user_with_role(&self, role: Role) -> (User, String) {
        let user = self
            .store
            .insert_user(&NewUser {
                name: Name().fake(),
                email: SafeEmail().fake(),
                role,
                password_hash: None,
            })
            .await
            .unwrap();
        let token = token_for(&user);
        (user, token)
    }

    pub async fn admin(&self) -> (User, String) {
        self.user_with_role(Role::Admin).await
    }

    pub async fn user(&self) -> (User, String) {
        self.user_with_role(Role::User).await
    }

    pub async fn slot(&self, number: &str) -> ParkingSlot {
        registry::create_slot(
            self.store.as_ref(),
            NewParkingSlot {
                slot_number: number.to_string(),
                location: "Level 1".to_string(),
                slot_type: "COMPACT".to_string(),
            },
        )
        .await
        .unwrap()
    }
}

pub fn server_for(store: Arc<dyn ParkingStore>) -> TestServer {
    let billing = SessionBilling::new(TEST_RATE).unwrap();
    let state = Arc::new(ApiState::new(store, billing, TEST_SECRET));
    TestServer::new(app(state)).unwrap()
}

pub fn sign(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn claims_for(user: &User) -> Claims {
    Claims {
        id: user.id,
        role: user.role,
        email: user.email.clone(),
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
    }
}

pub fn token_for(user: &User) -> String {
    sign(&claims_for(user), TEST_SECRET)
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}
