//! Test database helper utilities
//!
//! Connects to the Postgres instance named by `TEST_DATABASE_URL`, runs the
//! migrations and wires a full `ServiceFactory` over it. Tests that need a
//! live database skip themselves when the variable is unset, so the
//! pure-logic suite still runs everywhere.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use letz_engine::config::Settings;
use letz_engine::database::DatabaseService;
use letz_engine::models::event::{CreateEventRequest, Event, EventType};
use letz_engine::models::user::{CreateUserRequest, User};
use letz_engine::services::ServiceFactory;

pub struct TestDatabase {
    pub pool: PgPool,
    pub database: DatabaseService,
    pub services: ServiceFactory,
}

impl TestDatabase {
    /// Connect to the test database, or None when `TEST_DATABASE_URL` is unset
    pub async fn connect() -> Option<Self> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;

        let pool = PgPool::connect(&url)
            .await
            .expect("failed to connect to the test database");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("failed to run migrations");

        let database = DatabaseService::new(pool.clone());
        let services = ServiceFactory::with_log_dispatcher(Settings::default(), database.clone());

        Some(Self {
            pool,
            database,
            services,
        })
    }

    /// Remove all mutable data; the seeded achievement catalog stays
    pub async fn cleanup(&self) {
        for table in [
            "user_achievements",
            "event_participants",
            "event_admins",
            "recurring_events",
            "events",
            "friendships",
            "users",
        ] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&self.pool)
                .await
                .expect("failed to clean test table");
        }
    }

    /// Create a user with generated unique identity fields
    pub async fn create_user(&self, first_name: &str) -> User {
        let tag = Uuid::new_v4().simple().to_string();
        self.database
            .users
            .create(CreateUserRequest {
                email: format!("{}-{}@example.com", first_name.to_lowercase(), &tag[..8]),
                username: format!("{}_{}", first_name.to_lowercase(), &tag[..8]),
                first_name: first_name.to_string(),
                last_name: "Tester".to_string(),
                bio: None,
            })
            .await
            .expect("failed to create test user")
    }

    /// Create an event a week out with the given capacity and approval policy
    pub async fn create_event(
        &self,
        organizer_id: i64,
        max_participants: Option<i32>,
        requires_approval: bool,
    ) -> Event {
        let start = Utc::now() + Duration::weeks(1);
        self.services
            .event_service
            .create_event(
                organizer_id,
                CreateEventRequest {
                    title: "Dinner at the lake".to_string(),
                    description: None,
                    event_type: EventType::Dinner,
                    start_date_time: start,
                    end_date_time: Some(start + Duration::hours(3)),
                    location: "Lakeside".to_string(),
                    address: None,
                    latitude: None,
                    longitude: None,
                    max_participants,
                    is_private: false,
                    requires_approval,
                },
            )
            .await
            .expect("failed to create test event")
    }

    /// Count rows in a table
    pub async fn count_records(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .expect("failed to count records")
    }
}
