//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use room_billing::config::EngineConfig;
use room_billing::models::{CycleInputs, Member, Room, WaterBillingMode};
use room_billing::services::{BillingEngine, MemoryStore, RoomStore};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A presence timestamp with arbitrary time-of-day noise.
pub fn checkin(s: &str) -> DateTime<Utc> {
    date(s).and_hms_opt(9, 30, 0).unwrap().and_utc()
}

/// Engine over a fresh in-memory store with one room.
pub struct TestRoom {
    pub store: Arc<MemoryStore>,
    pub engine: BillingEngine<MemoryStore>,
    pub room_id: Uuid,
}

impl TestRoom {
    pub fn new(mode: WaterBillingMode) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();

        let store = Arc::new(MemoryStore::new());
        let room = Room::new("test room", mode);
        let room_id = room.room_id;
        store.insert_room(room);
        let engine = BillingEngine::new(store.clone(), EngineConfig::default());
        Self {
            store,
            engine,
            room_id,
        }
    }

    pub fn with_fixed_water(amount: &str) -> Self {
        let fixture = Self::new(WaterBillingMode::FixedMonthly);
        let mut room = fixture
            .store
            .get_room(fixture.room_id)
            .unwrap()
            .unwrap();
        room.water_fixed_amount = dec(amount);
        fixture.store.insert_room(room);
        fixture
    }

    /// Add a member with presence on the given days; returns the user id.
    pub fn add_member(&self, is_payer: bool, days: &[&str]) -> Uuid {
        let mut member = Member::new(Uuid::new_v4(), is_payer);
        for d in days {
            member.presence.insert(checkin(d));
        }
        let user_id = member.user_id;
        self.store.insert_member(self.room_id, member);
        user_id
    }
}

/// January window with rent 2000, electricity 500, internet 0.
pub fn january_inputs() -> CycleInputs {
    CycleInputs {
        start_date: date("2025-01-01"),
        end_date: date("2025-01-31"),
        rent: Some(dec("2000")),
        electricity: Some(dec("500")),
        internet: Some(dec("0")),
        previous_meter_reading: None,
        current_meter_reading: None,
    }
}
