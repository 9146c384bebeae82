//! Shared fixtures for integration tests: a seeded in-memory store, an
//! `AppState` with a recording notifier and HTTP helpers over the router.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
};
use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use weddingops_web::actor::{Actor, ACTOR_HEADER};
use weddingops_web::config::EnginePolicy;
use weddingops_web::contracts::{self, NewContract};
use weddingops_web::models::{
    Catalog, Contract, DiscountKind, DiscountRule, Location, Package, Product, ScheduleType,
    Selections, ServiceType, StaffMember,
};
use weddingops_web::notify::{ContractEvent, Notifier};
use weddingops_web::store::MemoryStore;
use weddingops_web::{router, AppState};

pub const ADMIN: &str = "owner";

/// Notifier that keeps every event for assertions
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ContractEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<ContractEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: ContractEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Catalog ids seeded by [`TestApp`]
pub struct Seeded {
    pub photo_package: Uuid,
    pub video_package: Uuid,
    pub dj_package: Uuid,
    pub booth_package: Uuid,
    pub bouquet: Uuid,
    pub tuxedo: Uuid,
    pub taxed_venue: Uuid,
    pub photographer: Uuid,
    pub second_photographer: Uuid,
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub seeded: Seeded,
}

fn package(catalog: &mut Catalog, name: &str, service_type: ServiceType, price: Decimal, deposit: Decimal) -> Uuid {
    let id = Uuid::new_v4();
    catalog.add_package(Package {
        id,
        name: name.to_string(),
        service_type,
        price,
        deposit,
    });
    id
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_policy(EnginePolicy {
            contract_admins: vec![ADMIN.to_string()],
            ..EnginePolicy::default()
        })
        .await
    }

    pub async fn with_policy(policy: EnginePolicy) -> Self {
        let mut catalog = Catalog::default();
        let photo_package = package(&mut catalog, "Photo Classic", ServiceType::Photography, dec!(1000), dec!(250));
        let video_package = package(&mut catalog, "Film Highlights", ServiceType::Videography, dec!(1200), dec!(300));
        let dj_package = package(&mut catalog, "DJ Evening", ServiceType::Dj, dec!(800), dec!(200));
        let booth_package = package(&mut catalog, "Booth Basic", ServiceType::Photobooth, dec!(500), dec!(100));

        let bouquet = Uuid::new_v4();
        catalog.add_product(Product {
            id: bouquet,
            name: "Bridal bouquet".to_string(),
            unit_price: dec!(120),
            taxable: true,
            deposit: None,
        });
        let tuxedo = Uuid::new_v4();
        catalog.add_product(Product {
            id: tuxedo,
            name: "Tuxedo rental".to_string(),
            unit_price: dec!(150),
            taxable: false,
            deposit: Some(dec!(50)),
        });

        let taxed_venue = Uuid::new_v4();
        catalog.add_location(Location {
            id: taxed_venue,
            name: "Garden Pavilion".to_string(),
            tax_rate: Some(dec!(8.25)),
        });

        for (kind, version, amount, active) in [
            (DiscountKind::Package, 1, dec!(50), true),
            (DiscountKind::Package, 2, dec!(75), true),
            (DiscountKind::Sunday, 1, dec!(150), true),
        ] {
            catalog.add_discount_rule(DiscountRule {
                id: Uuid::new_v4(),
                kind,
                version,
                base_amount: amount,
                is_active: active,
            });
        }

        let store = Arc::new(MemoryStore::with_catalog(catalog));

        let photographer = Uuid::new_v4();
        store
            .add_staff_member(StaffMember {
                id: photographer,
                name: "Riley".to_string(),
                off_days: vec![Weekday::Mon],
            })
            .await;
        let second_photographer = Uuid::new_v4();
        store
            .add_staff_member(StaffMember {
                id: second_photographer,
                name: "Morgan".to_string(),
                off_days: vec![],
            })
            .await;

        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(store.clone(), policy, Duration::from_secs(600))
            .with_notifier(notifier.clone());

        Self {
            state,
            store,
            notifier,
            seeded: Seeded {
                photo_package,
                video_package,
                dj_package,
                booth_package,
                bouquet,
                tuxedo,
                taxed_venue,
                photographer,
                second_photographer,
            },
        }
    }

    /// Create a contract through the service layer
    pub async fn contract(&self, event_date: NaiveDate, selections: Selections) -> Contract {
        let (contract, _) = contracts::create_contract(
            &self.state,
            NewContract {
                client_name: "Casey & Drew".to_string(),
                event_date,
                location_id: None,
                selections,
                schedule_type: ScheduleType::ScheduleA,
            },
            today(),
            &Actor::default(),
        )
        .await
        .unwrap();
        contract
    }

    /// Selections with packages on the given lines
    pub fn packages(&self, lines: &[ServiceType]) -> Selections {
        let mut selections = Selections::default();
        for line in lines {
            let id = match line {
                ServiceType::Photography => self.seeded.photo_package,
                ServiceType::Videography => self.seeded.video_package,
                ServiceType::Dj => self.seeded.dj_package,
                ServiceType::Photobooth => self.seeded.booth_package,
            };
            selections.line_mut(*line).package_id = Some(id);
        }
        selections
    }

    /// Send a request through the full router
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>, actor: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(actor) = actor {
            builder = builder.header(ACTOR_HEADER, actor);
        }
        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };

        router(self.state.clone())
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

/// A Tuesday
pub fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2027, 6, 8).unwrap()
}

/// A Sunday
pub fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2027, 6, 13).unwrap()
}

/// A Saturday
pub fn saturday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2027, 6, 12).unwrap()
}
