//! Catalog reference data: packages, options, products, locations and
//! discount rule versions.
//!
//! The pricing engine only ever reads these. A [`Catalog`] is a snapshot
//! loaded from the store and shared through the application cache.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Service line a package or option belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceType {
    Photography,
    Videography,
    Dj,
    Photobooth,
}

impl ServiceType {
    /// Every service line, in display order.
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Photography,
        ServiceType::Videography,
        ServiceType::Dj,
        ServiceType::Photobooth,
    ];

    /// Lines counted towards the package-bundle discount threshold.
    pub const CORE: [ServiceType; 3] = [
        ServiceType::Photography,
        ServiceType::Videography,
        ServiceType::Dj,
    ];
}

/// Base package for one service line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: Uuid,
    pub name: String,
    pub service_type: ServiceType,
    pub price: Decimal,
    pub deposit: Decimal,
}

/// Additional option (second shooter, extra hours bundle, ...) for a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalOption {
    pub id: Uuid,
    pub name: String,
    pub service_type: ServiceType,
    pub price: Decimal,
    pub deposit: Decimal,
}

/// Engagement session, priced onto the photography line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSession {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub deposit: Decimal,
}

/// Sellable product (albums, prints, formalwear rentals)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub taxable: bool,
    /// Per-unit deposit collected up front. Only formalwear carries one.
    pub deposit: Option<Decimal>,
}

/// Venue location; determines the contract's tax rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    /// Percentage, e.g. `7.25`
    pub tax_rate: Option<Decimal>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiscountKind {
    Package,
    Sunday,
}

/// Versioned discount rule.
///
/// Several versions of the same kind coexist so that historical contracts
/// keep the amounts that were in effect when they were booked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRule {
    pub id: Uuid,
    pub kind: DiscountKind,
    pub version: i32,
    pub base_amount: Decimal,
    pub is_active: bool,
}

/// Point-in-time view of all reference data the engine prices against.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub packages: HashMap<Uuid, Package>,
    pub options: HashMap<Uuid, AdditionalOption>,
    pub engagement_sessions: HashMap<Uuid, EngagementSession>,
    pub products: HashMap<Uuid, Product>,
    pub locations: HashMap<Uuid, Location>,
    pub discount_rules: Vec<DiscountRule>,
}

impl Catalog {
    pub fn add_package(&mut self, package: Package) {
        self.packages.insert(package.id, package);
    }

    pub fn add_option(&mut self, option: AdditionalOption) {
        self.options.insert(option.id, option);
    }

    pub fn add_engagement_session(&mut self, session: EngagementSession) {
        self.engagement_sessions.insert(session.id, session);
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    pub fn add_location(&mut self, location: Location) {
        self.locations.insert(location.id, location);
    }

    pub fn add_discount_rule(&mut self, rule: DiscountRule) {
        self.discount_rules.push(rule);
    }

    pub fn package(&self, id: Uuid) -> Option<&Package> {
        self.packages.get(&id)
    }

    pub fn option(&self, id: Uuid) -> Option<&AdditionalOption> {
        self.options.get(&id)
    }

    pub fn engagement_session(&self, id: Uuid) -> Option<&EngagementSession> {
        self.engagement_sessions.get(&id)
    }

    pub fn product(&self, id: Uuid) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn location(&self, id: Uuid) -> Option<&Location> {
        self.locations.get(&id)
    }

    /// Find the active rule for `(kind, version)`.
    ///
    /// Inactive versions are ignored even when the version number matches.
    pub fn active_discount_rule(&self, kind: DiscountKind, version: i32) -> Option<&DiscountRule> {
        self.discount_rules
            .iter()
            .find(|rule| rule.kind == kind && rule.version == version && rule.is_active)
    }
}
