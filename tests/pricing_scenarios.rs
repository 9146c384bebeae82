//! Pricing through the contract service: totals, discounts and tax as the
//! office sees them after every save.

mod common;

use common::{sunday, today, tuesday, TestApp};
use rust_decimal_macros::dec;
use weddingops_web::actor::Actor;
use weddingops_web::config::EnginePolicy;
use weddingops_web::contracts::{update_selections, ContractUpdate};
use weddingops_web::models::{ProductLine, ServiceType};
use weddingops_web::pricing::contract_total;

// ==================== package and Sunday discounts ====================

#[tokio::test]
async fn test_photo_and_dj_on_tuesday_costs_1700() {
    let app = TestApp::new().await;
    let selections = app.packages(&[ServiceType::Photography, ServiceType::Dj]);
    let contract = app.contract(tuesday(), selections).await;

    assert_eq!(contract.total_cost, dec!(1700));

    let (_, totals) = contract_total(&app.state, contract.id).await.unwrap();
    assert_eq!(totals.total_service_cost, dec!(1800));
    assert_eq!(totals.package_discount, dec!(100));
    assert_eq!(totals.sunday_discount, dec!(0));
    assert_eq!(totals.total_discount, dec!(100));
}

#[tokio::test]
async fn test_same_selection_on_sunday_costs_1500() {
    let app = TestApp::new().await;
    let selections = app.packages(&[ServiceType::Photography, ServiceType::Dj]);
    let contract = app.contract(sunday(), selections).await;

    // 1800 - 100 package - 2 * 100 Sunday
    assert_eq!(contract.total_cost, dec!(1500));
}

#[tokio::test]
async fn test_sunday_rule_amount_behind_policy_switch() {
    let app = TestApp::with_policy(EnginePolicy {
        sunday_discount_from_rule: true,
        ..EnginePolicy::default()
    })
    .await;
    let selections = app.packages(&[ServiceType::Photography, ServiceType::Dj]);
    let contract = app.contract(sunday(), selections).await;

    // seeded Sunday rule is 150 per package
    assert_eq!(contract.total_cost, dec!(1400));
}

#[tokio::test]
async fn test_photobooth_adds_increment_but_not_threshold() {
    let app = TestApp::new().await;

    let alone = app
        .contract(tuesday(), app.packages(&[ServiceType::Photography, ServiceType::Photobooth]))
        .await;
    // one core package: no discount
    assert_eq!(alone.total_cost, dec!(1500));

    let bundle = app
        .contract(
            tuesday(),
            app.packages(&[
                ServiceType::Photography,
                ServiceType::Videography,
                ServiceType::Dj,
                ServiceType::Photobooth,
            ]),
        )
        .await;
    // 3500 - 4 * 50
    assert_eq!(bundle.total_cost, dec!(3300));
}

#[tokio::test]
async fn test_discount_version_switch_reprices() {
    let app = TestApp::new().await;
    let contract = app
        .contract(tuesday(), app.packages(&[ServiceType::Photography, ServiceType::Dj]))
        .await;

    let update = ContractUpdate {
        package_discount_version: Some(2),
        ..ContractUpdate::default()
    };
    let (updated, totals) = update_selections(&app.state, contract.id, update, today(), &Actor::default())
        .await
        .unwrap();

    assert_eq!(totals.package_discount, dec!(150));
    assert_eq!(updated.total_cost, dec!(1650));
}

// ==================== products and tax ====================

#[tokio::test]
async fn test_products_taxed_at_location_rate() {
    let app = TestApp::new().await;
    let contract = app
        .contract(tuesday(), app.packages(&[ServiceType::Photography]))
        .await;

    let mut selections = contract.selections.clone();
    selections.products = vec![
        ProductLine {
            product_id: app.seeded.bouquet,
            quantity: 2,
        },
        ProductLine {
            product_id: app.seeded.tuxedo,
            quantity: 3,
        },
    ];
    let update = ContractUpdate {
        location_id: Some(Some(app.seeded.taxed_venue)),
        selections: Some(selections),
        ..ContractUpdate::default()
    };
    let (updated, totals) = update_selections(&app.state, contract.id, update, today(), &Actor::default())
        .await
        .unwrap();

    // 240 taxable bouquets, 450 untaxed tuxedos, 8.25% -> 19.80
    assert_eq!(totals.products.subtotal, dec!(690));
    assert_eq!(totals.products.taxable_amount, dec!(240));
    assert_eq!(totals.products.tax, dec!(19.80));
    assert_eq!(updated.total_cost, dec!(1709.80));

    // dropping the location drops the tax
    let update = ContractUpdate {
        location_id: Some(None),
        ..ContractUpdate::default()
    };
    let (updated, _) = update_selections(&app.state, contract.id, update, today(), &Actor::default())
        .await
        .unwrap();
    assert_eq!(updated.tax_rate, None);
    assert_eq!(updated.total_cost, dec!(1690));
}
