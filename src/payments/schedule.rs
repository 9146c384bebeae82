//! Payment schedule builders and ledger reconciliation.
//!
//! Pure functions. A schedule is always regenerated whole; installments are
//! never patched incrementally, and the `paid` flags are recomputed from the
//! full payment history every time the ledger changes.

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::models::{
    Catalog, Contract, Payment, PaymentPurpose, PaymentSchedule, SchedulePayment, ScheduleType,
    ServiceType,
};
use crate::pricing::{round_money, round_to_nearest_hundred, PricingError};

use super::ledger::amount_paid;

/// Share of the total taken as the Schedule A deposit
pub const SCHEDULE_A_DEPOSIT_RATE: Decimal = dec!(0.50);

/// Fixed two-installment plan.
///
/// Deposit is half the total rounded half-up to the nearest hundred and is
/// due `today`; the balance is due `balance_lead_days` before the event.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
/// use weddingops_web::models::Contract;
/// use weddingops_web::payments::schedule::build_schedule_a;
///
/// let today = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
/// let mut contract = Contract::new(
///     "26-01-01".into(),
///     "Lee".into(),
///     NaiveDate::from_ymd_opt(2026, 6, 9).unwrap(),
///     today,
/// );
/// contract.total_cost = dec!(1700);
///
/// let schedule = build_schedule_a(&contract, today, 60);
/// assert_eq!(schedule.installments[0].amount, dec!(900));
/// assert_eq!(schedule.installments[1].amount, dec!(800));
/// ```
pub fn build_schedule_a(contract: &Contract, today: NaiveDate, balance_lead_days: i64) -> PaymentSchedule {
    let deposit = round_to_nearest_hundred(contract.total_cost * SCHEDULE_A_DEPOSIT_RATE);
    two_installments(contract, ScheduleType::ScheduleA, deposit, today, balance_lead_days)
}

/// Itemized plan whose deposit is the sum of the selected components'
/// own deposits.
///
/// Staff bookings carry no deposit of their own and add nothing.
pub fn build_custom_schedule(
    contract: &Contract,
    catalog: &Catalog,
    today: NaiveDate,
    balance_lead_days: i64,
) -> Result<PaymentSchedule, PricingError> {
    let deposit = custom_deposit(contract, catalog)?;
    Ok(two_installments(
        contract,
        ScheduleType::Custom,
        deposit,
        today,
        balance_lead_days,
    ))
}

/// Builder matching `schedule_type`
pub fn build_schedule(
    schedule_type: ScheduleType,
    contract: &Contract,
    catalog: &Catalog,
    today: NaiveDate,
    balance_lead_days: i64,
) -> Result<PaymentSchedule, PricingError> {
    match schedule_type {
        ScheduleType::ScheduleA => Ok(build_schedule_a(contract, today, balance_lead_days)),
        ScheduleType::Custom => build_custom_schedule(contract, catalog, today, balance_lead_days),
    }
}

/// Deposit total for a custom schedule.
///
/// Package, option and engagement session deposits count once each; product
/// deposits count per unit.
pub fn custom_deposit(contract: &Contract, catalog: &Catalog) -> Result<Decimal, PricingError> {
    let selections = &contract.selections;
    let mut deposit = Decimal::ZERO;

    for service_type in ServiceType::ALL {
        let line = selections.line(service_type);
        if let Some(id) = line.package_id {
            deposit += catalog
                .package(id)
                .ok_or(PricingError::UnknownCatalogItem { kind: "package", id })?
                .deposit;
        }
        if let Some(id) = line.option_id {
            deposit += catalog
                .option(id)
                .ok_or(PricingError::UnknownCatalogItem { kind: "option", id })?
                .deposit;
        }
    }

    if let Some(id) = selections.engagement_session_id {
        deposit += catalog
            .engagement_session(id)
            .ok_or(PricingError::UnknownCatalogItem {
                kind: "engagement session",
                id,
            })?
            .deposit;
    }

    for line in &selections.products {
        let product = catalog
            .product(line.product_id)
            .ok_or(PricingError::UnknownCatalogItem {
                kind: "product",
                id: line.product_id,
            })?;
        if let Some(unit_deposit) = product.deposit {
            deposit += unit_deposit * Decimal::from(line.quantity);
        }
    }

    Ok(round_money(deposit, 2))
}

fn two_installments(
    contract: &Contract,
    schedule_type: ScheduleType,
    deposit: Decimal,
    today: NaiveDate,
    balance_lead_days: i64,
) -> PaymentSchedule {
    // never ask for more up front than the whole contract
    let deposit = deposit.min(contract.total_cost).max(Decimal::ZERO);
    let balance = contract.total_cost - deposit;

    PaymentSchedule {
        contract_id: contract.id,
        schedule_type,
        installments: vec![
            installment(PaymentPurpose::Deposit, today, deposit),
            installment(
                PaymentPurpose::Balance,
                balance_due_date(contract.event_date, balance_lead_days),
                balance,
            ),
        ],
        manually_edited: false,
        generated_at: Utc::now(),
    }
}

fn installment(purpose: PaymentPurpose, due_date: NaiveDate, amount: Decimal) -> SchedulePayment {
    SchedulePayment {
        id: Uuid::new_v4(),
        purpose,
        due_date,
        amount,
        paid: false,
        amount_applied: Decimal::ZERO,
    }
}

/// Balance installment due date: `event_date - lead_days`
pub fn balance_due_date(event_date: NaiveDate, lead_days: i64) -> NaiveDate {
    let lead = Days::new(lead_days.unsigned_abs());
    let shifted = if lead_days >= 0 {
        event_date.checked_sub_days(lead)
    } else {
        event_date.checked_add_days(lead)
    };
    shifted.unwrap_or(event_date)
}

/// Recompute `paid` and `amount_applied` for every installment.
///
/// Installments are walked in due-date order and payments are consumed
/// greedily against them, surplus carrying forward. Since every payment
/// counts in full, the walk only depends on the running total, not on how
/// it was split across payments. An installment is paid once the amount
/// consumed against it covers it.
pub fn reconcile(schedule: &mut PaymentSchedule, payments: &[Payment]) {
    schedule.installments.sort_by_key(|i| i.due_date);

    let mut available = amount_paid(payments);

    for installment in schedule.installments.iter_mut() {
        let applied = available.min(installment.amount).max(Decimal::ZERO);
        available -= applied;
        installment.amount_applied = applied;
        installment.paid = applied >= installment.amount;
    }
}

/// Bring a stored schedule in line with a changed contract.
///
/// Hand-edited schedules keep their amounts and are only reconciled;
/// generated ones are rebuilt from the contract's current total and type.
pub fn refresh(
    existing: PaymentSchedule,
    contract: &Contract,
    catalog: &Catalog,
    payments: &[Payment],
    today: NaiveDate,
    balance_lead_days: i64,
) -> Result<PaymentSchedule, PricingError> {
    let mut schedule = if existing.manually_edited {
        existing
    } else {
        build_schedule(contract.schedule_type, contract, catalog, today, balance_lead_days)?
    };
    reconcile(&mut schedule, payments);
    Ok(schedule)
}
