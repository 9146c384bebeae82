//! Ledger and schedule operations.
//!
//! Each operation holds the contract lock from the first read to the commit,
//! so balance checks and schedule rebuilds never interleave with another
//! writer on the same contract.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::actor::Actor;
use crate::error::{AppError, Result};
use crate::models::{
    AuditAction, AuditEntry, Contract, ContractStatus, Payment, PaymentMethod, PaymentPurpose,
    PaymentSchedule, ScheduleType,
};
use crate::notify::ContractEvent;
use crate::pricing::{load_catalog, reprice};
use crate::store::UnitOfWork;
use crate::AppState;

use super::ledger::{
    balance_due, ensure_edit_within_balance, ensure_within_balance, validate_amount,
    LedgerSummary,
};
use super::schedule::{build_schedule, reconcile};

/// Payment as entered by office staff
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub purpose: Option<PaymentPurpose>,
    pub memo: Option<String>,
    /// Defaults to now
    pub paid_at: Option<DateTime<Utc>>,
}

/// Fields of an existing payment that may change
#[derive(Debug, Clone, Default)]
pub struct PaymentUpdate {
    pub amount: Option<Decimal>,
    pub method: Option<PaymentMethod>,
    pub purpose: Option<PaymentPurpose>,
    pub memo: Option<String>,
}

/// Outcome of a ledger mutation
#[derive(Debug, Clone)]
pub struct LedgerChange {
    pub payment: Payment,
    pub contract_status: ContractStatus,
    pub ledger: LedgerSummary,
    pub schedule: Option<PaymentSchedule>,
}

/// Everything the ledger view shows for a contract
#[derive(Debug, Clone)]
pub struct LedgerView {
    pub contract: Contract,
    pub ledger: LedgerSummary,
    pub payments: Vec<Payment>,
    pub schedule: Option<PaymentSchedule>,
}

async fn load_contract(state: &AppState, contract_id: Uuid) -> Result<Contract> {
    state
        .store
        .contract(contract_id)
        .await?
        .ok_or_else(|| AppError::not_found("contract", contract_id))
}

async fn load_payment(state: &AppState, payment_id: Uuid) -> Result<Payment> {
    state
        .store
        .payment(payment_id)
        .await?
        .ok_or_else(|| AppError::not_found("payment", payment_id))
}

/// Reconcile the stored schedule (if any) against `payments` and stage it
async fn stage_reconciled_schedule(
    state: &AppState,
    work: &mut UnitOfWork,
    contract_id: Uuid,
    payments: &[Payment],
) -> Result<Option<PaymentSchedule>> {
    let schedule = state.store.schedule_for(contract_id).await?.map(|mut s| {
        reconcile(&mut s, payments);
        s
    });
    if let Some(schedule) = &schedule {
        work.put_schedule(schedule.clone());
    }
    Ok(schedule)
}

/// Record a payment against the contract's current balance.
///
/// The contract is repriced first so the balance check runs against the
/// authoritative total. The first payment on a contract that is still in the
/// pipeline, forecast or pending books it.
pub async fn record_payment(
    state: &AppState,
    contract_id: Uuid,
    new: NewPayment,
    actor: &Actor,
) -> Result<LedgerChange> {
    validate_amount(new.amount)?;

    let _guard = state.locks.acquire(contract_id).await;
    let mut contract = load_contract(state, contract_id).await?;
    let catalog = load_catalog(state).await?;
    reprice(&mut contract, &catalog, state.policy.pricing())?;

    let mut payments = state.store.payments_for(contract_id).await?;
    let balance = balance_due(contract.total_cost, &payments);
    if let Err(e) = ensure_within_balance(new.amount, balance) {
        tracing::warn!(
            contract_id = %contract_id,
            amount = %new.amount,
            balance_due = %balance,
            "payment rejected: exceeds balance due"
        );
        return Err(e);
    }

    let payment = Payment {
        id: Uuid::new_v4(),
        contract_id,
        amount: new.amount,
        method: new.method,
        purpose: new.purpose,
        memo: new.memo,
        paid_at: new.paid_at.unwrap_or_else(Utc::now),
    };
    payments.push(payment.clone());

    let mut work = UnitOfWork::new();
    let mut events = Vec::new();

    let previous_status = contract.status;
    if previous_status.promotes_on_payment() {
        contract.status = ContractStatus::Booked;
        work.audit.push(AuditEntry::new(
            contract_id,
            AuditAction::StatusChanged,
            actor.as_deref(),
            json!({
                "from": previous_status,
                "to": ContractStatus::Booked,
                "reason": "first payment",
            }),
        ));
        events.push(ContractEvent::StatusChanged {
            contract_id,
            code: contract.code.clone(),
            from: previous_status,
            to: ContractStatus::Booked,
        });
    }
    contract.updated_at = Utc::now();

    let schedule = stage_reconciled_schedule(state, &mut work, contract_id, &payments).await?;
    let ledger = LedgerSummary::new(contract.total_cost, &payments);

    work.payments_upserted.push(payment.clone());
    work.audit.push(AuditEntry::new(
        contract_id,
        AuditAction::PaymentRecorded,
        actor.as_deref(),
        json!({
            "payment_id": payment.id,
            "amount": payment.amount.to_string(),
            "method": payment.method,
        }),
    ));
    events.push(ContractEvent::PaymentRecorded {
        contract_id,
        payment_id: payment.id,
        amount: payment.amount,
        balance_due: ledger.balance_due,
    });
    let contract_status = contract.status;
    work.put_contract(contract);

    state.store.apply(work).await?;

    tracing::info!(
        contract_id = %contract_id,
        payment_id = %payment.id,
        amount = %payment.amount,
        balance_due = %ledger.balance_due,
        "payment recorded"
    );
    for event in events {
        state.notifier.notify(event);
    }

    Ok(LedgerChange {
        payment,
        contract_status,
        ledger,
        schedule,
    })
}

/// Change a recorded payment. Amount changes are audited with both values
/// and may raise the payment by at most the balance due against the
/// repriced total.
pub async fn update_payment(
    state: &AppState,
    payment_id: Uuid,
    update: PaymentUpdate,
    actor: &Actor,
) -> Result<LedgerChange> {
    if let Some(amount) = update.amount {
        validate_amount(amount)?;
    }

    let contract_id = load_payment(state, payment_id).await?.contract_id;
    let _guard = state.locks.acquire(contract_id).await;
    // re-read under the lock
    let existing = load_payment(state, payment_id).await?;
    let mut contract = load_contract(state, contract_id).await?;
    let catalog = load_catalog(state).await?;
    reprice(&mut contract, &catalog, state.policy.pricing())?;

    let mut payments = state.store.payments_for(contract_id).await?;
    let mut updated = existing.clone();

    if let Some(amount) = update.amount {
        let balance = balance_due(contract.total_cost, &payments);
        if let Err(e) = ensure_edit_within_balance(existing.amount, amount, balance) {
            tracing::warn!(
                payment_id = %payment_id,
                old_amount = %existing.amount,
                new_amount = %amount,
                balance_due = %balance,
                "payment edit rejected: exceeds balance due"
            );
            return Err(e);
        }
        updated.amount = amount;
    }
    if let Some(method) = update.method {
        updated.method = method;
    }
    if update.purpose.is_some() {
        updated.purpose = update.purpose;
    }
    if update.memo.is_some() {
        updated.memo = update.memo;
    }

    for payment in payments.iter_mut().filter(|p| p.id == payment_id) {
        *payment = updated.clone();
    }

    let mut work = UnitOfWork::new();
    let schedule = stage_reconciled_schedule(state, &mut work, contract_id, &payments).await?;
    work.payments_upserted.push(updated.clone());
    work.audit.push(AuditEntry::new(
        contract_id,
        AuditAction::PaymentEdited,
        actor.as_deref(),
        json!({
            "payment_id": payment_id,
            "old_amount": existing.amount.to_string(),
            "new_amount": updated.amount.to_string(),
            "old_method": existing.method,
            "new_method": updated.method,
        }),
    ));
    contract.updated_at = Utc::now();
    work.put_contract(contract.clone());

    state.store.apply(work).await?;

    tracing::info!(
        payment_id = %payment_id,
        old_amount = %existing.amount,
        new_amount = %updated.amount,
        "payment edited"
    );

    Ok(LedgerChange {
        payment: updated,
        contract_status: contract.status,
        ledger: LedgerSummary::new(contract.total_cost, &payments),
        schedule,
    })
}

/// Remove a payment from the ledger. The contract is repriced; its status
/// is left alone.
pub async fn delete_payment(state: &AppState, payment_id: Uuid, actor: &Actor) -> Result<LedgerChange> {
    let contract_id = load_payment(state, payment_id).await?.contract_id;
    let _guard = state.locks.acquire(contract_id).await;
    let removed = load_payment(state, payment_id).await?;
    let mut contract = load_contract(state, contract_id).await?;
    let catalog = load_catalog(state).await?;
    reprice(&mut contract, &catalog, state.policy.pricing())?;

    let mut payments = state.store.payments_for(contract_id).await?;
    payments.retain(|p| p.id != payment_id);

    let mut work = UnitOfWork::new();
    let schedule = stage_reconciled_schedule(state, &mut work, contract_id, &payments).await?;
    work.payments_deleted.push(payment_id);
    work.audit.push(AuditEntry::new(
        contract_id,
        AuditAction::PaymentDeleted,
        actor.as_deref(),
        json!({
            "payment_id": payment_id,
            "amount": removed.amount.to_string(),
            "method": removed.method,
            "paid_at": removed.paid_at,
        }),
    ));
    contract.updated_at = Utc::now();
    work.put_contract(contract.clone());

    state.store.apply(work).await?;

    tracing::info!(payment_id = %payment_id, amount = %removed.amount, "payment deleted");

    Ok(LedgerChange {
        payment: removed,
        contract_status: contract.status,
        ledger: LedgerSummary::new(contract.total_cost, &payments),
        schedule,
    })
}

/// Ledger, payments and schedule for one contract, against the current
/// catalog prices. Nothing is written.
pub async fn ledger_view(state: &AppState, contract_id: Uuid) -> Result<LedgerView> {
    let mut contract = load_contract(state, contract_id).await?;
    let catalog = load_catalog(state).await?;
    reprice(&mut contract, &catalog, state.policy.pricing())?;
    let payments = state.store.payments_for(contract_id).await?;
    let schedule = state.store.schedule_for(contract_id).await?;

    Ok(LedgerView {
        ledger: LedgerSummary::new(contract.total_cost, &payments),
        contract,
        payments,
        schedule,
    })
}

/// Generate (or regenerate) the contract's payment schedule.
///
/// `schedule_type` switches the plan and always rebuilds. Without a type
/// change a hand-edited schedule is kept unless `recalculate` is set.
pub async fn rebuild_schedule(
    state: &AppState,
    contract_id: Uuid,
    schedule_type: Option<ScheduleType>,
    recalculate: bool,
    today: NaiveDate,
    actor: &Actor,
) -> Result<PaymentSchedule> {
    let _guard = state.locks.acquire(contract_id).await;
    let mut contract = load_contract(state, contract_id).await?;
    let catalog = load_catalog(state).await?;
    reprice(&mut contract, &catalog, state.policy.pricing())?;

    let target = schedule_type.unwrap_or(contract.schedule_type);
    let payments = state.store.payments_for(contract_id).await?;
    let existing = state.store.schedule_for(contract_id).await?;

    let keep_existing = !recalculate
        && existing
            .as_ref()
            .is_some_and(|s| s.manually_edited && s.schedule_type == target);

    let mut work = UnitOfWork::new();
    let schedule = match existing {
        Some(mut schedule) if keep_existing => {
            tracing::debug!(contract_id = %contract_id, "keeping hand-edited schedule");
            reconcile(&mut schedule, &payments);
            schedule
        }
        _ => {
            let mut schedule = build_schedule(
                target,
                &contract,
                &catalog,
                today,
                state.policy.balance_due_days_before_event,
            )?;
            reconcile(&mut schedule, &payments);
            work.audit.push(AuditEntry::new(
                contract_id,
                AuditAction::ScheduleRebuilt,
                actor.as_deref(),
                json!({
                    "schedule_type": target,
                    "scheduled_total": schedule.scheduled_total().to_string(),
                }),
            ));
            tracing::info!(
                contract_id = %contract_id,
                schedule_type = %target,
                total = %contract.total_cost,
                "payment schedule rebuilt"
            );
            schedule
        }
    };

    contract.schedule_type = target;
    contract.updated_at = Utc::now();
    work.put_contract(contract);
    work.put_schedule(schedule.clone());
    state.store.apply(work).await?;

    Ok(schedule)
}

/// Hand-edit one installment. The schedule is flagged as edited so later
/// contract changes reconcile it instead of regenerating it.
pub async fn edit_installment(
    state: &AppState,
    contract_id: Uuid,
    installment_id: Uuid,
    amount: Decimal,
    due_date: Option<NaiveDate>,
    actor: &Actor,
) -> Result<PaymentSchedule> {
    if amount < Decimal::ZERO {
        return Err(AppError::validation("amount", "must not be negative"));
    }

    let _guard = state.locks.acquire(contract_id).await;
    let mut schedule = state
        .store
        .schedule_for(contract_id)
        .await?
        .ok_or_else(|| AppError::not_found("payment schedule", contract_id))?;
    let payments = state.store.payments_for(contract_id).await?;

    let installment = schedule
        .installment_mut(installment_id)
        .ok_or_else(|| AppError::not_found("installment", installment_id))?;
    let old_amount = installment.amount;
    let old_due_date = installment.due_date;
    installment.amount = amount;
    if let Some(due_date) = due_date {
        installment.due_date = due_date;
    }
    let new_due_date = installment.due_date;

    schedule.manually_edited = true;
    reconcile(&mut schedule, &payments);

    let mut work = UnitOfWork::new();
    work.put_schedule(schedule.clone());
    work.audit.push(AuditEntry::new(
        contract_id,
        AuditAction::InstallmentEdited,
        actor.as_deref(),
        json!({
            "installment_id": installment_id,
            "old_amount": old_amount.to_string(),
            "new_amount": amount.to_string(),
            "old_due_date": old_due_date,
            "new_due_date": new_due_date,
        }),
    ));
    state.store.apply(work).await?;

    tracing::info!(
        contract_id = %contract_id,
        installment_id = %installment_id,
        old_amount = %old_amount,
        new_amount = %amount,
        "installment edited"
    );

    Ok(schedule)
}
