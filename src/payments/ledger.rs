//! Ledger arithmetic.
//!
//! Balance due is never stored; it is always derived from the contract total
//! and the full payment history.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::Payment;
use crate::pricing::round_money;

/// Smallest amount the ledger accepts
pub const MIN_PAYMENT: Decimal = dec!(0.01);

/// Sum of every payment ever recorded for the contract
pub fn amount_paid(payments: &[Payment]) -> Decimal {
    payments.iter().map(|p| p.amount).sum()
}

/// `max(0, total - amount_paid)`
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use weddingops_web::payments::ledger::balance_due;
///
/// assert_eq!(balance_due(dec!(1500), &[]), dec!(1500));
/// ```
pub fn balance_due(total_cost: Decimal, payments: &[Payment]) -> Decimal {
    (total_cost - amount_paid(payments)).max(Decimal::ZERO)
}

/// Reject amounts below one cent or with fractional cents.
pub fn validate_amount(amount: Decimal) -> Result<()> {
    if amount < MIN_PAYMENT {
        return Err(AppError::validation(
            "amount",
            format!("must be at least {}", MIN_PAYMENT),
        ));
    }
    if round_money(amount, 2) != amount {
        return Err(AppError::validation("amount", "must be in whole cents"));
    }
    Ok(())
}

/// A new payment must fit within what is still owed.
pub fn ensure_within_balance(amount: Decimal, balance_due: Decimal) -> Result<()> {
    if amount > balance_due {
        return Err(AppError::PaymentExceedsBalance {
            amount,
            balance_due,
        });
    }
    Ok(())
}

/// An edit may raise a payment by at most the current balance due.
pub fn ensure_edit_within_balance(
    old_amount: Decimal,
    new_amount: Decimal,
    balance_due: Decimal,
) -> Result<()> {
    if new_amount - old_amount > balance_due {
        return Err(AppError::PaymentExceedsBalance {
            amount: new_amount,
            balance_due: balance_due + old_amount,
        });
    }
    Ok(())
}

/// Money position of one contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    #[serde(with = "rust_decimal::serde::str")]
    pub total_cost: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount_paid: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance_due: Decimal,
}

impl LedgerSummary {
    pub fn new(total_cost: Decimal, payments: &[Payment]) -> Self {
        Self {
            total_cost,
            amount_paid: amount_paid(payments),
            balance_due: balance_due(total_cost, payments),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentMethod;
    use chrono::Utc;
    use uuid::Uuid;

    fn payment(amount: Decimal) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            contract_id: Uuid::nil(),
            amount,
            method: PaymentMethod::Check,
            purpose: None,
            memo: None,
            paid_at: Utc::now(),
        }
    }

    #[test]
    fn test_balance_due_subtracts_payments() {
        let payments = vec![payment(dec!(500)), payment(dec!(250.50))];
        assert_eq!(amount_paid(&payments), dec!(750.50));
        assert_eq!(balance_due(dec!(1500), &payments), dec!(749.50));
    }

    #[test]
    fn test_balance_due_never_negative() {
        // total lowered after the client paid in full
        let payments = vec![payment(dec!(1700))];
        assert_eq!(balance_due(dec!(1500), &payments), Decimal::ZERO);
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(dec!(0.01)).is_ok());
        assert!(validate_amount(dec!(1300)).is_ok());

        let err = validate_amount(Decimal::ZERO).unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "amount", .. }));
        assert!(validate_amount(dec!(-5)).is_err());
        assert!(validate_amount(dec!(10.005)).is_err());
    }

    #[test]
    fn test_payment_over_balance_rejected() {
        // $1500 contract, $500 already paid, $1300 attempted
        let payments = vec![payment(dec!(500))];
        let balance = balance_due(dec!(1500), &payments);
        assert_eq!(balance, dec!(1000));

        let err = ensure_within_balance(dec!(1300), balance).unwrap_err();
        match err {
            AppError::PaymentExceedsBalance {
                amount,
                balance_due,
            } => {
                assert_eq!(amount, dec!(1300));
                assert_eq!(balance_due, dec!(1000));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(ensure_within_balance(dec!(1000), balance).is_ok());
    }

    #[test]
    fn test_edit_guard_uses_difference() {
        // $1500 total, $500 + $400 paid: raising the $400 to $1000 fits exactly
        assert!(ensure_edit_within_balance(dec!(400), dec!(1000), dec!(600)).is_ok());
        assert!(ensure_edit_within_balance(dec!(400), dec!(1000.01), dec!(600)).is_err());
        // lowering always fits, even when overpaid
        assert!(ensure_edit_within_balance(dec!(400), dec!(100), Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_summary() {
        let payments = vec![payment(dec!(900))];
        let summary = LedgerSummary::new(dec!(1700), &payments);
        assert_eq!(summary.amount_paid, dec!(900));
        assert_eq!(summary.balance_due, dec!(800));
    }
}
