//! Provider payment ledger arithmetic.
//!
//! Amounts are integer cents. A payment with `paid_at` set is settled; one
//! without is scheduled, and overdue once its due date has passed.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{Cents, DbId, Timestamp};

/// Provider categories offered by the planner console.
pub const PROVIDER_CATEGORIES: &[&str] = &[
    "VENUE",
    "CATERING",
    "PHOTOGRAPHY",
    "VIDEOGRAPHY",
    "MUSIC",
    "FLOWERS",
    "DECORATION",
    "TRANSPORT",
    "ATTIRE",
    "OTHER",
];

pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if PROVIDER_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid provider category '{category}'. Must be one of: {}",
            PROVIDER_CATEGORIES.join(", ")
        )))
    }
}

/// Largest single amount accepted, in cents (ten billion in currency units).
pub const MAX_AMOUNT_CENTS: Cents = 1_000_000_000_000;

pub fn validate_amount(amount_cents: Cents) -> Result<(), CoreError> {
    if amount_cents <= 0 {
        return Err(CoreError::Validation("Amount must be positive".into()));
    }
    if amount_cents > MAX_AMOUNT_CENTS {
        return Err(CoreError::Validation(format!(
            "Amount must not exceed {MAX_AMOUNT_CENTS} cents"
        )));
    }
    Ok(())
}

/// Contract totals may be zero but share the payment ceiling.
pub fn validate_total(total_cents: Cents) -> Result<(), CoreError> {
    if total_cents < 0 {
        return Err(CoreError::Validation(
            "Contract total must not be negative".into(),
        ));
    }
    if total_cents > MAX_AMOUNT_CENTS {
        return Err(CoreError::Validation(format!(
            "Contract total must not exceed {MAX_AMOUNT_CENTS} cents"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct PaymentEntry {
    pub amount_cents: Cents,
    pub paid_at: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderBalance {
    pub provider_id: DbId,
    pub total_cents: Cents,
    pub paid_cents: Cents,
    pub scheduled_cents: Cents,
    /// Contract total minus everything paid; never negative.
    pub outstanding_cents: Cents,
    pub overdue_count: i64,
}

pub fn provider_balance(
    provider_id: DbId,
    total_cents: Cents,
    payments: &[PaymentEntry],
    now: Timestamp,
) -> ProviderBalance {
    let mut balance = ProviderBalance {
        provider_id,
        total_cents,
        ..Default::default()
    };
    for p in payments {
        if p.paid_at.is_some() {
            balance.paid_cents = balance.paid_cents.saturating_add(p.amount_cents);
        } else {
            balance.scheduled_cents = balance.scheduled_cents.saturating_add(p.amount_cents);
            if p.due_date.is_some_and(|due| due < now) {
                balance.overdue_count += 1;
            }
        }
    }
    balance.outstanding_cents = total_cents.saturating_sub(balance.paid_cents).max(0);
    balance
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub total_cents: Cents,
    pub paid_cents: Cents,
    pub outstanding_cents: Cents,
    pub overdue_count: i64,
    pub providers: Vec<ProviderBalance>,
}

fn saturating_sum(values: impl Iterator<Item = i64>) -> i64 {
    values.fold(0, i64::saturating_add)
}

pub fn ledger_summary(providers: Vec<ProviderBalance>) -> LedgerSummary {
    LedgerSummary {
        total_cents: saturating_sum(providers.iter().map(|p| p.total_cents)),
        paid_cents: saturating_sum(providers.iter().map(|p| p.paid_cents)),
        outstanding_cents: saturating_sum(providers.iter().map(|p| p.outstanding_cents)),
        overdue_count: saturating_sum(providers.iter().map(|p| p.overdue_count)),
        providers,
    }
}
