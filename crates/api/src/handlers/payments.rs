//! Handlers for a wedding's providers and their payment ledger. Planner only.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use vowline_core::error::CoreError;
use vowline_core::payments::{
    ledger_summary, provider_balance, validate_amount, validate_category, validate_total,
    LedgerSummary, PaymentEntry,
};
use vowline_core::tracking::TrackingEventType;
use vowline_core::types::DbId;
use vowline_db::models::payment::{CreatePayment, CreateProvider, Payment, Provider, UpdateProvider};
use vowline_db::repositories::{PaymentRepo, ProviderRepo};
use vowline_events::TrackingEvent;

use super::planner::owned_wedding;
use super::require_name;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequirePlanner;
use crate::response::DataResponse;
use crate::state::AppState;

fn provider_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Provider",
        id,
    })
}

fn payment_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Payment",
        id,
    })
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// GET /api/planner/weddings/{wedding_id}/providers
pub async fn list_providers(
    access: RequirePlanner,
    State(state): State<AppState>,
    Path(wedding_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Provider>>>> {
    owned_wedding(&state.pool, access.planner_id, wedding_id).await?;
    let providers = ProviderRepo::list_for_wedding(&state.pool, wedding_id).await?;
    Ok(Json(DataResponse { data: providers }))
}

/// POST /api/planner/weddings/{wedding_id}/providers
pub async fn create_provider(
    access: RequirePlanner,
    State(state): State<AppState>,
    Path(wedding_id): Path<DbId>,
    Json(mut input): Json<CreateProvider>,
) -> AppResult<impl IntoResponse> {
    owned_wedding(&state.pool, access.planner_id, wedding_id).await?;
    require_name(&input.name, "Provider")?;
    input.category = input.category.trim().to_ascii_uppercase();
    validate_category(&input.category)?;
    validate_total(input.total_amount_cents)?;

    let provider = ProviderRepo::create(&state.pool, wedding_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: provider })))
}

/// PUT /api/planner/weddings/{wedding_id}/providers/{id}
pub async fn update_provider(
    access: RequirePlanner,
    State(state): State<AppState>,
    Path((wedding_id, id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateProvider>,
) -> AppResult<Json<DataResponse<Provider>>> {
    owned_wedding(&state.pool, access.planner_id, wedding_id).await?;
    if let Some(name) = &input.name {
        require_name(name, "Provider")?;
    }
    if let Some(category) = input.category.take() {
        let category = category.trim().to_ascii_uppercase();
        validate_category(&category)?;
        input.category = Some(category);
    }
    if let Some(total) = input.total_amount_cents {
        validate_total(total)?;
    }

    let provider = ProviderRepo::update(&state.pool, wedding_id, id, &input)
        .await?
        .ok_or_else(|| provider_not_found(id))?;
    Ok(Json(DataResponse { data: provider }))
}

/// DELETE /api/planner/weddings/{wedding_id}/providers/{id}
///
/// Removes the provider's payments with it.
pub async fn delete_provider(
    access: RequirePlanner,
    State(state): State<AppState>,
    Path((wedding_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    owned_wedding(&state.pool, access.planner_id, wedding_id).await?;
    if !ProviderRepo::delete(&state.pool, wedding_id, id).await? {
        return Err(provider_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// POST /api/planner/weddings/{wedding_id}/providers/{id}/payments
///
/// Record a payment. Without `paid_at` it is a scheduled installment.
pub async fn record_payment(
    access: RequirePlanner,
    State(state): State<AppState>,
    Path((wedding_id, provider_id)): Path<(DbId, DbId)>,
    Json(input): Json<CreatePayment>,
) -> AppResult<impl IntoResponse> {
    owned_wedding(&state.pool, access.planner_id, wedding_id).await?;
    validate_amount(input.amount_cents)?;

    let payment = PaymentRepo::create(&state.pool, wedding_id, provider_id, &input)
        .await?
        .ok_or_else(|| provider_not_found(provider_id))?;

    state.tracking.publish(
        TrackingEvent::new(wedding_id, TrackingEventType::PaymentRecorded)
            .with_metadata(serde_json::json!({
                "provider_id": provider_id,
                "payment_id": payment.id,
                "amount_cents": payment.amount_cents,
                "paid": payment.paid_at.is_some(),
            }))
            .by_admin(),
    );
    tracing::info!(
        wedding_id,
        provider_id,
        amount_cents = payment.amount_cents,
        "Payment recorded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: payment })))
}

/// GET /api/planner/weddings/{wedding_id}/payments
pub async fn list_payments(
    access: RequirePlanner,
    State(state): State<AppState>,
    Path(wedding_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Payment>>>> {
    owned_wedding(&state.pool, access.planner_id, wedding_id).await?;
    let payments = PaymentRepo::list_for_wedding(&state.pool, wedding_id).await?;
    Ok(Json(DataResponse { data: payments }))
}

/// POST /api/planner/weddings/{wedding_id}/payments/{id}/paid
///
/// Settle a scheduled payment now. Already settled payments keep their date.
pub async fn mark_paid(
    access: RequirePlanner,
    State(state): State<AppState>,
    Path((wedding_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Payment>>> {
    owned_wedding(&state.pool, access.planner_id, wedding_id).await?;
    let payment = PaymentRepo::mark_paid(&state.pool, wedding_id, id)
        .await?
        .ok_or_else(|| payment_not_found(id))?;
    Ok(Json(DataResponse { data: payment }))
}

/// DELETE /api/planner/weddings/{wedding_id}/payments/{id}
pub async fn delete_payment(
    access: RequirePlanner,
    State(state): State<AppState>,
    Path((wedding_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    owned_wedding(&state.pool, access.planner_id, wedding_id).await?;
    if !PaymentRepo::delete(&state.pool, wedding_id, id).await? {
        return Err(payment_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Per-provider balances rolled up into one ledger.
pub(crate) fn build_ledger(providers: &[Provider], payments: &[Payment]) -> LedgerSummary {
    let mut by_provider: HashMap<DbId, Vec<PaymentEntry>> = HashMap::new();
    for p in payments {
        by_provider.entry(p.provider_id).or_default().push(PaymentEntry {
            amount_cents: p.amount_cents,
            paid_at: p.paid_at,
            due_date: p.due_date,
        });
    }
    let now = Utc::now();
    let balances = providers
        .iter()
        .map(|provider| {
            let entries = by_provider.get(&provider.id).map(Vec::as_slice).unwrap_or(&[]);
            provider_balance(provider.id, provider.total_amount_cents, entries, now)
        })
        .collect();
    ledger_summary(balances)
}

/// GET /api/planner/weddings/{wedding_id}/ledger
pub async fn ledger(
    access: RequirePlanner,
    State(state): State<AppState>,
    Path(wedding_id): Path<DbId>,
) -> AppResult<Json<DataResponse<LedgerSummary>>> {
    owned_wedding(&state.pool, access.planner_id, wedding_id).await?;
    let (providers, payments) = tokio::try_join!(
        ProviderRepo::list_for_wedding(&state.pool, wedding_id),
        PaymentRepo::list_for_wedding(&state.pool, wedding_id),
    )?;
    Ok(Json(DataResponse {
        data: build_ledger(&providers, &payments),
    }))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use vowline_core::payments::MAX_AMOUNT_CENTS;
    use vowline_core::types::Cents;

    use super::*;

    fn provider(id: DbId, total: Cents) -> Provider {
        let now = Utc::now();
        Provider {
            id,
            wedding_id: 1,
            category: "VENUE".into(),
            name: format!("Provider {id}"),
            contact_email: None,
            phone: None,
            total_amount_cents: total,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn payment(id: DbId, provider_id: DbId, amount: Cents, paid: bool, overdue: bool) -> Payment {
        let now = Utc::now();
        Payment {
            id,
            wedding_id: 1,
            provider_id,
            amount_cents: amount,
            paid_at: paid.then_some(now),
            due_date: overdue.then(|| now - Duration::days(3)),
            method: None,
            notes: None,
            created_at: now,
        }
    }

    #[test]
    fn ledger_groups_payments_by_provider() {
        let providers = [provider(1, 10_000), provider(2, 5_000)];
        let payments = [
            payment(1, 1, 4_000, true, false),
            payment(2, 1, 6_000, false, true),
            payment(3, 2, 5_000, true, false),
        ];
        let ledger = build_ledger(&providers, &payments);
        assert_eq!(ledger.total_cents, 15_000);
        assert_eq!(ledger.paid_cents, 9_000);
        assert_eq!(ledger.outstanding_cents, 6_000);
        assert_eq!(ledger.overdue_count, 1);
        assert_eq!(ledger.providers.len(), 2);
    }

    #[test]
    fn provider_without_payments_is_fully_outstanding() {
        let ledger = build_ledger(&[provider(7, 2_500)], &[]);
        assert_eq!(ledger.outstanding_cents, 2_500);
        assert_eq!(ledger.paid_cents, 0);
    }

    #[test]
    fn totals_outside_the_accepted_range_are_rejected() {
        assert!(validate_total(-1).is_err());
        assert!(validate_total(0).is_ok());
        assert!(validate_total(MAX_AMOUNT_CENTS + 1).is_err());
    }

    #[test]
    fn ledger_of_oversized_rows_does_not_overflow() {
        let providers = [provider(1, i64::MAX)];
        let big = i64::MAX / 2 + 1;
        let payments = [payment(1, 1, big, true, false), payment(2, 1, big, true, false)];
        let ledger = build_ledger(&providers, &payments);
        assert_eq!(ledger.paid_cents, i64::MAX);
        assert_eq!(ledger.outstanding_cents, 0);
    }
}
