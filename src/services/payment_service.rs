//! Payment Service - append-only payments against a reservation

use serde::Serialize;

use crate::domain::validation;
use crate::domain::{DomainError, NewPayment, Payment, PaymentRepository, ReservationRepository};

const MAX_METHOD_LEN: usize = 50;
const MAX_NOTES_LEN: usize = 500;

/// Payments of one reservation with their sum
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSummary {
    pub payments: Vec<Payment>,
    pub total_paid: f64,
}

pub async fn add_payment(
    payments: &dyn PaymentRepository,
    reservations: &dyn ReservationRepository,
    input: NewPayment,
) -> Result<Payment, DomainError> {
    let amount = validation::monetary_amount("amount", input.amount)?;
    let payment_date = input
        .payment_date
        .map(|d| validation::timestamp("payment_date", &d))
        .transpose()?;
    let payment_method =
        validation::optional_text("payment_method", input.payment_method, MAX_METHOD_LEN)?;
    let notes = validation::optional_text("notes", input.notes, MAX_NOTES_LEN)?;

    if reservations.find_by_id(&input.reservation_id).await?.is_none() {
        return Err(DomainError::NotFound);
    }

    let payment = payments
        .create(NewPayment {
            reservation_id: input.reservation_id,
            amount,
            payment_date,
            payment_method,
            notes,
        })
        .await?;

    tracing::info!(
        "Recorded payment {} of {:.2} for reservation {}",
        payment.id,
        payment.amount,
        payment.reservation_id
    );
    Ok(payment)
}

pub async fn list_payments(
    payments: &dyn PaymentRepository,
    reservations: &dyn ReservationRepository,
    reservation_id: &str,
) -> Result<PaymentSummary, DomainError> {
    if reservations.find_by_id(reservation_id).await?.is_none() {
        return Err(DomainError::NotFound);
    }

    let payments = payments.find_by_reservation(reservation_id).await?;
    let total_paid = total(&payments);
    Ok(PaymentSummary {
        payments,
        total_paid,
    })
}

/// Sum in cents so repeated additions do not drift
fn total(payments: &[Payment]) -> f64 {
    let cents: i64 = payments
        .iter()
        .map(|p| (p.amount * 100.0).round() as i64)
        .sum();
    cents as f64 / 100.0
}
