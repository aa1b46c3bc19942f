//! SeaORM implementation of PaymentRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::domain::{DomainError, NewPayment, Payment, PaymentRepository};
use crate::models::payment::{self, ActiveModel, Entity as PaymentEntity};

/// SeaORM-based implementation of PaymentRepository
pub struct SeaOrmPaymentRepository {
    db: DatabaseConnection,
}

impl SeaOrmPaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentRepository for SeaOrmPaymentRepository {
    async fn find_by_reservation(
        &self,
        reservation_id: &str,
    ) -> Result<Vec<Payment>, DomainError> {
        let payments = PaymentEntity::find()
            .filter(payment::Column::ReservationId.eq(reservation_id))
            .order_by_asc(payment::Column::PaymentDate)
            .all(&self.db)
            .await?;

        Ok(payments.into_iter().map(Payment::from).collect())
    }

    async fn create(&self, input: NewPayment) -> Result<Payment, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let payment = ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            reservation_id: Set(input.reservation_id),
            amount: Set(input.amount),
            payment_date: Set(input.payment_date.unwrap_or_else(|| now.clone())),
            payment_method: Set(input.payment_method),
            notes: Set(input.notes),
            created_at: Set(now),
        };

        let result = payment.insert(&self.db).await?;
        Ok(Payment::from(result))
    }
}
