use std::sync::Arc;

use crate::gen_service_impl;
use async_trait::async_trait;
use dao::booking::BookingDao;
use dao::TransactionDao;
use fitbook_utils::TimeWindow;
use service::{
    availability::{AvailabilityService, AvailabilitySlot},
    booking::BookingStatus,
    permission::Authentication,
    slot_resolution::SlotResolutionService,
    ServiceError,
};
use time::Date;
use uuid::Uuid;

gen_service_impl! {
    struct SlotResolutionServiceImpl: SlotResolutionService = SlotResolutionServiceDeps {
        AvailabilityService: AvailabilityService<Context = Self::Context, Transaction = Self::Transaction> = availability_service,
        BookingDao: BookingDao<Transaction = Self::Transaction> = booking_dao,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

/// Declared windows which no booked window intersects, ordered by start.
///
/// A declared window is dropped as a whole as soon as any booking touches
/// it, the booked part is not carved out.
pub fn free_windows(declared: &[TimeWindow], booked: &[TimeWindow]) -> Arc<[TimeWindow]> {
    let mut free: Vec<TimeWindow> = declared
        .iter()
        .filter(|window| !booked.iter().any(|booking| window.intersects(booking)))
        .copied()
        .collect();
    free.sort();
    free.dedup();
    free.into()
}

#[async_trait]
impl<Deps: SlotResolutionServiceDeps> SlotResolutionService for SlotResolutionServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn get_available_slots(
        &self,
        trainer_id: Uuid,
        date: Date,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<Arc<[TimeWindow]>, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let declared = self
            .availability_service
            .get_trainer_slots_for_range(trainer_id, date, date, context, Some(tx.clone()))
            .await?;
        let bookings = self
            .booking_dao
            .find_active_by_trainer_and_date(trainer_id, date, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        let declared: Vec<TimeWindow> = declared
            .get(&date)
            .map(|slots| slots.iter().map(AvailabilitySlot::window).collect())
            .unwrap_or_default();
        let booked: Vec<TimeWindow> = bookings
            .iter()
            .filter(|booking| BookingStatus::from(booking.status).is_active())
            .map(|booking| TimeWindow {
                from: booking.start_time,
                to: booking.end_time,
            })
            .collect();
        Ok(free_windows(&declared, &booked))
    }
}
