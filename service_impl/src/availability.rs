use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::gen_service_impl;
use async_trait::async_trait;
use dao::availability_slot::{AvailabilitySlotDao, AvailabilitySlotEntity};
use dao::{DaoError, TransactionDao};
use fitbook_utils::{DateRange, DayOfWeek, TimeWindow};
use service::{
    availability::{AvailabilityService, AvailabilitySlot, DateIndexedSlots, WeekTemplate},
    clock::ClockService,
    config::ConfigService,
    permission::Authentication,
    uuid_service::UuidService,
    PermissionService, ServiceError, ValidationFailureItem,
};
use time::{Date, Time};
use tracing::info;
use uuid::Uuid;

const AVAILABILITY_SERVICE_PROCESS: &str = "availability-service";

gen_service_impl! {
    struct AvailabilityServiceImpl: AvailabilityService = AvailabilityServiceDeps {
        AvailabilitySlotDao: AvailabilitySlotDao<Transaction = Self::Transaction> = availability_slot_dao,
        PermissionService: PermissionService<Context = Self::Context> = permission_service,
        ConfigService: ConfigService = config_service,
        ClockService: ClockService = clock_service,
        UuidService: UuidService = uuid_service,
        TransactionDao: TransactionDao<Transaction = Self::Transaction> = transaction_dao
    }
}

/// Merges recurring templates and date-specific slots onto every date of
/// the range.
///
/// Slots with the same window on a date are reported once, the recurring
/// template wins over a date-specific duplicate.
pub fn resolve_range(
    range: &DateRange,
    recurring: &[AvailabilitySlotEntity],
    specific: &[AvailabilitySlotEntity],
) -> DateIndexedSlots {
    range
        .iter()
        .map(|date| {
            let day_of_week = DayOfWeek::of_date(date);
            let mut seen = BTreeSet::new();
            let mut slots: Vec<AvailabilitySlot> = recurring
                .iter()
                .filter(|slot| slot.day_of_week == day_of_week)
                .chain(
                    specific
                        .iter()
                        .filter(|slot| slot.specific_date == Some(date)),
                )
                .filter(|slot| seen.insert((slot.start_time, slot.end_time)))
                .map(AvailabilitySlot::from)
                .collect();
            slots.sort_by_key(|slot| (slot.start_time, slot.end_time));
            (date, Arc::from(slots))
        })
        .collect()
}

impl<Deps: AvailabilityServiceDeps> AvailabilityServiceImpl<Deps> {
    async fn create_slot(
        &self,
        trainer_id: Uuid,
        day_of_week: DayOfWeek,
        window: TimeWindow,
        specific_date: Option<Date>,
        tx: Deps::Transaction,
    ) -> Result<AvailabilitySlot, ServiceError> {
        let slot = AvailabilitySlot {
            id: self.uuid_service.new_uuid(&format!(
                "{}::create id",
                AVAILABILITY_SERVICE_PROCESS
            )),
            trainer_id,
            day_of_week,
            specific_date,
            start_time: window.from,
            end_time: window.to,
            is_recurring: specific_date.is_none(),
            updated: Some(self.clock_service.date_time_now()),
            version: self.uuid_service.new_uuid(&format!(
                "{}::create version",
                AVAILABILITY_SERVICE_PROCESS
            )),
        };
        self.availability_slot_dao
            .create(&(&slot).try_into()?, AVAILABILITY_SERVICE_PROCESS, tx)
            .await?;
        info!(
            slot_id = %slot.id,
            %trainer_id,
            %day_of_week,
            date = ?specific_date,
            %window,
            "Availability slot created"
        );
        Ok(slot)
    }

    /// Creates the recurring template or replaces the end time of the one
    /// stored under `(trainer_id, day_of_week, window.from)`.
    async fn upsert_recurring(
        &self,
        trainer_id: Uuid,
        day_of_week: DayOfWeek,
        window: TimeWindow,
        tx: Deps::Transaction,
    ) -> Result<AvailabilitySlot, ServiceError> {
        let existing = self
            .availability_slot_dao
            .find_recurring_by_key(trainer_id, day_of_week, window.from, tx.clone())
            .await?;
        let Some(mut entity) = existing else {
            return self
                .create_slot(trainer_id, day_of_week, window, None, tx)
                .await;
        };
        if entity.end_time != window.to {
            entity.end_time = window.to;
            entity.updated = self.clock_service.date_time_now();
            entity.version = self.uuid_service.new_uuid(&format!(
                "{}::update version",
                AVAILABILITY_SERVICE_PROCESS
            ));
            self.availability_slot_dao
                .update(&entity, AVAILABILITY_SERVICE_PROCESS, tx)
                .await?;
            info!(
                slot_id = %entity.id,
                %trainer_id,
                %day_of_week,
                %window,
                "Recurring availability slot end time replaced"
            );
        }
        Ok(AvailabilitySlot::from(&entity))
    }
}

#[async_trait]
impl<Deps: AvailabilityServiceDeps> AvailabilityService for AvailabilityServiceImpl<Deps> {
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn set_availability_slot(
        &self,
        trainer_id: Uuid,
        day_of_week: DayOfWeek,
        start_time: Time,
        end_time: Time,
        specific_date: Option<Date>,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<AvailabilitySlot, ServiceError> {
        self.permission_service
            .check_trainer(trainer_id, context)
            .await?;

        let window = TimeWindow::new(start_time, end_time)?;
        if let Some(date) = specific_date {
            if DayOfWeek::of_date(date) != day_of_week {
                return Err(ServiceError::ValidationError(
                    [ValidationFailureItem::InvalidValue("day_of_week".into())].into(),
                ));
            }
        }

        let tx = self.transaction_dao.use_write_transaction(tx).await?;
        let slot = match specific_date {
            // A concurrent writer may insert the same template between lookup
            // and insert, a second pass then finds and updates it.
            None => match self
                .upsert_recurring(trainer_id, day_of_week, window, tx.clone())
                .await
            {
                Err(ServiceError::DatabaseQueryError(DaoError::UniqueConstraintViolation(_))) => {
                    self.upsert_recurring(trainer_id, day_of_week, window, tx.clone())
                        .await?
                }
                result => result?,
            },
            Some(date) => {
                if let Some(existing) = self
                    .availability_slot_dao
                    .find_specific_by_key(trainer_id, date, start_time, tx.clone())
                    .await?
                {
                    return Err(ServiceError::EntityAlreadyExists(existing.id));
                }
                match self
                    .create_slot(trainer_id, day_of_week, window, Some(date), tx.clone())
                    .await
                {
                    Err(ServiceError::DatabaseQueryError(
                        DaoError::UniqueConstraintViolation(_),
                    )) => {
                        let existing = self
                            .availability_slot_dao
                            .find_specific_by_key(trainer_id, date, start_time, tx.clone())
                            .await?
                            .ok_or(ServiceError::InternalError)?;
                        return Err(ServiceError::EntityAlreadyExists(existing.id));
                    }
                    result => result?,
                }
            }
        };
        self.transaction_dao.commit(tx).await?;
        Ok(slot)
    }

    async fn remove_availability_slot(
        &self,
        slot_id: Uuid,
        context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<(), ServiceError> {
        let tx = self.transaction_dao.use_write_transaction(tx).await?;
        let slot = self
            .availability_slot_dao
            .find_by_id(slot_id, tx.clone())
            .await?
            .ok_or(ServiceError::EntityNotFound(slot_id))?;
        self.permission_service
            .check_trainer(slot.trainer_id, context)
            .await?;

        self.availability_slot_dao
            .delete(slot_id, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;
        info!(%slot_id, trainer_id = %slot.trainer_id, "Availability slot removed");
        Ok(())
    }

    async fn get_trainer_availability(
        &self,
        trainer_id: Uuid,
        _context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<WeekTemplate, ServiceError> {
        let tx = self.transaction_dao.use_transaction(tx).await?;
        let recurring = self
            .availability_slot_dao
            .find_recurring_by_trainer(trainer_id, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        let mut by_day: BTreeMap<DayOfWeek, Vec<AvailabilitySlot>> = DayOfWeek::ALL
            .iter()
            .map(|day| (*day, Vec::new()))
            .collect();
        for entity in recurring.iter() {
            by_day
                .entry(entity.day_of_week)
                .or_default()
                .push(entity.into());
        }
        Ok(by_day
            .into_iter()
            .map(|(day, mut slots)| {
                slots.sort_by_key(|slot| (slot.start_time, slot.end_time));
                (day, Arc::from(slots))
            })
            .collect())
    }

    async fn get_trainer_slots_for_range(
        &self,
        trainer_id: Uuid,
        start_date: Date,
        end_date: Date,
        _context: Authentication<Self::Context>,
        tx: Option<Self::Transaction>,
    ) -> Result<DateIndexedSlots, ServiceError> {
        if end_date < start_date {
            return Err(ServiceError::DateOrderWrong(start_date, end_date));
        }
        let range = DateRange::new(start_date, end_date);
        let config = self.config_service.get_config().await?;
        if range.len() > config.max_range_days {
            return Err(ServiceError::ValidationError(
                [ValidationFailureItem::InvalidValue("end_date".into())].into(),
            ));
        }

        let tx = self.transaction_dao.use_transaction(tx).await?;
        let recurring = self
            .availability_slot_dao
            .find_recurring_by_trainer(trainer_id, tx.clone())
            .await?;
        let specific = self
            .availability_slot_dao
            .find_specific_by_trainer_and_range(trainer_id, start_date, end_date, tx.clone())
            .await?;
        self.transaction_dao.commit(tx).await?;

        Ok(resolve_range(&range, &recurring, &specific))
    }
}
