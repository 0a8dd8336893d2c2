use std::collections::{BTreeMap, BTreeSet};

use crate::gen_service_impl;
use async_trait::async_trait;
use fitbook_utils::{range_to_slots, DateRange, DayOfWeek, TimeWindow};
use service::{
    availability::{AvailabilityService, AvailabilitySlot},
    availability_bulk::{AvailabilityBulkService, BulkAvailabilityRequest, BulkResult},
    config::{Config, ConfigService},
    permission::Authentication,
    PermissionService, ServiceError, ValidationFailureItem,
};
use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

gen_service_impl! {
    struct AvailabilityBulkServiceImpl: AvailabilityBulkService = AvailabilityBulkServiceDeps {
        AvailabilityService: AvailabilityService<Context = Self::Context, Transaction = Self::Transaction> = availability_service,
        PermissionService: PermissionService<Context = Self::Context> = permission_service,
        ConfigService: ConfigService = config_service
    }
}

impl<Deps: AvailabilityBulkServiceDeps> AvailabilityBulkServiceImpl<Deps> {
    /// One store call for one date-specific slot. Never fails, the outcome
    /// is only counted in `result`.
    async fn create_counted(
        &self,
        trainer_id: Uuid,
        date: Date,
        window: TimeWindow,
        config: &Config,
        context: Authentication<Deps::Context>,
        result: &mut BulkResult,
    ) {
        if result.total() > 0 && !config.bulk_create_delay.is_zero() {
            tokio::time::sleep(config.bulk_create_delay).await;
        }
        match self
            .availability_service
            .set_availability_slot(
                trainer_id,
                DayOfWeek::of_date(date),
                window.from,
                window.to,
                Some(date),
                context,
                None,
            )
            .await
        {
            Ok(_) => result.record_success(),
            Err(err) => {
                warn!(%trainer_id, %date, %window, "Creating availability slot failed: {err}");
                result.record_failure();
            }
        }
    }
}

#[async_trait]
impl<Deps: AvailabilityBulkServiceDeps> AvailabilityBulkService
    for AvailabilityBulkServiceImpl<Deps>
{
    type Context = Deps::Context;
    type Transaction = Deps::Transaction;

    async fn bulk_create(
        &self,
        request: &BulkAvailabilityRequest,
        context: Authentication<Self::Context>,
    ) -> Result<BulkResult, ServiceError> {
        self.permission_service
            .check_trainer(request.trainer_id, context.clone())
            .await?;

        if request.end_date < request.start_date {
            return Err(ServiceError::DateOrderWrong(
                request.start_date,
                request.end_date,
            ));
        }
        let slots = range_to_slots(
            request.start_time,
            request.end_time,
            request.slot_duration_minutes,
        )?;
        let config = self.config_service.get_config().await?;
        let dates = DateRange::new(request.start_date, request.end_date);

        let mut validation = Vec::with_capacity(2);
        if dates.len() > config.max_range_days {
            validation.push(ValidationFailureItem::InvalidValue("end_date".into()));
        }
        if request.weekdays.is_empty() {
            validation.push(ValidationFailureItem::MissingValue("weekdays".into()));
        }
        if !validation.is_empty() {
            return Err(ServiceError::ValidationError(validation.into()));
        }

        let mut result = BulkResult::default();
        for date in dates
            .iter()
            .filter(|date| request.weekdays.contains(&DayOfWeek::of_date(*date)))
        {
            for window in slots.iter() {
                self.create_counted(
                    request.trainer_id,
                    date,
                    window,
                    &config,
                    context.clone(),
                    &mut result,
                )
                .await;
            }
        }
        info!(
            trainer_id = %request.trainer_id,
            success = result.success_count,
            failure = result.failure_count,
            "Bulk availability creation finished"
        );
        Ok(result)
    }

    async fn copy_week(
        &self,
        trainer_id: Uuid,
        source_week_start: Date,
        target_week_start: Date,
        context: Authentication<Self::Context>,
    ) -> Result<BulkResult, ServiceError> {
        self.permission_service
            .check_trainer(trainer_id, context.clone())
            .await?;

        let source_week = DateRange::week_from(source_week_start)?;
        let target_week = DateRange::week_from(target_week_start)?;
        let config = self.config_service.get_config().await?;

        let source = self
            .availability_service
            .get_trainer_slots_for_range(
                trainer_id,
                source_week.start(),
                source_week.end(),
                context.clone(),
                None,
            )
            .await?;
        let target = self
            .availability_service
            .get_trainer_slots_for_range(
                trainer_id,
                target_week.start(),
                target_week.end(),
                context.clone(),
                None,
            )
            .await?;

        let mut by_weekday: BTreeMap<DayOfWeek, Vec<TimeWindow>> = BTreeMap::new();
        for (date, slots) in source.iter() {
            by_weekday
                .entry(DayOfWeek::of_date(*date))
                .or_default()
                .extend(slots.iter().map(AvailabilitySlot::window));
        }

        let mut result = BulkResult::default();
        for date in target_week.iter() {
            let Some(windows) = by_weekday.get(&DayOfWeek::of_date(date)) else {
                continue;
            };
            let existing: BTreeSet<TimeWindow> = target
                .get(&date)
                .map(|slots| slots.iter().map(AvailabilitySlot::window).collect())
                .unwrap_or_default();
            for window in windows {
                if existing.contains(window) {
                    warn!(%trainer_id, %date, %window, "Slot is already available, not copied");
                    result.record_failure();
                    continue;
                }
                self.create_counted(
                    trainer_id,
                    date,
                    *window,
                    &config,
                    context.clone(),
                    &mut result,
                )
                .await;
            }
        }
        info!(
            %trainer_id,
            %source_week_start,
            %target_week_start,
            success = result.success_count,
            failure = result.failure_count,
            "Week copied"
        );
        Ok(result)
    }
}
