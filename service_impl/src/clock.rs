use service::clock::ClockService;
use time::OffsetDateTime;

/// Wall clock in the local offset of the host, UTC if the offset is unknown.
pub struct ClockServiceImpl;
impl ClockService for ClockServiceImpl {
    fn date_time_now(&self) -> time::PrimitiveDateTime {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        time::PrimitiveDateTime::new(now.date(), now.time())
    }
}
