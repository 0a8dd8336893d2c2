use mockall::automock;

/// Local, timezone-less wall clock.
#[automock]
pub trait ClockService {
    fn date_time_now(&self) -> time::PrimitiveDateTime;
}
