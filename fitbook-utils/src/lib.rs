mod date_utils;
mod time_slot;

pub use date_utils::*;
pub use time_slot::*;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FitbookUtilsError {
    #[error("Invalid day of week: {0}")]
    InvalidDayOfWeek(u8),

    #[error("Time order wrong: {0} must be before {1}")]
    TimeOrderWrong(time::Time, time::Time),

    #[error("Slot duration must be greater than zero")]
    ZeroSlotDuration,

    #[error("Date out of range")]
    DateOutOfRange,
}

/// Implement `From<T>` for a type which already implement From<&T>
#[macro_export]
macro_rules! derive_from_reference {
    ($from_type:ty, $impl_type:ty) => {
        impl From<$from_type> for $impl_type {
            fn from(value: $from_type) -> Self {
                Self::from(&value)
            }
        }
    };
}
