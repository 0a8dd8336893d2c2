use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use uuid::Uuid;

pub mod availability_slot;
pub mod booking;

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("Uuid error: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Time format error: {0}")]
    TimeFormatError(#[from] time::error::Format),

    #[error("Time parse error: {0}")]
    TimeParseError(#[from] time::error::Parse),

    #[error("Invalid day of week number: {0}")]
    InvalidDayOfWeek(u8),

    #[error("Enum value not found: {0}")]
    EnumValueNotFound(Arc<str>),

    #[error("Unique constraint violated: {0}")]
    UniqueConstraintViolation(Arc<str>),

    #[error("Entity {0} was modified concurrently")]
    VersionConflict(Uuid),
}

pub trait Transaction: Clone + std::fmt::Debug + Send + Sync + 'static {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockTransaction;
impl Transaction for MockTransaction {}

#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait TransactionDao {
    type Transaction: Transaction;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError>;
    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError>;
    /// Like `use_transaction`, but a new transaction holds the write lock
    /// from its first statement on, so check-then-insert sequences of
    /// concurrent callers run one after another.
    async fn use_write_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError>;
    async fn commit(&self, transaction: Self::Transaction) -> Result<(), DaoError>;
}
