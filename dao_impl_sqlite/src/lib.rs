use std::sync::Arc;

use async_trait::async_trait;
use dao::{DaoError, Transaction};
use sqlx::SqlitePool;
use time::{
    format_description::BorrowedFormatItem, macros::format_description, Date, Time,
};
use tokio::sync::Mutex;

pub mod availability_slot;
pub mod booking;

pub(crate) const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
pub(crate) const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]");

pub trait ResultDbErrorExt<T, E> {
    fn map_db_error(self) -> Result<T, DaoError>;
}
impl<T, E: std::error::Error + Send + Sync + 'static> ResultDbErrorExt<T, E> for Result<T, E> {
    fn map_db_error(self) -> Result<T, DaoError> {
        self.map_err(|err| DaoError::DatabaseQueryError(Box::new(err)))
    }
}

/// Like `map_db_error` but reports violations of a unique index separately.
pub trait ResultUniqueErrorExt<T> {
    fn map_unique_error(self, constraint: &str) -> Result<T, DaoError>;
}
impl<T> ResultUniqueErrorExt<T> for Result<T, sqlx::Error> {
    fn map_unique_error(self, constraint: &str) -> Result<T, DaoError> {
        self.map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DaoError::UniqueConstraintViolation(constraint.into())
            }
            _ => DaoError::DatabaseQueryError(Box::new(err)),
        })
    }
}

pub(crate) fn format_date(date: Date) -> Result<String, DaoError> {
    Ok(date.format(DATE_FORMAT)?)
}

pub(crate) fn parse_date(value: &str) -> Result<Date, DaoError> {
    Ok(Date::parse(value, DATE_FORMAT)?)
}

pub(crate) fn format_time(time: Time) -> Result<String, DaoError> {
    Ok(time.format(TIME_FORMAT)?)
}

pub(crate) fn parse_time(value: &str) -> Result<Time, DaoError> {
    Ok(Time::parse(value, TIME_FORMAT)?)
}

#[derive(Clone, Debug)]
pub struct TransactionImpl {
    tx: Arc<Mutex<sqlx::Transaction<'static, sqlx::Sqlite>>>,
}

impl Transaction for TransactionImpl {}

pub struct TransactionDaoImpl {
    pool: Arc<SqlitePool>,
}
impl TransactionDaoImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}
#[async_trait]
impl dao::TransactionDao for TransactionDaoImpl {
    type Transaction = TransactionImpl;

    async fn new_transaction(&self) -> Result<Self::Transaction, DaoError> {
        let tx = self.pool.begin().await.map_db_error()?;
        Ok(TransactionImpl {
            tx: Arc::new(tx.into()),
        })
    }

    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError> {
        match tx {
            Some(tx) => Ok(tx),
            None => self.new_transaction().await,
        }
    }

    async fn use_write_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError> {
        match tx {
            Some(tx) => Ok(tx),
            None => {
                let tx = self
                    .pool
                    .begin_with("BEGIN IMMEDIATE")
                    .await
                    .map_db_error()?;
                Ok(TransactionImpl {
                    tx: Arc::new(tx.into()),
                })
            }
        }
    }

    async fn commit(&self, transaction: Self::Transaction) -> Result<(), DaoError> {
        if let Some(tx) = Arc::into_inner(transaction.tx) {
            tx.into_inner().commit().await.map_db_error()?;
        }
        Ok(())
    }
}
