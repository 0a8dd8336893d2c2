#[cfg(test)]
mod integration_test;

use std::sync::Arc;

use dao_impl_sqlite::{
    availability_slot::AvailabilitySlotDaoImpl, booking::BookingDaoImpl, TransactionDaoImpl,
    TransactionImpl,
};
use service::config::Config;
use service_impl::{
    availability::{AvailabilityServiceDeps, AvailabilityServiceImpl},
    availability_bulk::{AvailabilityBulkServiceDeps, AvailabilityBulkServiceImpl},
    booking::{BookingServiceDeps, BookingServiceImpl},
    slot_resolution::{SlotResolutionServiceDeps, SlotResolutionServiceImpl},
};
use sqlx::SqlitePool;
#[cfg(feature = "json_logging")]
use tracing_subscriber::fmt::format::FmtSpan;

const DEFAULT_DATABASE_URL: &str = "sqlite:./localdb.sqlite3?mode=rwc";
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3000";
const NOTIFICATION_CAPACITY: usize = 256;

type Context = rest::Context;
type Transaction = TransactionImpl;
type TransactionDao = TransactionDaoImpl;
type AvailabilitySlotDao = AvailabilitySlotDaoImpl;
type BookingDao = BookingDaoImpl;

type IdentityService = service_impl::identity::IdentityServiceDev;
type PermissionService = service_impl::permission::PermissionServiceImpl<IdentityService>;
type ClockService = service_impl::clock::ClockServiceImpl;
type UuidService = service_impl::uuid_service::UuidServiceImpl;
type ConfigService = service_impl::config::ConfigServiceImpl;
type BookingNotificationService = service_impl::notification::BookingNotificationServiceImpl;

pub struct AvailabilityServiceDependencies;
impl AvailabilityServiceDeps for AvailabilityServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type AvailabilitySlotDao = AvailabilitySlotDao;
    type PermissionService = PermissionService;
    type ConfigService = ConfigService;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type TransactionDao = TransactionDao;
}
type AvailabilityService = AvailabilityServiceImpl<AvailabilityServiceDependencies>;

pub struct AvailabilityBulkServiceDependencies;
impl AvailabilityBulkServiceDeps for AvailabilityBulkServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type AvailabilityService = AvailabilityService;
    type PermissionService = PermissionService;
    type ConfigService = ConfigService;
}
type AvailabilityBulkService = AvailabilityBulkServiceImpl<AvailabilityBulkServiceDependencies>;

pub struct SlotResolutionServiceDependencies;
impl SlotResolutionServiceDeps for SlotResolutionServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type AvailabilityService = AvailabilityService;
    type BookingDao = BookingDao;
    type TransactionDao = TransactionDao;
}
type SlotResolutionService = SlotResolutionServiceImpl<SlotResolutionServiceDependencies>;

pub struct BookingServiceDependencies;
impl BookingServiceDeps for BookingServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type BookingDao = BookingDao;
    type SlotResolutionService = SlotResolutionService;
    type PermissionService = PermissionService;
    type BookingNotificationService = BookingNotificationService;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type TransactionDao = TransactionDao;
}
type BookingService = BookingServiceImpl<BookingServiceDependencies>;

#[derive(Clone)]
pub struct RestStateImpl {
    availability_service: Arc<AvailabilityService>,
    availability_bulk_service: Arc<AvailabilityBulkService>,
    slot_resolution_service: Arc<SlotResolutionService>,
    booking_service: Arc<BookingService>,
    booking_notification_service: Arc<BookingNotificationService>,
}

impl rest::RestStateDef for RestStateImpl {
    type AvailabilityService = AvailabilityService;
    type AvailabilityBulkService = AvailabilityBulkService;
    type SlotResolutionService = SlotResolutionService;
    type BookingService = BookingService;

    fn availability_service(&self) -> Arc<Self::AvailabilityService> {
        self.availability_service.clone()
    }
    fn availability_bulk_service(&self) -> Arc<Self::AvailabilityBulkService> {
        self.availability_bulk_service.clone()
    }
    fn slot_resolution_service(&self) -> Arc<Self::SlotResolutionService> {
        self.slot_resolution_service.clone()
    }
    fn booking_service(&self) -> Arc<Self::BookingService> {
        self.booking_service.clone()
    }
}

impl RestStateImpl {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self::with_config_service(pool, ConfigService::from_env())
    }

    pub fn with_config(pool: Arc<SqlitePool>, config: Config) -> Self {
        Self::with_config_service(pool, ConfigService::with_config(config))
    }

    fn with_config_service(pool: Arc<SqlitePool>, config_service: ConfigService) -> Self {
        let transaction_dao = Arc::new(TransactionDao::new(pool.clone()));
        let availability_slot_dao = Arc::new(AvailabilitySlotDao::new(pool.clone()));
        let booking_dao = Arc::new(BookingDao::new(pool.clone()));

        let permission_service = Arc::new(PermissionService::new(Arc::new(
            service_impl::identity::IdentityServiceDev,
        )));
        let clock_service = Arc::new(service_impl::clock::ClockServiceImpl);
        let uuid_service = Arc::new(service_impl::uuid_service::UuidServiceImpl);
        let config_service = Arc::new(config_service);
        let booking_notification_service =
            Arc::new(BookingNotificationService::new(NOTIFICATION_CAPACITY));

        let availability_service = Arc::new(AvailabilityService {
            availability_slot_dao,
            permission_service: permission_service.clone(),
            config_service: config_service.clone(),
            clock_service: clock_service.clone(),
            uuid_service: uuid_service.clone(),
            transaction_dao: transaction_dao.clone(),
        });
        let availability_bulk_service = Arc::new(AvailabilityBulkService {
            availability_service: availability_service.clone(),
            permission_service: permission_service.clone(),
            config_service,
        });
        let slot_resolution_service = Arc::new(SlotResolutionService {
            availability_service: availability_service.clone(),
            booking_dao: booking_dao.clone(),
            transaction_dao: transaction_dao.clone(),
        });
        let booking_service = Arc::new(BookingService {
            booking_dao,
            slot_resolution_service: slot_resolution_service.clone(),
            permission_service,
            booking_notification_service: booking_notification_service.clone(),
            clock_service,
            uuid_service,
            transaction_dao,
        });

        Self {
            availability_service,
            availability_bulk_service,
            slot_resolution_service,
            booking_service,
            booking_notification_service,
        }
    }

    pub fn booking_notification_service(&self) -> Arc<BookingNotificationService> {
        self.booking_notification_service.clone()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let version = env!("CARGO_PKG_VERSION");

    #[cfg(feature = "local_logging")]
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::TRACE)
        .pretty()
        .with_file(true)
        .finish();

    #[cfg(feature = "json_logging")]
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_span_list(true)
        .with_file(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("Fitbook scheduler version: {}", version);
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let server_address =
        std::env::var("SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string());

    let pool = Arc::new(SqlitePool::connect(&database_url).await?);
    sqlx::migrate!("../migrations/sqlite")
        .run(pool.as_ref())
        .await?;

    let rest_state = RestStateImpl::new(pool);
    rest::start_server(rest_state, &server_address).await?;
    Ok(())
}
