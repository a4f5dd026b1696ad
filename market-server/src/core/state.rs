//! Server state
//!
//! [`ServerState`] holds the shared service singletons. Cloning is an Arc
//! bump; every request handler gets one through axum's `State`.

use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::core::tasks::BackgroundTasks;
use crate::db::DbService;
use crate::db::repository::{
    OrderRepository, ProductRepository, RefundRepository, RevenueRepository,
};
use crate::integrity::IntegrityChecker;
use crate::orders::{CheckoutService, LifecycleService, StockLedger};

#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Embedded database handle
    pub db: Surreal<Db>,
    /// JWT validation service
    pub jwt_service: Arc<JwtService>,
    /// Order placement saga
    pub checkout: CheckoutService,
    /// Status transitions and refunds
    pub lifecycle: LifecycleService,
}

impl ServerState {
    /// Initialize the full state: work dirs, database, services.
    ///
    /// # Panics
    ///
    /// Panics when the work directory or database cannot be initialized;
    /// the server is useless without either.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_dir = config.database_dir();
        let db_path = db_dir.join("market.db");
        let db_service = DbService::open(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        Self::from_db(config.clone(), db_service.db)
    }

    /// Build state on top of an existing database handle. Tests use this
    /// with the in-memory engine.
    pub fn from_db(config: Config, db: Surreal<Db>) -> Self {
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let products = ProductRepository::new(db.clone());
        let orders = OrderRepository::new(db.clone());
        let revenue = RevenueRepository::new(db.clone());
        let refunds = RefundRepository::new(db.clone());

        let stock = StockLedger::new(products.clone());
        let checkout = CheckoutService::new(
            products,
            orders.clone(),
            stock.clone(),
            config.shipping_fee,
        );
        let lifecycle = LifecycleService::new(orders, revenue, refunds, stock);

        Self {
            config,
            db,
            jwt_service,
            checkout,
            lifecycle,
        }
    }

    /// Start the background jobs. The returned registry must be kept
    /// alive and shut down when the server exits.
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let checker = IntegrityChecker::new(self.db.clone());
        let interval = std::time::Duration::from_secs(self.config.integrity_interval_secs);
        let token = tasks.shutdown_token();
        tasks.spawn("integrity_check", async move {
            checker.run_loop(interval, token).await;
        });

        tasks
    }
}
