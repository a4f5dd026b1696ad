//! Market Server - multi-vendor marketplace backend
//!
//! # Architecture
//!
//! - **HTTP API** (`api`): REST routes for catalog, checkout, order
//!   lifecycle, refunds and admin revenue
//! - **Database** (`db`): embedded SurrealDB models and repositories
//! - **Order domain** (`orders`): money arithmetic, stock reconciliation,
//!   checkout saga, status lifecycle
//! - **Auth** (`auth`): JWT bearer validation and role gates
//! - **Integrity** (`integrity`): periodic invariant checker
//!
//! # Module structure
//!
//! ```text
//! market-server/src/
//! ├── core/        # config, state, server, background tasks
//! ├── auth/        # JWT validation, role checks
//! ├── api/         # HTTP routes and handlers
//! ├── db/          # models and repositories
//! ├── orders/      # checkout, stock, lifecycle, money
//! ├── integrity.rs # invariant checker job
//! └── utils/       # errors, logging, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod integrity;
pub mod orders;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, setup_environment};
pub use orders::{CheckoutService, LifecycleService, StockLedger};
pub use utils::{AppError, AppResult};

pub fn print_banner() {
    println!(
        r#"
   __  ___           __        __
  /  |/  /___ ______/ /_____  / /_
 / /|_/ / __ `/ ___/ //_/ _ \/ __/
/ /  / / /_/ / /  / ,< /  __/ /_
/_/  /_/\__,_/_/  /_/|_|\___/\__/
    "#
    );
}
