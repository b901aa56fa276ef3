//! Command implementations
//!
//! Each command is implemented in its own submodule:
//! - core: Database opening and init
//! - serve: Web server
//! - users: Account management
//! - transactions: Transaction listing, stats and categories
//! - receipts: Receipt scanning and statement parsing

pub mod core;
pub mod receipts;
pub mod serve;
pub mod transactions;
pub mod users;

pub use self::core::*;
pub use receipts::*;
pub use serve::*;
pub use transactions::*;
pub use users::*;
