pub mod logging;
pub(crate) mod task;

pub mod accounts;
pub mod address;
pub mod builder;
pub mod exchange_address;
pub mod fee_client;
pub mod manager;
pub mod rates;
pub mod server_error;
pub mod trade;

pub use skiff_types as types;
