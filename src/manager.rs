pub mod send_manager;

pub use send_manager::SendManager;
