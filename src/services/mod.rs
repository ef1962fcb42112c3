//! The services that sit between the REST handlers and the stores.
//!
//! Each service owns the add/update protocol: adding rejects a pre-assigned
//! identity, updating requires one and falls back to inserting a fresh record
//! when the identity does not match a stored row.

pub mod account;
pub mod config_type;
pub mod expense;
pub mod user;

pub use account::AccountService;
pub use config_type::ConfigTypeService;
pub use expense::ExpenseService;
pub use user::{Credentials, DeleteUserRequest, UserService};
