//! The domain entities, their external REST representations, and the shared
//! value types (ids, audit stamps, password hashes) they are built from.
//!
//! Each entity comes in two shapes: the internal struct stored in the
//! database, and a `*Resource` struct that speaks the wire format. The
//! resource type doubles as create body, update body, and response; absent
//! fields on an update body mean "leave unchanged".

mod account;
mod audit;
mod config_type;
mod expense;
mod password;
pub mod resource_id;
mod user;

pub use account::{Account, AccountResource};
pub use audit::{Audit, DEFAULT_IDENTITY};
pub use config_type::{ConfigType, ConfigTypeResource, DEFAULT_CONFIG_STATUS};
pub use expense::{Expense, ExpenseResource};
pub use password::{PasswordHash, validate_password_strength};
pub use resource_id::ResourceId;
pub use user::{
    ENCRYPT_TYPE_BCRYPT, User, UserResource, UserStatus, parse_email, validate_username,
};
