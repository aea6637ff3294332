//! HTTP request handlers.

mod agents;
mod health;
pub(crate) mod problem_details;
mod status;
mod vaults;

pub use agents::{capabilities, chat, search};
pub use health::{livez, readyz, version};
pub use status::{create_status_check, list_status_checks, root};
pub use vaults::{get_vault, list_vaults};
