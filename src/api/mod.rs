//! Backend REST client and resource operations

mod accounts;
mod attendance;
mod batches;
pub mod client;
mod institutes;
mod master_data;
pub mod models;
mod students;
mod subjects;

pub use accounts::Accounts;
pub use attendance::Attendance;
pub use batches::Batches;
pub use client::{Access, ApiClient};
pub use institutes::Institutes;
pub use master_data::MasterData;
pub use students::Students;
pub use subjects::Subjects;
