//! Authentication, session and access control

pub mod gate;
pub mod models;
pub mod navigator;
pub mod session;

pub use gate::{AccessGate, Gate, View};
pub use models::{Credentials, Identity, PasswordChange, ProfileUpdate, Registration, Role, Session};
pub use navigator::{ConsoleNavigator, Navigator, RecordingNavigator};
pub use session::{FileStorage, MemoryStorage, SessionStorage, SessionStore};
