pub mod client;
pub mod comments;
pub mod config;
pub mod errors;
pub mod notify;
pub mod posts;
pub mod profile;
pub mod relations;
pub mod remote;
pub mod search;
pub mod session;
pub mod telemetry;
pub mod toggle;
pub mod ui;

// Shared data types, so callers need not depend on socialsync-common directly.
pub use socialsync_common as model;
