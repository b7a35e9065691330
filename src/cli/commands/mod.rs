//! CLI command implementations

pub mod config;
pub mod inspect;
pub mod status;
pub mod unpack;

pub use config::execute as config;
pub use inspect::execute as inspect;
pub use status::execute as status;
pub use unpack::execute as unpack;
