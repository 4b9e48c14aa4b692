pub mod shutdown;

pub use shutdown::{shutdown_on_signals, wait_for_shutdown};
