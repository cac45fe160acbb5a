mod serve;

pub use serve::{serve, show_config};
