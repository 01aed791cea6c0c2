#![deny(warnings)]
pub mod game;
pub mod model;
pub mod stats;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "love-potion-tracker"
    }

    pub const fn game() -> &'static str {
        "Love Potion"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
