pub mod calc;
pub mod config;
pub mod history;
pub mod pricing;
pub mod profile;
pub mod strategy;
pub mod trader;
pub mod visualizer;

pub use config::TraderConfig;
pub use profile::{PRODUCT_PROFILES, ProductProfile, ProductProfiles, StrategyKind};
pub use trader::{Trader, TraderOutput};
