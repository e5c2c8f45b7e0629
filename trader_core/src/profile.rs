use std::{fs, path::Path};

use anyhow::{Context, Result, ensure};
use datamodel::{Price, Quantity, Symbol};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Profiles shipped with the crate, see `products.toml`.
pub static PRODUCT_PROFILES: Lazy<ProductProfiles> = Lazy::new(|| {
    ProductProfiles::from_toml_str(include_str!("../products.toml"))
        .expect("embedded products.toml must parse")
});

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Quote around a fixed fair value.
    FixedAnchor,
    /// Quote around the EMA, skewed by inventory.
    EmaTrend,
    /// Follow the slope of sunlight and humidity.
    ObservationSignal,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ProductProfile {
    pub default_price: Price,
    pub position_limit: Quantity,
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone, Default)]
pub struct ProductProfiles(FxHashMap<Symbol, ProductProfile>);

impl ProductProfiles {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let profiles: FxHashMap<Symbol, ProductProfile> =
            toml::from_str(raw).context("invalid product profiles")?;
        for (symbol, profile) in &profiles {
            ensure!(
                profile.position_limit > 0,
                "position limit of {symbol} must be positive"
            );
            ensure!(
                profile.default_price > 0,
                "default price of {symbol} must be positive"
            );
        }
        Ok(Self(profiles))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&raw)
    }

    pub fn get(&self, symbol: &str) -> Option<&ProductProfile> {
        self.0.get(symbol)
    }

    /// Sorted by symbol so the per-step order of work is stable.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &ProductProfile)> {
        let mut profiles: Vec<_> = self.0.iter().collect();
        profiles.sort_by(|a, b| a.0.cmp(b.0));
        profiles.into_iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
