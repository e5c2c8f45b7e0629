use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use datamodel::TradingState;
use trader_core::{PRODUCT_PROFILES, ProductProfiles, Trader, TraderConfig};

#[derive(Parser)]
#[command(name = "replay")]
#[command(about = "Feed recorded trading states through the trader, one step per line")]
struct Args {
    /// JSON-lines file, one TradingState per line
    #[arg(long, short)]
    input: PathBuf,

    /// Product profiles (TOML); defaults to the bundled products.toml
    #[arg(long, short)]
    profiles: Option<PathBuf>,

    /// Print only the orders of each step instead of the full log line
    #[arg(long)]
    orders_only: bool,
}

fn main() -> Result<()> {
    let _guard = utils::init_tracing("replay");
    let args = Args::parse();

    let config = TraderConfig::from_env()?;
    let profiles = match &args.profiles {
        Some(path) => ProductProfiles::load(path)?,
        None => PRODUCT_PROFILES.clone(),
    };
    if profiles.is_empty() {
        bail!("no product profiles to trade");
    }
    let mut trader = Trader::new(&profiles, config);

    let file = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let state: TradingState = serde_json::from_str(&line)
            .with_context(|| format!("line {} is not a trading state", line_no + 1))?;

        let output = trader.run(&state);
        if args.orders_only {
            let mut orders: Vec<_> = output.orders.values().flatten().collect();
            orders.sort_by(|a, b| a.symbol.cmp(&b.symbol));
            println!("{}", serde_json::to_string(&orders)?);
            trader.log_line(&state, &output);
        } else {
            println!("{}", trader.log_line(&state, &output));
        }
    }

    tracing::info!("Replayed {} steps", trader.round());
    Ok(())
}
