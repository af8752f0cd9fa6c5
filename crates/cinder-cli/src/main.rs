//! Cinder CLI
//!
//! Prints configuration and runs deterministic simulations of the game core.

use anyhow::Context;
use cinder_core::types::{Address, Timestamp, SECONDS_PER_DAY};
use cinder_farming::FarmingProduct;
use cinder_node::{AssetAttributes, CinderConfig, Node, SeededEntropy};
use cinder_ritual::{Affix, AffixEffect, Charges, Component, RitualTemplate};
use clap::{Parser, Subcommand};
use rand::Rng;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// 2026-01-01T00:00:00Z
const DEFAULT_START: Timestamp = 1_767_225_600;
const HOUR: Timestamp = 3_600;
/// Pool token minted by rituals
const DUST_POOL: u64 = 4;

#[derive(Parser)]
#[command(name = "cinder")]
#[command(version)]
#[command(about = "Cinder - wave rewards, farming and rituals for a game server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CINDER_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration as TOML
    Config,

    /// Run a deterministic simulation
    Simulate {
        /// Number of simulated days
        #[arg(short, long, default_value = "3")]
        days: u32,

        /// Number of players
        #[arg(short, long, default_value = "4")]
        players: u32,

        /// Entropy seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Start time (unix seconds)
        #[arg(long, default_value_t = DEFAULT_START)]
        start: Timestamp,

        /// Print the summary and the event journal as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct PlayerSummary {
    address: String,
    creature: u64,
    reward_a: u128,
    reward_b: u128,
    farmed: u64,
    dust: u64,
    contribution_pct: u64,
}

#[derive(Serialize)]
struct Summary {
    days: u32,
    seed: u64,
    rituals_minted: usize,
    rituals_consumed: usize,
    rejected_calls: usize,
    events: usize,
    players: Vec<PlayerSummary>,
}

fn player(index: u32) -> Address {
    Address::from_low_u64(0x1000 + u64::from(index))
}

/// Register the products, affixes and templates the simulation uses; returns
/// (farming product id, template pool id)
fn seed_catalog(node: &Node, currency: u64) -> anyhow::Result<(u64, u64)> {
    let product = node.register_product(FarmingProduct {
        active: true,
        pool_id: 1,
        base_hourly_rate: 1_000,
        cap: 24,
        bonus_from_rarity: true,
        bonus_from_level: true,
        ..Default::default()
    })?;

    let extra_charge = node.create_affix(Affix {
        effect: AffixEffect::Charges(Charges::Limited(1)),
        is_positive: true,
        weight: 2,
    })?;
    let cheaper = node.create_affix(Affix {
        effect: AffixEffect::Cost(Component::fungible(currency, 4)),
        is_positive: false,
        weight: 1,
    })?;
    let bound = node.create_affix(Affix {
        effect: AffixEffect::Soulbound,
        is_positive: true,
        weight: 1,
    })?;
    let bucket = node.create_affix_bucket(vec![extra_charge, cheaper, bound])?;

    let common = node.create_template(RitualTemplate {
        rarity: 1,
        charges: Charges::Limited(1),
        affix_bucket_ids: vec![bucket],
        costs: vec![Component::fungible(currency, 10)],
        products: vec![Component::pool_token(DUST_POOL, 2)],
        ..Default::default()
    })?;
    let rare = node.create_template(RitualTemplate {
        rarity: 3,
        charges: Charges::Limited(2),
        affix_bucket_ids: vec![bucket, bucket],
        costs: vec![Component::fungible(currency, 25)],
        products: vec![Component::pool_token(DUST_POOL, 6)],
        ..Default::default()
    })?;
    let pool = node.create_template_pool(vec![common, rare], vec![3, 1])?;
    node.set_creation_config(Vec::new(), vec![Component::fungible(currency, 5)])?;
    Ok((product, pool))
}

fn simulate(
    config: CinderConfig,
    days: u32,
    players: u32,
    seed: u64,
    start: Timestamp,
) -> anyhow::Result<(Node, Summary)> {
    let currency = config.waves.currency_a;
    let node = Node::new(config)?;
    let mut entropy = SeededEntropy::new(seed);
    let mut rejected = 0usize;
    let mut minted = 0usize;
    let mut consumed = 0usize;

    node.initialize(start)?;
    let (product, pool) = seed_catalog(&node, currency)?;

    for index in 0..players {
        let creature = u64::from(index) + 1;
        let rng = entropy.rng();
        let stats = [(); 5].map(|_| rng.gen_range(1..=20u64));
        let attributes = AssetAttributes {
            stats,
            class: rng.gen_range(0..4u8),
            rarity: rng.gen_range(1..=3u8),
        };
        node.mint_asset(player(index), creature, attributes)?;
        node.mint_currency(player(index), currency, 200)?;
        node.stake(player(index), creature, product, start)?;
    }

    for day in 0..i64::from(days) {
        let morning = start + day * SECONDS_PER_DAY + 8 * HOUR;
        let evening = morning + 10 * HOUR;

        for index in 0..players {
            let who = player(index);
            let creature = u64::from(index) + 1;
            if let Err(e) = node.harvest(who, creature, morning) {
                warn!("Harvest failed for {}: {}", who, e);
                rejected += 1;
            }
            if !entropy.rng().gen_bool(0.6) {
                continue;
            }

            let outcome = node.create_ritual(who, pool, morning).and_then(|token| {
                let ritual_id = node.fulfill_randomness(token, entropy.next_value())?;
                minted += 1;
                node.consume_ritual(who, ritual_id, evening)?;
                Ok(())
            });
            match outcome {
                Ok(()) => consumed += 1,
                Err(e) => {
                    warn!("Ritual for {} rejected: {}", who, e);
                    rejected += 1;
                }
            }
        }

        for index in 0..players {
            if let Err(e) = node.claim_rewards(player(index), evening + 7 * HOUR) {
                warn!("Claim failed for {}: {}", player(index), e);
                rejected += 1;
            }
        }
        info!("Simulated day {}", day + 1);
    }

    let players = (0..players)
        .map(|index| {
            let who = player(index);
            PlayerSummary {
                address: who.to_string(),
                creature: u64::from(index) + 1,
                reward_a: node.balance_of(who, node.config().waves.currency_a),
                reward_b: node.balance_of(who, node.config().waves.currency_b),
                farmed: node.pool_balance_of(who, 1),
                dust: node.pool_balance_of(who, DUST_POOL),
                contribution_pct: node.get_contribution_percentage(who),
            }
        })
        .collect();

    let summary = Summary {
        days,
        seed,
        rituals_minted: minted,
        rituals_consumed: consumed,
        rejected_calls: rejected,
        events: node.journal_len(),
        players,
    };
    Ok((node, summary))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = CinderConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }

        Commands::Simulate {
            days,
            players,
            seed,
            start,
            json,
        } => {
            cinder_node::logging::init(&config.logging)?;
            info!("Simulating {} days with {} players (seed {})", days, players, seed);

            let (node, summary) = simulate(config, days, players, seed, start)?;
            if json {
                let report = serde_json::json!({
                    "summary": summary,
                    "events": node.events(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Days:             {}", summary.days);
                println!("Seed:             {}", summary.seed);
                println!("Rituals minted:   {}", summary.rituals_minted);
                println!("Rituals consumed: {}", summary.rituals_consumed);
                println!("Rejected calls:   {}", summary.rejected_calls);
                println!("Events:           {}", summary.events);
                println!();
                println!(
                    "{:<44} {:>10} {:>10} {:>8} {:>6} {:>6}",
                    "player", "reward a", "reward b", "farmed", "dust", "share"
                );
                for p in &summary.players {
                    println!(
                        "{:<44} {:>10} {:>10} {:>8} {:>6} {:>5}%",
                        p.address, p.reward_a, p.reward_b, p.farmed, p.dust, p.contribution_pct
                    );
                }
            }
        }
    }

    Ok(())
}
