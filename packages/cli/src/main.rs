use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use emojicoin_sdk::constants::*;
use emojicoin_sdk::rows::WriteSetFields;
use emojicoin_sdk::{
    exact_transition_input_amount, process_transaction, simulate_swap, EmojicoinEvent,
    MarketState, RawEvent, Reserves, TxnInfo,
};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};

// ─── Input files ──────────────────────────────────────────────────────────────

/// A transaction as handed to `correlate`: metadata plus its raw events.
#[derive(Deserialize)]
struct TransactionFile {
    txn_info: TxnInfo,
    events: Vec<RawEvent>,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not valid for this command", path.display()))
}

/// Format a raw amount with `decimals` implied decimal places.
fn display_units(amount: u128, decimals: u32) -> String {
    let scale = 10u128.pow(decimals);
    format!("{}.{:0width$}", amount / scale, amount % scale, width = decimals as usize)
}

const APT_DECIMALS: u32 = 8;
const EMOJICOIN_DECIMALS: u32 = 8;

// ─── Version banner ───────────────────────────────────────────────────────────

/// Print the emojicoin banner to stdout.
fn print_banner() {
    let ver = env!("CARGO_PKG_VERSION");
    println!();
    println!("  emojicoin  v{ver}  ·  offline bonding-curve toolkit");
    println!("  {}", "─".repeat(62));
    println!("  Curve     {} → {} APT virtual quote", display_units(QUOTE_VIRTUAL_FLOOR, APT_DECIMALS), display_units(QUOTE_VIRTUAL_CEILING, APT_DECIMALS));
    println!("  Fees      0.25% pool (after graduation)  +  integrator fee (per swap)");
    println!("  Supply    {} emojicoin per market", display_units(EMOJICOIN_SUPPLY, EMOJICOIN_DECIMALS));
    println!();
}

// ─── CLI definition ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    Buy,
    Sell,
}

/// emojicoin — swap quotes and event correlation for bonding-curve markets.
///
/// Every command supports --json for machine-readable output.
/// Logging is controlled with RUST_LOG (e.g. RUST_LOG=debug).
#[derive(Parser)]
#[command(
    name    = "emojicoin",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Offline swap pricing and transaction event correlation for emojicoin markets.",
    after_help = "\
ENVIRONMENT:
  EMOJICOIN_INTEGRATOR_FEE_BPS   Integrator fee in basis points  [default: 100]
  RUST_LOG                       Log filter, e.g. info or emojicoin_sdk=debug

QUICK START:
  emojicoin quote --side buy --amount 100000000
  emojicoin quote --side sell --amount 5000000000000 --virtual-base 4800000000000000 --virtual-quote 40833333333
  emojicoin transition --virtual-quote 120000000000
  emojicoin correlate --file txn.json --json"
)]
struct Cli {
    /// Integrator fee charged on every quoted swap, in basis points
    #[arg(
        long,
        global        = true,
        value_name    = "BPS",
        default_value_t = DEFAULT_INTEGRATOR_FEE_RATE_BPS,
        env           = "EMOJICOIN_INTEGRATOR_FEE_BPS"
    )]
    integrator_fee_bps: u8,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a buy or sell against a market snapshot
    ///
    /// Reserves default to a freshly registered market. A market is on the
    /// bonding curve while --lp-coin-supply is 0; after graduation pass the
    /// pool's real reserves and its LP supply.
    #[command(
        after_help = "\
EXAMPLES:
  # Buy with 1 APT on a fresh market
  emojicoin quote --side buy --amount 100000000

  # Buy that crosses the curve ceiling and graduates the market
  emojicoin quote --side buy --amount 20000000000 --virtual-base 1425000000000000 --virtual-quote 137543859649

  # Sell on a graduated market
  emojicoin quote --side sell --amount 1000000000000 \\
    --real-base 990000000000000 --real-quote 101000000000 --lp-coin-supply 10000000000000

NOTES:
  Amounts are raw units: octas for APT, 1e-8 emojicoin for base.
  Sells default --balance to --amount."
    )]
    Quote {
        #[arg(long, value_enum)]
        side: Side,

        /// Input amount: quote for a buy, base for a sell
        #[arg(long, value_name = "AMOUNT")]
        amount: u128,

        #[arg(long, value_name = "AMOUNT", default_value_t = INITIAL_VIRTUAL_RESERVES.base)]
        virtual_base: u128,

        #[arg(long, value_name = "AMOUNT", default_value_t = INITIAL_VIRTUAL_RESERVES.quote)]
        virtual_quote: u128,

        #[arg(long, value_name = "AMOUNT", default_value_t = 0)]
        real_base: u128,

        #[arg(long, value_name = "AMOUNT", default_value_t = 0)]
        real_quote: u128,

        #[arg(long, value_name = "AMOUNT", default_value_t = 0)]
        lp_coin_supply: u128,

        /// Seller's base balance (sells only)
        #[arg(long, value_name = "AMOUNT")]
        balance: Option<u128>,
    },

    /// Smallest buy that exhausts the bonding curve
    #[command(
        after_help = "\
EXAMPLES:
  emojicoin transition
  emojicoin transition --virtual-quote 120000000000 --integrator-fee-bps 0"
    )]
    Transition {
        /// Current virtual quote reserve of the curve
        #[arg(long, value_name = "AMOUNT", default_value_t = QUOTE_VIRTUAL_FLOOR)]
        virtual_quote: u128,
    },

    /// Group a transaction's events and project them into indexer rows
    ///
    /// Reads {"txn_info": {...}, "events": [{"type": "...", "data": {...}}]}.
    /// Non-emojicoin events are skipped; an unrecognized emojicoin event type
    /// aborts the run. Without --misc, latest-state rows use synthetic defaults.
    #[command(
        after_help = "\
EXAMPLES:
  emojicoin correlate --file txn.json
  emojicoin correlate --file txn.json --misc misc.json --json

  # misc.json maps market id to write-set fields:
  #   {\"7\": {\"daily_tvl_per_lp_coin_growth\": \"1.0025\", \"in_bonding_curve\": false,
  #          \"volume_in_1m_state_tracker\": \"0\", \"lp_coin_balances\": {}}}"
    )]
    Correlate {
        #[arg(long, value_name = "PATH")]
        file: PathBuf,

        /// Write-set fields keyed by market id
        #[arg(long, value_name = "PATH")]
        misc: Option<PathBuf>,
    },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    // Logs go to stderr so --json output on stdout stays parseable.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    // When invoked with no arguments, show banner + full help and exit cleanly.
    if std::env::args().len() == 1 {
        print_banner();
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();

    match &cli.command {
        Commands::Quote {
            side, amount, virtual_base, virtual_quote,
            real_base, real_quote, lp_coin_supply, balance,
        } => {
            let market = MarketState {
                clamm_virtual_reserves: Reserves::new(*virtual_base, *virtual_quote),
                cpamm_real_reserves:    Reserves::new(*real_base, *real_quote),
                lp_coin_supply:         *lp_coin_supply,
            };
            cmd_quote(
                &market, *side, *amount, balance.unwrap_or(*amount),
                cli.integrator_fee_bps, cli.json,
            )?;
        }
        Commands::Transition { virtual_quote } => {
            cmd_transition(*virtual_quote, cli.integrator_fee_bps, cli.json)?;
        }
        Commands::Correlate { file, misc } => {
            cmd_correlate(file, misc.as_deref(), cli.json)?;
        }
    }

    Ok(())
}

// ─── quote ───────────────────────────────────────────────────────────────────

fn cmd_quote(
    market: &MarketState,
    side: Side,
    amount: u128,
    balance: u128,
    integrator_fee_bps: u8,
    json_output: bool,
) -> Result<()> {
    market.validate().context("market snapshot")?;

    let is_sell = side == Side::Sell;
    let request = market.swap_request(is_sell, amount, balance, integrator_fee_bps);
    let quote = simulate_swap(&request).map_err(|e| anyhow!("Cannot price swap: {e}"))?;

    let (token_in, token_out) = if is_sell { ("emojicoin", "APT") } else { ("APT", "emojicoin") };
    let phase = if market.in_bonding_curve() { "bonding curve" } else { "cpamm pool" };

    if json_output {
        println!("{}", json!({
            "status":                      "ok",
            "command":                     "quote",
            "side":                        if is_sell { "sell" } else { "buy" },
            "starts_in_bonding_curve":     request.starts_in_bonding_curve,
            "input_amount":                amount.to_string(),
            "integrator_fee_rate_bps":     integrator_fee_bps,
            "net_proceeds":                quote.net_proceeds.to_string(),
            "integrator_fee":              quote.integrator_fee.to_string(),
            "pool_fee":                    quote.pool_fee.to_string(),
            "base_volume":                 quote.base_volume.to_string(),
            "quote_volume":                quote.quote_volume.to_string(),
            "results_in_state_transition": quote.results_in_state_transition,
        }));
    } else {
        println!("─── Swap Quote ───────────────────────────────────────────────────");
        println!("  {token_in} → {token_out}  [{phase}]");
        println!("  Circulating      {:>20}", market.circulating_supply());
        println!();
        println!("  ─── Fee Breakdown ────────────────────────────────");
        println!("  Amount in        {:>20}  {token_in}", amount);
        println!("  Integrator fee   {:>20}  APT  ({:.2}%)", quote.integrator_fee, integrator_fee_bps as f64 / 100.0);
        println!("  Pool fee         {:>20}  {}", quote.pool_fee, if is_sell { "APT" } else { "emojicoin" });
        println!();
        println!("  ─── Output ───────────────────────────────────────");
        println!("  Net proceeds     {:>20}  {token_out}", quote.net_proceeds);
        println!("  Base volume      {:>20}", quote.base_volume);
        println!("  Quote volume     {:>20}", quote.quote_volume);
        if quote.results_in_state_transition {
            println!();
            println!("  This swap exhausts the bonding curve and graduates the market.");
        }
    }
    Ok(())
}

// ─── transition ──────────────────────────────────────────────────────────────

fn cmd_transition(virtual_quote: u128, integrator_fee_bps: u8, json_output: bool) -> Result<()> {
    if !(QUOTE_VIRTUAL_FLOOR..=QUOTE_VIRTUAL_CEILING).contains(&virtual_quote) {
        return Err(anyhow!(
            "--virtual-quote must lie in [{QUOTE_VIRTUAL_FLOOR}, {QUOTE_VIRTUAL_CEILING}]"
        ));
    }
    let input = exact_transition_input_amount(virtual_quote, integrator_fee_bps);

    if json_output {
        println!("{}", json!({
            "status":                  "ok",
            "command":                 "transition",
            "virtual_quote":           virtual_quote.to_string(),
            "integrator_fee_rate_bps": integrator_fee_bps,
            "input_amount":            input.to_string(),
        }));
    } else {
        println!("─── Graduation ───────────────────────────────────────────────────");
        println!("  Virtual quote    {:>20}", virtual_quote);
        println!("  Left in curve    {:>20}", QUOTE_VIRTUAL_CEILING - virtual_quote);
        println!("  Integrator fee   {:>20}  bps", integrator_fee_bps);
        println!("  Input to graduate{:>21}  ({} APT)", input, display_units(input, APT_DECIMALS));
    }
    Ok(())
}

// ─── correlate ───────────────────────────────────────────────────────────────

fn cmd_correlate(file: &Path, misc: Option<&Path>, json_output: bool) -> Result<()> {
    let txn: TransactionFile = read_json(file)?;
    let write_set: Option<WriteSetFields> = misc.map(read_json).transpose()?;

    let mut events = Vec::with_capacity(txn.events.len());
    let mut skipped = 0usize;
    for (index, raw) in txn.events.iter().enumerate() {
        match raw.decode().with_context(|| format!("event #{index}"))? {
            Some(EmojicoinEvent::Market(event)) => events.push(event),
            Some(EmojicoinEvent::GlobalState(_)) => {
                log::info!("event #{index}: skipping registry-wide GlobalState");
                skipped += 1;
            }
            None => {
                log::debug!("event #{index}: skipping foreign event {}", raw.type_tag);
                skipped += 1;
            }
        }
    }
    let n_market_events = events.len();

    let rows = process_transaction(events, &txn.txn_info, write_set.as_ref())
        .with_context(|| format!("transaction {}", txn.txn_info.version))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("─── Transaction {} ───────────────────────────────────", txn.txn_info.version);
    println!("  Sender           {}", txn.txn_info.sender);
    println!("  Timestamp        {}", rows.transaction.timestamp);
    println!("  Market events    {:>6}  ({} skipped)", n_market_events, skipped);
    println!();
    println!("  ─── Rows ─────────────────────────────────────────");
    println!("  Swaps            {:>6}", rows.swap_events.len());
    println!("  Chats            {:>6}", rows.chat_events.len());
    println!("  Liquidity        {:>6}", rows.liquidity_events.len());
    println!("  Registrations    {:>6}", rows.market_registration_events.len());
    println!("  Periodic states  {:>6}", rows.periodic_state_events.len());
    println!("  User pools       {:>6}", rows.user_pools.len());
    println!();
    println!("  ─── Latest State ─────────────────────────────────");
    for latest in &rows.market_latest_state_events {
        let state = MarketState {
            clamm_virtual_reserves: latest.state.clamm_virtual_reserves,
            cpamm_real_reserves:    latest.state.cpamm_real_reserves,
            lp_coin_supply:         latest.state.lp_coin_supply,
        };
        let reserves = state.real_reserves();
        println!(
            "  {} #{:<8} nonce {:<6} {:<20} base {:>20}  quote {:>16}",
            latest.market.emoji_symbol(),
            latest.market.market_id,
            latest.market.market_nonce,
            latest.market.trigger,
            reserves.base,
            reserves.quote,
        );
    }
    Ok(())
}
