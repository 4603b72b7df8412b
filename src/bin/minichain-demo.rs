#![forbid(unsafe_code)]

use clap::Parser;
use colored::*;
use minichain::blockchain::Blockchain;
use minichain::config::load_config;
use minichain::crypto::{AccountId, KeyPair, Signer};
use minichain::transaction::Transaction;
use std::path::PathBuf;
use std::time::Instant;

/// Replays a small transfer scenario on an in-memory ledger.
#[derive(Parser, Debug)]
#[command(name = "minichain-demo", version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Amount Alice tries to send to Bob
    #[arg(long, default_value_t = 200)]
    amount: u64,
}

fn print_balances(chain: &Blockchain, wallets: &[(&str, &AccountId)]) {
    for (name, account) in wallets {
        println!(
            "  {:<8} {}",
            format!("{}:", name).bright_white(),
            chain.get_balance(account).to_string().bright_yellow()
        );
    }
}

fn submit(chain: &mut Blockchain, tx: Transaction, label: &str) {
    if chain.add_transaction(tx) {
        println!("{} {}", "✅".green(), format!("{} added to mempool", label).green());
    } else {
        println!("{} {}", "❌".red(), format!("{} rejected", label).red());
    }
}

fn mine(chain: &mut Blockchain, miner: &AccountId) {
    let start_time = Instant::now();
    let block = chain.mine_block(miner);
    println!(
        "{} Block #{} mined with nonce {} in {:.2?}",
        "⛏️ ".bright_cyan(),
        block.index.to_string().bright_white(),
        block.nonce,
        start_time.elapsed()
    );
    println!("   {} {}", "hash:".dimmed(), block.compute_hash().bright_green());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let config = load_config(&args.config)?;

    let treasury = KeyPair::generate();
    let alice = KeyPair::generate();
    let bob = KeyPair::generate();
    let miner = KeyPair::generate();

    let mut chain = Blockchain::with_genesis_account(treasury.account_id(), config)?;

    println!("\n{}", "minichain demo".bright_cyan().bold());
    println!("{}", "--------------".bright_cyan());
    println!("Treasury address: {}", treasury.account_id());
    println!("Alice address:    {}", alice.account_id());
    println!("Bob address:      {}", bob.account_id());
    println!("Miner address:    {}\n", miner.account_id());

    let treasury_id = treasury.account_id();
    let alice_id = alice.account_id();
    let bob_id = bob.account_id();
    let miner_id = miner.account_id();
    let wallets = [
        ("Treasury", &treasury_id),
        ("Alice", &alice_id),
        ("Bob", &bob_id),
        ("Miner", &miner_id),
    ];

    println!("{}", "Initial balances".bright_green().underline());
    print_balances(&chain, &wallets);
    println!();

    // Alice has nothing yet, so this first attempt bounces.
    let mut tx = Transaction::new(alice_id.clone(), bob_id.clone(), args.amount);
    tx.sign(&alice)?;
    submit(&mut chain, tx, "Alice -> Bob");

    let mut funding = Transaction::new(treasury_id.clone(), alice_id.clone(), args.amount);
    funding.sign(&treasury)?;
    submit(&mut chain, funding, "Treasury -> Alice");
    mine(&mut chain, &miner_id);

    let mut tx = Transaction::new(alice_id.clone(), bob_id.clone(), args.amount);
    tx.sign(&alice)?;
    submit(&mut chain, tx, "Alice -> Bob");
    mine(&mut chain, &miner_id);

    println!("\n{}", "Balances after mining".bright_green().underline());
    print_balances(&chain, &wallets);

    chain.validate_chain()?;
    chain.audit_balances()?;
    println!(
        "\n{} chain of {} blocks validated",
        "✔".green(),
        chain.blocks().len().to_string().bright_white()
    );

    Ok(())
}
