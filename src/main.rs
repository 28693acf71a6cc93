mod db;
mod error;
mod models;
mod operations;

use clap::{Parser, Subcommand};
use db::connection::establish_connection;
use db::storage::{MemoryStorage, SqliteStorage, Storage};
use db::store::TransactionStore;
use error::{Result, TrackerError};
use models::category::{EXPENSE_CATEGORIES, INCOME_CATEGORIES};
use operations::add::{create_draft, parse_transaction_type};
use operations::format::{format_amount, signed_amount};
use operations::summary::{chart_segments, expense_by_category, totals};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "mtr", version, about = "Track income and expenses")]
struct Cli {
    /// SQLite file holding the saved ledger
    #[arg(long, env = "MONEY_TRACKER_DB", default_value = "money_tracker.db")]
    db: PathBuf,

    /// Keep everything in memory; nothing is written to disk
    #[arg(long)]
    in_memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a transaction
    Add {
        description: String,
        amount: String,
        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        transaction_type: String,
        /// Category id, see `mtr categories`
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Delete a transaction by id
    Remove { id: u64 },
    /// Show transactions, newest first
    List,
    /// Show balance and the expense breakdown
    Summary,
    /// Import rows of description,amount,type[,category]
    Import { path: PathBuf },
    /// Open the terminal dashboard
    Dashboard,
    /// List the known categories
    Categories,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = if cli.in_memory {
        run(TransactionStore::load(MemoryStorage::new()), cli.command)
    } else {
        establish_connection(&cli.db)
            .map_err(TrackerError::from)
            .and_then(|conn| run(TransactionStore::load(SqliteStorage::new(conn)), cli.command))
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run<S: Storage>(mut store: TransactionStore<S>, command: Command) -> Result<()> {
    match command {
        Command::Add {
            description,
            amount,
            transaction_type,
            category,
        } => {
            let transaction_type = parse_transaction_type(&transaction_type)?;
            let draft = create_draft(&description, &amount, transaction_type, category.as_deref())?;
            let added = &store.add(draft)?[0];
            println!("Added {} ({} {})", added.id, added.description, signed_amount(added));
        }
        Command::Remove { id } => match store.find(id).map(|t| t.description.clone()) {
            Some(description) => {
                store.remove(id)?;
                println!("Removed {} ({}).", id, description);
            }
            None => println!("No transaction with id {}.", id),
        },
        Command::List => print_list(&store),
        Command::Summary => print_summary(&store),
        Command::Import { path } => {
            let count = operations::import::import_csv_to_store(&mut store, &path)?;
            println!("Successfully imported {} transactions.", count);
        }
        Command::Dashboard => operations::dashboard::run_dashboard(&mut store)?,
        Command::Categories => {
            println!("expense:");
            for category in EXPENSE_CATEGORIES {
                println!("  {:<14} {} {}", category.id, category.icon, category.label);
            }
            println!("income:");
            for category in INCOME_CATEGORIES {
                println!("  {:<14} {} {}", category.id, category.icon, category.label);
            }
        }
    }
    Ok(())
}

fn print_list<S: Storage>(store: &TransactionStore<S>) {
    if store.transactions().is_empty() {
        println!("No transactions yet.");
        return;
    }
    for tx in store.transactions() {
        println!(
            "{:<14} {} {:<18} {:>14}  {}",
            tx.id,
            tx.date.format("%Y-%m-%d"),
            tx.category_info().label,
            signed_amount(tx),
            tx.description
        );
    }
}

fn print_summary<S: Storage>(store: &TransactionStore<S>) {
    let transactions = store.transactions();
    let summary = totals(transactions);
    println!("Balance: {}", format_amount(summary.balance));
    println!("Income:  +{}", format_amount(summary.income));
    println!("Expense: -{}", format_amount(summary.expense));

    let segments = chart_segments(&expense_by_category(transactions), summary.expense);
    if segments.is_empty() {
        println!("No expenses yet.");
        return;
    }
    println!();
    for segment in segments {
        println!(
            "{} {:<18} {:>14} {:>6.1}%",
            segment.icon,
            segment.label,
            format_amount(segment.total),
            segment.percent
        );
    }
}
