use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tally_core::{
    Category, Clock, CreditCardCycle, CycleAdvisor, DayOfMonth, Debt, DebtKind, FixedClock,
    Severity, SystemClock, Transaction, TransactionKind, categories_for,
};
use tally_finance::{
    calculate_balance, card_tip, card_tips, category_breakdown, debt_totals, financial_advice,
    import_transactions_csv, recent,
};

mod auth;
mod config;
mod ledger;
mod llm;
mod prefs;
mod state;
mod store;

use ledger::Ledger;
use prefs::{PreferenceStore, Theme};
use store::FileStore;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Personal finance tracker with credit-card cycle tips")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and log in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Prompted on stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in as an existing user
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Income and expense transactions
    Txn {
        #[command(subcommand)]
        command: TxnCommand,
    },

    /// Debts and credit cards
    Debt {
        #[command(subcommand)]
        command: DebtCommand,
    },

    /// Transaction categories
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },

    /// Balance summary and latest activity
    Dashboard,

    /// Expense breakdown by category
    Report,

    /// Purchase/payment timing for each credit card
    Cards {
        /// Evaluate as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Ask the AI advisor for a short recommendation
    Advise,

    /// Light/dark theme preference
    Theme {
        #[command(subcommand)]
        command: ThemeCommand,
    },

    /// Manage ~/.tally/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for TransactionKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Income => TransactionKind::Income,
            KindArg::Expense => TransactionKind::Expense,
        }
    }
}

#[derive(Subcommand, Debug)]
enum TxnCommand {
    /// Record a transaction
    Add {
        #[arg(long = "type", value_enum, default_value = "expense")]
        kind: KindArg,
        #[arg(long)]
        amount: f64,
        /// Category id (see `tally category list`)
        #[arg(long)]
        category: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        note: Option<String>,
    },

    /// List transactions, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Delete a transaction by id
    Delete { id: String },

    /// Import transactions from a CSV (date,type,amount,category,note)
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum DebtCommand {
    /// Record a debt. Pass --cutoff and --payment for a credit card.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        amount: f64,
        /// Money owed to me rather than by me
        #[arg(long)]
        receivable: bool,
        /// Due date for plain loans (YYYY-MM-DD)
        #[arg(long, conflicts_with_all = ["cutoff", "payment"])]
        due: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
        /// Statement cutoff day (1-31)
        #[arg(long, requires = "payment")]
        cutoff: Option<DayOfMonth>,
        /// Payment due day (1-31)
        #[arg(long, requires = "cutoff")]
        payment: Option<DayOfMonth>,
    },

    /// List debts with totals and card tips
    List,

    /// Delete a debt by id
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// Add a custom category
    Add {
        #[arg(long)]
        name: String,
        #[arg(long = "type", value_enum, default_value = "expense")]
        kind: KindArg,
        #[arg(long, default_value = "🏷️")]
        icon: String,
        #[arg(long, default_value = "#64748b")]
        color: String,
    },

    /// List built-in and custom categories
    List {
        #[arg(long = "type", value_enum)]
        kind: Option<KindArg>,
    },
}

#[derive(Subcommand, Debug)]
enum ThemeCommand {
    Show,
    Set {
        #[arg(value_enum)]
        theme: Theme,
    },
    Toggle,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let store = FileStore::new(state::data_dir()?);

    match cli.command {
        Command::Register {
            name,
            email,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let user = auth::register(&store, &name, &email, &password)?;
            println!("Welcome, {}! You are logged in as {}.", user.name, user.email);
        }

        Command::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let user = auth::login(&store, &email, &password)?;
            println!("Logged in as {} <{}>", user.name, user.email);
        }

        Command::Logout => {
            auth::logout(&store)?;
            println!("Logged out.");
        }

        Command::Whoami => match auth::current_user(&store) {
            Some(u) => println!("{} <{}> ({})", u.name, u.email, u.id),
            None => println!("Not logged in."),
        },

        Command::Txn { command } => run_txn(&store, command)?,

        Command::Debt { command } => run_debt(&store, command)?,

        Command::Category { command } => run_category(&store, command)?,

        Command::Dashboard => {
            let ledger = open_ledger(&store);
            let txns = ledger.transactions();
            let balance = calculate_balance(&txns);

            println!("# Dashboard\n");
            println!("Balance:  {}", money(balance.total));
            println!("Income:   {}", money(balance.income));
            println!("Expenses: {}\n", money(balance.expense));

            println!("## Recent activity\n");
            if txns.is_empty() {
                println!("(no transactions yet; try `tally txn add`)");
            }
            let custom = ledger.custom_categories();
            for t in recent(&txns, 5) {
                print_txn(t, &custom);
            }
        }

        Command::Report => {
            let ledger = open_ledger(&store);
            let txns = ledger.transactions();
            let categories = categories_for(TransactionKind::Expense, &ledger.custom_categories());
            let slices = category_breakdown(&txns, &categories);

            println!("# Expenses by category\n");
            if slices.is_empty() {
                println!("(no expenses recorded)");
            }
            for s in &slices {
                println!(
                    "{} {:<16} {:>12}  {:>5.1}%",
                    s.icon,
                    s.name,
                    money(s.value),
                    s.share * 100.0
                );
            }
            let total: f64 = slices.iter().map(|s| s.value).sum();
            println!("\nTotal: {}", money(total));
        }

        Command::Cards { today } => {
            let clock: Box<dyn Clock> = match today {
                Some(d) => Box::new(FixedClock(d)),
                None => Box::new(SystemClock),
            };
            let today = clock.today();
            let advisor = CycleAdvisor::new(config::load_config()?.cycle_policy(today));
            let debts = open_ledger(&store).debts();
            let tips = card_tips(&debts, today, &advisor);

            println!("# Credit cards on {today}\n");
            if tips.is_empty() {
                println!("(no credit cards; add one with `tally debt add --cutoff N --payment N`)");
            }
            for tip in &tips {
                println!(
                    "[{}] {} (cutoff {} / payment {}): {}",
                    severity_tag(tip.severity),
                    tip.title,
                    tip.cycle.cutoff_day,
                    tip.cycle.payment_day,
                    tip.message
                );
            }
        }

        Command::Advise => {
            let cfg = config::load_config()?;
            let ledger = open_ledger(&store);
            let advisor = llm::GeminiAdvisor::from_config(&cfg);
            let day = SystemClock.day_of_month();

            println!("Thinking…\n");
            let advice =
                financial_advice(advisor.as_ref(), day, &ledger.transactions(), &ledger.debts())
                    .await;
            println!("{advice}");
        }

        Command::Theme { command } => {
            let mut prefs = PreferenceStore::load(&store);
            let theme = match command {
                ThemeCommand::Show => prefs.get().theme,
                ThemeCommand::Set { theme } => prefs.set_theme(theme)?,
                ThemeCommand::Toggle => prefs.toggle_theme()?,
            };
            println!("Theme: {theme}");
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let mut cfg = config::load_config()?;
                if cfg.advisor.api_key.is_some() {
                    cfg.advisor.api_key = Some("********".to_string());
                }
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn run_txn(store: &FileStore, command: TxnCommand) -> Result<()> {
    let ledger = open_ledger(store);
    match command {
        TxnCommand::Add {
            kind,
            amount,
            category,
            date,
            note,
        } => {
            let kind = TransactionKind::from(kind);
            let known = categories_for(kind, &ledger.custom_categories());
            if !known.iter().any(|c| c.id == category) {
                let ids: Vec<&str> = known.iter().map(|c| c.id.as_str()).collect();
                bail!(
                    "unknown {} category '{category}' (known: {})",
                    kind.as_str(),
                    ids.join(", ")
                );
            }

            let date = date.unwrap_or_else(|| SystemClock.today());
            let mut txn = Transaction::new(new_id(), kind, amount, category, date)?;
            if let Some(note) = note {
                txn = txn.with_note(note);
            }
            ledger.add_transaction(txn.clone())?;
            println!("Saved {} ({})", txn.id, money(txn.signed_amount()));
        }

        TxnCommand::List { limit } => {
            let txns = ledger.transactions();
            let custom = ledger.custom_categories();
            for t in recent(&txns, limit) {
                print_txn(t, &custom);
            }
            println!("\n{} of {} transactions", limit.min(txns.len()), txns.len());
        }

        TxnCommand::Delete { id } => {
            if ledger.delete_transaction(&id)? {
                println!("Deleted {id}");
            } else {
                bail!("no transaction with id {id}");
            }
        }

        TxnCommand::Import { csv } => {
            if !csv.exists() {
                bail!("CSV not found: {}", csv.display());
            }
            let txns = import_transactions_csv(&csv, &format!("csv{}", new_id()))
                .with_context(|| format!("parsing {}", csv.display()))?;
            let count = txns.len();
            ledger.add_transactions(txns)?;
            println!("Imported {count} transactions from {}", csv.display());
        }
    }
    Ok(())
}

fn run_debt(store: &FileStore, command: DebtCommand) -> Result<()> {
    let ledger = open_ledger(store);
    match command {
        DebtCommand::Add {
            title,
            amount,
            receivable,
            due,
            notes,
            cutoff,
            payment,
        } => {
            let kind = if receivable {
                DebtKind::Receivable
            } else {
                DebtKind::Payable
            };
            let mut debt = Debt::new(new_id(), kind, title, amount)?;
            if let Some(notes) = notes {
                debt = debt.with_notes(notes);
            }
            match (cutoff, payment, due) {
                (Some(cutoff), Some(payment), _) => {
                    debt = debt.with_card(CreditCardCycle::new(cutoff, payment)?)?;
                }
                (None, None, Some(due)) => debt = debt.with_due_date(due),
                (None, None, None) => {}
                _ => bail!("a credit card needs both --cutoff and --payment"),
            }
            ledger.add_debt(debt.clone())?;
            println!("Saved {} ({})", debt.id, debt.title);
        }

        DebtCommand::List => {
            let debts = ledger.debts();
            let totals = debt_totals(&debts);
            println!("To pay:     {}", money(totals.payable));
            println!("To collect: {}\n", money(totals.receivable));

            if debts.is_empty() {
                println!("(no debts recorded)");
            }

            let today = SystemClock.today();
            let advisor = CycleAdvisor::new(config::load_config()?.cycle_policy(today));
            for d in &debts {
                let label = match (d.kind, d.is_credit_card()) {
                    (DebtKind::Payable, true) => "credit card",
                    (DebtKind::Payable, false) => "I owe",
                    (DebtKind::Receivable, _) => "owed to me",
                };
                println!("{}  {} [{}]  {}", d.id, d.title, label, money(d.amount));
                match d.card_cycle() {
                    Some(c) => {
                        println!("    cutoff: {} / payment: {}", c.cutoff_day, c.payment_day);
                    }
                    None => match d.due_date {
                        Some(due) => println!("    due: {due}"),
                        None => println!("    No date"),
                    },
                }
                if let Some(tip) = card_tip(d, today, &advisor) {
                    println!("    [{}] {}", severity_tag(tip.severity), tip.message);
                }
            }
        }

        DebtCommand::Delete { id } => {
            if ledger.delete_debt(&id)? {
                println!("Deleted {id}");
            } else {
                bail!("no debt with id {id}");
            }
        }
    }
    Ok(())
}

fn run_category(store: &FileStore, command: CategoryCommand) -> Result<()> {
    let ledger = open_ledger(store);
    match command {
        CategoryCommand::Add {
            name,
            kind,
            icon,
            color,
        } => {
            if name.trim().is_empty() {
                bail!("category name is required");
            }
            let cat = Category::new(format!("custom_{}", new_id()), name, icon, color, kind.into());
            ledger.add_custom_category(cat.clone())?;
            println!("Added {} {} ({})", cat.icon, cat.name, cat.id);
        }

        CategoryCommand::List { kind } => {
            let custom = ledger.custom_categories();
            let kinds: Vec<TransactionKind> = match kind {
                Some(k) => vec![k.into()],
                None => vec![TransactionKind::Expense, TransactionKind::Income],
            };
            for k in kinds {
                println!("## {}\n", k.as_str());
                for c in categories_for(k, &custom) {
                    println!("{} {:<16} {}", c.icon, c.name, c.id);
                }
                println!();
            }
        }
    }
    Ok(())
}

fn open_ledger(store: &FileStore) -> Ledger<'_, FileStore> {
    let user_id = auth::current_user(store).map(|u| u.id);
    Ledger::new(store, user_id)
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => auth::prompt_secret("Password"),
    }
}

fn new_id() -> String {
    Utc::now().timestamp_millis().to_string()
}

fn money(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Positive => "good",
        Severity::Warning => "warn",
    }
}

fn print_txn(t: &Transaction, custom: &[Category]) {
    let icon = categories_for(t.kind, custom)
        .into_iter()
        .find(|c| c.id == t.category)
        .map(|c| c.icon)
        .unwrap_or_else(|| "🏷️".to_string());
    println!(
        "{}  {} {} {:>12}  {}{}",
        t.date,
        icon,
        t.category,
        money(t.signed_amount()),
        t.id,
        t.note
            .as_deref()
            .map(|n| format!("  {n}"))
            .unwrap_or_default()
    );
}
