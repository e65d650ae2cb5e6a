#![warn(clippy::uninlined_format_args)]

mod bootstrap;
mod cli;

use std::{env, process};

use chrono::Utc;
use tripsplit_application::GroupSession;
use tripsplit_domain::{BillDraft, SplitMode};
use tripsplit_infrastructure::JsonFileGroupStore;
use tripsplit_presentation::{CsvExporter, SettlementPresenter, StatsPresenter};

use crate::{
    bootstrap::AppConfig,
    cli::{BillArgs, CliResult, Command, USAGE},
};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    bootstrap::init_logging();
    let config = AppConfig::from_env();

    let invocation = cli::parse_args(env::args().skip(1))?;
    let Some(path) = invocation.path.or_else(|| config.group_file.clone()) else {
        return Err(USAGE.into());
    };

    let store = JsonFileGroupStore::new(path);
    let mut session = GroupSession::open(&store)
        .map_err(|err| format!("Failed to open '{}': {err}", store.path().display()))?;
    let currency = config.currency();
    tracing::debug!(
        path = %store.path().display(),
        members = session.group().members.len(),
        bills = session.group().bills.len(),
        command = ?invocation.command,
        "opened group"
    );

    match invocation.command {
        Command::Summary => {
            let group = session.group();
            println!(
                "{}",
                SettlementPresenter::render_summary(
                    &group.name,
                    &session.report(),
                    group,
                    &currency,
                    Utc::now(),
                )
            );
        }
        Command::Balances => {
            print!(
                "{}",
                SettlementPresenter::render_balances(&session.report(), session.group(), &currency)
            );
        }
        Command::Settle => {
            print!(
                "{}",
                SettlementPresenter::render_settlements(
                    &session.report(),
                    session.group(),
                    &currency
                )
            );
        }
        Command::Stats => {
            print!(
                "{}",
                StatsPresenter::render(&session.stats(), session.group(), &currency)
            );
        }
        Command::Csv => print!("{}", CsvExporter::export([session.group()])),
        Command::Toggle(index) => {
            let paid = session
                .toggle_settlement(index)
                .map_err(|err| err.to_string())?;
            let state = if paid { "paid" } else { "pending" };
            println!("Settlement #{index} marked as {state}");
        }
        Command::AddMember(name) => {
            let id = session.add_member(&name).map_err(|err| err.to_string())?;
            println!("Added {} ({id})", name.trim());
        }
        Command::RemoveMember(id) => {
            let removed = session.remove_member(&id).map_err(|err| err.to_string())?;
            println!("Removed member {id} and {} bill(s)", removed.len());
        }
        Command::AddBill(bill) => {
            let draft = bill_draft(bill, &session);
            let id = session.add_bill(draft).map_err(|err| err.to_string())?;
            println!("Added bill {id}");
        }
        Command::UpdateBill { id, bill } => {
            let draft = bill_draft(bill, &session);
            session
                .update_bill(&id, draft)
                .map_err(|err| err.to_string())?;
            println!("Updated bill {id}");
        }
        Command::DeleteBill(id) => {
            let bill = session.delete_bill(&id).map_err(|err| err.to_string())?;
            println!("Deleted bill {id} ({})", bill.description);
        }
    }

    Ok(())
}

fn bill_draft(bill: BillArgs, session: &GroupSession<'_>) -> BillDraft {
    let split = match bill.split {
        Some(weights) => SplitMode::Custom(weights),
        None => SplitMode::Equal(
            session
                .group()
                .members
                .iter()
                .map(|member| member.id.clone())
                .collect(),
        ),
    };
    BillDraft {
        description: bill.description,
        amount: bill.amount,
        category: bill.category,
        paid_by: bill.paid_by,
        split,
    }
}
