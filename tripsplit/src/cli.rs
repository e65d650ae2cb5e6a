use std::{borrow::Cow, path::PathBuf, str::FromStr};

use rust_decimal::Decimal;
use tripsplit_domain::{BillId, MemberId, Money, SplitRatio};

pub type CliResult<T> = Result<T, Cow<'static, str>>;

pub const USAGE: &str = "Usage: tripsplit [group.json] \
[balances|settle|stats|summary|csv|toggle <index>|add-member <name>|remove-member <id>\
|add-bill <payer-id> <amount> <description> [category] [--split <id:weight,...>]\
|update-bill <bill-id> <payer-id> <amount> <description> [category] [--split <id:weight,...>]\
|delete-bill <id>]";

pub const DEFAULT_CATEGORY: &str = "Other";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Balances,
    Settle,
    Stats,
    Summary,
    Csv,
    Toggle(usize),
    AddMember(String),
    RemoveMember(MemberId),
    AddBill(BillArgs),
    UpdateBill { id: BillId, bill: BillArgs },
    DeleteBill(BillId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillArgs {
    pub paid_by: MemberId,
    pub amount: Money,
    pub description: String,
    pub category: String,
    /// `None` splits equally among every current member.
    pub split: Option<SplitRatio>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// `None` defers to the configured default group file.
    pub path: Option<PathBuf>,
    pub command: Command,
}

const COMMANDS: &[&str] = &[
    "balances",
    "settle",
    "stats",
    "summary",
    "csv",
    "toggle",
    "add-member",
    "remove-member",
    "add-bill",
    "update-bill",
    "delete-bill",
];

pub fn parse_args(args: impl IntoIterator<Item = String>) -> CliResult<Invocation> {
    let mut args = args.into_iter().peekable();

    let starts_with_path = args
        .peek()
        .is_some_and(|first| !COMMANDS.contains(&first.as_str()));
    let path = if starts_with_path {
        args.next().map(PathBuf::from)
    } else {
        None
    };

    let command = match args.next().as_deref() {
        None | Some("summary") => Command::Summary,
        Some("balances") => Command::Balances,
        Some("settle") => Command::Settle,
        Some("stats") => Command::Stats,
        Some("csv") => Command::Csv,
        Some("toggle") => {
            let raw = required(args.next(), "toggle <index>")?;
            let index = raw
                .parse()
                .map_err(|_| format!("Invalid settlement index '{raw}'"))?;
            Command::Toggle(index)
        }
        Some("add-member") => {
            let name = args.collect::<Vec<_>>().join(" ");
            if name.trim().is_empty() {
                return Err("Missing argument: add-member <name>".into());
            }
            return Ok(Invocation {
                path,
                command: Command::AddMember(name),
            });
        }
        Some("remove-member") => {
            Command::RemoveMember(MemberId::new(required(args.next(), "remove-member <id>")?))
        }
        Some("add-bill") => {
            let bill = parse_bill(args, "add-bill <payer-id> <amount> <description> [category]")?;
            return Ok(Invocation {
                path,
                command: Command::AddBill(bill),
            });
        }
        Some("update-bill") => {
            const SHAPE: &str = "update-bill <bill-id> <payer-id> <amount> <description> [category]";
            let id = BillId::new(required(args.next(), SHAPE)?);
            let bill = parse_bill(args, SHAPE)?;
            return Ok(Invocation {
                path,
                command: Command::UpdateBill { id, bill },
            });
        }
        Some("delete-bill") => {
            Command::DeleteBill(BillId::new(required(args.next(), "delete-bill <id>")?))
        }
        Some(other) => return Err(format!("Unknown command '{other}'\n{USAGE}").into()),
    };

    if let Some(extra) = args.next() {
        return Err(format!("Unexpected argument '{extra}'\n{USAGE}").into());
    }

    Ok(Invocation { path, command })
}

fn required(arg: Option<String>, shape: &str) -> CliResult<String> {
    arg.ok_or_else(|| format!("Missing argument: {shape}").into())
}

/// Bill fields, an optional category and an optional `--split` in either order.
fn parse_bill(mut args: impl Iterator<Item = String>, shape: &str) -> CliResult<BillArgs> {
    let paid_by = MemberId::new(required(args.next(), shape)?);
    let raw_amount = required(args.next(), shape)?;
    let amount = Decimal::from_str(&raw_amount)
        .map(Money::from_decimal)
        .map_err(|_| format!("Invalid amount '{raw_amount}'"))?;
    let description = required(args.next(), shape)?;

    let mut category = None;
    let mut split = None;
    while let Some(arg) = args.next() {
        if arg == "--split" {
            if split.is_some() {
                return Err("Duplicate --split".into());
            }
            split = Some(parse_split(&required(args.next(), SPLIT_SHAPE)?)?);
        } else if category.is_none() {
            category = Some(arg);
        } else {
            return Err(format!("Unexpected argument '{arg}'\n{USAGE}").into());
        }
    }

    Ok(BillArgs {
        paid_by,
        amount,
        description,
        category: category.unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
        split,
    })
}

const SPLIT_SHAPE: &str = "--split <id:weight,...>";

/// `a:2,b:1`; an id without a weight counts once.
fn parse_split(raw: &str) -> CliResult<SplitRatio> {
    let mut ratio = SplitRatio::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (id, weight) = match entry.split_once(':') {
            Some((id, weight)) => {
                let weight = Decimal::from_str(weight.trim())
                    .map_err(|_| format!("Invalid split entry '{entry}'"))?;
                (id.trim(), weight)
            }
            None => (entry, Decimal::ONE),
        };
        if id.is_empty() {
            return Err(format!("Invalid split entry '{entry}'").into());
        }
        if ratio.insert(MemberId::new(id), weight).is_some() {
            return Err(format!("Member '{id}' appears twice in split").into());
        }
    }
    if ratio.is_empty() {
        return Err(format!("Missing argument: {SPLIT_SHAPE}").into());
    }
    Ok(ratio)
}
