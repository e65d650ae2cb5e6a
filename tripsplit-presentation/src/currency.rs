use tripsplit_domain::Money;

pub const DEFAULT_SYMBOL: &str = "₹";

/// Renders amounts as `<symbol><amount>` with two decimals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyFormat {
    symbol: String,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::new(DEFAULT_SYMBOL)
    }
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn format(&self, amount: Money) -> String {
        let rounded = amount.round_cents();
        if rounded.is_negative() {
            format!("-{}{:.2}", self.symbol, rounded.abs())
        } else {
            format!("{}{:.2}", self.symbol, rounded)
        }
    }

    /// Two-decimal amount without the symbol, as used in CSV cells.
    pub fn format_plain(&self, amount: Money) -> String {
        format!("{:.2}", amount.round_cents())
    }
}
