use log::debug;
use std::collections::HashMap;

/// Number of non-base currencies the accounting API currently reports rates
/// for. The table is treated as complete once this many distinct codes have
/// arrived.
pub const DEFAULT_EXPECTED_RATES: usize = 11;

/// Mapping from currency code to the multiplicative rate into the target
/// currency, doubling as a counting gate: nothing downstream consumes rates
/// before the expected cardinality is reached.
#[derive(Debug, Clone)]
pub struct ExchangeRateTable {
    rates: HashMap<String, f64>,
    expected: usize,
}

impl ExchangeRateTable {
    pub fn new(expected: usize) -> Self {
        Self {
            rates: HashMap::new(),
            expected,
        }
    }

    /// Fixed rates used by demo mode, complete by construction.
    pub fn demo() -> Self {
        let mut table = Self::new(4);
        table.insert("EUR", 4.24);
        table.insert("USD", 3.91);
        table.insert("GBP", 5.5);
        table.insert("AUS", 2.87);
        table
    }

    /// Records a rate. Returns `true` exactly when this insertion completes
    /// the table; re-inserting a known code overwrites the rate without
    /// counting toward the expected cardinality.
    pub fn insert(&mut self, code: impl Into<String>, rate: f64) -> bool {
        let before = self.rates.len();
        self.rates.insert(code.into(), rate);
        before < self.expected && self.rates.len() == self.expected
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.rates.len() >= self.expected
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn clear(&mut self) {
        self.rates.clear();
    }
}

impl Default for ExchangeRateTable {
    fn default() -> Self {
        Self::new(DEFAULT_EXPECTED_RATES)
    }
}

/// Converts `amount` from `currency_code` into the target currency. A code
/// with no known rate passes through unchanged: the amount is assumed to
/// already be in the target currency. There is no signal distinguishing
/// "known same-currency" from "rate missing", so the miss is traced.
pub fn convert(amount: f64, currency_code: &str, table: &ExchangeRateTable) -> f64 {
    match table.rate(currency_code) {
        Some(rate) => amount * rate,
        None => {
            debug!("no exchange rate for '{currency_code}', passing amount through");
            amount
        }
    }
}
