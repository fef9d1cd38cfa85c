use crate::utils::{format_display_date, parse_api_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which accounting entity a record was parsed from. Invoices are income;
/// expenses and bills are outgoing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Invoice,
    Expense,
    Bill,
}

impl RecordKind {
    pub fn is_income(&self) -> bool {
        matches!(self, RecordKind::Invoice)
    }
}

/// Recurrence frequency as reported by the accounting API. The wire values
/// are `"weeks"` and `"months"`; anything else degrades to `None` and the
/// record is treated as a one-off event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceFrequency {
    Weeks,
    Months,
    #[default]
    None,
}

impl RecurrenceFrequency {
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "weeks" => RecurrenceFrequency::Weeks,
            "months" => RecurrenceFrequency::Months,
            _ => RecurrenceFrequency::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceFrequency::Weeks => "weeks",
            RecurrenceFrequency::Months => "months",
            RecurrenceFrequency::None => "",
        }
    }
}

/// Normalized representation of an invoice, expense, or bill line.
///
/// `converted_total` carries the amount in the target currency and is
/// attached by the session once exchange rates are known; a record must not
/// enter aggregation before that happens. Records are immutable after
/// conversion and replaced wholesale on each fetch cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub kind: RecordKind,
    pub id: String,
    pub party: String,
    pub status: String,
    pub total: f64,
    pub currency_code: String,
    pub converted_total: Option<f64>,
    pub date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub next_date: Option<NaiveDate>,
    pub is_recurrent: bool,
    pub frequency: RecurrenceFrequency,
}

impl FinancialRecord {
    /// The date a record counts against: next-occurrence date if present,
    /// else due date, else the primary date. `None` means the record has no
    /// usable date and is silently excluded from aggregation.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.next_date.or(self.due_date).or(self.date)
    }

    /// Converted amount, falling back to the native amount when conversion
    /// has not been applied (treated as already being in the target
    /// currency).
    pub fn converted_or_native(&self) -> f64 {
        self.converted_total.unwrap_or(self.total)
    }

    /// Case-insensitive substring match over the fields the summary labels
    /// search: identifier, counterparty, status, displayed dates, currency
    /// code, and the converted amount.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        let haystacks = [
            self.id.to_lowercase(),
            self.party.to_lowercase(),
            self.status.to_lowercase(),
            self.frequency.as_str().to_string(),
            self.currency_code.to_lowercase(),
            self.date.map(format_display_date).unwrap_or_default(),
            self.due_date.map(format_display_date).unwrap_or_default(),
            self.next_date.map(format_display_date).unwrap_or_default(),
            format!("{}", self.converted_or_native()),
        ];
        haystacks.iter().any(|h| h.contains(&needle))
    }
}

/// User-authored forward-looking entry. Recurring forecasts are implicitly
/// monthly; there is no frequency field.
///
/// Equality is structural over exactly these five fields, which is what the
/// forecast store uses to locate an entry for removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub name: String,
    pub amount: f64,
    pub date: Option<NaiveDate>,
    pub is_income: bool,
    pub is_recurrent: bool,
}

// Wire shapes of the accounting API responses. Dates arrive as
// `yyyy-MM-dd` strings, empty when absent.

#[derive(Debug, Clone, Deserialize)]
pub struct WireInvoice {
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub currency_code: String,
    #[serde(default)]
    pub total: f64,
}

impl From<WireInvoice> for FinancialRecord {
    fn from(wire: WireInvoice) -> Self {
        FinancialRecord {
            kind: RecordKind::Invoice,
            id: wire.invoice_number,
            party: wire.customer_name,
            status: wire.status,
            total: wire.total,
            currency_code: wire.currency_code,
            converted_total: None,
            date: parse_api_date(&wire.date),
            due_date: parse_api_date(&wire.due_date),
            next_date: None,
            is_recurrent: false,
            frequency: RecurrenceFrequency::None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireExpense {
    #[serde(default)]
    pub expense_id: String,
    #[serde(default)]
    pub recurring_expense_id: String,
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub recurrence_frequency: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub next_expense_date: String,
    #[serde(default)]
    pub currency_code: String,
    #[serde(default)]
    pub total: f64,
}

impl WireExpense {
    pub fn into_record(self, is_recurrent: bool) -> FinancialRecord {
        let id = if is_recurrent && !self.recurring_expense_id.is_empty() {
            self.recurring_expense_id
        } else {
            self.expense_id
        };
        FinancialRecord {
            kind: RecordKind::Expense,
            id,
            party: self.vendor_name,
            status: self.status,
            total: self.total,
            currency_code: self.currency_code,
            converted_total: None,
            date: parse_api_date(&self.date),
            due_date: None,
            next_date: parse_api_date(&self.next_expense_date),
            is_recurrent,
            frequency: if is_recurrent {
                RecurrenceFrequency::parse(&self.recurrence_frequency)
            } else {
                RecurrenceFrequency::None
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireBill {
    #[serde(default)]
    pub bill_number: String,
    #[serde(default)]
    pub recurring_bill_id: String,
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub recurrence_frequency: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub next_bill_date: String,
    #[serde(default)]
    pub currency_code: String,
    #[serde(default)]
    pub total: f64,
}

impl WireBill {
    pub fn into_record(self, is_recurrent: bool) -> FinancialRecord {
        let id = if is_recurrent && !self.recurring_bill_id.is_empty() {
            self.recurring_bill_id
        } else {
            self.bill_number
        };
        FinancialRecord {
            kind: RecordKind::Bill,
            id,
            party: self.vendor_name,
            status: self.status,
            total: self.total,
            currency_code: self.currency_code,
            converted_total: None,
            date: parse_api_date(&self.date),
            due_date: parse_api_date(&self.due_date),
            next_date: parse_api_date(&self.next_bill_date),
            is_recurrent,
            frequency: if is_recurrent {
                RecurrenceFrequency::parse(&self.recurrence_frequency)
            } else {
                RecurrenceFrequency::None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FinancialRecord {
        FinancialRecord {
            kind: RecordKind::Bill,
            id: "BILL-042".to_string(),
            party: "Acme Hosting".to_string(),
            status: "open".to_string(),
            total: 120.0,
            currency_code: "EUR".to_string(),
            converted_total: Some(508.8),
            date: NaiveDate::from_ymd_opt(2024, 1, 3),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 20),
            next_date: None,
            is_recurrent: false,
            frequency: RecurrenceFrequency::None,
        }
    }

    #[test]
    fn test_effective_date_prefers_next_then_due() {
        let mut r = record();
        assert_eq!(r.effective_date(), NaiveDate::from_ymd_opt(2024, 1, 20));

        r.next_date = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert_eq!(r.effective_date(), NaiveDate::from_ymd_opt(2024, 2, 1));

        r.next_date = None;
        r.due_date = None;
        assert_eq!(r.effective_date(), NaiveDate::from_ymd_opt(2024, 1, 3));

        r.date = None;
        assert_eq!(r.effective_date(), None);
    }

    #[test]
    fn test_converted_or_native_falls_back() {
        let mut r = record();
        assert_eq!(r.converted_or_native(), 508.8);
        r.converted_total = None;
        assert_eq!(r.converted_or_native(), 120.0);
    }

    #[test]
    fn test_matches_query() {
        let r = record();
        assert!(r.matches_query(""));
        assert!(r.matches_query("acme"));
        assert!(r.matches_query("BILL-042"));
        assert!(r.matches_query("eur"));
        assert!(r.matches_query("20/01/2024"));
        assert!(!r.matches_query("payroll"));
    }

    #[test]
    fn test_frequency_parse() {
        assert_eq!(RecurrenceFrequency::parse("weeks"), RecurrenceFrequency::Weeks);
        assert_eq!(RecurrenceFrequency::parse("months"), RecurrenceFrequency::Months);
        assert_eq!(RecurrenceFrequency::parse("years"), RecurrenceFrequency::None);
        assert_eq!(RecurrenceFrequency::parse(""), RecurrenceFrequency::None);
    }

    #[test]
    fn test_forecast_structural_equality() {
        let a = ForecastEntry {
            name: "Office move".to_string(),
            amount: 1500.0,
            date: NaiveDate::from_ymd_opt(2024, 6, 1),
            is_income: false,
            is_recurrent: false,
        };
        let mut b = a.clone();
        assert_eq!(a, b);
        b.amount = 1500.01;
        assert_ne!(a, b);
    }

    #[test]
    fn test_wire_invoice_deserialization() {
        let json = r#"{
            "invoice_number": "INV-7",
            "customer_name": "Globex",
            "status": "sent",
            "date": "2024-01-02",
            "due_date": "2024-01-16",
            "currency_code": "USD",
            "total": 950.5
        }"#;
        let wire: WireInvoice = serde_json::from_str(json).unwrap();
        let record: FinancialRecord = wire.into();
        assert_eq!(record.kind, RecordKind::Invoice);
        assert_eq!(record.id, "INV-7");
        assert_eq!(record.effective_date(), NaiveDate::from_ymd_opt(2024, 1, 16));
        assert_eq!(record.converted_total, None);
    }

    #[test]
    fn test_wire_recurring_bill_uses_recurring_id() {
        let json = r#"{
            "recurring_bill_id": "RB-3",
            "vendor_name": "CloudCo",
            "status": "active",
            "recurrence_frequency": "months",
            "next_bill_date": "2024-03-01",
            "currency_code": "GBP",
            "total": 49.0
        }"#;
        let wire: WireBill = serde_json::from_str(json).unwrap();
        let record = wire.into_record(true);
        assert_eq!(record.id, "RB-3");
        assert!(record.is_recurrent);
        assert_eq!(record.frequency, RecurrenceFrequency::Months);
        assert_eq!(record.effective_date(), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_wire_expense_missing_date_yields_none() {
        let json = r#"{"expense_id": "E-1", "total": 10.0}"#;
        let wire: WireExpense = serde_json::from_str(json).unwrap();
        let record = wire.into_record(false);
        assert_eq!(record.effective_date(), None);
    }
}
