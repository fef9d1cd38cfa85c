//! Demo-mode source backed by the bundled CSV exports. Columns and the
//! `d-M-yyyy` date format follow the demo files shipped with the desktop
//! app; rates are a fixed table so the rate gate completes immediately.

use crate::error::Result;
use crate::record::{FinancialRecord, RecordKind, RecurrenceFrequency};
use crate::source::{RateSource, RecordSource};
use crate::utils::parse_demo_date;
use async_trait::async_trait;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

pub struct DemoSource {
    dir: PathBuf,
}

impl DemoSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn open(&self, name: &str) -> Result<File> {
        Ok(File::open(self.dir.join(name))?)
    }
}

#[async_trait]
impl RecordSource for DemoSource {
    async fn fetch_invoices(&self) -> Result<Vec<FinancialRecord>> {
        parse_invoices(self.open("invoices.csv")?)
    }

    async fn fetch_expenses(&self) -> Result<Vec<FinancialRecord>> {
        parse_normal_expenses(self.open("normalExpenses.csv")?)
    }

    async fn fetch_recurring_expenses(&self) -> Result<Vec<FinancialRecord>> {
        parse_recurring_expenses(self.open("recurrentExpenses.csv")?)
    }

    async fn fetch_bills(&self) -> Result<Vec<FinancialRecord>> {
        parse_normal_bills(self.open("normalBills.csv")?)
    }

    async fn fetch_recurring_bills(&self) -> Result<Vec<FinancialRecord>> {
        parse_recurring_bills(self.open("recurrentBills.csv")?)
    }
}

const DEMO_RATES: [(&str, f64); 4] = [("EUR", 4.24), ("USD", 3.91), ("GBP", 5.5), ("AUS", 2.87)];

#[async_trait]
impl RateSource for DemoSource {
    async fn fetch_supported_currencies(&self) -> Result<Vec<String>> {
        Ok(DEMO_RATES.iter().map(|(code, _)| code.to_string()).collect())
    }

    async fn fetch_exchange_rate(&self, currency: &str) -> Result<(String, f64)> {
        let rate = DEMO_RATES
            .iter()
            .find(|(code, _)| *code == currency)
            .map(|(_, rate)| *rate)
            .unwrap_or(1.0);
        Ok((currency.to_string(), rate))
    }
}

fn rows<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
}

fn field(row: &csv::StringRecord, index: usize) -> String {
    row.get(index).unwrap_or("").trim().to_string()
}

fn amount(row: &csv::StringRecord, index: usize) -> f64 {
    row.get(index)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0.0)
}

pub fn parse_invoices<R: Read>(reader: R) -> Result<Vec<FinancialRecord>> {
    let mut invoices = Vec::new();
    for row in rows(reader).records() {
        let row = row?;
        invoices.push(FinancialRecord {
            kind: RecordKind::Invoice,
            id: field(&row, 0),
            party: field(&row, 1),
            status: field(&row, 2),
            total: amount(&row, 5),
            currency_code: field(&row, 6),
            converted_total: None,
            date: parse_demo_date(&field(&row, 3)),
            due_date: parse_demo_date(&field(&row, 4)),
            next_date: None,
            is_recurrent: false,
            frequency: RecurrenceFrequency::None,
        });
    }
    Ok(invoices)
}

pub fn parse_normal_expenses<R: Read>(reader: R) -> Result<Vec<FinancialRecord>> {
    let mut expenses = Vec::new();
    for row in rows(reader).records() {
        let row = row?;
        expenses.push(FinancialRecord {
            kind: RecordKind::Expense,
            id: field(&row, 0),
            party: field(&row, 3),
            status: field(&row, 1),
            total: amount(&row, 8),
            currency_code: field(&row, 9),
            converted_total: None,
            date: parse_demo_date(&field(&row, 6)),
            due_date: None,
            next_date: None,
            is_recurrent: false,
            frequency: RecurrenceFrequency::None,
        });
    }
    Ok(expenses)
}

pub fn parse_recurring_expenses<R: Read>(reader: R) -> Result<Vec<FinancialRecord>> {
    let mut expenses = Vec::new();
    for row in rows(reader).records() {
        let row = row?;
        expenses.push(FinancialRecord {
            kind: RecordKind::Expense,
            id: field(&row, 0),
            party: field(&row, 3),
            status: field(&row, 1),
            total: amount(&row, 8),
            currency_code: field(&row, 9),
            converted_total: None,
            date: None,
            due_date: None,
            next_date: parse_demo_date(&field(&row, 7)),
            is_recurrent: true,
            frequency: RecurrenceFrequency::parse(&field(&row, 5)),
        });
    }
    Ok(expenses)
}

pub fn parse_normal_bills<R: Read>(reader: R) -> Result<Vec<FinancialRecord>> {
    let mut bills = Vec::new();
    for row in rows(reader).records() {
        let row = row?;
        bills.push(FinancialRecord {
            kind: RecordKind::Bill,
            id: field(&row, 0),
            party: field(&row, 1),
            status: field(&row, 3),
            total: amount(&row, 8),
            currency_code: field(&row, 9),
            converted_total: None,
            date: parse_demo_date(&field(&row, 5)),
            due_date: parse_demo_date(&field(&row, 6)),
            next_date: None,
            is_recurrent: false,
            frequency: RecurrenceFrequency::None,
        });
    }
    Ok(bills)
}

pub fn parse_recurring_bills<R: Read>(reader: R) -> Result<Vec<FinancialRecord>> {
    let mut bills = Vec::new();
    for row in rows(reader).records() {
        let row = row?;
        bills.push(FinancialRecord {
            kind: RecordKind::Bill,
            id: field(&row, 0),
            party: field(&row, 1),
            status: field(&row, 3),
            total: amount(&row, 8),
            currency_code: field(&row, 9),
            converted_total: None,
            date: None,
            due_date: None,
            next_date: parse_demo_date(&field(&row, 7)),
            is_recurrent: true,
            frequency: RecurrenceFrequency::parse(&field(&row, 4)),
        });
    }
    Ok(bills)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_invoices() {
        let csv = "\
number,party,status,date,due_date,total,currency
INV-1,Globex,sent,2-1-2024,16-1-2024,950.5,USD
INV-2,Initech,paid,5-1-2024,,120,PLN
";
        let invoices = parse_invoices(csv.as_bytes()).unwrap();
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].id, "INV-1");
        assert_eq!(
            invoices[0].due_date,
            NaiveDate::from_ymd_opt(2024, 1, 16)
        );
        assert_eq!(invoices[0].total, 950.5);
        // missing due date falls back to the primary date
        assert_eq!(
            invoices[1].effective_date(),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn test_parse_recurring_expenses() {
        let csv = "\
id,status,category,party,count,frequency,date,next_date,total,currency
RE-1,active,hosting,CloudCo,,months,,10-2-2024,49,EUR
";
        let expenses = parse_recurring_expenses(csv.as_bytes()).unwrap();
        assert_eq!(expenses.len(), 1);
        let e = &expenses[0];
        assert!(e.is_recurrent);
        assert_eq!(e.frequency, RecurrenceFrequency::Months);
        assert_eq!(e.next_date, NaiveDate::from_ymd_opt(2024, 2, 10));
        assert_eq!(e.party, "CloudCo");
    }

    #[test]
    fn test_parse_recurring_bills() {
        let csv = "\
number,party,x,status,frequency,date,due,next,total,currency
RB-1,PowerGrid,,open,weeks,,,1-3-2024,75,GBP
";
        let bills = parse_recurring_bills(csv.as_bytes()).unwrap();
        let b = &bills[0];
        assert_eq!(b.frequency, RecurrenceFrequency::Weeks);
        assert_eq!(b.next_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(b.status, "open");
    }

    #[tokio::test]
    async fn test_demo_rates() {
        let source = DemoSource::new(".");
        let currencies = source.fetch_supported_currencies().await.unwrap();
        assert_eq!(currencies.len(), 4);
        let (code, rate) = source.fetch_exchange_rate("EUR").await.unwrap();
        assert_eq!(code, "EUR");
        assert_eq!(rate, 4.24);
    }
}
