//! # Cashflow Projector
//!
//! A library for aggregating financial records (invoices, bills, expenses)
//! pulled from an accounting API into a single-currency cash-flow timeline
//! that blends actual transactions with user-authored forecasts.
//!
//! ## Core Concepts
//!
//! - **Financial Record**: a normalized invoice, expense, or bill line with
//!   its amount converted into the target currency
//! - **Recurrence Expansion**: bounded projection of weekly/monthly
//!   recurring records and monthly recurring forecasts up to a horizon
//! - **Event Aggregation**: same-day, same-direction events merge into one
//!   timeline point; income and expense never combine
//! - **Period Bucketing**: calendar-month periods with per-period balance
//!   and a running cumulative cash flow
//! - **Arrival Gates**: paired sources (normal + recurring) unblock
//!   aggregation only once both members have arrived
//!
//! ## Example
//!
//! ```rust,ignore
//! use cashflow_projector::*;
//! use chrono::NaiveDate;
//!
//! let mut session = Session::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
//! );
//! session.set_demo_rates();
//!
//! let source = DemoSource::new("assets");
//! refresh_session(&mut session, &source).await?;
//!
//! session.set_forecasting_enabled(true);
//! session.add_forecast(ForecastEntry {
//!     name: "Retainer".to_string(),
//!     amount: 2000.0,
//!     date: NaiveDate::from_ymd_opt(2024, 3, 1),
//!     is_income: true,
//!     is_recurrent: true,
//! });
//!
//! let projection = project_cash_flow(&session)?;
//! for (date, value) in &projection.cash_flow_series {
//!     println!("{date}: {value:.2}");
//! }
//! ```

pub mod aggregate;
pub mod currency;
pub mod demo;
pub mod error;
pub mod gate;
pub mod period;
pub mod record;
pub mod recurrence;
pub mod session;
pub mod source;
pub mod utils;

#[cfg(feature = "remote")]
pub mod remote;

pub use aggregate::{aggregate, AggregationInput, SeriesBundle, TimelinePoint, ValueBounds};
pub use currency::{convert, ExchangeRateTable, DEFAULT_EXPECTED_RATES};
pub use demo::DemoSource;
pub use error::{CashFlowError, Result};
pub use gate::{ArrivalGate, GateState, PairMember};
pub use period::{bucketize, cash_flow_series, BucketizeOutput, Period};
pub use record::{
    FinancialRecord, ForecastEntry, RecordKind, RecurrenceFrequency, WireBill, WireExpense,
    WireInvoice,
};
pub use recurrence::{expand, MAX_FUTURE_OCCURRENCES};
pub use session::{Session, TotalsFilter};
pub use source::{refresh_rates, refresh_session, RateSource, RecordSource};
pub use utils::*;

#[cfg(feature = "remote")]
pub use remote::RemoteBooksClient;

use chrono::NaiveDate;
use log::{debug, info};

/// Everything one aggregation pass produces: the merged per-direction
/// timeline points, the plotted series, the monthly periods, and the value
/// bounds for axis scaling.
#[derive(Debug, Clone)]
pub struct CashFlowProjection {
    pub income_points: Vec<TimelinePoint>,
    pub expense_points: Vec<TimelinePoint>,
    pub income_series: Vec<(NaiveDate, f64)>,
    pub expense_series: Vec<(NaiveDate, f64)>,
    pub cash_flow_series: Vec<(NaiveDate, f64)>,
    pub periods: Vec<Period>,
    pub bounds: ValueBounds,
}

pub struct CashFlowProjector;

impl CashFlowProjector {
    /// Runs one full projection pass over a ready session. Refuses to run
    /// before the arrival gates and the rate table have completed, since
    /// the result would reflect partial data.
    pub fn project(session: &Session) -> Result<CashFlowProjection> {
        validate_session_readiness(session)?;

        info!(
            "projecting cash flow over {} invoices, {} expenses, {} bills, {} forecasts",
            session.invoices().len(),
            session.expenses().len(),
            session.bills().len(),
            session.forecasts().len()
        );

        let input = AggregationInput {
            invoices: session.invoices(),
            expenses: session.expenses(),
            bills: session.bills(),
            forecasts: session.forecasts(),
            forecasting_enabled: session.is_forecasting_enabled(),
            earliest: session.earliest_date(),
            horizon: session.horizon(),
            display_from: session.from_date(),
            display_to: session.to_date(),
        };
        let bundle = aggregate(&input);
        debug!(
            "aggregated {} income points and {} expense points",
            bundle.income.len(),
            bundle.expense.len()
        );

        let buckets = bucketize(
            &bundle.income,
            &bundle.expense,
            session.from_date(),
            session.to_date(),
            session.earliest_date(),
            session.latest_date(),
        );
        debug!("bucketed into {} monthly periods", buckets.periods.len());

        let mut bounds = bundle.bounds;
        bounds.merge(buckets.bounds);

        let income_series = bundle.income.iter().map(|p| (p.date, p.amount)).collect();
        let expense_series = bundle.expense.iter().map(|p| (p.date, p.amount)).collect();
        let cash_flow = cash_flow_series(&buckets.periods);

        Ok(CashFlowProjection {
            income_points: bundle.income,
            expense_points: bundle.expense,
            income_series,
            expense_series,
            cash_flow_series: cash_flow,
            periods: buckets.periods,
            bounds,
        })
    }
}

/// Convenience wrapper over [`CashFlowProjector::project`].
pub fn project_cash_flow(session: &Session) -> Result<CashFlowProjection> {
    CashFlowProjector::project(session)
}

fn validate_session_readiness(session: &Session) -> Result<()> {
    if !session.rates().is_complete() {
        return Err(CashFlowError::IncompleteRates {
            received: session.rates().len(),
            expected: session.rates().expected(),
        });
    }
    if !session.invoices_arrived() {
        return Err(CashFlowError::IncompleteArrival("invoice"));
    }
    if !session.expense_pair_complete() {
        return Err(CashFlowError::IncompleteArrival("expense"));
    }
    if !session.bill_pair_complete() {
        return Err(CashFlowError::IncompleteArrival("bill"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(id: &str, due: NaiveDate, total: f64) -> FinancialRecord {
        FinancialRecord {
            kind: RecordKind::Invoice,
            id: id.to_string(),
            party: "Customer".to_string(),
            status: "sent".to_string(),
            total,
            currency_code: "PLN".to_string(),
            converted_total: None,
            date: Some(due),
            due_date: Some(due),
            next_date: None,
            is_recurrent: false,
            frequency: RecurrenceFrequency::None,
        }
    }

    fn expense(id: &str, on: NaiveDate, total: f64) -> FinancialRecord {
        FinancialRecord {
            kind: RecordKind::Expense,
            id: id.to_string(),
            party: "Vendor".to_string(),
            status: "paid".to_string(),
            total,
            currency_code: "PLN".to_string(),
            converted_total: None,
            date: Some(on),
            due_date: None,
            next_date: None,
            is_recurrent: false,
            frequency: RecurrenceFrequency::None,
        }
    }

    fn ready_session() -> Session {
        let mut session = Session::new(date(2024, 1, 1), date(2024, 3, 31));
        session.set_demo_rates();
        session.ingest_invoices(vec![
            invoice("I-1", date(2024, 1, 10), 100.0),
            invoice("I-2", date(2024, 3, 5), 20.0),
        ]);
        session.ingest_expenses(
            vec![expense("E-1", date(2024, 2, 14), 50.0)],
            PairMember::Normal,
        );
        session.ingest_expenses(Vec::new(), PairMember::Recurrent);
        session.ingest_bills(Vec::new(), PairMember::Normal);
        session.ingest_bills(Vec::new(), PairMember::Recurrent);
        session
    }

    #[test]
    fn test_end_to_end_projection() {
        let session = ready_session();
        let projection = project_cash_flow(&session).unwrap();

        let balances: Vec<f64> = projection.periods.iter().map(|p| p.balance).collect();
        let cash_flows: Vec<f64> = projection.periods.iter().map(|p| p.cash_flow).collect();
        assert_eq!(balances, vec![100.0, -50.0, 20.0]);
        assert_eq!(cash_flows, vec![100.0, 50.0, 70.0]);

        assert_eq!(projection.income_series.len(), 2);
        assert_eq!(projection.expense_series.len(), 1);
        assert_eq!(projection.cash_flow_series.len(), 3);
    }

    #[test]
    fn test_project_refuses_incomplete_session() {
        let mut session = Session::new(date(2024, 1, 1), date(2024, 3, 31));
        session.set_demo_rates();
        session.ingest_invoices(Vec::new());
        session.ingest_expenses(Vec::new(), PairMember::Normal);
        // expense pair never completes
        session.ingest_bills(Vec::new(), PairMember::Normal);
        session.ingest_bills(Vec::new(), PairMember::Recurrent);

        let err = project_cash_flow(&session).unwrap_err();
        assert!(matches!(err, CashFlowError::IncompleteArrival("expense")));
    }

    #[test]
    fn test_project_refuses_incomplete_rates() {
        let session = Session::new(date(2024, 1, 1), date(2024, 3, 31));
        let err = project_cash_flow(&session).unwrap_err();
        assert!(matches!(err, CashFlowError::IncompleteRates { .. }));
    }

    #[test]
    fn test_projection_is_stable_across_passes() {
        let session = ready_session();
        let first = project_cash_flow(&session).unwrap();
        let second = project_cash_flow(&session).unwrap();
        assert_eq!(first.periods, second.periods);
        assert_eq!(first.income_points, second.income_points);
        assert_eq!(first.expense_points, second.expense_points);
    }
}
