use crate::currency::{convert, ExchangeRateTable};
use crate::gate::{ArrivalGate, PairMember};
use crate::record::{FinancialRecord, ForecastEntry, RecordKind};
use chrono::NaiveDate;
use log::{debug, info, warn};

/// Optional narrowing applied to the summary totals: a free-text query plus
/// recurrence-visibility toggles.
#[derive(Debug, Clone, Default)]
pub struct TotalsFilter {
    pub query: String,
    pub hide_normal: bool,
    pub hide_recurrent: bool,
}

impl TotalsFilter {
    fn accepts(&self, record: &FinancialRecord) -> bool {
        if self.hide_recurrent && record.is_recurrent {
            return false;
        }
        if self.hide_normal && !record.is_recurrent {
            return false;
        }
        record.matches_query(&self.query)
    }
}

/// Session-level context owning all mutable state the projection reads:
/// record lists, forecasts, exchange rates, the display window, and the
/// arrival gates. Everything is rebuilt wholesale per fetch cycle; the
/// aggregation core only ever takes read-only snapshots of it.
#[derive(Debug, Clone)]
pub struct Session {
    invoices: Vec<FinancialRecord>,
    expenses: Vec<FinancialRecord>,
    bills: Vec<FinancialRecord>,
    forecasts: Vec<ForecastEntry>,
    rates: ExchangeRateTable,
    expense_gate: ArrivalGate,
    bill_gate: ArrivalGate,
    invoices_arrived: bool,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    from_date: NaiveDate,
    to_date: NaiveDate,
    forecasting_enabled: bool,
}

impl Session {
    pub fn new(from_date: NaiveDate, to_date: NaiveDate) -> Self {
        Self {
            invoices: Vec::new(),
            expenses: Vec::new(),
            bills: Vec::new(),
            forecasts: Vec::new(),
            rates: ExchangeRateTable::default(),
            expense_gate: ArrivalGate::new(),
            bill_gate: ArrivalGate::new(),
            invoices_arrived: false,
            first_date: None,
            last_date: None,
            from_date,
            to_date,
            forecasting_enabled: false,
        }
    }

    pub fn with_rate_table(mut self, rates: ExchangeRateTable) -> Self {
        self.rates = rates;
        self
    }

    // --- exchange rates -------------------------------------------------

    /// Records one exchange rate. Returns `true` exactly when the table
    /// just became complete.
    pub fn add_rate(&mut self, code: impl Into<String>, rate: f64) -> bool {
        let completed = self.rates.insert(code, rate);
        if completed {
            info!("exchange rate table complete ({} rates)", self.rates.len());
        }
        completed
    }

    pub fn rates(&self) -> &ExchangeRateTable {
        &self.rates
    }

    pub fn set_demo_rates(&mut self) {
        self.rates = ExchangeRateTable::demo();
    }

    // --- ingestion ------------------------------------------------------

    /// Replaces the invoice list. Invoices arrive as a single response, so
    /// no pairing gate applies; the list is converted, sorted by due date,
    /// and the known date span extends immediately.
    pub fn ingest_invoices(&mut self, mut invoices: Vec<FinancialRecord>) {
        self.convert_batch(&mut invoices);
        self.invoices = invoices;
        self.invoices.sort_by_key(|r| r.due_date);
        let span = Self::date_span(&self.invoices);
        self.extend_known_dates(span);
        self.invoices_arrived = true;
        info!("ingested {} invoices", self.invoices.len());
    }

    /// Appends one member of the expense pair. Partial data is visible
    /// immediately; sorting and date-span extension wait for the pair to
    /// complete. Returns `true` exactly when this arrival completes it.
    pub fn ingest_expenses(
        &mut self,
        mut expenses: Vec<FinancialRecord>,
        member: PairMember,
    ) -> bool {
        self.convert_batch(&mut expenses);
        debug!("ingesting {} expenses ({:?})", expenses.len(), member);
        self.expenses.append(&mut expenses);

        if self.expense_gate.arrive(member) {
            self.expenses.sort_by_key(|r| r.effective_date());
            let span = Self::date_span(&self.expenses);
            self.extend_known_dates(span);
            info!("expense pair complete: {} records", self.expenses.len());
            true
        } else {
            false
        }
    }

    /// Appends one member of the bill pair; same protocol as expenses.
    pub fn ingest_bills(&mut self, mut bills: Vec<FinancialRecord>, member: PairMember) -> bool {
        self.convert_batch(&mut bills);
        debug!("ingesting {} bills ({:?})", bills.len(), member);
        self.bills.append(&mut bills);

        if self.bill_gate.arrive(member) {
            self.bills.sort_by_key(|r| r.effective_date());
            let span = Self::date_span(&self.bills);
            self.extend_known_dates(span);
            info!("bill pair complete: {} records", self.bills.len());
            true
        } else {
            false
        }
    }

    /// Starts a fresh fetch cycle: discards buffered records and resets the
    /// gates. Invoked on mode change and on range re-fetch.
    pub fn begin_cycle(&mut self) {
        self.invoices.clear();
        self.expenses.clear();
        self.bills.clear();
        self.expense_gate.reset();
        self.bill_gate.reset();
        self.invoices_arrived = false;
        self.first_date = None;
        self.last_date = None;
        debug!("fetch cycle reset");
    }

    /// All data sources have delivered and the rate table is complete, so
    /// aggregation will reflect full data.
    pub fn is_ready(&self) -> bool {
        self.invoices_arrived
            && self.expense_gate.is_complete()
            && self.bill_gate.is_complete()
            && self.rates.is_complete()
    }

    pub fn expense_pair_complete(&self) -> bool {
        self.expense_gate.is_complete()
    }

    pub fn bill_pair_complete(&self) -> bool {
        self.bill_gate.is_complete()
    }

    pub fn invoices_arrived(&self) -> bool {
        self.invoices_arrived
    }

    // Conversion is a one-shot at ingest; rates landing later do not
    // rewrite buffered batches.
    fn convert_batch(&self, records: &mut [FinancialRecord]) {
        if !records.is_empty() && !self.rates.is_complete() {
            warn!(
                "converting {} records against an incomplete rate table ({} of {} rates)",
                records.len(),
                self.rates.len(),
                self.rates.expected()
            );
        }
        for record in records.iter_mut() {
            record.converted_total = Some(convert(record.total, &record.currency_code, &self.rates));
        }
    }

    fn date_span(records: &[FinancialRecord]) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let dates = records.iter().filter_map(|r| r.effective_date());
        (dates.clone().min(), dates.max())
    }

    fn extend_known_dates(&mut self, (min, max): (Option<NaiveDate>, Option<NaiveDate>)) {
        if let Some(min) = min {
            self.first_date = Some(self.first_date.map_or(min, |d| d.min(min)));
        }
        if let Some(max) = max {
            self.last_date = Some(self.last_date.map_or(max, |d| d.max(max)));
        }
    }

    // --- forecasts ------------------------------------------------------

    pub fn add_forecast(&mut self, entry: ForecastEntry) {
        self.forecasts.push(entry);
    }

    /// Removes the first entry structurally equal to `entry`.
    pub fn remove_forecast(&mut self, entry: &ForecastEntry) -> bool {
        match self.forecasts.iter().position(|f| f == entry) {
            Some(index) => {
                self.forecasts.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn remove_forecast_at(&mut self, index: usize) -> Option<ForecastEntry> {
        if index < self.forecasts.len() {
            Some(self.forecasts.remove(index))
        } else {
            None
        }
    }

    pub fn clear_forecasts(&mut self) {
        self.forecasts.clear();
    }

    pub fn forecasts(&self) -> &[ForecastEntry] {
        &self.forecasts
    }

    // --- accessors ------------------------------------------------------

    pub fn invoices(&self) -> &[FinancialRecord] {
        &self.invoices
    }

    pub fn expenses(&self) -> &[FinancialRecord] {
        &self.expenses
    }

    pub fn bills(&self) -> &[FinancialRecord] {
        &self.bills
    }

    pub fn set_forecasting_enabled(&mut self, enabled: bool) {
        self.forecasting_enabled = enabled;
    }

    pub fn is_forecasting_enabled(&self) -> bool {
        self.forecasting_enabled
    }

    pub fn set_window(&mut self, from_date: NaiveDate, to_date: NaiveDate) {
        self.from_date = from_date;
        self.to_date = to_date;
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from_date
    }

    pub fn to_date(&self) -> NaiveDate {
        self.to_date
    }

    /// Earliest effective date across all known records, falling back to
    /// the display start before any data has arrived.
    pub fn earliest_date(&self) -> NaiveDate {
        self.first_date.unwrap_or(self.from_date)
    }

    pub fn latest_date(&self) -> NaiveDate {
        self.last_date.unwrap_or(self.to_date)
    }

    /// Furthest date recurring/forecast expansion may reach: the later of
    /// the last known record date and the display end.
    pub fn horizon(&self) -> NaiveDate {
        self.latest_date().max(self.to_date)
    }

    // --- ranged views and totals ---------------------------------------

    fn records_of(&self, kind: RecordKind) -> &[FinancialRecord] {
        match kind {
            RecordKind::Invoice => &self.invoices,
            RecordKind::Expense => &self.expenses,
            RecordKind::Bill => &self.bills,
        }
    }

    /// Records of the given kind whose effective date falls inside the
    /// display window.
    pub fn ranged_records(&self, kind: RecordKind) -> Vec<&FinancialRecord> {
        self.records_of(kind)
            .iter()
            .filter(|r| {
                r.effective_date()
                    .map(|d| self.from_date <= d && d <= self.to_date)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Sum of converted amounts over the ranged records passing the filter,
    /// rounded to cents for the summary labels.
    pub fn filtered_total(&self, kind: RecordKind, filter: &TotalsFilter) -> f64 {
        let sum: f64 = self
            .ranged_records(kind)
            .into_iter()
            .filter(|r| filter.accepts(r))
            .map(|r| r.converted_or_native())
            .sum();
        (sum * 100.0).round() / 100.0
    }
}
