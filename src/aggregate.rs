use crate::record::{FinancialRecord, ForecastEntry, RecurrenceFrequency};
use crate::recurrence::{expand, MAX_FUTURE_OCCURRENCES};
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

/// One plotted event on the timeline. Transient: rebuilt on every
/// aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub amount: f64,
    pub is_income: bool,
    pub is_recurrent: bool,
}

/// Running minimum/maximum observed within the displayed date window, used
/// downstream for axis scaling. Derived output, reset per pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueBounds {
    pub min: f64,
    pub max: f64,
}

impl ValueBounds {
    pub fn new() -> Self {
        Self { min: 0.0, max: 0.0 }
    }

    pub fn observe(&mut self, value: f64) {
        if value > self.max {
            self.max = value;
        } else if value < self.min {
            self.min = value;
        }
    }

    pub fn merge(&mut self, other: ValueBounds) {
        self.observe(other.max);
        self.observe(other.min);
    }
}

impl Default for ValueBounds {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only snapshot the aggregation pass runs over. All records must have
/// their converted amounts attached before reaching this point.
#[derive(Debug, Clone, Copy)]
pub struct AggregationInput<'a> {
    pub invoices: &'a [FinancialRecord],
    pub expenses: &'a [FinancialRecord],
    pub bills: &'a [FinancialRecord],
    pub forecasts: &'a [ForecastEntry],
    pub forecasting_enabled: bool,
    /// Earliest known record date; forecasts dated before it are ignored.
    pub earliest: NaiveDate,
    /// Furthest date recurring/forecast expansion may reach.
    pub horizon: NaiveDate,
    pub display_from: NaiveDate,
    pub display_to: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct SeriesBundle {
    pub income: Vec<TimelinePoint>,
    pub expense: Vec<TimelinePoint>,
    pub bounds: ValueBounds,
}

/// Merges one-off and expanded-recurring events into two date-sorted point
/// lists, one per direction. Events sharing a date within a direction are
/// combined into a single point; income and expense never combine, even on
/// the same date. Records without a usable date are dropped.
pub fn aggregate(input: &AggregationInput) -> SeriesBundle {
    let mut income: BTreeMap<NaiveDate, TimelinePoint> = BTreeMap::new();
    let mut expense: BTreeMap<NaiveDate, TimelinePoint> = BTreeMap::new();

    collect_records(input.invoices, input.horizon, true, &mut income);
    collect_records(input.expenses, input.horizon, false, &mut expense);
    collect_records(input.bills, input.horizon, false, &mut expense);

    if input.forecasting_enabled {
        collect_forecasts(input, true, &mut income);
        collect_forecasts(input, false, &mut expense);
    }

    let mut income: Vec<TimelinePoint> = income.into_values().collect();
    let mut expense: Vec<TimelinePoint> = expense.into_values().collect();

    let mut bounds = ValueBounds::new();
    for point in income.iter().chain(expense.iter()) {
        if input.display_from <= point.date && point.date <= input.display_to {
            bounds.observe(point.amount);
        }
    }

    // Zero sentinels extend each plotted series to the horizon without
    // implying growth past the last real event.
    if input.forecasting_enabled {
        append_sentinels(&mut income, true, input.earliest, input.horizon);
        append_sentinels(&mut expense, false, input.earliest, input.horizon);
    }

    SeriesBundle {
        income,
        expense,
        bounds,
    }
}

fn collect_records(
    records: &[FinancialRecord],
    horizon: NaiveDate,
    is_income: bool,
    points: &mut BTreeMap<NaiveDate, TimelinePoint>,
) {
    for record in records {
        let Some(date) = record.effective_date() else {
            debug!("dropping {:?} record '{}': no usable date", record.kind, record.id);
            continue;
        };
        let amount = record.converted_or_native();

        if record.is_recurrent && record.frequency != RecurrenceFrequency::None {
            for (occurrence, occurrence_amount) in
                expand(date, amount, record.frequency, horizon, MAX_FUTURE_OCCURRENCES)
            {
                merge_point(points, occurrence, occurrence_amount, is_income, true);
            }
        } else {
            merge_point(points, date, amount, is_income, record.is_recurrent);
        }
    }
}

fn collect_forecasts(
    input: &AggregationInput,
    is_income: bool,
    points: &mut BTreeMap<NaiveDate, TimelinePoint>,
) {
    for forecast in input.forecasts {
        if forecast.is_income != is_income {
            continue;
        }
        let Some(date) = forecast.date else { continue };
        if date < input.earliest {
            continue;
        }

        if forecast.is_recurrent {
            // recurring forecasts are implicitly monthly
            for (occurrence, amount) in expand(
                date,
                forecast.amount,
                RecurrenceFrequency::Months,
                input.horizon,
                MAX_FUTURE_OCCURRENCES,
            ) {
                merge_point(points, occurrence, amount, is_income, true);
            }
        } else {
            merge_point(points, date, forecast.amount, is_income, false);
        }
    }
}

fn merge_point(
    points: &mut BTreeMap<NaiveDate, TimelinePoint>,
    date: NaiveDate,
    amount: f64,
    is_income: bool,
    is_recurrent: bool,
) {
    points
        .entry(date)
        .and_modify(|point| point.amount += amount)
        .or_insert(TimelinePoint {
            date,
            amount,
            is_income,
            is_recurrent,
        });
}

fn append_sentinels(
    points: &mut Vec<TimelinePoint>,
    is_income: bool,
    earliest: NaiveDate,
    horizon: NaiveDate,
) {
    let date_after_last = points
        .iter()
        .map(|p| p.date)
        .max()
        .unwrap_or(earliest);
    for date in [date_after_last, horizon] {
        points.push(TimelinePoint {
            date,
            amount: 0.0,
            is_income,
            is_recurrent: false,
        });
    }
}
