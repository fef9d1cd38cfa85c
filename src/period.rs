use crate::aggregate::{TimelinePoint, ValueBounds};
use crate::utils::{add_days, first_day_of_month, month_span_end};
use chrono::NaiveDate;

/// One calendar month of the projection. `balance` is the net of the
/// period's events; `cash_flow` is the running cumulative balance through
/// this period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub balance: f64,
    pub cash_flow: f64,
}

#[derive(Debug, Clone)]
pub struct BucketizeOutput {
    pub periods: Vec<Period>,
    pub bounds: ValueBounds,
}

/// Partitions the aggregated timeline into consecutive calendar-month
/// periods and computes per-period net balance plus the cumulative
/// cash-flow prefix sum.
///
/// Coverage runs from `min(earliest, display_from)` truncated to the first
/// of its month through `max(latest, display_to)` inclusive; periods are
/// chronological, contiguous, and non-overlapping. Bounds are restricted to
/// periods whose span falls entirely within the display window.
pub fn bucketize(
    income: &[TimelinePoint],
    expense: &[TimelinePoint],
    display_from: NaiveDate,
    display_to: NaiveDate,
    earliest: NaiveDate,
    latest: NaiveDate,
) -> BucketizeOutput {
    let start = earliest.min(display_from);
    let limit = latest.max(display_to);

    let mut periods = Vec::new();
    let mut date = first_day_of_month(start);
    loop {
        let period = Period {
            start_date: date,
            end_date: month_span_end(date),
            balance: 0.0,
            cash_flow: 0.0,
        };
        let done = limit <= period.start_date || period.end_date >= limit;
        periods.push(period);
        if done {
            break;
        }
        date = add_days(period.end_date, 1);
    }

    let mut running = 0.0;
    for period in periods.iter_mut() {
        let incoming: f64 = amounts_within(income, period.start_date, period.end_date);
        let outgoing: f64 = amounts_within(expense, period.start_date, period.end_date);
        period.balance = incoming - outgoing;
        running += period.balance;
        period.cash_flow = running;
    }

    let mut bounds = ValueBounds::new();
    for period in &periods {
        if display_from <= period.start_date && period.end_date <= display_to {
            bounds.observe(period.balance);
            bounds.observe(period.cash_flow);
        }
    }

    BucketizeOutput { periods, bounds }
}

/// Plotted cash-flow curve: one point per period, placed mid-month.
pub fn cash_flow_series(periods: &[Period]) -> Vec<(NaiveDate, f64)> {
    periods
        .iter()
        .map(|p| (add_days(p.start_date, 14), p.cash_flow))
        .collect()
}

fn amounts_within(points: &[TimelinePoint], start: NaiveDate, end: NaiveDate) -> f64 {
    points
        .iter()
        .filter(|p| start <= p.date && p.date <= end)
        .map(|p| p.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(on: NaiveDate, amount: f64, is_income: bool) -> TimelinePoint {
        TimelinePoint {
            date: on,
            amount,
            is_income,
            is_recurrent: false,
        }
    }

    #[test]
    fn test_concrete_three_month_scenario() {
        // monthly balances [100, -50, 20] must yield cash flow [100, 50, 70]
        let income = vec![
            point(date(2024, 1, 10), 100.0, true),
            point(date(2024, 3, 5), 20.0, true),
        ];
        let expense = vec![point(date(2024, 2, 14), 50.0, false)];

        let out = bucketize(
            &income,
            &expense,
            date(2024, 1, 1),
            date(2024, 3, 31),
            date(2024, 1, 10),
            date(2024, 3, 5),
        );

        let balances: Vec<f64> = out.periods.iter().map(|p| p.balance).collect();
        let cash_flows: Vec<f64> = out.periods.iter().map(|p| p.cash_flow).collect();
        assert_eq!(balances, vec![100.0, -50.0, 20.0]);
        assert_eq!(cash_flows, vec![100.0, 50.0, 70.0]);
    }

    #[test]
    fn test_prefix_sum_law() {
        let income = vec![
            point(date(2024, 1, 2), 10.0, true),
            point(date(2024, 2, 2), 30.0, true),
            point(date(2024, 4, 2), 5.0, true),
        ];
        let expense = vec![point(date(2024, 3, 2), 45.0, false)];
        let out = bucketize(
            &income,
            &expense,
            date(2024, 1, 1),
            date(2024, 4, 30),
            date(2024, 1, 2),
            date(2024, 4, 2),
        );

        assert_eq!(out.periods[0].cash_flow, out.periods[0].balance);
        for window in out.periods.windows(2) {
            let expected = window[0].cash_flow + window[1].balance;
            assert!((window[1].cash_flow - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_coverage_is_contiguous_and_total() {
        let income = vec![
            point(date(2023, 11, 30), 1.0, true),
            point(date(2024, 2, 29), 1.0, true),
        ];
        let out = bucketize(
            &income,
            &[],
            date(2024, 1, 1),
            date(2024, 1, 31),
            date(2023, 11, 30),
            date(2024, 2, 29),
        );

        assert_eq!(out.periods.first().unwrap().start_date, date(2023, 11, 1));
        assert!(out.periods.last().unwrap().end_date >= date(2024, 2, 29));
        for window in out.periods.windows(2) {
            assert_eq!(add_days(window[0].end_date, 1), window[1].start_date);
        }

        // every point falls in exactly one period
        for p in &income {
            let covering = out
                .periods
                .iter()
                .filter(|period| period.start_date <= p.date && p.date <= period.end_date)
                .count();
            assert_eq!(covering, 1);
        }
    }

    #[test]
    fn test_span_extends_to_display_window() {
        let out = bucketize(
            &[],
            &[],
            date(2024, 1, 1),
            date(2024, 5, 31),
            date(2024, 3, 1),
            date(2024, 3, 31),
        );
        assert_eq!(out.periods.first().unwrap().start_date, date(2024, 1, 1));
        assert!(out.periods.last().unwrap().end_date >= date(2024, 5, 31));
        assert!(out.periods.iter().all(|p| p.balance == 0.0));
    }

    #[test]
    fn test_bounds_restricted_to_window() {
        let income = vec![
            point(date(2024, 1, 10), 100.0, true),
            point(date(2024, 6, 10), 10_000.0, true),
        ];
        let out = bucketize(
            &income,
            &[],
            date(2024, 1, 1),
            date(2024, 2, 29),
            date(2024, 1, 10),
            date(2024, 6, 10),
        );
        assert_eq!(out.bounds.max, 100.0);
    }

    #[test]
    fn test_cash_flow_series_is_mid_month() {
        let income = vec![point(date(2024, 1, 10), 100.0, true)];
        let out = bucketize(
            &income,
            &[],
            date(2024, 1, 1),
            date(2024, 1, 31),
            date(2024, 1, 10),
            date(2024, 1, 10),
        );
        let series = cash_flow_series(&out.periods);
        assert_eq!(series, vec![(date(2024, 1, 15), 100.0)]);
    }
}
