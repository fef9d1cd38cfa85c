use crate::record::RecurrenceFrequency;
use crate::utils::{add_days, add_months};
use chrono::NaiveDate;

/// Hard cap on expanded occurrences. Guards against malformed input whose
/// frequency never advances the date; such input would otherwise recur
/// forever.
pub const MAX_FUTURE_OCCURRENCES: usize = 400;

/// Expands a recurring amount into its occurrence dates, bounded by the
/// horizon and by `max_occurrences`.
///
/// Occurrence `i` falls at `anchor + 7*i` days (weekly) or `anchor + i`
/// months (monthly). Expansion stops after emitting the first occurrence
/// whose date reaches or passes the horizon, so the series always extends to
/// the horizon but never more than one step beyond it.
///
/// A `None` frequency is not expandable; the caller normally treats such a
/// record as a single one-off event, and this function degrades the same
/// way.
pub fn expand(
    anchor: NaiveDate,
    amount: f64,
    frequency: RecurrenceFrequency,
    horizon: NaiveDate,
    max_occurrences: usize,
) -> Vec<(NaiveDate, f64)> {
    let mut occurrences = Vec::new();
    for i in 0..max_occurrences {
        let date = match frequency {
            RecurrenceFrequency::Weeks => add_days(anchor, 7 * i as u64),
            RecurrenceFrequency::Months => add_months(anchor, i as u32),
            RecurrenceFrequency::None => {
                occurrences.push((anchor, amount));
                break;
            }
        };
        occurrences.push((date, amount));
        if date >= horizon {
            break;
        }
    }
    occurrences
}
