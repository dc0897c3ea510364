//! Turns dated records into chart-ready series.
//!
//! Every function here is pure: each call works on its own input and
//! returns its own output, so re-rendering simply calls again.

use crate::errors::ValidationError;
use crate::models::{
    BalanceDay, CategoryTotal, DatedRecord, Granularity, RunningBalanceSeries, Series, UpperBound,
};
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};

/// Key that collapsed categories are reported under.
pub const OTHERS: &str = "Others";

/// Longest series [`bucket`] will build, about a century of days.
pub const MAX_PERIODS: usize = 36_600;

/// Same-day nets this small relative to the day's turnover count as zero.
const NET_TOLERANCE: f64 = 1e-9;

/// First day of the period containing `date`.
pub fn period_start(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Month => {
            NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
        }
    }
}

fn next_period(start: NaiveDate, granularity: Granularity) -> Option<NaiveDate> {
    match granularity {
        Granularity::Day => start.succ_opt(),
        Granularity::Month => start.checked_add_months(Months::new(1)),
    }
}

/// Number of periods from `first` to `last`, both period starts, inclusive.
fn period_count(first: NaiveDate, last: NaiveDate, granularity: Granularity) -> usize {
    let span = match granularity {
        Granularity::Day => (last - first).num_days(),
        Granularity::Month => {
            let years = i64::from(last.year() - first.year());
            years * 12 + i64::from(last.month()) - i64::from(first.month())
        }
    };
    usize::try_from(span + 1).unwrap_or(0)
}

/// Sums records into one bucket per period, from the earliest record's
/// period up to `upper`, with empty periods as zero.
///
/// Input order does not matter. A `Through` bound earlier than the last
/// record is pushed out to that record's period so nothing is dropped.
/// Ranges longer than [`MAX_PERIODS`] are refused before anything is
/// allocated.
pub fn bucket(
    records: &[DatedRecord],
    granularity: Granularity,
    upper: UpperBound,
) -> Result<Series, ValidationError> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(|record| record.timestamp());

    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return Ok(Series::default());
    };

    let last_period = period_start(last.day(), granularity);
    let end = match upper {
        UpperBound::Through(date) => period_start(date, granularity).max(last_period),
        UpperBound::LastRecord => last_period,
    };
    let mut current = period_start(first.day(), granularity);

    let periods = period_count(current, end, granularity);
    if periods > MAX_PERIODS {
        return Err(ValidationError::TooManyPeriods {
            periods,
            limit: MAX_PERIODS,
        });
    }

    let mut series = Series {
        labels: Vec::with_capacity(periods),
        values: Vec::with_capacity(periods),
    };
    let mut pending = sorted.iter().peekable();
    loop {
        let next = next_period(current, granularity);
        let mut sum = 0.0;
        while let Some(record) = pending.next_if(|record| match next {
            Some(next) => record.day() < next,
            None => true,
        }) {
            sum += record.amount();
        }
        series.labels.push(current);
        series.values.push(sum);

        match next {
            Some(next) if next <= end => current = next,
            _ => break,
        }
    }
    Ok(series)
}

/// The latest record's amount in each of `labels`' periods, `None` where a
/// period has no record.
///
/// For level readings such as a daily allowance, where adding two rows of
/// the same day would be meaningless. Of records with the same timestamp
/// the later one in the input wins.
pub fn sample_last(
    records: &[DatedRecord],
    granularity: Granularity,
    labels: &[NaiveDate],
) -> Vec<Option<f64>> {
    let mut latest: BTreeMap<NaiveDate, (DateTime<Utc>, f64)> = BTreeMap::new();
    for record in records {
        let period = period_start(record.day(), granularity);
        let sample = (record.timestamp(), record.amount());
        latest
            .entry(period)
            .and_modify(|kept| {
                if sample.0 >= kept.0 {
                    *kept = sample;
                }
            })
            .or_insert(sample);
    }
    labels
        .iter()
        .map(|label| latest.get(label).map(|(_, amount)| *amount))
        .collect()
}

/// Trailing mean over `count` values.
pub fn moving_average(
    values: &[f64],
    count: usize,
) -> Result<Vec<Option<f64>>, ValidationError> {
    moving_average_by(values, count, |_| true)
}

/// Trailing mean over `count` values, averaging only those accepted by
/// `qualifier`.
///
/// The output has the input's length. The first `count - 1` entries have
/// no full window and are `None`, as is any window with no qualifying value.
pub fn moving_average_by<F>(
    values: &[f64],
    count: usize,
    qualifier: F,
) -> Result<Vec<Option<f64>>, ValidationError>
where
    F: Fn(f64) -> bool,
{
    if count == 0 {
        return Err(ValidationError::EmptyWindow);
    }

    let averages = (0..values.len())
        .map(|i| {
            if i + 1 < count {
                return None;
            }
            let (sum, used) = values[i + 1 - count..=i]
                .iter()
                .copied()
                .filter(|value| qualifier(*value))
                .fold((0.0, 0usize), |(sum, used), value| (sum + value, used + 1));
            (used > 0).then(|| sum / used as f64)
        })
        .collect();
    Ok(averages)
}

/// Rebuilds daily balances backward from `final_balance`.
///
/// Same-day transactions are netted. Days whose net is zero, up to float
/// rounding against the day's turnover, leave the balance flat and are
/// not reported.
pub fn running_balance(final_balance: f64, transactions: &[DatedRecord]) -> RunningBalanceSeries {
    // day -> (net, turnover)
    let mut daily: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for transaction in transactions {
        let (net, turnover) = daily.entry(transaction.day()).or_default();
        *net += transaction.amount();
        *turnover += transaction.amount().abs();
    }

    let mut balance = final_balance;
    let mut days = Vec::with_capacity(daily.len());
    for (&day, &(delta, turnover)) in daily.iter().rev() {
        if delta.abs() <= turnover * NET_TOLERANCE {
            continue;
        }
        days.push(BalanceDay {
            day,
            opening: balance - delta,
            closing: balance,
        });
        balance -= delta;
    }
    days.reverse();

    RunningBalanceSeries {
        days,
        earliest_balance: balance,
        final_balance,
    }
}

/// Sums amounts per key, keeping keys in first-seen order.
pub fn accumulate_categories<I, K>(pairs: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = (K, f64)>,
    K: Into<String>,
{
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (key, amount) in pairs {
        let key = key.into();
        match positions.get(&key) {
            Some(&position) => totals[position].total += amount,
            None => {
                positions.insert(key.clone(), totals.len());
                totals.push(CategoryTotal { key, total: amount });
            }
        }
    }
    totals
}

/// Largest `n` categories first, the rest summed into [`OTHERS`].
///
/// Ties keep their input order. Nothing is added when there is nothing
/// to collapse.
pub fn top_categories(mut totals: Vec<CategoryTotal>, n: usize) -> Vec<CategoryTotal> {
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    if totals.len() <= n {
        return totals;
    }

    let collapsed: f64 = totals.drain(n..).map(|category| category.total).sum();
    match totals.iter_mut().find(|category| category.key == OTHERS) {
        Some(others) => others.total += collapsed,
        None => totals.push(CategoryTotal {
            key: OTHERS.to_string(),
            total: collapsed,
        }),
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(y: i32, m: u32, d: u32, amount: f64) -> DatedRecord {
        let at = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        DatedRecord::new(0, at, amount).unwrap()
    }

    fn record_at(y: i32, m: u32, d: u32, hour: u32, amount: f64) -> DatedRecord {
        let at = Utc.with_ymd_and_hms(y, m, d, hour, 0, 0).unwrap();
        DatedRecord::new(0, at, amount).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bucket_empty_input_is_empty_series() {
        let upper = UpperBound::Through(date(2021, 1, 1));
        let series = bucket(&[], Granularity::Month, upper).unwrap();
        assert!(series.is_empty());
        assert!(series.values.is_empty());
    }

    #[test]
    fn bucket_monthly_fills_gaps_up_to_today() {
        let records = vec![
            record(2020, 11, 3, 100.0),
            record(2020, 11, 28, 50.0),
            record(2021, 1, 15, 25.0),
        ];
        let upper = UpperBound::Through(date(2021, 3, 9));
        let series = bucket(&records, Granularity::Month, upper).unwrap();
        assert_eq!(
            series.labels,
            vec![
                date(2020, 11, 1),
                date(2020, 12, 1),
                date(2021, 1, 1),
                date(2021, 2, 1),
                date(2021, 3, 1),
            ]
        );
        assert_eq!(series.values, vec![150.0, 0.0, 25.0, 0.0, 0.0]);
    }

    #[test]
    fn bucket_tolerates_descending_input() {
        let records = vec![
            record(2021, 1, 3, 1.0),
            record(2020, 12, 30, 2.0),
            record(2020, 12, 30, 3.0),
        ];
        let series = bucket(&records, Granularity::Day, UpperBound::LastRecord).unwrap();
        assert_eq!(
            series.labels,
            vec![
                date(2020, 12, 30),
                date(2020, 12, 31),
                date(2021, 1, 1),
                date(2021, 1, 2),
                date(2021, 1, 3),
            ]
        );
        assert_eq!(series.values, vec![5.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn bucket_labels_are_consecutive_and_amounts_conserved() {
        let records = vec![
            record(2019, 12, 31, 10.0),
            record(2020, 2, 29, 7.5),
            record(2020, 2, 1, 2.5),
            record(2020, 7, 4, 30.0),
        ];
        for granularity in [Granularity::Day, Granularity::Month] {
            let upper = UpperBound::Through(date(2020, 8, 2));
            let series = bucket(&records, granularity, upper).unwrap();
            assert_eq!(series.labels.len(), series.values.len());
            for pair in series.labels.windows(2) {
                assert_eq!(next_period(pair[0], granularity), Some(pair[1]));
            }
            assert_eq!(series.total(), 50.0);
        }
    }

    #[test]
    fn bucket_extends_bound_to_keep_late_records() {
        let records = vec![record(2021, 1, 1, 1.0), record(2021, 4, 1, 2.0)];
        let upper = UpperBound::Through(date(2021, 2, 1));
        let series = bucket(&records, Granularity::Month, upper).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.total(), 3.0);
    }

    #[test]
    fn bucket_is_repeatable() {
        let records = vec![record(2020, 1, 5, 3.0), record(2020, 3, 5, 4.0)];
        let first = bucket(&records, Granularity::Month, UpperBound::LastRecord).unwrap();
        let second = bucket(&records, Granularity::Month, UpperBound::LastRecord).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn bucket_refuses_ranges_over_the_period_limit() {
        let records = vec![record(1950, 1, 1, 1.0), record(2100, 1, 1, 1.0)];
        let err = bucket(&records, Granularity::Day, UpperBound::LastRecord).unwrap_err();
        match err {
            ValidationError::TooManyPeriods { periods, limit } => {
                assert_eq!(limit, MAX_PERIODS);
                assert!(periods > MAX_PERIODS);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The same span by month is well inside the limit.
        let monthly = bucket(&records, Granularity::Month, UpperBound::LastRecord).unwrap();
        assert_eq!(monthly.len(), 150 * 12 + 1);
    }

    #[test]
    fn bucket_counts_the_bound_against_the_limit() {
        let records = vec![record(2000, 1, 1, 1.0)];
        let upper = UpperBound::Through(date(2199, 12, 31));
        assert!(bucket(&records, Granularity::Day, upper).is_err());
    }

    #[test]
    fn period_count_is_inclusive() {
        assert_eq!(period_count(date(2021, 1, 1), date(2021, 1, 1), Granularity::Day), 1);
        assert_eq!(period_count(date(2020, 2, 1), date(2020, 3, 1), Granularity::Day), 30);
        assert_eq!(period_count(date(2020, 11, 1), date(2021, 2, 1), Granularity::Month), 4);
    }

    #[test]
    fn sample_last_keeps_latest_reading_and_leaves_gaps() {
        let records = vec![
            record_at(2021, 1, 1, 9, 100.0),
            record_at(2021, 1, 1, 18, 95.0),
            record_at(2021, 1, 4, 12, 90.0),
        ];
        let labels = [date(2021, 1, 1), date(2021, 1, 2), date(2021, 1, 3), date(2021, 1, 4)];
        let sampled = sample_last(&records, Granularity::Day, &labels);
        assert_eq!(sampled, vec![Some(95.0), None, None, Some(90.0)]);
    }

    #[test]
    fn sample_last_ties_go_to_the_later_input() {
        let records = vec![record(2021, 1, 1, 0.5), record(2021, 1, 1, 0.4)];
        let sampled = sample_last(&records, Granularity::Day, &[date(2021, 1, 1)]);
        assert_eq!(sampled, vec![Some(0.4)]);
    }

    #[test]
    fn moving_average_pads_missing_history() {
        let averages = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(averages, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn moving_average_is_trailing_mean() {
        let averages = moving_average(&[10.0, 20.0, 30.0], 2).unwrap();
        assert_eq!(averages, vec![None, Some(15.0), Some(25.0)]);
        assert_eq!(averages, moving_average(&[10.0, 20.0, 30.0], 2).unwrap());
    }

    #[test]
    fn moving_average_window_larger_than_input() {
        let averages = moving_average(&[1.0, 2.0], 30).unwrap();
        assert_eq!(averages, vec![None, None]);
    }

    #[test]
    fn moving_average_rejects_empty_window() {
        assert_eq!(moving_average(&[1.0], 0), Err(ValidationError::EmptyWindow));
    }

    #[test]
    fn moving_average_by_skips_unqualified_values() {
        let values = [0.0, 4.0, 0.0, 0.0, 8.0];
        let averages = moving_average_by(&values, 2, |value| value > 0.0).unwrap();
        assert_eq!(averages, vec![None, Some(4.0), Some(4.0), None, Some(8.0)]);
    }

    #[test]
    fn running_balance_conserves_final_balance() {
        let transactions = vec![record(2021, 1, 2, 5.0), record(2021, 1, 1, -10.0)];
        let balances = running_balance(100.0, &transactions);
        assert_eq!(balances.days.len(), 2);
        assert_eq!(balances.days[0].day, date(2021, 1, 1));
        assert_eq!(balances.days[0].opening, 105.0);
        assert_eq!(balances.days[0].closing, 95.0);
        assert_eq!(balances.days[1].opening, 95.0);
        assert_eq!(balances.days[1].closing, 100.0);
        let deltas: f64 = balances.days.iter().map(BalanceDay::delta).sum();
        assert_eq!(balances.earliest_balance + deltas, 100.0);
    }

    #[test]
    fn running_balance_nets_days_and_skips_flat_ones() {
        let transactions = vec![
            record(2021, 1, 1, -10.0),
            record(2021, 1, 1, 4.0),
            record(2021, 1, 3, 6.0),
            record(2021, 1, 3, -6.0),
        ];
        let balances = running_balance(20.0, &transactions);
        assert_eq!(balances.days.len(), 1);
        assert_eq!(balances.days[0].delta(), -6.0);
        assert_eq!(balances.earliest_balance, 26.0);
        assert_eq!(balances.final_balance, 20.0);
    }

    #[test]
    fn running_balance_treats_rounding_residue_as_flat() {
        // 0.1 + 0.2 - 0.3 leaves about 5.5e-17 in f64.
        let transactions = vec![
            record(2021, 1, 5, 0.1),
            record(2021, 1, 5, 0.2),
            record(2021, 1, 5, -0.3),
            record(2021, 1, 6, 1.0),
        ];
        let balances = running_balance(10.0, &transactions);
        assert_eq!(balances.days.len(), 1);
        assert_eq!(balances.days[0].day, date(2021, 1, 6));
        assert_eq!(balances.earliest_balance, 9.0);
    }

    #[test]
    fn running_balance_keeps_small_genuine_moves() {
        let transactions = vec![record(2021, 1, 5, 0.001)];
        let balances = running_balance(1.0, &transactions);
        assert_eq!(balances.days.len(), 1);
    }

    #[test]
    fn running_balance_without_transactions() {
        let balances = running_balance(42.0, &[]);
        assert!(balances.days.is_empty());
        assert_eq!(balances.earliest_balance, 42.0);
    }

    #[test]
    fn accumulate_categories_sums_in_first_seen_order() {
        let totals = accumulate_categories([("b", 1.0), ("a", 2.0), ("b", 3.0), ("c", 0.5)]);
        let keys: Vec<&str> = totals.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(totals[0].total, 4.0);
    }

    #[test]
    fn accumulate_categories_handles_many_keys() {
        let pairs = (0..20_000).map(|i| (format!("K{}", i % 5_000), 1.0));
        let totals = accumulate_categories(pairs);
        assert_eq!(totals.len(), 5_000);
        assert!(totals.iter().all(|c| c.total == 4.0));
        assert_eq!(totals[0].key, "K0");
        assert_eq!(totals[4_999].key, "K4999");
    }

    #[test]
    fn top_categories_collapses_into_others() {
        let totals = accumulate_categories(
            ["a", "b", "c", "d", "e", "f", "g"]
                .into_iter()
                .zip([50.0, 40.0, 30.0, 20.0, 10.0, 5.0, 1.0]),
        );
        let top = top_categories(totals, 5);
        let keys: Vec<&str> = top.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c", "d", "e", OTHERS]);
        assert_eq!(top[5].total, 6.0);
    }

    #[test]
    fn top_categories_leaves_small_sets_alone() {
        let totals = accumulate_categories([("x", 3.0), ("y", 2.0), ("z", 1.0)]);
        let top = top_categories(totals.clone(), 5);
        assert_eq!(top, totals);
        assert!(top.iter().all(|c| c.key != OTHERS));
    }

    #[test]
    fn top_categories_ties_keep_input_order() {
        let totals =
            accumulate_categories([("late", 1.0), ("early", 1.0), ("late", 1.0), ("mid", 2.0)]);
        let top = top_categories(totals, 2);
        let keys: Vec<&str> = top.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["late", "mid", OTHERS]);
        assert_eq!(top[2].total, 1.0);
    }

    #[test]
    fn top_categories_folds_into_existing_others() {
        let totals = accumulate_categories([(OTHERS, 9.0), ("a", 8.0), ("b", 1.0)]);
        let top = top_categories(totals, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(
            top[0],
            CategoryTotal {
                key: OTHERS.to_string(),
                total: 10.0
            }
        );
    }
}
