//! Builds the chart payloads each dashboard view asks for.

use crate::aggregate::{
    accumulate_categories, bucket, moving_average, running_balance, sample_last, top_categories,
};
use crate::errors::ValidationError;
use crate::models::{
    Account, AccountSummary, BalanceResponse, ChartData, DailyStatsRow, Dataset, DatedRecord,
    Flight, FlightView, Granularity, Series, StatsResponse, Transaction, TravellerChartsResponse,
    Trip, UpperBound, epoch_time, parse_time,
};
use chrono::{DateTime, NaiveDate, Utc};

pub const TRAVELLER_WINDOW: usize = 3;
pub const STATS_WINDOW: usize = 30;
pub const TOP_DESTINATIONS: usize = 5;

/// Model totals are shown per traveller by dividing by the population.
const POPULATION: f64 = 10_000.0;
const TONNES_PER_FLIGHT_HOUR: f64 = 0.25;
const UK_MONTHLY_TONNES: f64 = 13.4 / 12.0;
const GLOBAL_MONTHLY_TONNES: f64 = 5.0 / 12.0;

pub fn account_summary(account: &Account) -> Result<AccountSummary, ValidationError> {
    let status = match account.cleared {
        0 => "GROUNDED",
        1 => "MID-TRIP",
        _ => "CLEARED",
    };
    let clearance_date = match account.clearance_date.trim() {
        "" => None,
        raw => Some(label(parse_time(0, raw)?.date_naive())),
    };
    Ok(AccountSummary {
        status: status.to_string(),
        balance: account.balance.round() as i64,
        in_credit: account.balance > 0.0,
        clearance_date,
    })
}

/// Monthly distance flown and CO2 footprint, up to `today`.
pub fn traveller_charts(
    trips: &[Trip],
    today: NaiveDate,
) -> Result<TravellerChartsResponse, ValidationError> {
    let mut distances = Vec::new();
    let mut footprints = Vec::new();
    for (index, (_, flight)) in flights(trips).enumerate() {
        let (start, end) = flight_times(index, flight)?;
        let hours = (end - start).num_seconds() as f64 / 3600.0;
        distances.push(DatedRecord::new(index, start, flight.distance)?);
        footprints.push(DatedRecord::new(index, start, hours * TONNES_PER_FLIGHT_HOUR)?);
    }

    let upper = UpperBound::Through(today);
    let distance = bucket(&distances, Granularity::Month, upper)?;
    let footprint = bucket(&footprints, Granularity::Month, upper)?;
    let months = footprint.len();
    let distance_average = moving_average(&distance.values, TRAVELLER_WINDOW)?;
    let footprint_average = moving_average(&footprint.values, TRAVELLER_WINDOW)?;

    Ok(TravellerChartsResponse {
        distance: ChartData {
            labels: labels(&distance),
            datasets: vec![dataset("Distance Per Month (km)", distance_average)],
        },
        footprint: ChartData {
            labels: labels(&footprint),
            datasets: vec![
                dataset("You (flights only)", footprint_average),
                dataset("UK Avg (total)", vec![Some(UK_MONTHLY_TONNES); months]),
                dataset("Global Avg (total)", vec![Some(GLOBAL_MONTHLY_TONNES); months]),
            ],
        },
    })
}

/// Model-wide daily statistics and monthly flight counts.
///
/// Distance and flights are totals and add up when a day has several
/// rows. Allowance and share are levels: each day shows its latest row,
/// and days without a row are gaps.
pub fn stats_charts(rows: &[DailyStatsRow]) -> Result<StatsResponse, ValidationError> {
    let mut allowance = Vec::with_capacity(rows.len());
    let mut travelled = Vec::with_capacity(rows.len());
    let mut share = Vec::with_capacity(rows.len());
    let mut flights = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let at = epoch_time(index, row.date)?;
        allowance.push(DatedRecord::new(index, at, row.daily_total)?);
        travelled.push(DatedRecord::new(index, at, row.travelled)?);
        share.push(DatedRecord::new(index, at, row.share)?);
        flights.push(DatedRecord::new(index, at, row.flights)?);
    }

    let travelled = bucket(&travelled, Granularity::Day, UpperBound::LastRecord)?;
    let allowance = sample_last(&allowance, Granularity::Day, &travelled.labels);
    let share = sample_last(&share, Granularity::Day, &travelled.labels);
    let monthly = bucket(&flights, Granularity::Month, UpperBound::LastRecord)?;
    let per_traveller: Vec<f64> = travelled.values.iter().map(|km| km / POPULATION).collect();
    let travelled_average = moving_average(&travelled.values, STATS_WINDOW)?;
    let per_traveller_average = moving_average(&per_traveller, STATS_WINDOW)?;

    Ok(StatsResponse {
        daily: ChartData {
            labels: labels(&travelled),
            datasets: vec![
                dataset("Daily Allowance", allowance),
                dataset("Distance Travelled", travelled_average),
                dataset("Daily Share", share),
                dataset("Distance Travelled Per Traveller", per_traveller_average),
            ],
        },
        monthly_flights: ChartData {
            labels: labels(&monthly),
            datasets: vec![
                dataset("Flights Per Month", raw(&monthly.values)),
                dataset(
                    "Flights Per Month Per Traveller",
                    monthly.values.iter().map(|count| Some(count / POPULATION)).collect(),
                ),
            ],
        },
    })
}

/// Daily balance ranges walked back from the account's current balance.
pub fn balance_chart(
    account: &Account,
    transactions: &[Transaction],
) -> Result<BalanceResponse, ValidationError> {
    let records = transactions
        .iter()
        .enumerate()
        .map(|(index, transaction)| {
            let at = epoch_time(index, transaction.date)?;
            DatedRecord::new(index, at, transaction.distance)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let balances = running_balance(account.balance, &records);
    Ok(BalanceResponse {
        chart: ChartData {
            labels: balances.days.iter().map(|day| label(day.day)).collect(),
            datasets: vec![
                dataset("Opening", balances.days.iter().map(|day| Some(day.opening)).collect()),
                dataset("Closing", balances.days.iter().map(|day| Some(day.closing)).collect()),
            ],
        },
        earliest_balance: balances.earliest_balance,
        final_balance: balances.final_balance,
    })
}

/// Distance flown per destination airport, largest first.
pub fn destinations_chart(trips: &[Trip]) -> ChartData {
    let distances = flights(trips).map(|(_, flight)| (flight.to.as_str(), flight.distance));
    let totals = accumulate_categories(distances);
    let top = top_categories(totals, TOP_DESTINATIONS);
    ChartData {
        labels: top.iter().map(|category| category.key.clone()).collect(),
        datasets: vec![dataset(
            "Distance (km)",
            top.iter().map(|category| Some(category.total)).collect(),
        )],
    }
}

/// Every flight, newest first.
pub fn flight_history(trips: &[Trip]) -> Result<Vec<FlightView>, ValidationError> {
    let mut history = flights(trips)
        .enumerate()
        .map(|(index, (trip, flight))| {
            let (start, _) = flight_times(index, flight)?;
            let view = FlightView {
                trip_status: trip.trip_status.clone(),
                start: flight.start.clone(),
                end: flight.end.clone(),
                from: flight.from.clone(),
                to: flight.to.clone(),
                distance: flight.distance,
            };
            Ok::<_, ValidationError>((start, view))
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;
    history.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(history.into_iter().map(|(_, view)| view).collect())
}

fn flights(trips: &[Trip]) -> impl Iterator<Item = (&Trip, &Flight)> {
    trips.iter().flat_map(|trip| {
        trip.journeys
            .iter()
            .flat_map(move |journey| journey.flights.iter().map(move |flight| (trip, flight)))
    })
}

fn flight_times(
    index: usize,
    flight: &Flight,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
    Ok((parse_time(index, &flight.start)?, parse_time(index, &flight.end)?))
}

fn label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn labels(series: &Series) -> Vec<String> {
    series.labels.iter().copied().map(label).collect()
}

fn raw(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

fn dataset(label: &str, data: Vec<Option<f64>>) -> Dataset {
    Dataset {
        label: label.to_string(),
        data,
    }
}
