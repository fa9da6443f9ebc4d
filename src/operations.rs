// ------------------------------------------------------------------------------------------------
// --- Operations summary
// ------------------------------------------------------------------------------------------------
//
// A snapshot of the movement sheet as seen on a given day: how many movements run today and
// tomorrow, how many are delayed or still waiting for confirmation, which days carry a high
// load, where the groups go and which vehicles they need, plus the alerts a dispatcher acts on.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use rustc_hash::FxHashMap;
use serde::Serialize;
use strum_macros::Display;

use crate::{
    models::{MovementRecord, TripStatus, VehicleClass},
    parsing::parse_date,
};

/// Days with at least this many movements (today or later) are high-load days.
pub const HIGH_LOAD_ROWS: usize = 5;
/// A day with at least this many movements (today or later) raises a load spike alert.
pub const SPIKE_ROWS: usize = 8;

// ------------------------------------------------------------------------------------------------
// --- Alert
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "alert")]
pub enum Alert {
    /// Movements dated today that are still `Planned`.
    UnconfirmedToday { count: usize },
    /// Movements without a time, a flight or a vehicle class.
    MissingFields { count: usize },
    /// The first day, today or later, with at least [`SPIKE_ROWS`] movements.
    LoadSpike { date: NaiveDate, count: usize },
}

impl Alert {
    pub fn severity(&self) -> AlertSeverity {
        match self {
            Alert::UnconfirmedToday { .. } => AlertSeverity::Error,
            Alert::MissingFields { .. } => AlertSeverity::Warning,
            Alert::LoadSpike { .. } => AlertSeverity::Info,
        }
    }

    /// Dispatcher-facing message, in Arabic.
    pub fn message(&self) -> String {
        match self {
            Alert::UnconfirmedToday { count } => {
                format!("يوجد {count} رحلات اليوم بانتظار التأكيد.")
            }
            Alert::MissingFields { count } => {
                format!("يوجد {count} رحلات تفتقد لبيانات أساسية (وقت، رحلة، سيارة).")
            }
            Alert::LoadSpike { date, count } => {
                format!(
                    "ضغط عمليات مرتفع ({count} رحلة) متوقع يوم {}.",
                    date.format("%Y-%m-%d")
                )
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// --- OperationsSummary
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationsSummary {
    today: NaiveDate,
    today_count: usize,
    tomorrow_count: usize,
    delayed_count: usize,
    awaiting_confirmation_count: usize,
    daily_counts: BTreeMap<NaiveDate, usize>,
    high_load_days: Vec<NaiveDate>,
    cities: Vec<(String, usize)>,
    vehicles: Vec<(VehicleClass, usize)>,
    alerts: Vec<Alert>,
}

impl OperationsSummary {
    // Getters/Setters

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn today_count(&self) -> usize {
        self.today_count
    }

    pub fn tomorrow_count(&self) -> usize {
        self.tomorrow_count
    }

    pub fn delayed_count(&self) -> usize {
        self.delayed_count
    }

    pub fn awaiting_confirmation_count(&self) -> usize {
        self.awaiting_confirmation_count
    }

    pub fn daily_counts(&self) -> &BTreeMap<NaiveDate, usize> {
        &self.daily_counts
    }

    pub fn high_load_days(&self) -> &Vec<NaiveDate> {
        &self.high_load_days
    }

    /// Destination cities, busiest first.
    pub fn cities(&self) -> &Vec<(String, usize)> {
        &self.cities
    }

    /// Vehicle classes, most requested first.
    pub fn vehicles(&self) -> &Vec<(VehicleClass, usize)> {
        &self.vehicles
    }

    pub fn alerts(&self) -> &Vec<Alert> {
        &self.alerts
    }

    // Functions

    /// Movements per day for `days` consecutive days starting today, empty days included.
    pub fn upcoming_load(&self, days: u64) -> Vec<(NaiveDate, usize)> {
        (0..days)
            .filter_map(|offset| self.today.checked_add_days(Days::new(offset)))
            .map(|date| (date, self.daily_counts.get(&date).copied().unwrap_or(0)))
            .collect()
    }
}

/// Counts `(key, occurrences)` in first-seen order, then sorts busiest first. Ties keep the
/// first-seen order.
fn distribution<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Clone + Eq + std::hash::Hash,
    I: Iterator<Item = K>,
{
    let mut index: FxHashMap<K, usize> = FxHashMap::default();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Builds the operations summary of `records` as seen on `today`.
///
/// Record dates are read in either canonical format. Rows whose date is empty or not a
/// calendar date take no part in the per-day counts.
pub fn summarize(records: &[MovementRecord], today: NaiveDate) -> OperationsSummary {
    let tomorrow = today.checked_add_days(Days::new(1));
    let dated = records
        .iter()
        .map(|record| (record, parse_date(record.date())))
        .collect::<Vec<_>>();

    let daily_counts = dated
        .iter()
        .filter_map(|(_, date)| *date)
        .fold(BTreeMap::new(), |mut acc, date| {
            *acc.entry(date).or_insert(0) += 1;
            acc
        });
    let high_load_days = daily_counts
        .iter()
        .filter(|&(date, &count)| *date >= today && count >= HIGH_LOAD_ROWS)
        .map(|(date, _)| *date)
        .collect::<Vec<_>>();

    let today_count = daily_counts.get(&today).copied().unwrap_or(0);
    let tomorrow_count = tomorrow
        .and_then(|date| daily_counts.get(&date).copied())
        .unwrap_or(0);
    let delayed_count = records
        .iter()
        .filter(|record| record.status() == TripStatus::Delayed)
        .count();
    let awaiting_confirmation_count = records
        .iter()
        .filter(|record| record.status() == TripStatus::Planned)
        .count();

    let cities = distribution(
        records
            .iter()
            .map(|record| record.to().trim())
            .filter(|city| !city.is_empty())
            .map(String::from),
    );
    let vehicles = distribution(records.iter().filter_map(|record| record.vehicle_class()));

    let mut alerts = Vec::new();
    let unconfirmed_today = dated
        .iter()
        .filter(|(record, date)| *date == Some(today) && record.status() == TripStatus::Planned)
        .count();
    if unconfirmed_today > 0 {
        alerts.push(Alert::UnconfirmedToday {
            count: unconfirmed_today,
        });
    }
    let missing_fields = records
        .iter()
        .filter(|record| {
            record.time().is_empty()
                || record.flight().is_empty()
                || record.vehicle_class().is_none()
        })
        .count();
    if missing_fields > 0 {
        alerts.push(Alert::MissingFields {
            count: missing_fields,
        });
    }
    if let Some((&date, &count)) = daily_counts
        .range(today..)
        .find(|&(_, &count)| count >= SPIKE_ROWS)
    {
        alerts.push(Alert::LoadSpike { date, count });
    }

    log::info!(
        "Summarized {} record(s): {} today, {} alert(s).",
        records.len(),
        today_count,
        alerts.len()
    );

    OperationsSummary {
        today,
        today_count,
        tomorrow_count,
        delayed_count,
        awaiting_confirmation_count,
        daily_counts,
        high_load_days,
        cities,
        vehicles,
        alerts,
    }
}
