//! Bucketing of sorted messages by calendar day.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::sort::TimedMessage;
use super::timestamp::day_key;

/// All messages of one local calendar day, in display order.
#[derive(Clone, Debug)]
pub struct DayBucket<'a> {
    pub date: NaiveDate,
    pub messages: Vec<TimedMessage<'a>>,
}

impl DayBucket<'_> {
    pub fn key(&self) -> String {
        day_key(self.date)
    }
}

/// Split sorted messages into day buckets, oldest day first.
///
/// The order inside a bucket is the order of `sorted`.
pub fn group_by_day(sorted: Vec<TimedMessage<'_>>) -> Vec<DayBucket<'_>> {
    let mut days: BTreeMap<NaiveDate, Vec<TimedMessage<'_>>> = BTreeMap::new();
    for timed in sorted {
        days.entry(timed.at.date()).or_default().push(timed);
    }

    days.into_iter()
        .map(|(date, messages)| DayBucket { date, messages })
        .collect()
}
