//! Day separator labels ("Hoy", "Ayer", "14 de marzo de 2024").

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// Language used for separator labels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

const MONTHS_ES: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio",
    "julio", "agosto", "septiembre", "octubre", "noviembre", "diciembre",
];

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

impl Locale {
    fn today(self) -> &'static str {
        match self {
            Locale::Es => "Hoy",
            Locale::En => "Today",
        }
    }

    fn yesterday(self) -> &'static str {
        match self {
            Locale::Es => "Ayer",
            Locale::En => "Yesterday",
        }
    }

    /// Long form "day month year".
    pub fn long_date(self, date: NaiveDate) -> String {
        let month = date.month0() as usize;
        match self {
            Locale::Es => format!("{} de {} de {}", date.day(), MONTHS_ES[month], date.year()),
            Locale::En => format!("{} {} {}", date.day(), MONTHS_EN[month], date.year()),
        }
    }
}

/// Label for the separator of `date`, relative to the clock's current day.
///
/// Only calendar days are compared; the time of day plays no part.
pub fn separator_label(date: NaiveDate, clock: &dyn Clock, locale: Locale) -> String {
    let today = clock.today();
    if date == today {
        locale.today().to_string()
    } else if today.pred_opt() == Some(date) {
        locale.yesterday().to_string()
    } else {
        locale.long_date(date)
    }
}
