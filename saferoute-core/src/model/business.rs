//! Business records and weekly opening hours

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::rescoring::DepartureTime;

/// Day of week and time of day, days counted from 0 = Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekTime {
    pub day: u8,
    #[serde(default)]
    pub hour: u8,
    #[serde(default)]
    pub minute: u8,
}

impl WeekTime {
    pub fn new(day: u8, hour: u8, minute: u8) -> Self {
        Self { day, hour, minute }
    }

    pub fn minute_of_day(self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    fn validate(self) -> Result<(), Error> {
        // 24:00 is a valid closing time
        let valid = self.day <= 6
            && self.minute <= 59
            && (self.hour <= 23 || (self.hour == 24 && self.minute == 0));
        if valid {
            Ok(())
        } else {
            Err(Error::InvalidData(format!(
                "invalid week time day={} {:02}:{:02}",
                self.day, self.hour, self.minute
            )))
        }
    }
}

/// One weekly open window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningPeriod {
    pub open: WeekTime,
    /// Listing providers omit the close of a place that never closes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<WeekTime>,
}

impl OpeningPeriod {
    pub fn new(open: WeekTime, close: WeekTime) -> Self {
        Self {
            open,
            close: Some(close),
        }
    }

    /// A period without a close, i.e. open around the clock
    pub fn open_ended(open: WeekTime) -> Self {
        Self { open, close: None }
    }

    /// Same-day windows are half-open `[open, close)`. A window spanning
    /// days is checked against the opening day (after opening) and the
    /// closing day (before closing) separately. Open-ended periods always
    /// contain `at`.
    pub fn contains(&self, at: DepartureTime) -> bool {
        let Some(close) = self.close else {
            return true;
        };
        let now = at.minute_of_day();
        let open_minute = self.open.minute_of_day();
        let close_minute = close.minute_of_day();

        if self.open.day == close.day {
            self.open.day == at.day() && open_minute <= now && now < close_minute
        } else {
            (at.day() == self.open.day && now >= open_minute)
                || (at.day() == close.day && now < close_minute)
        }
    }
}

/// Weekly schedule; an empty schedule means hours are unknown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpeningHours(pub Vec<OpeningPeriod>);

impl OpeningHours {
    pub fn new(periods: Vec<OpeningPeriod>) -> Self {
        Self(periods)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn periods(&self) -> &[OpeningPeriod] {
        &self.0
    }

    /// Businesses without hours data are treated as open
    pub fn is_open_at(&self, at: DepartureTime) -> bool {
        self.is_empty() || self.0.iter().any(|period| period.contains(at))
    }
}

/// Point of interest whose proximity makes a street feel safer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub hours: OpeningHours,
    #[serde(default)]
    pub review_count: u32,
    /// Open flag reported by the listing provider at fetch time, display only
    #[serde(default)]
    pub open_now: Option<bool>,
}

impl Business {
    pub fn new(lat: f64, lon: f64, name: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            name: name.into(),
            category: None,
            hours: OpeningHours::default(),
            review_count: 0,
            open_now: None,
        }
    }

    #[must_use]
    pub fn with_hours(mut self, hours: OpeningHours) -> Self {
        self.hours = hours;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn location(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    pub fn is_open_at(&self, at: DepartureTime) -> bool {
        self.hours.is_open_at(at)
    }

    /// Checks coordinates and schedule ranges
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidData` describing the first problem found
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat))
            || !(self.lon.is_finite() && (-180.0..=180.0).contains(&self.lon))
        {
            return Err(Error::InvalidData(format!(
                "business '{}' has invalid coordinates ({}, {})",
                self.name, self.lat, self.lon
            )));
        }
        for period in self.hours.periods() {
            period.open.validate()?;
            if let Some(close) = period.close {
                close.validate()?;
            }
        }
        Ok(())
    }
}

/// Keeps businesses that pass validation, logging the rest
pub fn validate_businesses(businesses: Vec<Business>) -> Vec<Business> {
    let total = businesses.len();
    let valid: Vec<Business> = businesses
        .into_iter()
        .filter(|business| match business.validate() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping business: {e}");
                false
            }
        })
        .collect();
    if valid.len() < total {
        log::info!("Kept {} of {total} businesses after validation", valid.len());
    }
    valid
}
