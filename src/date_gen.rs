use chrono::{Duration, NaiveDate};

/// Accumulation year running October 1 of `year` through September 30 of
/// `year + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WaterYear {
    year: i32,
    start: NaiveDate,
    end: NaiveDate,
}

impl WaterYear {
    pub fn new(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 10, 1)?;
        let end = NaiveDate::from_ymd_opt(year.checked_add(1)?, 9, 30)?;
        Some(Self { year, start, end })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// 366 when the February inside the water year has a leap day, 365 otherwise.
    pub fn len_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Calendar date of a 1-based day label.
    pub fn date_of_day(&self, day: usize) -> Option<NaiveDate> {
        if day == 0 || day > self.len_days() {
            return None;
        }
        Some(self.start + Duration::days(day as i64 - 1))
    }
}

/// Inclusive daily date range.
#[derive(Debug, Clone)]
pub struct DateRange {
    current: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            current: start,
            end,
        }
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current <= self.end {
            let current_date = self.current;
            match self.current.succ_opt() {
                Some(next) => self.current = next,
                // Past the last representable date: make the range empty.
                None => self.end = current_date.pred_opt().unwrap_or(current_date),
            }
            Some(current_date)
        } else {
            None
        }
    }
}

/// Daily calendar axis of an analysis window, from the start of the
/// `start_year` water year to the end of the `end_year` water year.
#[derive(Debug, Clone, Copy)]
pub struct DateGenerator {
    first: WaterYear,
    last: WaterYear,
}

impl DateGenerator {
    pub fn new(first: WaterYear, last: WaterYear) -> Self {
        Self { first, last }
    }

    pub fn for_years(start_year: i32, end_year: i32) -> Option<Self> {
        Some(Self::new(WaterYear::new(start_year)?, WaterYear::new(end_year)?))
    }

    pub fn start(&self) -> NaiveDate {
        self.first.start()
    }

    pub fn end(&self) -> NaiveDate {
        self.last.end()
    }

    pub fn water_years(&self) -> impl Iterator<Item = WaterYear> {
        (self.first.year()..=self.last.year()).filter_map(WaterYear::new)
    }

    pub fn len_days(&self) -> usize {
        if self.end() < self.start() {
            return 0;
        }
        ((self.end() - self.start()).num_days() + 1) as usize
    }

    pub fn generate_date_series(&self) -> Vec<NaiveDate> {
        DateRange::new(self.start(), self.end()).collect()
    }
}
