use chrono::{DateTime, Days, NaiveTime, Utc};

/// Lower bounds used for the creation counters.
///
/// All bounds are UTC midnights: today, seven days before today and thirty
/// days before today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindow {
    pub today_start: DateTime<Utc>,
    pub week_start: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
}

impl StatsWindow {
    pub const WEEK_DAYS: u64 = 7;
    pub const MONTH_DAYS: u64 = 30;

    pub fn at(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let midnight = |days_back: u64| {
            today
                .checked_sub_days(Days::new(days_back))
                .unwrap_or(today)
                .and_time(NaiveTime::MIN)
                .and_utc()
        };

        Self {
            today_start: midnight(0),
            week_start: midnight(Self::WEEK_DAYS),
            month_start: midnight(Self::MONTH_DAYS),
        }
    }
}
