use crate::clock::DateTime;
use time::{Month, OffsetDateTime, Weekday};

/// A strategy-facing calendar gate for `place_order` calls. The core engine
/// has no dependency on this — orders carry their own `valid_from`/
/// `valid_until` — but a caller may want to restrict when it *submits*
/// orders in the first place.
pub trait TradingSchedule {
    fn should_trade(&self, date: DateTime) -> bool;
}

pub struct DefaultTradingSchedule;

impl TradingSchedule for DefaultTradingSchedule {
    fn should_trade(&self, _date: DateTime) -> bool {
        true
    }
}

/// Trades only on the last business day (Mon-Fri) of each month.
pub struct LastBusinessDayTradingSchedule;

impl TradingSchedule for LastBusinessDayTradingSchedule {
    fn should_trade(&self, date: DateTime) -> bool {
        let dt: OffsetDateTime = date.into();
        last_business_day_of_month(dt.year(), dt.month()) == dt.date()
    }
}

fn last_business_day_of_month(year: i32, month: Month) -> time::Date {
    let next_month_first = if month == Month::December {
        time::Date::from_calendar_date(year + 1, Month::January, 1).unwrap()
    } else {
        time::Date::from_calendar_date(year, month.next(), 1).unwrap()
    };
    let mut day = next_month_first.previous_day().unwrap();
    while matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
        day = day.previous_day().unwrap();
    }
    day
}
