//! DCF77 time telegram packed into a ring-log [`Event`].
//!
//! Bit positions follow the broadcast order of one minute of DCF77:
//!
//! ```text
//!  0       start of minute (always 0)
//!  1..=14  civil warning / weather bits
//! 15       call bit (backup antenna)
//! 16       summer time change announced
//! 17, 18   CEST, CET
//! 19       leap second announced
//! 20       start of time (always 1)
//! 21..=27  minute (BCD), 28 parity
//! 29..=34  hour (BCD), 35 parity
//! 36..=41  day of month (BCD)
//! 42..=44  day of week, Monday = 1
//! 45..=49  month (BCD)
//! 50..=57  year within century (BCD), 58 parity over bits 36..=57
//! ```

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::history::Event;

const WEATHER: (u32, u32) = (1, 14);
const MINUTE: (u32, u32) = (21, 7);
const HOUR: (u32, u32) = (29, 6);
const DAY: (u32, u32) = (36, 6);
const WEEKDAY: (u32, u32) = (42, 3);
const MONTH: (u32, u32) = (45, 5);
const YEAR: (u32, u32) = (50, 8);
/// Everything covered by the date parity bit.
const DATE: (u32, u32) = (36, 22);

const CALL_BIT: u32 = 15;
const SUMMER_ANNOUNCE: u32 = 16;
const CEST: u32 = 17;
const CET: u32 = 18;
const LEAP_ANNOUNCE: u32 = 19;
const START_OF_TIME: u32 = 20;
const MINUTE_PARITY: u32 = 28;
const HOUR_PARITY: u32 = 35;
const DATE_PARITY: u32 = 58;

/// One decoded minute telegram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dcf77Frame(Event);

impl Dcf77Frame {
    pub fn from_event(event: Event) -> Self {
        Self(event)
    }

    pub fn raw(&self) -> Event {
        self.0
    }

    /// Builds a well-formed telegram for `time`, with even parity bits set.
    ///
    /// `summer` selects CEST over CET. Weather and announcement bits are
    /// left clear.
    pub fn encode(time: &NaiveDateTime, summer: bool) -> Self {
        let mut raw: u64 = 1 << START_OF_TIME;
        raw |= if summer { 1 << CEST } else { 1 << CET };

        raw |= to_bcd(time.minute()) << MINUTE.0;
        raw |= to_bcd(time.hour()) << HOUR.0;
        raw |= to_bcd(time.day()) << DAY.0;
        raw |= u64::from(time.weekday().number_from_monday()) << WEEKDAY.0;
        raw |= to_bcd(time.month()) << MONTH.0;
        raw |= to_bcd(time.year().rem_euclid(100) as u32) << YEAR.0;

        let mut frame = Self(raw);
        frame.set(MINUTE_PARITY, odd(frame.field(MINUTE)));
        frame.set(HOUR_PARITY, odd(frame.field(HOUR)));
        frame.set(DATE_PARITY, odd(frame.field(DATE)));
        frame
    }

    fn field(&self, (shift, width): (u32, u32)) -> u64 {
        (self.0 >> shift) & ((1 << width) - 1)
    }

    fn bit(&self, position: u32) -> bool {
        (self.0 >> position) & 1 == 1
    }

    fn set(&mut self, position: u32, value: bool) {
        if value {
            self.0 |= 1 << position;
        } else {
            self.0 &= !(1 << position);
        }
    }

    pub fn weather(&self) -> u16 {
        self.field(WEATHER) as u16
    }

    pub fn call_bit(&self) -> bool {
        self.bit(CALL_BIT)
    }

    pub fn summer_announced(&self) -> bool {
        self.bit(SUMMER_ANNOUNCE)
    }

    pub fn cest(&self) -> bool {
        self.bit(CEST)
    }

    pub fn cet(&self) -> bool {
        self.bit(CET)
    }

    pub fn leap_announced(&self) -> bool {
        self.bit(LEAP_ANNOUNCE)
    }

    pub fn minute(&self) -> u32 {
        from_bcd(self.field(MINUTE))
    }

    pub fn hour(&self) -> u32 {
        from_bcd(self.field(HOUR))
    }

    pub fn day(&self) -> u32 {
        from_bcd(self.field(DAY))
    }

    /// Day of week, Monday = 1 through Sunday = 7.
    pub fn weekday(&self) -> u32 {
        self.field(WEEKDAY) as u32
    }

    pub fn month(&self) -> u32 {
        from_bcd(self.field(MONTH))
    }

    /// Full year; the telegram only carries the last two digits.
    pub fn year(&self) -> u32 {
        2000 + from_bcd(self.field(YEAR))
    }

    pub fn minute_parity(&self) -> bool {
        self.bit(MINUTE_PARITY)
    }

    pub fn hour_parity(&self) -> bool {
        self.bit(HOUR_PARITY)
    }

    pub fn date_parity(&self) -> bool {
        self.bit(DATE_PARITY)
    }

    /// Whether all three parity bits match their fields.
    pub fn parity_ok(&self) -> bool {
        self.minute_parity() == odd(self.field(MINUTE))
            && self.hour_parity() == odd(self.field(HOUR))
            && self.date_parity() == odd(self.field(DATE))
    }
}

fn odd(bits: u64) -> bool {
    bits.count_ones() % 2 == 1
}

fn to_bcd(value: u32) -> u64 {
    u64::from(((value / 10) << 4) | (value % 10))
}

fn from_bcd(raw: u64) -> u32 {
    ((raw >> 4) * 10 + (raw & 0x0f)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn bcd_digits() {
        assert_eq!(to_bcd(59), 0x59);
        assert_eq!(from_bcd(0x59), 59);
    }

    #[test]
    fn parity_detects_flipped_minute_bit() {
        let time = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(12, 34, 0)
            .unwrap();
        let frame = Dcf77Frame::encode(&time, false);
        let corrupted = Dcf77Frame::from_event(frame.raw() ^ (1 << MINUTE.0));

        assert!(frame.parity_ok());
        assert!(!corrupted.parity_ok());
    }
}
