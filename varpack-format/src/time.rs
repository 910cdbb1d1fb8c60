//! MS-DOS date/time encoding for ZIP headers.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Earliest year representable in a DOS date.
pub const DOS_EPOCH_YEAR: i32 = 1980;

/// Latest year representable in the 7-bit DOS year field.
pub const DOS_MAX_YEAR: i32 = DOS_EPOCH_YEAR + 0x7F;

/// A packed DOS time/date pair.
///
/// Time is `(hours << 11) | (minutes << 5) | (seconds / 2)`,
/// date is `((year - 1980) << 9) | (month << 5) | day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DosDateTime {
    // Field order matters for `Ord`: date first, then time.
    pub date: u16,
    pub time: u16,
}

impl DosDateTime {
    /// Encode a wall-clock timestamp. Years before 1980 are floored to 1980,
    /// keeping month, day and time; years after 2107 are clamped to the last
    /// representable instant.
    pub fn from_datetime(datetime: NaiveDateTime) -> DosDateTime {
        let year = datetime.year();
        if year > DOS_MAX_YEAR {
            return DosDateTime::encode(DOS_MAX_YEAR, 12, 31, 23, 59, 58);
        }

        DosDateTime::encode(
            year.max(DOS_EPOCH_YEAR),
            datetime.month(),
            datetime.day(),
            datetime.hour(),
            datetime.minute(),
            datetime.second(),
        )
    }

    /// The current local time, as the archive's shared timestamp.
    pub fn now() -> DosDateTime {
        DosDateTime::from_datetime(chrono::Local::now().naive_local())
    }

    fn encode(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DosDateTime {
        let year = (year - DOS_EPOCH_YEAR) as u32;
        // Leap seconds show up as second == 60.
        let second = second.min(59);
        DosDateTime {
            date: ((year << 9) | (month << 5) | day) as u16,
            time: ((hour << 11) | (minute << 5) | (second / 2)) as u16,
        }
    }
}

impl From<NaiveDateTime> for DosDateTime {
    fn from(datetime: NaiveDateTime) -> Self {
        DosDateTime::from_datetime(datetime)
    }
}
