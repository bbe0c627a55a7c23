// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Day of the week `offset` days after `self`.
    #[inline]
    pub fn advanced_by(self, offset: usize) -> DayOfWeek {
        let base = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(base + offset) % 7]
    }

    #[inline]
    pub fn is_weekend(self) -> bool {
        matches!(self, DayOfWeek::Saturday | DayOfWeek::Sunday)
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        };
        write!(f, "{}", name)
    }
}

/// The finite scheduling horizon: a number of consecutive days starting on a
/// given day of the week. Day indexes run from `0` to `size() - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchedulingPeriod {
    num_days: usize,
    first_day: DayOfWeek,
}

impl SchedulingPeriod {
    #[inline]
    pub const fn new(num_days: usize, first_day: DayOfWeek) -> Self {
        Self {
            num_days,
            first_day,
        }
    }

    #[inline]
    pub const fn size(&self) -> usize {
        self.num_days
    }

    #[inline]
    pub fn day_of_week(&self, day_index: usize) -> DayOfWeek {
        self.first_day.advanced_by(day_index)
    }
}

impl std::fmt::Display for SchedulingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SchedulingPeriod({} days from {})",
            self.num_days, self.first_day
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_of_week_wraps() {
        assert_eq!(DayOfWeek::Saturday.advanced_by(2), DayOfWeek::Monday);
        assert_eq!(DayOfWeek::Monday.advanced_by(14), DayOfWeek::Monday);
        assert!(DayOfWeek::Sunday.is_weekend());
        assert!(!DayOfWeek::Friday.is_weekend());
    }

    #[test]
    fn period_indexes_days() {
        let p = SchedulingPeriod::new(10, DayOfWeek::Friday);
        assert_eq!(p.size(), 10);
        assert_eq!(p.day_of_week(0), DayOfWeek::Friday);
        assert_eq!(p.day_of_week(2), DayOfWeek::Sunday);
        assert_eq!(p.day_of_week(9), DayOfWeek::Sunday);
    }
}
