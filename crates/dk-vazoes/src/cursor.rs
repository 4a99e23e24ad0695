use std::fmt;

/// (year, month) position of a record in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The month after this one.
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn advance(&mut self) {
        *self = self.next();
    }

    /// Cursor `n` records after `self`.
    pub fn offset(self, n: usize) -> Self {
        let base = self.year as i64 * 12 + (self.month as i64 - 1);
        let total = base + n as i64;
        Self {
            year: total.div_euclid(12) as i32,
            month: total.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for MonthCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn december_rolls_into_next_year() {
        let mut c = MonthCursor::new(1931, 12);
        c.advance();
        assert_eq!(c, MonthCursor::new(1932, 1));
    }

    #[test]
    fn offset_matches_repeated_advance() {
        let mut c = MonthCursor::new(1931, 1);
        for _ in 0..27 {
            c.advance();
        }
        assert_eq!(MonthCursor::new(1931, 1).offset(27), c);
        assert_eq!(c, MonthCursor::new(1933, 4));
    }
}
