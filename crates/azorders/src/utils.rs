use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::types::OrderRecord;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn validate(self) -> Result<Self, String> {
        if self.start > self.end {
            return Err(format!(
                "Start year ({}) cannot be after end year ({})",
                self.start, self.end
            ));
        }
        if self.start < MIN_YEAR || self.end > MAX_YEAR {
            return Err(format!(
                "Years must be between {MIN_YEAR} and {MAX_YEAR}, got {}-{}",
                self.start, self.end
            ));
        }
        Ok(self)
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            (i64::from(self.end) - i64::from(self.start) + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct CrawlStats {
    pub total: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub per_year: BTreeMap<i32, usize>,
    pub per_decade: BTreeMap<i32, usize>,
    pub failed_years: Vec<i32>,
}

impl CrawlStats {
    pub fn from_records(records: &[OrderRecord], failed_years: &[i32]) -> CrawlStats {
        let mut per_year = BTreeMap::new();
        let mut per_decade = BTreeMap::new();
        for record in records {
            *per_year.entry(record.year).or_insert(0) += 1;
            *per_decade.entry(record.year.div_euclid(10) * 10).or_insert(0) += 1;
        }

        CrawlStats {
            total: records.len(),
            first_year: per_year.keys().next().copied(),
            last_year: per_year.keys().next_back().copied(),
            per_year,
            per_decade,
            failed_years: failed_years.to_vec(),
        }
    }

    pub fn years_with_data(&self) -> usize {
        self.per_year.len()
    }

    /// The ten most recent years that produced orders, oldest first.
    pub fn recent_years(&self) -> Vec<(i32, usize)> {
        let mut recent: Vec<(i32, usize)> = self
            .per_year
            .iter()
            .rev()
            .take(10)
            .map(|(y, c)| (*y, *c))
            .collect();
        recent.reverse();
        recent
    }
}

impl std::fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        match (self.first_year, self.last_year) {
            (Some(first), Some(last)) => writeln!(f, "  Years covered:   {} - {}", first, last)?,
            _ => writeln!(f, "  Years covered:   none")?,
        }
        writeln!(f, "  Total orders:    {}", self.total)?;
        writeln!(f, "  Years with data: {}", self.years_with_data())?;

        if !self.per_decade.is_empty() {
            writeln!(f, "\nOrders by decade:")?;
            for (decade, count) in &self.per_decade {
                writeln!(f, "  {}s: {} orders", decade, count)?;
            }
            writeln!(f, "\nMost recent years:")?;
            for (year, count) in self.recent_years() {
                writeln!(f, "  {}: {} orders", year, count)?;
            }
        }

        if !self.failed_years.is_empty() {
            let years: Vec<String> = self.failed_years.iter().map(|y| y.to_string()).collect();
            writeln!(f, "\nFailed years: {}", years.join(", "))?;
        }
        Ok(())
    }
}
