use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Site-structure regime the order index of a given year lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEpoch {
    Legacy,
    Modern,
}

impl SourceEpoch {
    pub const LAST_LEGACY_YEAR: i32 = 2015;

    pub fn for_year(year: i32) -> Self {
        if year <= Self::LAST_LEGACY_YEAR {
            SourceEpoch::Legacy
        } else {
            SourceEpoch::Modern
        }
    }

    pub fn format_label(&self) -> &'static str {
        match self {
            SourceEpoch::Legacy => ".aspx format",
            SourceEpoch::Modern => "dash format",
        }
    }
}

impl Display for SourceEpoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceEpoch::Legacy => write!(f, "Legacy"),
            SourceEpoch::Modern => write!(f, "Modern"),
        }
    }
}

/// Which order-table roles the header row hints at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnSignal {
    pub has_order_header: bool,
    pub has_date_header: bool,
    pub has_description_header: bool,
}

impl Display for ColumnSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order: {}, Date: {}, Description: {}",
            self.has_order_header, self.has_date_header, self.has_description_header
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTable {
    /// Zero-based position of the table in document order.
    pub index: usize,
    /// Lower-cased, trimmed header cell texts.
    pub headers: Vec<String>,
    pub column_count: usize,
    pub signal: ColumnSignal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLink {
    pub text: String,
    pub href: String,
}

/// A data row reduced to plain text, detached from the DOM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<String>,
    /// First hyperlink found inside cell 0, if any.
    pub first_link: Option<RowLink>,
}

impl RawRow {
    pub fn new<S: Into<String>>(cells: impl IntoIterator<Item = S>) -> Self {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            first_link: None,
        }
    }

    pub fn with_link(mut self, text: impl Into<String>, href: impl Into<String>) -> Self {
        self.first_link = Some(RowLink {
            text: text.into(),
            href: href.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub order_number: String,
    pub description: String,
    pub date_signed: String,
    pub link_order: String,
    pub year: i32,
}

/// A validated, whitespace-normalised administrative order.
///
/// Field order doubles as the export column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "Order_Number")]
    pub order_number: String,
    #[serde(rename = "Administrative_Order_Description")]
    pub description: String,
    #[serde(rename = "Date_Signed")]
    pub date_signed: String,
    #[serde(rename = "Link_Order")]
    pub link_order: String,
    #[serde(rename = "Year")]
    pub year: i32,
}

impl Display for OrderRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} - {}", self.year, self.order_number, self.description)?;
        if !self.date_signed.is_empty() {
            write!(f, "\n   Signed: {}", self.date_signed)?;
        }
        if !self.link_order.is_empty() {
            write!(f, "\n   Link:   {}", self.link_order)?;
        }
        Ok(())
    }
}
