use crate::types::{CandidateRecord, OrderRecord};

pub const MAX_ORDER_NUMBER_LEN: usize = 50;
pub const MIN_DESCRIPTION_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("missing order number")]
    MissingOrderNumber,
    #[error("order number too long ({0} chars)")]
    OrderNumberTooLong(usize),
    #[error("missing description")]
    MissingDescription,
    #[error("description too short ({0} chars)")]
    DescriptionTooShort(usize),
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Checks lengths on the raw text first, then normalises the retained fields.
pub fn validate(candidate: CandidateRecord) -> Result<OrderRecord, Rejection> {
    let order_len = candidate.order_number.chars().count();
    if order_len == 0 {
        return Err(Rejection::MissingOrderNumber);
    }
    if order_len > MAX_ORDER_NUMBER_LEN {
        return Err(Rejection::OrderNumberTooLong(order_len));
    }

    let description_len = candidate.description.chars().count();
    if description_len == 0 {
        return Err(Rejection::MissingDescription);
    }
    if description_len < MIN_DESCRIPTION_LEN {
        return Err(Rejection::DescriptionTooShort(description_len));
    }

    Ok(OrderRecord {
        order_number: normalize_whitespace(&candidate.order_number),
        description: normalize_whitespace(&candidate.description),
        date_signed: normalize_whitespace(&candidate.date_signed),
        link_order: candidate.link_order,
        year: candidate.year,
    })
}

/// Tally of why candidates were turned away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectionCounts {
    pub missing_order_number: usize,
    pub order_number_too_long: usize,
    pub missing_description: usize,
    pub description_too_short: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::MissingOrderNumber => self.missing_order_number += 1,
            Rejection::OrderNumberTooLong(_) => self.order_number_too_long += 1,
            Rejection::MissingDescription => self.missing_description += 1,
            Rejection::DescriptionTooShort(_) => self.description_too_short += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_order_number
            + self.order_number_too_long
            + self.missing_description
            + self.description_too_short
    }
}
