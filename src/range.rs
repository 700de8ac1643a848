//! Page-range expression parsing
//!
//! A range expression is a comma-separated list of tokens, each either a
//! single 1-based page number (`"5"`) or an inclusive span (`"2-6"`).
//! Duplicates collapse; iteration order is ascending.
//!
//! An empty expression parses to an empty selection. What an empty
//! selection *means* is up to the caller: the watermark and page-number
//! operations treat it as "all pages", rotation treats it as "no pages".

use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// A parsed set of 1-based page indices targeted by an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    /// Parse a range expression like `"1-3,5,9-12"`.
    ///
    /// A reversed span (`"5-3"`) is rejected rather than silently
    /// expanding to nothing.
    pub fn parse(expr: &str) -> Result<Self> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Ok(Self::default());
        }

        let mut pages = BTreeSet::new();
        for token in expr.split(',') {
            let token = token.trim();
            match token.split_once('-') {
                Some((start, end)) => {
                    let start = parse_page_number(start.trim(), token)?;
                    let end = parse_page_number(end.trim(), token)?;
                    if start > end {
                        return Err(Error::InvalidRangeFormat(format!(
                            "span '{token}' runs backwards"
                        )));
                    }
                    pages.extend(start..=end);
                }
                None => {
                    pages.insert(parse_page_number(token, token)?);
                }
            }
        }

        Ok(Self { pages })
    }

    /// True when the expression named no pages at all.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Membership test for a 1-based page index.
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }

    /// Number of distinct pages selected.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Iterate the selected pages in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.iter().copied()
    }
}

fn parse_page_number(part: &str, token: &str) -> Result<u32> {
    part.parse::<u32>()
        .map_err(|_| Error::InvalidRangeFormat(format!("'{token}' is not a page number or span")))
}
