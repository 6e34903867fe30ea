//! Raw owner mentions and their provenance
//!
//! A mention is one scraped owner string together with the point in time it
//! refers to. The scraping layer can hand over mentions directly, or a
//! [`PropertyOwnership`] document built from the current-owner block and the
//! sale-history table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Temporal context of a mention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OwnerContext {
    /// Current owner block
    Current,
    /// Grantee of a sale with a resolvable transfer date
    Date(NaiveDate),
    /// Grantor side, or a grantee whose transfer date could not be resolved
    PriorUnmatched,
}

impl OwnerContext {
    /// Parse a context string.
    ///
    /// Accepts `current`, `prior_unmatched`, ISO `YYYY-MM-DD` and `M/D/YYYY`.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "current" => Some(Self::Current),
            "prior_unmatched" | "prior" | "unknown" => Some(Self::PriorUnmatched),
            _ => parse_transfer_date(trimmed).map(Self::Date),
        }
    }
}

impl From<String> for OwnerContext {
    fn from(s: String) -> Self {
        Self::parse(&s).unwrap_or_else(|| {
            tracing::warn!("Unresolvable owner context '{}', treating as prior_unmatched", s);
            Self::PriorUnmatched
        })
    }
}

impl From<OwnerContext> for String {
    fn from(ctx: OwnerContext) -> Self {
        ctx.to_string()
    }
}

impl std::fmt::Display for OwnerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => write!(f, "current"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::PriorUnmatched => write!(f, "prior_unmatched"),
        }
    }
}

/// Parse a transfer date cell into a calendar date.
///
/// Accepts `YYYY-MM-DD` and `M/D/YYYY`; a trailing time portion
/// (`5/1/2019 12:00:00 AM`) is ignored.
pub fn parse_transfer_date(s: &str) -> Option<NaiveDate> {
    let date_part = s.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%m/%d/%Y"))
        .ok()
}

/// One scraped owner string plus provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOwnerMention {
    pub text: String,
    pub context: OwnerContext,
}

impl RawOwnerMention {
    pub fn new(text: impl Into<String>, context: OwnerContext) -> Self {
        Self {
            text: text.into(),
            context,
        }
    }

    pub fn current(text: impl Into<String>) -> Self {
        Self::new(text, OwnerContext::Current)
    }

    pub fn dated(text: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(text, OwnerContext::Date(date))
    }

    pub fn prior_unmatched(text: impl Into<String>) -> Self {
        Self::new(text, OwnerContext::PriorUnmatched)
    }
}

/// One row of a sale-history table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleHistoryRow {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub grantee: Option<String>,
    #[serde(default)]
    pub grantor: Option<String>,
}

/// Owner-related cells scraped from one property document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyOwnership {
    /// Current owner block, possibly one name per line
    #[serde(default)]
    pub current_owners: Option<String>,
    #[serde(default)]
    pub sales: Vec<SaleHistoryRow>,
}

impl PropertyOwnership {
    /// Flatten into mentions in document order
    pub fn into_mentions(self) -> Vec<RawOwnerMention> {
        let mut mentions = Vec::new();

        if let Some(block) = &self.current_owners {
            mentions.extend(
                block
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(RawOwnerMention::current),
            );
        }

        for row in self.sales {
            let date = row.date.as_deref().and_then(parse_transfer_date);

            if let Some(grantee) = row.grantee.filter(|g| !g.trim().is_empty()) {
                let context = match date {
                    Some(d) => OwnerContext::Date(d),
                    None => OwnerContext::PriorUnmatched,
                };
                mentions.push(RawOwnerMention::new(grantee, context));
            }

            if let Some(grantor) = row.grantor.filter(|g| !g.trim().is_empty()) {
                mentions.push(RawOwnerMention::prior_unmatched(grantor));
            }
        }

        mentions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transfer_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2019, 5, 1).unwrap();
        assert_eq!(parse_transfer_date("2019-05-01"), Some(expected));
        assert_eq!(parse_transfer_date("5/1/2019"), Some(expected));
        assert_eq!(parse_transfer_date("05/01/2019 12:00:00 AM"), Some(expected));
        assert_eq!(parse_transfer_date("sometime in May"), None);
        assert_eq!(parse_transfer_date(""), None);
    }

    #[test]
    fn test_context_serde_roundtrip_strings() {
        let ctx: OwnerContext = serde_json::from_str("\"current\"").unwrap();
        assert_eq!(ctx, OwnerContext::Current);

        let ctx: OwnerContext = serde_json::from_str("\"2/10/2021\"").unwrap();
        assert_eq!(
            ctx,
            OwnerContext::Date(NaiveDate::from_ymd_opt(2021, 2, 10).unwrap())
        );
        assert_eq!(serde_json::to_string(&ctx).unwrap(), "\"2021-02-10\"");

        let ctx: OwnerContext = serde_json::from_str("\"not a date\"").unwrap();
        assert_eq!(ctx, OwnerContext::PriorUnmatched);
    }

    #[test]
    fn test_property_into_mentions() {
        let doc = PropertyOwnership {
            current_owners: Some("SMITH JOHN\n\n  DOE JANE  \n".to_string()),
            sales: vec![
                SaleHistoryRow {
                    date: Some("3/4/2015".to_string()),
                    grantee: Some("SMITH JOHN".to_string()),
                    grantor: Some("ABC LLC".to_string()),
                },
                SaleHistoryRow {
                    date: None,
                    grantee: Some("OLD OWNER".to_string()),
                    grantor: Some("   ".to_string()),
                },
            ],
        };

        let mentions = doc.into_mentions();
        assert_eq!(mentions.len(), 5);
        assert_eq!(mentions[0], RawOwnerMention::current("SMITH JOHN"));
        assert_eq!(mentions[1], RawOwnerMention::current("DOE JANE"));
        assert_eq!(
            mentions[2].context,
            OwnerContext::Date(NaiveDate::from_ymd_opt(2015, 3, 4).unwrap())
        );
        assert_eq!(mentions[3], RawOwnerMention::prior_unmatched("ABC LLC"));
        assert_eq!(mentions[4], RawOwnerMention::prior_unmatched("OLD OWNER"));
    }
}
