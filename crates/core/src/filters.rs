//! Code Filters

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::voucher::VoucherState;

/// Filter accepted by code listings and exports.
///
/// Filters are independent predicates, so a code can pass more than one: a
/// code with open assignments and some redemptions is both unredeemed and
/// partially redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeFilter {
    /// Codes with no open assignment and no redemption.
    Unassigned,

    /// Codes with at least one open assignment.
    Unredeemed,

    /// Assigned codes with some but not all slots redeemed.
    PartiallyRedeemed,

    /// Codes with every slot redeemed.
    Redeemed,
}

/// Error returned for an unknown filter value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown code filter: {0}")]
pub struct UnknownCodeFilter(pub String);

impl CodeFilter {
    /// Query string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Unredeemed => "unredeemed",
            Self::PartiallyRedeemed => "partially-redeemed",
            Self::Redeemed => "redeemed",
        }
    }

    /// Every filter, in listing order.
    pub const ALL: [Self; 4] = [
        Self::Unassigned,
        Self::Unredeemed,
        Self::PartiallyRedeemed,
        Self::Redeemed,
    ];

    /// Report label of the filter.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unassigned => "UNASSIGNED",
            Self::Unredeemed => "UNREDEEMED",
            Self::PartiallyRedeemed => "PARTIAL_REDEEMED",
            Self::Redeemed => "REDEEMED",
        }
    }

    /// Whether `voucher` passes the filter.
    #[must_use]
    pub fn matches(self, voucher: &VoucherState) -> bool {
        let availability = voucher.availability();

        match self {
            Self::Unassigned => availability.assigned == 0 && availability.redeemed == 0,
            Self::Unredeemed => availability.assigned > 0,
            Self::PartiallyRedeemed => {
                availability.redeemed > 0
                    && availability.redeemed < availability.total
                    && voucher.is_earmarked()
            }
            Self::Redeemed => availability.redeemed > 0 && availability.redeemed >= availability.total,
        }
    }

    /// The filters `voucher` passes.
    #[must_use]
    pub fn matching(voucher: &VoucherState) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|filter| filter.matches(voucher))
            .collect()
    }
}

impl fmt::Display for CodeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeFilter {
    type Err = UnknownCodeFilter;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "unassigned" => Ok(Self::Unassigned),
            "unredeemed" => Ok(Self::Unredeemed),
            "partially-redeemed" => Ok(Self::PartiallyRedeemed),
            "redeemed" => Ok(Self::Redeemed),
            other => Err(UnknownCodeFilter(other.to_string())),
        }
    }
}

/// Keep the items that pass `filter`; `None` keeps everything.
pub fn apply_filter<T>(
    items: impl IntoIterator<Item = T>,
    filter: Option<CodeFilter>,
    passes: impl Fn(&T, CodeFilter) -> bool,
) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| filter.is_none_or(|filter| passes(item, filter)))
        .collect()
}
