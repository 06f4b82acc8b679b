//! Code Reports

use crate::{availability::Availability, filters::CodeFilter, voucher::VoucherState};

/// Header row of the code export.
pub const CSV_HEADER: &str = "assigned_to,code,redeem_url,redemptions.total,redemptions.used";

/// One reported voucher code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeReport {
    /// Voucher code.
    pub code: String,

    /// Emails holding an open assignment.
    pub assigned_to: Vec<String>,

    /// Slot counters.
    pub availability: Availability,

    /// Filters the code passes.
    pub filters: Vec<CodeFilter>,
}

impl CodeReport {
    /// Whether the code passes `filter`.
    #[must_use]
    pub fn passes(&self, filter: CodeFilter) -> bool {
        self.filters.contains(&filter)
    }
}

impl From<&VoucherState> for CodeReport {
    fn from(voucher: &VoucherState) -> Self {
        Self {
            code: voucher.code.clone(),
            assigned_to: voucher
                .active_holders()
                .into_iter()
                .map(ToString::to_string)
                .collect(),
            availability: voucher.availability(),
            filters: CodeFilter::matching(voucher),
        }
    }
}

/// Link a learner follows to redeem `code`.
#[must_use]
pub fn redeem_url(base: &str, code: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };

    format!("{base}{separator}code={code}")
}

/// Render reports as CSV, header included, one line per code.
#[must_use]
pub fn render_csv(reports: &[CodeReport], redeem_base_url: &str) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for report in reports {
        let fields = [
            escape_field(&report.assigned_to.join(";")),
            escape_field(&report.code),
            escape_field(&redeem_url(redeem_base_url, &report.code)),
            report.availability.total.to_string(),
            report.availability.used().to_string(),
        ];

        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
