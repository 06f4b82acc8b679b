//! Route templates for span names and metric labels.

use uuid::Uuid;

/// Replace identifiers in `path` with placeholders so spans and metrics
/// group by route: UUIDs become `{uuid}` and the segment after `vouchers`
/// becomes `{code}`.
pub(super) fn route_template(path: &str) -> String {
    let trimmed = path.trim_matches('/');

    if trimmed.is_empty() {
        return "/".to_owned();
    }

    let mut template = String::new();
    let mut previous = "";

    for segment in trimmed.split('/') {
        template.push('/');

        if previous == "vouchers" {
            template.push_str("{code}");
        } else if Uuid::parse_str(segment).is_ok() {
            template.push_str("{uuid}");
        } else {
            template.push_str(segment);
        }

        previous = segment;
    }

    template
}
