//! `code_filter` query parsing.

use salvo::{oapi::extract::QueryParam, prelude::StatusError};
use vouchers::filters::CodeFilter;

use crate::extensions::*;

pub(crate) trait CodeFilterExt {
    fn into_code_filter(self) -> Result<Option<CodeFilter>, StatusError>;
}

impl CodeFilterExt for QueryParam<String, false> {
    fn into_code_filter(self) -> Result<Option<CodeFilter>, StatusError> {
        self.into_inner()
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.trim().parse::<CodeFilter>())
            .transpose()
            .or_400("invalid code_filter")
    }
}
