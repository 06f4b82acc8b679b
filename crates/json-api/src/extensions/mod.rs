//! Extension traits

mod code_filter;
mod depot;
mod result;

pub(crate) use code_filter::CodeFilterExt as _;
pub(crate) use depot::DepotExt as _;
pub(crate) use result::ResultExt as _;
