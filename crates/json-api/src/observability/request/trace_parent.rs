//! Remote span parents from W3C trace headers.

use opentelemetry::{
    Context, global,
    propagation::{Extractor, TextMapPropagator},
    trace::TraceContextExt as _,
};
use salvo::http::HeaderMap;

/// The caller's span context, when the request carries a usable one.
pub(super) fn remote_parent(headers: &HeaderMap) -> Option<Context> {
    global::get_text_map_propagator(|propagator| remote_parent_with(propagator, headers))
}

fn remote_parent_with(
    propagator: &dyn TextMapPropagator,
    headers: &HeaderMap,
) -> Option<Context> {
    // Start from an empty context so requests without trace headers get a
    // root span instead of the active in-process one.
    let context = propagator.extract_with_context(&Context::new(), &RequestHeaders(headers));

    context
        .span()
        .span_context()
        .is_valid()
        .then_some(context)
}

struct RequestHeaders<'a>(&'a HeaderMap);

impl Extractor for RequestHeaders<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}
