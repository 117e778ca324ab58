//! Batch execution with per-element isolation.

use crate::codec;
use crate::dispatcher::Dispatcher;
use crate::envelope::Response;

/// Decode and dispatch one batch element. A decode failure becomes that
/// element's error response; notifications yield `None`.
pub fn run_element(dispatcher: &Dispatcher, element: &str) -> Option<Response> {
    match codec::decode_element(element) {
        Ok(request) => dispatcher.dispatch(&request),
        Err(rejection) => Some(rejection),
    }
}

/// Run every element in order. `None` when no element produced a response.
pub fn execute(dispatcher: &Dispatcher, elements: &[&str]) -> Option<Vec<Response>> {
    let results = elements
        .iter()
        .enumerate()
        .map(|(index, element)| (index, run_element(dispatcher, element)));
    collect(results)
}

/// Restore input order for results that may have completed in any order,
/// dropping notification slots.
pub fn collect<I>(results: I) -> Option<Vec<Response>>
where
    I: IntoIterator<Item = (usize, Option<Response>)>,
{
    let mut slots: Vec<(usize, Option<Response>)> = results.into_iter().collect();
    let total = slots.len();
    slots.sort_by_key(|(index, _)| *index);

    let responses: Vec<Response> = slots.into_iter().filter_map(|(_, r)| r).collect();
    tracing::debug!("batch of {total} produced {} responses", responses.len());

    if responses.is_empty() {
        None
    } else {
        Some(responses)
    }
}
