//! The call-site scanner.

use rustc_hash::FxHashMap;
use rowan::TextRange;

use crate::host::{CallSite, ProgramImage};
use crate::method::Method;

/// A catalog call found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Position in scan order.
    pub id: usize,
    pub method: Method,
    pub call: CallSite,
    /// The candidate whose call is this candidate's receiver, if any
    /// (`xs.Where(p)` for `xs.Where(p).Count()`).
    pub receiver_call: Option<usize>,
}

/// Collect every call whose name is in the operator catalog, in the host's
/// order. No semantic judgment happens here.
pub fn scan<I: ProgramImage>(image: &I) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = image
        .call_sites()
        .into_iter()
        .filter_map(|call| {
            let method = Method::from_name(&call.name)?;
            Some((method, call))
        })
        .enumerate()
        .map(|(id, (method, call))| Candidate {
            id,
            method,
            call,
            receiver_call: None,
        })
        .collect();

    let by_range: FxHashMap<TextRange, usize> = candidates
        .iter()
        .map(|c| (c.call.range, c.id))
        .collect();
    for candidate in &mut candidates {
        candidate.receiver_call = by_range.get(&candidate.call.receiver).copied();
    }

    candidates
}
