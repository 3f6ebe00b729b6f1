//! Population balance between internal and external residents.
//!
//! Two soft rules, applied per cleanup while picking from a ranked list:
//! - external people hold at most `slots / 2` places;
//! - the last open place may not go to an external person while no internal
//!   person holds a place.
//!
//! Both give way when the internal candidates left cannot cover the open
//! places, so selection always makes progress.

use super::candidate::Candidate;

/// Internal / external headcount already placed in one cleanup this week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub internal: u32,
    pub external: u32,
}

impl Tally {
    pub(crate) fn record(&mut self, external: bool) {
        if external {
            self.external += 1;
        } else {
            self.internal += 1;
        }
    }
}

/// Take up to `open` candidates from `ranked` (best first).
///
/// With `enabled == false` this is a plain prefix.
pub(crate) fn select<'a>(
    ranked: Vec<Candidate<'a>>,
    open: usize,
    slots: u32,
    tally: Tally,
    enabled: bool,
) -> Vec<Candidate<'a>> {
    if !enabled {
        return ranked.into_iter().take(open).collect();
    }

    let cap = slots / 2;
    let mut tally = tally;
    let mut open = open;
    let mut pool = ranked;
    let mut chosen = Vec::new();

    while open > 0 && !pool.is_empty() {
        let internal_left = pool.iter().filter(|c| !c.is_external()).count();
        let admissible = |c: &Candidate<'_>| {
            if !c.is_external() {
                return true;
            }
            let over_cap = tally.external >= cap && internal_left >= open;
            let last_place_needs_internal =
                open == 1 && tally.internal == 0 && internal_left > 0;
            !over_cap && !last_place_needs_internal
        };
        let Some(index) = pool.iter().position(admissible) else {
            break;
        };
        let candidate = pool.remove(index);
        tally.record(candidate.is_external());
        open -= 1;
        chosen.push(candidate);
    }
    chosen
}
