//! Time management — convert UCI clock parameters to a search budget.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use shakmaty::Color;

use crate::search::SearchControl;

/// Milliseconds to spend on one move, from the side's remaining clock
/// and increment.
///
/// The base allotment is a fortieth of the clock plus the whole
/// increment, floored at 50 ms so the engine always completes a shallow
/// search, and capped at half the clock minus a second of headroom so
/// it can never think itself into time trouble. With under ~2 s on the
/// clock the cap collapses toward zero and the engine moves instantly.
pub fn allocate_movetime(remaining_ms: u64, increment_ms: u64) -> u64 {
    let ceiling = (remaining_ms / 2).saturating_sub(1000);
    (remaining_ms / 40 + increment_ms).max(50).min(ceiling)
}

/// Build a [`SearchControl`] from `go` parameters and the side to move.
///
/// Priority: `infinite`, then an explicit `movetime`, then the side's
/// clock via [`allocate_movetime`], and finally (depth-only or bare
/// `go`) no time limit at all.
#[allow(clippy::too_many_arguments)]
pub fn control_from_go(
    wtime: Option<u64>,
    btime: Option<u64>,
    winc: Option<u64>,
    binc: Option<u64>,
    movetime: Option<u64>,
    infinite: bool,
    side: Color,
    stopped: Arc<AtomicBool>,
) -> SearchControl {
    if infinite {
        return SearchControl::new_infinite(stopped);
    }

    if let Some(ms) = movetime {
        return SearchControl::new_timed(stopped, Duration::from_millis(ms));
    }

    let (remaining, increment) = match side {
        Color::White => (wtime, winc),
        Color::Black => (btime, binc),
    };

    if let Some(remaining) = remaining {
        let budget = allocate_movetime(remaining, increment.unwrap_or(0));
        return SearchControl::new_timed(stopped, Duration::from_millis(budget));
    }

    SearchControl::new_infinite(stopped)
}
