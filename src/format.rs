use crate::engine::OutcomeKind;

/// Renders a reaction time as `{whole}.{millis:03} seconds`.
///
/// The whole part is truncated toward zero and the millisecond part is
/// floored, so `1.2345` reads `1.234 seconds`. Out-of-range input is printed
/// as-is: negative or huge values are what the caller reported.
pub fn format_elapsed(elapsed_secs: f64) -> String {
    let whole = elapsed_secs.trunc();
    let millis = ((elapsed_secs - whole) * 1000.0).floor();
    // adding 0.0 turns -0 into 0, so -0.5 prints as `0.-500`
    format!("{:.0}.{:03} seconds", whole + 0.0, millis as i64)
}

pub fn outcome_line(kind: OutcomeKind, elapsed_secs: f64) -> String {
    format!(
        "{} {}! Reaction time: {}",
        kind.icon(),
        kind,
        format_elapsed(elapsed_secs)
    )
}

/// `Round 2 of 5 · Success: 1`, where `round_index` counts completed rounds.
pub fn status_line(round_index: u32, rounds_to_win: u32, success_count: u32) -> String {
    format!(
        "Round {} of {} · Success: {}",
        (round_index + 1).min(rounds_to_win),
        rounds_to_win,
        success_count
    )
}

pub fn score_line(success_count: u32, rounds_to_win: u32) -> String {
    format!("You got {} out of {} correct.", success_count, rounds_to_win)
}
