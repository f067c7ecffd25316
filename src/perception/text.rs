//! Marker matching over extracted page text
//!
//! Pure functions: they take the visible text (and element labels) of one
//! snapshot and derive facts from it. Markers are matched against the
//! upper-cased text; numeric patterns run on the raw text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::game::{BattlePhase, PopupState};

/// Present only while a location popup is open
pub const POPUP_MARKER: &str = "DAILY REWARD LIMIT";
/// Shown once today's rewards for a location are used up
pub const EXHAUSTED_MARKER: &str = "REWARDS WILL RETURN";
pub const PLAY_LABEL: &str = "PLAY";
pub const LOCKED_LABEL: &str = "LOCKED";
/// Visible exactly while the player may act
pub const END_TURN_MARKER: &str = "END TURN";
/// Any of these ends the battle outright
pub const TERMINAL_MARKERS: [&str; 6] = [
    "VICTORY", "DEFEAT", "YOU WIN", "YOU WON", "YOU LOSE", "YOU LOST",
];
pub const CONTINUE_MARKER: &str = "CONTINUE";
/// Paired with CONTINUE on the result screen
pub const REWARD_MARKERS: [&str; 2] = ["YOUR DAMAGE", "REWARDS"];
/// Both visible means the view is back on the map
pub const MAP_VIEW_MARKERS: [&str; 2] = ["TRAINING", "FOREST"];
/// Any of these means the result screen is still up
pub const RESULT_SCREEN_MARKERS: [&str; 4] = ["CONTINUE", "YOU WON", "YOU LOST", "YOUR DAMAGE"];
/// Game shell finished loading
pub const GAME_READY_MARKERS: [&str; 5] = ["MAP", "HOME", "PLAY", "BATTLE", "PROFILE"];
/// Home tab finished loading
pub const HOME_READY_MARKERS: [&str; 2] = ["MAP", "PROFILE"];

static RATIO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)").unwrap());
static HP_RATIO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,5})\s*/\s*(\d{1,5})").unwrap());
static HP_LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)HP[:\s]*(\d{1,5})").unwrap());

/// Upper-cased text used for marker matching
pub fn normalize(text: &str) -> String {
    text.to_uppercase()
}

/// Trimmed, upper-cased element label
pub fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// First `<int> / <int>` pair anywhere in the text
///
/// This also matches unrelated ratios (reward counters and the like); the
/// first one in document order wins. Pairs that do not fit a `u32` are
/// skipped.
pub fn first_ratio(text: &str) -> Option<(u32, u32)> {
    RATIO_RE.captures_iter(text).find_map(|caps| {
        let left = caps.get(1)?.as_str().parse().ok()?;
        let right = caps.get(2)?.as_str().parse().ok()?;
        Some((left, right))
    })
}

/// Read a location popup from one snapshot
///
/// `locations` are checked in order and the first name present wins, no
/// matter where in the text it appears.
pub fn parse_popup<'a, I>(text: &str, labels: &[String], locations: I) -> PopupState
where
    I: IntoIterator<Item = &'a str>,
{
    let upper = normalize(text);
    if !upper.contains(POPUP_MARKER) {
        return PopupState::closed();
    }

    let location = locations
        .into_iter()
        .find(|name| upper.contains(&normalize(name)))
        .map(str::to_string);

    let (attempts, max_attempts) = first_ratio(text).unwrap_or((0, 0));

    let mut play_offered = false;
    let mut is_locked = false;
    for label in labels {
        match normalize_label(label).as_str() {
            PLAY_LABEL => play_offered = true,
            LOCKED_LABEL => is_locked = true,
            _ => {}
        }
    }

    PopupState {
        is_open: true,
        location,
        attempts,
        max_attempts,
        can_play: play_offered && !is_locked && attempts > 0,
        is_locked,
        exhausted: upper.contains(EXHAUSTED_MARKER) || attempts == 0,
    }
}

/// Player-turn and battle-over markers
pub fn parse_phase(text: &str) -> BattlePhase {
    let upper = normalize(text);
    let player_turn = upper.contains(END_TURN_MARKER);

    let terminal = contains_any(&upper, &TERMINAL_MARKERS);
    let result_screen = upper.contains(CONTINUE_MARKER) && contains_any(&upper, &REWARD_MARKERS);
    let back_on_map = !player_turn && MAP_VIEW_MARKERS.iter().all(|m| upper.contains(m));

    BattlePhase {
        player_turn,
        battle_over: terminal || result_screen || back_on_map,
    }
}

/// Monster hit points, best effort
///
/// Takes the first number of the first `current / max` ratio, falling back
/// to an `HP: n` label. Any other ratio on the page (a reward counter, an
/// attempts display) is picked up just the same and can make a play look
/// confirmed when it was not. `None` means unknown, never zero.
pub fn parse_hit_points(text: &str) -> Option<u32> {
    [&*HP_RATIO_RE, &*HP_LABEL_RE]
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether the post-battle result screen is still up
pub fn result_screen_visible(text: &str) -> bool {
    contains_any(&normalize(text), &RESULT_SCREEN_MARKERS)
}

/// Whether the game shell has loaded after authentication
pub fn game_ready(text: &str) -> bool {
    contains_any(&normalize(text), &GAME_READY_MARKERS)
}

/// Whether the home tab has loaded
pub fn home_ready(text: &str) -> bool {
    contains_any(&normalize(text), &HOME_READY_MARKERS)
}
