use crate::domain::{Seat, normalize_name};
use crate::errors::{LedgerError, LedgerResult};

/// One seat of the record-game form, as entered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeatEntry {
    pub player: Option<String>,
    pub final_score: Option<String>,
}

impl SeatEntry {
    pub fn new(player: impl Into<String>, final_score: impl Into<String>) -> Self {
        Self {
            player: Some(player.into()),
            final_score: Some(final_score.into()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    fn player_name(&self) -> Option<&str> {
        self.player
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Checks that all four seats are filled with four different players.
pub(crate) fn validate_selection(seats: &[SeatEntry; 4]) -> LedgerResult<[(Seat, String); 4]> {
    let filled = seats.iter().filter(|s| s.player_name().is_some()).count();
    if filled != 4 {
        return Err(LedgerError::IncompleteSelection { filled });
    }

    let names: [&str; 4] = std::array::from_fn(|i| seats[i].player_name().unwrap_or_default());
    for (i, name) in names.iter().enumerate() {
        let key = normalize_name(name);
        if names[..i].iter().any(|earlier| normalize_name(earlier) == key) {
            return Err(LedgerError::DuplicatePlayer {
                name: name.to_string(),
            });
        }
    }

    Ok(std::array::from_fn(|i| (Seat::ALL[i], names[i].to_string())))
}

/// Parses every seat's score in seat order, stopping at the first bad one.
pub(crate) fn parse_scores(
    seated: [(Seat, String); 4],
    raw: [Option<&str>; 4],
) -> LedgerResult<[(Seat, String, f64); 4]> {
    let mut scores = [0.0; 4];
    for (idx, (seat, player)) in seated.iter().enumerate() {
        scores[idx] = parse_final_score(*seat, player, raw[idx])?;
    }

    Ok(std::array::from_fn(|i| {
        let (seat, player) = &seated[i];
        (*seat, player.clone(), scores[i])
    }))
}

/// A final score must be present, finite and not negative.
pub fn parse_final_score(seat: Seat, player: &str, raw: Option<&str>) -> LedgerResult<f64> {
    let input = raw.unwrap_or_default().trim();
    let invalid = || LedgerError::InvalidScore {
        seat,
        player: player.to_string(),
        input: input.to_string(),
    };

    let score: f64 = input.parse().map_err(|_| invalid())?;
    if !score.is_finite() || score < 0.0 {
        return Err(invalid());
    }

    // "-0" parses as negative zero
    Ok(score.abs())
}
