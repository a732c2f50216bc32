//! Plain-text rendering of ledger state for the terminal.

use colored::Colorize;
use std::fmt::Write;

use crate::config::DisplaySettings;
use crate::domain::{Game, Player};
use crate::engine::ReconcileReport;

const CROWN: &str = "👑";

/// Signed points, green above zero and red below.
pub fn points(value: f64, display: &DisplaySettings) -> String {
    tint(format!("{:+.*}", display.decimals, value), value, display)
}

fn tint(text: String, value: f64, display: &DisplaySettings) -> String {
    if !display.color {
        return text;
    }
    if value > 0.0 {
        text.green().to_string()
    } else if value < 0.0 {
        text.red().to_string()
    } else {
        text
    }
}

fn heading(text: &str, display: &DisplaySettings) -> String {
    if display.color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

pub fn leaderboard(players: &[Player], display: &DisplaySettings) -> String {
    if players.is_empty() {
        return "No players registered yet.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        heading(
            &format!(
                "{:<4}{:<20}{:>10}{:>7}{:>10}  {}",
                "#", "Player", "Points", "Games", "Avg rank", "1st/2nd/3rd/4th"
            ),
            display
        )
    );

    for (idx, player) in players.iter().enumerate() {
        let marker = if idx == 0 && player.games_played > 0 {
            format!("{CROWN} ")
        } else {
            String::new()
        };
        let counts = player.rank_counts.as_array();
        // pad before colouring so escape codes do not break the columns
        let total = format!("{:>10}", format!("{:+.*}", display.decimals, player.total_points));
        let total = tint(total, player.total_points, display);

        let _ = writeln!(
            out,
            "{:<4}{:<20}{}{:>7}{:>10.2}  {}/{}/{}/{}",
            idx + 1,
            format!("{marker}{}", player.name),
            total,
            player.games_played,
            player.average_rank,
            counts[0],
            counts[1],
            counts[2],
            counts[3]
        );
    }
    out.trim_end().to_string()
}

/// One game: header line then the four results in rank order.
pub fn game(number: usize, game: &Game, display: &DisplaySettings) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} - {} ({})",
        heading(&format!("Game {number}"), display),
        game.date.format("%Y-%m-%d %H:%M"),
        game.id
    );
    for result in &game.results {
        let _ = writeln!(
            out,
            "  {}. {:<20}{:<12}{:>10}  {}",
            result.rank,
            result.name,
            result.position.to_string(),
            result.final_score,
            points(result.leaderboard_score, display)
        );
    }
    out.trim_end().to_string()
}

/// Games numbered by history position, most recent first.
pub fn history(games: &[Game], limit: Option<usize>, display: &DisplaySettings) -> String {
    if games.is_empty() {
        return "No games recorded yet.".to_string();
    }

    games
        .iter()
        .take(limit.unwrap_or(games.len()))
        .enumerate()
        .map(|(idx, g)| game(idx + 1, g, display))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn reconcile(report: &ReconcileReport, applied: bool, display: &DisplaySettings) -> String {
    let mut out = String::new();
    if report.is_consistent() {
        let _ = write!(
            out,
            "Statistics match the {} recorded games.",
            report.games_replayed
        );
        return out;
    }

    let verb = if applied { "corrected" } else { "differs" };
    for drift in &report.drifted {
        let _ = writeln!(
            out,
            "{} {}: {} points over {} games, log says {} over {}",
            drift.stored.name,
            verb,
            points(drift.stored.total_points, display),
            drift.stored.games_played,
            points(drift.expected.total_points, display),
            drift.expected.games_played
        );
    }
    for name in &report.orphaned {
        let _ = writeln!(out, "{name} appears in games but is not a registered player");
    }
    if !applied && !report.drifted.is_empty() {
        let _ = writeln!(out, "Run `reconcile` to rebuild statistics from the game log.");
    }
    out.trim_end().to_string()
}
