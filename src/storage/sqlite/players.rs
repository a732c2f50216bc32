use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::domain::{Player, RankCounts};

pub fn insert_all(conn: &Connection, players: &[Player]) -> Result<()> {
    let sql = "INSERT INTO players (id, ordinal, name, total_points, games_played, average_rank, rank_1, rank_2, rank_3, rank_4) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

    let mut stmt = conn.prepare(sql)?;
    for (ordinal, player) in players.iter().enumerate() {
        let [first, second, third, fourth] = player.rank_counts.as_array();
        stmt.execute(params![
            player.id,
            ordinal as i64,
            player.name,
            player.total_points,
            player.games_played,
            player.average_rank,
            first,
            second,
            third,
            fourth
        ])
        .with_context(|| format!("Failed to insert player {}", player.name))?;
    }

    Ok(())
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        total_points: row.get(2)?,
        games_played: row.get(3)?,
        average_rank: row.get(4)?,
        rank_counts: RankCounts::new([row.get(5)?, row.get(6)?, row.get(7)?, row.get(8)?]),
    })
}

pub fn list_all(conn: &Connection) -> Result<Vec<Player>> {
    let sql = "SELECT id, name, total_points, games_played, average_rank, rank_1, rank_2, rank_3, rank_4 FROM players ORDER BY ordinal";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_player_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read players")?;

    Ok(rows)
}
