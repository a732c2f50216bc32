use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, params};

use crate::domain::{Game, Seat, SeatResult};
use crate::scoring::Rank;

pub fn insert_all(conn: &Connection, games: &[Game]) -> Result<()> {
    let game_sql = "INSERT INTO games (id, ordinal, date) VALUES (?1, ?2, ?3)";
    let result_sql = "INSERT INTO results (game_id, rank, name, position, final_score, leaderboard_score) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

    let mut game_stmt = conn.prepare(game_sql)?;
    let mut result_stmt = conn.prepare(result_sql)?;

    for (ordinal, game) in games.iter().enumerate() {
        game_stmt
            .execute(params![game.id, ordinal as i64, game.date])
            .with_context(|| format!("Failed to insert game {}", game.id))?;

        for result in &game.results {
            result_stmt
                .execute(params![
                    game.id,
                    result.rank.number(),
                    result.name,
                    result.position.glyph(),
                    result.final_score,
                    result.leaderboard_score
                ])
                .with_context(|| format!("Failed to insert result for game {}", game.id))?;
        }
    }

    Ok(())
}

fn parse_result_row(row: &rusqlite::Row) -> rusqlite::Result<SeatResult> {
    let rank: u8 = row.get(0)?;
    let position: String = row.get(2)?;

    Ok(SeatResult {
        rank: Rank::try_from(rank)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(e)))?,
        name: row.get(1)?,
        position: position.parse::<Seat>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into())
        })?,
        final_score: row.get(3)?,
        leaderboard_score: row.get(4)?,
    })
}

fn list_results(conn: &Connection, game_id: &str) -> Result<Vec<SeatResult>> {
    let sql = "SELECT rank, name, position, final_score, leaderboard_score FROM results WHERE game_id = ?1 ORDER BY rank";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![game_id], parse_result_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read results of game {}", game_id))?;

    Ok(rows)
}

pub fn list_all(conn: &Connection) -> Result<Vec<Game>> {
    let sql = "SELECT id, date FROM games ORDER BY ordinal";

    let mut stmt = conn.prepare(sql)?;
    let headers = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, DateTime<Utc>>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read games")?;

    headers
        .into_iter()
        .map(|(id, date)| {
            let results: [SeatResult; 4] = list_results(conn, &id)?
                .try_into()
                .map_err(|found: Vec<SeatResult>| {
                    anyhow::anyhow!("Game {} has {} results, expected 4", id, found.len())
                })?;
            Ok(Game { id, date, results })
        })
        .collect()
}
