use crate::domain::{Game, SeatResult};

/// Recorded games, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameLedger {
    games: Vec<Game>,
}

impl GameLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_games(games: Vec<Game>) -> Self {
        Self { games }
    }

    pub fn prepend(&mut self, game: Game) {
        self.games.insert(0, game);
    }

    pub fn get(&self, id: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: &str) -> Option<Game> {
        let idx = self.games.iter().position(|g| g.id == id)?;
        Some(self.games.remove(idx))
    }

    /// Swaps a game's results in place, returning the previous set.
    pub fn replace_results(&mut self, id: &str, results: [SeatResult; 4]) -> Option<[SeatResult; 4]> {
        let game = self.games.iter_mut().find(|g| g.id == id)?;
        Some(std::mem::replace(&mut game.results, results))
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    /// Games in the order they were recorded.
    pub fn oldest_first(&self) -> impl Iterator<Item = &Game> {
        self.games.iter().rev()
    }

    /// 1-based position in the history, newest game being 1.
    pub fn number_of(&self, id: &str) -> Option<usize> {
        self.games.iter().position(|g| g.id == id).map(|idx| idx + 1)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn into_games(self) -> Vec<Game> {
        self.games
    }
}
