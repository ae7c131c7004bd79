use uuid::Uuid;

/// The player whose interaction triggered a loot operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    /// Spectators can look into containers but never trigger generation.
    pub spectator: bool,
}

impl Player {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            spectator: false,
        }
    }

    pub fn spectating(mut self) -> Self {
        self.spectator = true;
        self
    }
}
