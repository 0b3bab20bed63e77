use models::domains::{matches, rounds, tournaments};

#[derive(Debug, Clone)]
pub struct InitializedBracket {
    pub tournament: tournaments::Model,
    /// Every round shell in `order`, the first one populated.
    pub rounds: Vec<rounds::Model>,
    pub matches: Vec<matches::Model>,
}

#[derive(Debug, Clone)]
pub struct GeneratedRound {
    pub round: rounds::Model,
    pub matches: Vec<matches::Model>,
}

#[derive(Debug, Clone)]
pub struct AdvancedRound {
    pub next: GeneratedRound,
    /// Populated only when advancing out of the semifinal.
    pub third_place: Option<GeneratedRound>,
}
