use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentParams {
    #[validate(length(min = 1, max = 1024))]
    pub title: String,
    #[validate(range(min = 2, max = 1024))]
    pub max_participants: i32,
    /// Pins the first-round shuffle. Drawn at random when absent.
    pub seed: Option<u64>,
}
