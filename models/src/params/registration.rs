use serde::{Deserialize, Deserializer};
use validator::Validate;

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterParticipantParams {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(email)]
    pub contact: String,
    pub category: Option<String>,
}

#[derive(Deserialize, Validate, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CorrectRegistrationParams {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,
    #[validate(email)]
    pub contact: Option<String>,
    /// Absent leaves the category alone, `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
}

/// Marks a field that was present in the payload, even when it was `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
