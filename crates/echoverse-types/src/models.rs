use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub username: String,
}

/// The fixed set of reactions a user can attach to a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Heart,
    Sad,
    Wow,
}

impl ReactionType {
    pub const ALL: [ReactionType; 3] = [ReactionType::Heart, ReactionType::Sad, ReactionType::Wow];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heart => "heart",
            Self::Sad => "sad",
            Self::Wow => "wow",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reaction type: {0}")]
pub struct UnknownReactionType(pub String);

impl FromStr for ReactionType {
    type Err = UnknownReactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heart" => Ok(Self::Heart),
            "sad" => Ok(Self::Sad),
            "wow" => Ok(Self::Wow),
            other => Err(UnknownReactionType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub reaction_type: ReactionType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub commenter_alias: Option<String>,
    pub created_at: DateTime<Utc>,
}

// -- Inserts --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewStory {
    pub author_id: Uuid,
    pub content: String,
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewReaction {
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub reaction_type: ReactionType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewComment {
    pub story_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub commenter_alias: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_type_parses_known_names() {
        for kind in ReactionType::ALL {
            assert_eq!(kind.as_str().parse::<ReactionType>().unwrap(), kind);
        }
        assert!("like".parse::<ReactionType>().is_err());
    }

    #[test]
    fn reaction_type_serializes_lowercase() {
        let json = serde_json::to_string(&ReactionType::Wow).unwrap();
        assert_eq!(json, "\"wow\"");
        assert!(serde_json::from_str::<ReactionType>("\"angry\"").is_err());
    }
}
