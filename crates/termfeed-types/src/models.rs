use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a post interaction. Stored in the `post_interactions.kind` column
/// and enforced there by a CHECK constraint; at most one row per
/// (post, user, kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Like,
    Repost,
}

impl InteractionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Repost => "repost",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(InteractionKind::Like),
            "repost" => Ok(InteractionKind::Repost),
            other => Err(format!("unknown interaction kind: {other}")),
        }
    }
}

/// Kind tag on a notification row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Mention,
    Like,
    Repost,
    Follow,
    Comment,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Mention => "mention",
            NotificationKind::Like => "like",
            NotificationKind::Repost => "repost",
            NotificationKind::Follow => "follow",
            NotificationKind::Comment => "comment",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mention" => Ok(NotificationKind::Mention),
            "like" => Ok(NotificationKind::Like),
            "repost" => Ok(NotificationKind::Repost),
            "follow" => Ok(NotificationKind::Follow),
            "comment" => Ok(NotificationKind::Comment),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_kind_round_trips() {
        assert_eq!("like".parse::<InteractionKind>(), Ok(InteractionKind::Like));
        assert_eq!(InteractionKind::Repost.as_str(), "repost");
        assert!("boost".parse::<InteractionKind>().is_err());
    }

    #[test]
    fn notification_kind_round_trips() {
        for kind in [
            NotificationKind::Mention,
            NotificationKind::Like,
            NotificationKind::Repost,
            NotificationKind::Follow,
            NotificationKind::Comment,
        ] {
            assert_eq!(kind.as_str().parse::<NotificationKind>(), Ok(kind));
        }
    }
}
