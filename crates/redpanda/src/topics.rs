//! Topic definitions for event families.

use analytics_core::EventFamily;
use serde::{Deserialize, Serialize};

/// Default topic names for each event family.
pub mod topic {
    pub const VIDEO: &str = "VideoEvents";
    pub const PROBLEM: &str = "ProblemEvents";
    pub const SEQUENTIAL: &str = "SequentialEvents";
    pub const LINK: &str = "LinkEvents";
    pub const BOOKMARK: &str = "BookmarkEvents";

    /// All topics for verification.
    pub const ALL: &[&str] = &[VIDEO, PROBLEM, SEQUENTIAL, LINK, BOOKMARK];
}

/// Topic carrying each family's raw logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicNames {
    #[serde(default = "default_video")]
    pub video: String,
    #[serde(default = "default_problem")]
    pub problem: String,
    #[serde(default = "default_sequential")]
    pub sequential: String,
    #[serde(default = "default_link")]
    pub link: String,
    #[serde(default = "default_bookmark")]
    pub bookmark: String,
}

fn default_video() -> String {
    topic::VIDEO.to_string()
}

fn default_problem() -> String {
    topic::PROBLEM.to_string()
}

fn default_sequential() -> String {
    topic::SEQUENTIAL.to_string()
}

fn default_link() -> String {
    topic::LINK.to_string()
}

fn default_bookmark() -> String {
    topic::BOOKMARK.to_string()
}

impl Default for TopicNames {
    fn default() -> Self {
        Self {
            video: default_video(),
            problem: default_problem(),
            sequential: default_sequential(),
            link: default_link(),
            bookmark: default_bookmark(),
        }
    }
}

impl TopicNames {
    pub fn topic_for(&self, family: EventFamily) -> &str {
        match family {
            EventFamily::Video => &self.video,
            EventFamily::Problem => &self.problem,
            EventFamily::Sequential => &self.sequential,
            EventFamily::Link => &self.link,
            EventFamily::Bookmark => &self.bookmark,
        }
    }

    /// Every configured topic, in family order.
    pub fn all(&self) -> Vec<&str> {
        EventFamily::ALL
            .iter()
            .map(|family| self.topic_for(*family))
            .collect()
    }
}
