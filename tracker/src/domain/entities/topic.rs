//! Topic streams
//!
//! A topic stream is one polling configuration: which newswire tag to
//! follow, how often, and how notifications for it are presented.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Known newswire topics and their API tag ids. `None` means unfiltered.
pub const TOPICS: &[(&str, Option<u32>)] = &[
    ("latest", None),
    ("announcements", Some(722)),
    ("content_updates", Some(705)),
    ("updates", Some(705)),
    ("backward_compatibility", Some(735)),
    ("rockstar_launcher", Some(739)),
    ("fan_videos", Some(706)),
    ("fan_art", Some(708)),
    ("livestream", Some(711)),
    ("in_memoriam", Some(730)),
    ("twitch", Some(712)),
    ("warehouse", Some(191)),
    ("contest", Some(161)),
    ("crews", Some(621)),
    ("crews_recruiting", Some(725)),
    ("events", Some(13)),
    ("music", Some(30)),
    ("rockstar", Some(43)),
    ("sales", Some(661)),
    ("game_tips", Some(121)),
    ("max_payne", Some(25)),
    ("max_payne_3", Some(27)),
    ("grand_theft_auto_vi", Some(666)),
    ("gta_online", Some(702)),
    ("grand_theft_auto_v", Some(591)),
    ("grand_theft_auto_the_trilogy", Some(751)),
    ("creator_jobs", Some(728)),
    ("red_dead_online", Some(736)),
    ("red_dead_redemption_2", Some(716)),
    ("red_dead_redemption", Some(40)),
    ("la_noire", Some(86)),
    ("circoloco_records", Some(1005)),
];

/// Look up a topic's tag id. The outer `None` means the name is unknown.
pub fn lookup_topic(name: &str) -> Option<Option<u32>> {
    TOPICS
        .iter()
        .find(|(topic, _)| *topic == name)
        .map(|(_, id)| *id)
}

/// Date format used when presenting entry dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFormat {
    #[default]
    #[serde(rename = "DD/MM/YYYY")]
    DayMonthYear,
    #[serde(rename = "MM/DD/YYYY")]
    MonthDayYear,
}

impl DateFormat {
    /// chrono format pattern
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => "%d/%m/%Y",
            DateFormat::MonthDayYear => "%m/%d/%Y",
        }
    }
}

/// How notifications for a stream are presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    pub date_format: DateFormat,
    pub profile_name: String,
    pub avatar_url: String,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            date_format: DateFormat::default(),
            profile_name: "Rockstar Newswire Tracker".to_string(),
            avatar_url: super::site::ICON_URL.to_string(),
        }
    }
}

/// One polling configuration, immutable for its lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicStream {
    /// Topic name, e.g. "gta_online"
    pub name: String,
    /// API tag filter; `None` polls the unfiltered listing
    pub topic_id: Option<u32>,
    pub refresh_interval: Duration,
    /// Webhook target; `None` disables notifications for this stream
    pub webhook_url: Option<String>,
    pub display: DisplayOptions,
}
