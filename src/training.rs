//! Training video catalog
//!
//! Twelve drill videos grouped into four categories, and the small view
//! state of a browser that opens one of them at a time.

use enum_map::{Enum, EnumMap, enum_map};
use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::Duration;

use crate::constants::training::{MAX_DESCRIPTION_LENGTH, MAX_RATING, MAX_TITLE_LENGTH};

/// Errors from the video catalog and browser
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No video has the requested id
    #[error("no video with id {0}")]
    UnknownVideo(String),
    /// Two videos share an id
    #[error("duplicate video id {0}")]
    DuplicateId(String),
    /// A video failed validation
    #[error("invalid video: {0}")]
    Invalid(String),
}

/// Topic a video belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum VideoCategory {
    /// Fire safety and evacuation
    FireSafety,
    /// Earthquake drills
    Earthquake,
    /// First aid and CPR
    FirstAid,
    /// Lockdown and security procedures
    Lockdown,
}

impl VideoCategory {
    /// Section heading of the category
    pub fn title(self) -> &'static str {
        match self {
            Self::FireSafety => "Fire Safety & Evacuation",
            Self::Earthquake => "Earthquake Safety Drills",
            Self::FirstAid => "First Aid & CPR Training",
            Self::Lockdown => "Lockdown & Security Procedures",
        }
    }
}

/// A training video hosted on YouTube
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Video {
    /// Catalog-wide unique id
    #[garde(length(min = 1))]
    pub id: String,
    /// Title
    #[garde(length(chars, min = 1, max = MAX_TITLE_LENGTH))]
    pub title: String,
    /// Running time
    #[garde(skip)]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub duration: Duration,
    /// View count
    #[garde(skip)]
    pub views: u64,
    /// Average rating out of five
    #[garde(range(min = 0.0, max = MAX_RATING))]
    pub rating: f32,
    /// YouTube video key
    #[garde(length(min = 1), ascii)]
    pub video_key: String,
    /// Short description
    #[garde(length(chars, max = MAX_DESCRIPTION_LENGTH))]
    pub description: String,
}

impl Video {
    fn new(
        id: &str,
        title: &str,
        duration_seconds: u64,
        views: u64,
        rating: f32,
        video_key: &str,
        description: &str,
    ) -> Self {
        Self {
            id: id.to_owned(),
            title: title.to_owned(),
            duration: Duration::from_secs(duration_seconds),
            views,
            rating,
            video_key: video_key.to_owned(),
            description: description.to_owned(),
        }
    }

    /// Full size thumbnail image
    pub fn thumbnail_url(&self) -> String {
        format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", self.video_key)
    }

    /// Embeddable player address
    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.video_key)
    }

    /// Running time as `m:ss`
    pub fn duration_display(&self) -> String {
        let seconds = self.duration.as_secs();
        format!("{}:{:02}", seconds / 60, seconds % 60)
    }

    /// View count in compact form, e.g. `3.2M`, `112K`
    pub fn views_display(&self) -> String {
        #[allow(clippy::cast_precision_loss)]
        let compact = |value: u64, unit: u64, suffix: &str| {
            let scaled = value as f64 / unit as f64;
            if scaled < 10.0 {
                format!("{scaled:.1}{suffix}")
            } else {
                format!("{scaled:.0}{suffix}")
            }
        };

        match self.views {
            v if v >= 1_000_000 => compact(v, 1_000_000, "M"),
            v if v >= 1_000 => compact(v, 1_000, "K"),
            v => v.to_string(),
        }
    }
}

/// Videos grouped by category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    videos: EnumMap<VideoCategory, Vec<Video>>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// Builds a catalog after validating every video
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invalid`] if a video fails validation and
    /// [`Error::DuplicateId`] if two videos share an id.
    pub fn new(videos: EnumMap<VideoCategory, Vec<Video>>) -> Result<Self, Error> {
        let all = videos.values().flatten();
        for video in all.clone() {
            video
                .validate()
                .map_err(|report| Error::Invalid(format!("{}: {report}", video.id)))?;
        }
        if let Some(id) = all.map(|video| video.id.as_str()).duplicates().next() {
            return Err(Error::DuplicateId(id.to_owned()));
        }

        Ok(Self { videos })
    }

    /// The twelve shipped videos
    pub fn standard() -> Self {
        Self {
            videos: enum_map! {
                VideoCategory::FireSafety => vec![
                    Video::new(
                        "1",
                        "School Fire Drill #13 - Real School Evacuation",
                        323,
                        3_200_000,
                        4.9,
                        "O1uEpFw0pFk",
                        "Real high school fire drill showing proper evacuation procedures, alarm systems, and student response protocols.",
                    ),
                    Video::new(
                        "2",
                        "Fire Drills at School - Firefighter Training",
                        285,
                        112_000,
                        4.8,
                        "UbBT7ZLg2Bk",
                        "Professional firefighter demonstrates proper fire drill procedures specifically for school environments.",
                    ),
                    Video::new(
                        "3",
                        "Fire Mock Drill Training - Complete Procedure",
                        510,
                        45_000,
                        4.7,
                        "atwOKIaBX84",
                        "Comprehensive fire evacuation drill training video showing complete emergency response procedures.",
                    ),
                ],
                VideoCategory::Earthquake => vec![
                    Video::new(
                        "4",
                        "Drop, Cover, and Hold On - Official Training",
                        252,
                        150_000,
                        4.9,
                        "aV89_yUJunM",
                        "Official earthquake safety demonstration showing proper Drop, Cover, and Hold On procedures for classrooms.",
                    ),
                    Video::new(
                        "5",
                        "Earthquake Safety for Kids - School Training",
                        225,
                        89_000,
                        4.8,
                        "YWTsoSU1BMg",
                        "Educational video teaching children the three essential steps for earthquake safety in school settings.",
                    ),
                    Video::new(
                        "6",
                        "Drop, Cover, Hold On - Real Classroom Demo",
                        375,
                        21_000,
                        4.6,
                        "wnACXbcdkDA",
                        "Real classroom demonstration of earthquake response procedures with students and teachers.",
                    ),
                ],
                VideoCategory::FirstAid => vec![
                    Video::new(
                        "7",
                        "CPR in Schools Training Kit Demo",
                        735,
                        1_600,
                        4.8,
                        "-DK99mmo4NM",
                        "Professional demonstration of CPR training specifically designed for school environments and staff.",
                    ),
                    Video::new(
                        "8",
                        "Red Cross CPR Basics for Schools",
                        510,
                        34_000,
                        4.7,
                        "_zJQUUj2Oo8",
                        "American Red Cross CPR training basics designed for school staff and older students.",
                    ),
                    Video::new(
                        "9",
                        "How to Perform CPR - Step by Step Guide",
                        645,
                        2_100_000,
                        4.9,
                        "Plse2FOkV4Q",
                        "Detailed step-by-step CPR demonstration for emergency situations in educational settings.",
                    ),
                ],
                VideoCategory::Lockdown => vec![
                    Video::new(
                        "10",
                        "Inside Look: School Lockdown Drills",
                        585,
                        125_000,
                        4.7,
                        "DH_qQ4MtxTY",
                        "School resource officers demonstrate proper lockdown procedures and safety protocols.",
                    ),
                    Video::new(
                        "11",
                        "Real World Lockdown Drill Training",
                        440,
                        3_700,
                        4.5,
                        "kPvNYkNSNt0",
                        "Real lockdown drill showing classroom security measures and student response procedures.",
                    ),
                    Video::new(
                        "12",
                        "School Emergency Safety Procedures",
                        680,
                        18_000,
                        4.6,
                        "Qu2KjEb79rs",
                        "Comprehensive guide to handling various school emergency situations including lockdowns and evacuations.",
                    ),
                ],
            },
        }
    }

    /// Videos of `category`, in display order
    pub fn videos(&self, category: VideoCategory) -> &[Video] {
        &self.videos[category]
    }

    /// Categories with their videos, in display order
    pub fn categories(&self) -> impl Iterator<Item = (VideoCategory, &[Video])> {
        self.videos
            .iter()
            .map(|(category, videos)| (category, videos.as_slice()))
    }

    /// Looks a video up by id
    pub fn find(&self, id: &str) -> Option<&Video> {
        self.videos.values().flatten().find(|video| video.id == id)
    }

    /// Total number of videos
    pub fn len(&self) -> usize {
        self.videos.values().map(Vec::len).sum()
    }

    /// Whether the catalog holds no videos
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// View state of the video browser
#[derive(Debug, Clone, Default)]
pub struct Browser {
    catalog: Catalog,
    selected: Option<String>,
}

impl Browser {
    /// Browses `catalog` with nothing open
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            selected: None,
        }
    }

    /// Opens the video with `id`, replacing any open one
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVideo`] if no video has that id; the current
    /// selection is left untouched.
    pub fn open(&mut self, id: &str) -> Result<&Video, Error> {
        let video = self
            .catalog
            .find(id)
            .ok_or_else(|| Error::UnknownVideo(id.to_owned()))?;
        tracing::info!(id, title = %video.title, "playing video");
        self.selected = Some(id.to_owned());
        Ok(video)
    }

    /// Closes the open video
    pub fn close(&mut self) {
        self.selected = None;
    }

    /// The open video, if any
    pub fn selected(&self) -> Option<&Video> {
        self.selected.as_deref().and_then(|id| self.catalog.find(id))
    }

    /// The browsed catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
