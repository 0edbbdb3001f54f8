use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    En,
    #[serde(rename = "hi")]
    Hi,
    #[serde(rename = "hi-latn")]
    HiLatn,
}

impl Language {
    pub fn from_optional_str(value: Option<&str>) -> Option<Self> {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "en" || v == "en-us" || v == "english" => Some(Self::En),
            Some(v) if v == "hi" || v == "hi-in" || v == "hindi" => Some(Self::Hi),
            Some(v) if v == "hi-latn" || v == "hinglish" => Some(Self::HiLatn),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::HiLatn => "hi-latn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Period {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "morning" | "subah" | "सुबह" => Some(Self::Morning),
            "afternoon" | "dopahar" | "दोपहर" => Some(Self::Afternoon),
            "evening" | "shaam" | "शाम" => Some(Self::Evening),
            "night" | "raat" | "रात" => Some(Self::Night),
            _ => None,
        }
    }

    pub fn contains_hour(self, hour: u32) -> bool {
        match self {
            Self::Morning => (5..12).contains(&hour),
            Self::Afternoon => (12..17).contains(&hour),
            Self::Evening => (17..21).contains(&hour),
            Self::Night => hour >= 21 || hour < 5,
        }
    }

    pub fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (Self::Morning, Language::En) => "morning",
            (Self::Morning, Language::Hi) => "सुबह",
            (Self::Morning, Language::HiLatn) => "subah",
            (Self::Afternoon, Language::En) => "afternoon",
            (Self::Afternoon, Language::Hi) => "दोपहर",
            (Self::Afternoon, Language::HiLatn) => "dopahar",
            (Self::Evening, Language::En) => "evening",
            (Self::Evening, Language::Hi) => "शाम",
            (Self::Evening, Language::HiLatn) => "shaam",
            (Self::Night, Language::En) => "night",
            (Self::Night, Language::Hi) => "रात",
            (Self::Night, Language::HiLatn) => "raat",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleRecord {
    pub bus_id: String,
    pub source: String,
    pub destination: String,
    pub time: String,
    pub fare: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Greeting,
    FareQuery,
    TimingQuery,
    TrackQuery,
    StatusQuery,
    RouteQuery,
    Complaint,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    FareQuery {
        bus_number: Option<String>,
    },
    TimingQuery {
        bus_number: Option<String>,
    },
    TrackQuery {
        bus_number: Option<String>,
        source: Option<String>,
        destination: Option<String>,
    },
    StatusQuery {
        bus_number: Option<String>,
    },
    RouteQuery {
        source: String,
        destination: String,
        period: Option<Period>,
        ask_next: bool,
    },
    Complaint {
        bus_number: Option<String>,
        complaint_text: String,
    },
    Unknown,
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::Greeting => IntentKind::Greeting,
            Self::FareQuery { .. } => IntentKind::FareQuery,
            Self::TimingQuery { .. } => IntentKind::TimingQuery,
            Self::TrackQuery { .. } => IntentKind::TrackQuery,
            Self::StatusQuery { .. } => IntentKind::StatusQuery,
            Self::RouteQuery { .. } => IntentKind::RouteQuery,
            Self::Complaint { .. } => IntentKind::Complaint,
            Self::Unknown => IntentKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedIntent {
    pub intent: Intent,
    pub language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintTicket {
    pub ticket_id: String,
    pub bus_number: String,
    pub complaint_text: String,
    pub filed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub at: DateTime<Utc>,
    pub user_text: String,
    pub assistant_text: String,
    pub intent: IntentKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInput {
    pub text: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub reply_text: String,
    pub speak_text: String,
    pub language: Language,
    pub intent: IntentKind,
    pub ticket_id: Option<String>,
}
