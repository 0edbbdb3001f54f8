use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::{Local, Utc};
use rand::Rng;
use saarthi_core::{
    extract, normalize_text, reply3, simulate_location, simulated_delay_minutes, AssistantReply,
    ChatInput, ChatTurn, ComplaintTicket, Intent, Language, Period, ScheduleStore,
};
use saarthi_lm::LmStack;
use saarthi_observability::AppMetrics;
use saarthi_storage::{ComplaintRepository, TranscriptRepository};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct TransitAgent<S>
where
    S: ComplaintRepository + TranscriptRepository,
{
    schedule: Arc<ScheduleStore>,
    lm: LmStack,
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> TransitAgent<S>
where
    S: ComplaintRepository + TranscriptRepository,
{
    pub fn new(
        schedule: Arc<ScheduleStore>,
        lm: LmStack,
        store: Arc<S>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            schedule,
            lm,
            store,
            metrics,
        }
    }

    pub fn schedule(&self) -> &ScheduleStore {
        &self.schedule
    }

    pub async fn complaints(&self) -> Result<Vec<ComplaintTicket>> {
        self.store.list_complaints().await
    }

    #[instrument(skip(self, input))]
    pub async fn handle_message(&self, input: ChatInput) -> Result<AssistantReply> {
        let started = Instant::now();
        self.metrics.inc_request();

        let normalized = normalize_text(&input.text);
        let extracted = extract(&normalized);
        let language = Language::from_optional_str(input.language.as_deref())
            .unwrap_or(extracted.language);

        let mut ticket_id = None;
        let reply_text = match &extracted.intent {
            Intent::Greeting => reply3(
                "Hello! This is Saarthi. How can I help you with buses today?",
                "नमस्ते! मैं सारथी बोल रही हूँ। बस से जुड़ी क्या मदद करूँ?",
                "Namaste! Main Saarthi bol rahi hoon. Bus se judi kya madad karoon?",
            )
            .pick(language),
            Intent::FareQuery { bus_number } => self.answer_fare(bus_number.as_deref(), language),
            Intent::TimingQuery { bus_number } => {
                self.answer_timing(bus_number.as_deref(), language)
            }
            Intent::TrackQuery { bus_number, .. } => {
                self.answer_track(bus_number.as_deref(), language)
            }
            Intent::StatusQuery { bus_number } => {
                self.answer_status(bus_number.as_deref(), language)
            }
            Intent::RouteQuery {
                source,
                destination,
                period,
                ask_next,
            } => self.answer_route(source, destination, *period, *ask_next, language),
            Intent::Complaint {
                bus_number,
                complaint_text,
            } => {
                let (text, id) = self
                    .lodge_complaint(bus_number.as_deref(), complaint_text, language)
                    .await?;
                ticket_id = id;
                text
            }
            Intent::Unknown => self.resolve_unknown(&normalized, language),
        };

        let kind = extracted.intent.kind();
        self.store
            .append_turn(&ChatTurn {
                at: Utc::now(),
                user_text: normalized,
                assistant_text: reply_text.clone(),
                intent: kind,
            })
            .await?;

        self.metrics.observe_latency(started.elapsed());
        info!(language = %language.as_code(), intent = ?kind, "message handled");

        Ok(AssistantReply {
            speak_text: reply_text.clone(),
            reply_text,
            language,
            intent: kind,
            ticket_id,
        })
    }

    fn answer_fare(&self, bus_number: Option<&str>, language: Language) -> String {
        let Some(number) = bus_number else {
            return reply3(
                "Please tell me the bus number to check the fare.",
                "किराया बताने के लिए बस नंबर बताइए।",
                "Kiraya batane ke liye bus number bataiye.",
            )
            .pick(language);
        };

        match self.schedule.find_by_number(number) {
            Some(bus) => reply3(
                format!("The fare for bus {number} is {}.", bus.fare),
                format!("बस {number} का किराया {} है।", bus.fare),
                format!("Bus {number} ka kiraya {} hai.", bus.fare),
            )
            .pick(language),
            None => self.bus_not_found(number, language),
        }
    }

    fn answer_timing(&self, bus_number: Option<&str>, language: Language) -> String {
        let Some(number) = bus_number else {
            return reply3(
                "Please tell me the bus number to check timing.",
                "समय बताने के लिए बस नंबर बताइए।",
                "Samay batane ke liye bus number bataiye.",
            )
            .pick(language);
        };

        match self.schedule.find_by_number(number) {
            Some(bus) => reply3(
                format!("Bus {number} leaves at {}.", bus.time),
                format!("बस {number} {} बजे निकलती है।", bus.time),
                format!("Bus {number} {} baje nikalti hai.", bus.time),
            )
            .pick(language),
            None => self.bus_not_found(number, language),
        }
    }

    fn answer_track(&self, bus_number: Option<&str>, language: Language) -> String {
        let Some(number) = bus_number else {
            return reply3(
                "Please tell me the bus number to track.",
                "बस ट्रैक करने के लिए बस नंबर बताइए।",
                "Bus track karne ke liye bus number bataiye.",
            )
            .pick(language);
        };

        match self.schedule.find_by_number(number) {
            Some(bus) => {
                let location = simulate_location(bus);
                reply3(
                    format!("Bus {number} is currently near {location}."),
                    format!("बस {number} अभी {location} के पास है।"),
                    format!("Bus {number} abhi {location} ke paas hai."),
                )
                .pick(language)
            }
            None => self.bus_not_found(number, language),
        }
    }

    fn answer_status(&self, bus_number: Option<&str>, language: Language) -> String {
        let Some(number) = bus_number else {
            return reply3(
                "Please tell me the bus number to check status.",
                "स्टेटस बताने के लिए बस नंबर बताइए।",
                "Status batane ke liye bus number bataiye.",
            )
            .pick(language);
        };

        if self.schedule.find_by_number(number).is_none() {
            return self.bus_not_found(number, language);
        }

        let delay = simulated_delay_minutes(number);
        if delay == 0 {
            reply3(
                format!("Bus {number} is on time today."),
                format!("बस {number} आज समय पर है।"),
                format!("Bus {number} aaj samay par hai."),
            )
            .pick(language)
        } else {
            reply3(
                format!("Bus {number} is running {delay} minutes late today."),
                format!("बस {number} आज {delay} मिनट देरी से चल रही है।"),
                format!("Bus {number} aaj {delay} minute late chal rahi hai."),
            )
            .pick(language)
        }
    }

    fn answer_route(
        &self,
        source: &str,
        destination: &str,
        period: Option<Period>,
        ask_next: bool,
        language: Language,
    ) -> String {
        let src = title_case(source);
        let dst = title_case(destination);

        if ask_next {
            return match self
                .schedule
                .next_departure(&src, &dst, Local::now().time())
            {
                Some(bus) => reply3(
                    format!(
                        "Next bus from {src} to {dst} is {} at {} with fare {}.",
                        bus.bus_id, bus.time, bus.fare
                    ),
                    format!(
                        "{src} से {dst} के लिए अगली बस {} है, समय {}, किराया {}।",
                        bus.bus_id, bus.time, bus.fare
                    ),
                    format!(
                        "{src} se {dst} ke liye agla bus {} hai, samay {}, kiraya {}.",
                        bus.bus_id, bus.time, bus.fare
                    ),
                )
                .pick(language),
                None => {
                    self.metrics.inc_lookup_miss();
                    reply3(
                        format!("I could not find the next bus from {src} to {dst}."),
                        format!("माफ़ कीजिए, {src} से {dst} के लिए अगली बस नहीं मिली।"),
                        format!("Maaf kijiye, {src} se {dst} ke liye agla bus nahi mila."),
                    )
                    .pick(language)
                }
            };
        }

        if let Some(period) = period {
            if let Some(bus) = self.schedule.last_in_period(&src, &dst, period) {
                let label = period.label(language);
                return reply3(
                    format!(
                        "The last {label} bus from {src} to {dst} is {} at {}.",
                        bus.bus_id, bus.time
                    ),
                    format!(
                        "{src} से {dst} के लिए {label} की आख़िरी बस {} है, समय {}।",
                        bus.bus_id, bus.time
                    ),
                    format!(
                        "{src} se {dst} ke liye {label} ki aakhri bus {} hai, samay {}.",
                        bus.bus_id, bus.time
                    ),
                )
                .pick(language);
            }

            let matches = self.schedule.find_between(&src, &dst);
            if !matches.is_empty() {
                let label = period.label(language);
                let times = matches
                    .iter()
                    .map(|bus| format!("{} at {}", bus.bus_id, bus.time))
                    .collect::<Vec<_>>()
                    .join(", ");
                return reply3(
                    format!("No specific {label} service. Available buses: {times}."),
                    format!("{label} की कोई विशेष सेवा नहीं है। उपलब्ध बसें: {times}।"),
                    format!("{label} ki koi khaas seva nahi hai. Uplabdh basen: {times}."),
                )
                .pick(language);
            }

            return self.route_not_found(&src, &dst, language);
        }

        let matches = self.schedule.find_between(&src, &dst);
        if !matches.is_empty() {
            let lines: Vec<String> = matches
                .iter()
                .map(|bus| match language {
                    Language::En => format!(
                        "Bus {} from {} to {} at {} (fare {}).",
                        bus.bus_id, bus.source, bus.destination, bus.time, bus.fare
                    ),
                    Language::Hi => format!(
                        "बस {} {} से {} के लिए {} बजे, किराया {}।",
                        bus.bus_id, bus.source, bus.destination, bus.time, bus.fare
                    ),
                    Language::HiLatn => format!(
                        "Bus {} {} se {} ke liye {} baje, kiraya {}.",
                        bus.bus_id, bus.source, bus.destination, bus.time, bus.fare
                    ),
                })
                .collect();
            return lines.join("\n");
        }

        // no direct listing; try the temporal index before giving up
        match self
            .schedule
            .next_departure(&src, &dst, Local::now().time())
        {
            Some(bus) => reply3(
                format!(
                    "No direct listing found. Next bus from {src} to {dst} is {} at {}.",
                    bus.bus_id, bus.time
                ),
                format!(
                    "सीधी सूची नहीं मिली। {src} से {dst} की अगली बस {} है, समय {}।",
                    bus.bus_id, bus.time
                ),
                format!(
                    "Seedhi suchi nahi mili. {src} se {dst} ka agla bus {} hai, samay {}.",
                    bus.bus_id, bus.time
                ),
            )
            .pick(language),
            None => self.route_not_found(&src, &dst, language),
        }
    }

    async fn lodge_complaint(
        &self,
        bus_number: Option<&str>,
        complaint_text: &str,
        language: Language,
    ) -> Result<(String, Option<String>)> {
        let Some(number) = bus_number else {
            let prompt = reply3(
                "Please mention the bus number in your complaint.",
                "कृपया अपनी शिकायत में बस नंबर ज़रूर बताइए।",
                "Kripya apni shikayat mein bus number zarur bataiye.",
            )
            .pick(language);
            return Ok((prompt, None));
        };

        let ticket_id = format!("C-{}", rand::thread_rng().gen_range(1000..=9999));
        let ticket = ComplaintTicket {
            ticket_id: ticket_id.clone(),
            bus_number: number.to_string(),
            complaint_text: complaint_text.to_string(),
            filed_at: Utc::now(),
        };
        self.store.append_complaint(&ticket).await?;
        self.metrics.inc_complaint();
        info!(ticket_id = %ticket_id, bus_number = %number, "complaint lodged");

        let text = reply3(
            format!("Your complaint has been logged. Ticket ID: {ticket_id}."),
            format!("आपकी शिकायत दर्ज हो गई है। टिकट आईडी: {ticket_id}।"),
            format!("Aapki shikayat darj ho gayi hai. Ticket ID: {ticket_id}."),
        )
        .pick(language);
        Ok((text, Some(ticket_id)))
    }

    fn resolve_unknown(&self, text: &str, language: Language) -> String {
        // a bare number is an implicit bus-detail lookup
        if let Some(number) = saarthi_core::intent::extract_bus_number(&text.to_lowercase()) {
            if let Some(bus) = self.schedule.find_by_number(&number) {
                return reply3(
                    format!(
                        "Bus {number} goes from {} to {} at {} with fare {}.",
                        bus.source, bus.destination, bus.time, bus.fare
                    ),
                    format!(
                        "बस {number} {} से {} जाती है, समय {}, किराया {}।",
                        bus.source, bus.destination, bus.time, bus.fare
                    ),
                    format!(
                        "Bus {number} {} se {} jati hai, samay {}, kiraya {}.",
                        bus.source, bus.destination, bus.time, bus.fare
                    ),
                )
                .pick(language);
            }
        }

        if self.lm.enabled {
            self.metrics.inc_lm_inference();
            if let Some(answer) = self.lm.model.generate(text, language) {
                return answer;
            }
        }

        self.metrics.inc_fallback();
        reply3(
            "I am not sure I understood that. Please rephrase.",
            "माफ़ कीजिए, मैं समझ नहीं पाई। कृपया दोबारा बताइए।",
            "Maaf kijiye, main samajh nahi payi. Kripya dobara bataiye.",
        )
        .pick(language)
    }

    fn bus_not_found(&self, number: &str, language: Language) -> String {
        self.metrics.inc_lookup_miss();
        reply3(
            format!("Sorry, I could not find bus {number}."),
            format!("माफ़ कीजिए, मुझे बस {number} नहीं मिली।"),
            format!("Maaf kijiye, mujhe bus {number} nahi mili."),
        )
        .pick(language)
    }

    fn route_not_found(&self, source: &str, destination: &str, language: Language) -> String {
        self.metrics.inc_lookup_miss();
        reply3(
            format!("No buses found between {source} and {destination}."),
            format!("{source} और {destination} के बीच कोई बस नहीं मिली।"),
            format!("{source} aur {destination} ke beech koi bus nahi mili."),
        )
        .pick(language)
    }
}

pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
