use std::sync::Arc;

use regex::Regex;
use saarthi_agents::TransitAgent;
use saarthi_core::{AssistantReply, ChatInput, IntentKind, Language, ScheduleStore};
use saarthi_lm::LmStack;
use saarthi_observability::AppMetrics;
use saarthi_storage::{ComplaintRepository, MemoryStore};

fn agent_with(lm: LmStack) -> (TransitAgent<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    let agent = TransitAgent::new(
        Arc::new(ScheduleStore::sample()),
        lm,
        Arc::new(store.clone()),
        AppMetrics::shared(),
    );
    (agent, store)
}

async fn ask(agent: &TransitAgent<MemoryStore>, text: &str) -> AssistantReply {
    agent
        .handle_message(ChatInput {
            text: text.to_string(),
            language: None,
        })
        .await
        .expect("dispatch should succeed")
}

#[tokio::test]
async fn fare_query_answers_with_the_fare() {
    let (agent, _) = agent_with(LmStack::disabled());
    let reply = ask(&agent, "fare of bus 702").await;

    assert_eq!(reply.intent, IntentKind::FareQuery);
    assert_eq!(reply.language, Language::En);
    assert!(reply.reply_text.contains("220"), "got: {}", reply.reply_text);
    assert_eq!(reply.reply_text, reply.speak_text);
}

#[tokio::test]
async fn hinglish_next_bus_miss_stays_hinglish() {
    let (agent, _) = agent_with(LmStack::disabled());
    let reply = ask(&agent, "Delhi se Karnal agla bus").await;

    assert_eq!(reply.intent, IntentKind::RouteQuery);
    assert_eq!(reply.language, Language::HiLatn);
    assert!(
        reply.reply_text.contains("agla bus nahi mila"),
        "got: {}",
        reply.reply_text
    );
}

#[tokio::test]
async fn bare_number_falls_through_to_bus_details() {
    let (agent, _) = agent_with(LmStack::disabled());
    let reply = ask(&agent, "702").await;

    assert_eq!(reply.intent, IntentKind::Unknown);
    assert!(reply.reply_text.contains("Agra"));
    assert!(reply.reply_text.contains("Lucknow"));
    assert!(reply.reply_text.contains("11:45 AM"));
}

#[tokio::test]
async fn complaint_lodges_a_ticket() {
    let (agent, store) = agent_with(LmStack::disabled());
    let reply = ask(&agent, "complaint bus 702 driver rude").await;

    assert_eq!(reply.intent, IntentKind::Complaint);
    let ticket_id = reply.ticket_id.expect("ticket id should be set");
    let pattern = Regex::new(r"^C-\d{4}$").unwrap();
    assert!(pattern.is_match(&ticket_id), "got: {ticket_id}");
    assert!(reply.reply_text.contains(&ticket_id));

    let tickets = store.list_complaints().await.unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].ticket_id, ticket_id);
    assert_eq!(tickets[0].bus_number, "702");
    assert_eq!(tickets[0].complaint_text, "complaint bus 702 driver rude");
}

#[tokio::test]
async fn missing_bus_number_prompts_without_touching_the_store() {
    let (agent, _) = agent_with(LmStack::disabled());
    let reply = ask(&agent, "kya kiraya hai").await;

    assert_eq!(reply.intent, IntentKind::FareQuery);
    assert_eq!(reply.language, Language::HiLatn);
    assert!(
        reply.reply_text.contains("bus number bataiye"),
        "got: {}",
        reply.reply_text
    );
}

#[tokio::test]
async fn unknown_intent_uses_the_scripted_model_verbatim() {
    let (agent, _) = agent_with(LmStack::scripted("scripted answer"));
    let reply = ask(&agent, "tell me something nice").await;

    assert_eq!(reply.intent, IntentKind::Unknown);
    assert_eq!(reply.reply_text, "scripted answer");
}

#[tokio::test]
async fn unknown_intent_without_model_gets_generic_message() {
    let (agent, _) = agent_with(LmStack::disabled());
    let reply = ask(&agent, "abracadabra").await;

    assert_eq!(reply.intent, IntentKind::Unknown);
    assert_eq!(reply.language, Language::En);
    assert!(reply.reply_text.contains("not sure I understood"));
}

#[tokio::test]
async fn devanagari_greeting_is_answered_in_hindi() {
    let (agent, _) = agent_with(LmStack::disabled());
    let reply = ask(&agent, "नमस्ते").await;

    assert_eq!(reply.intent, IntentKind::Greeting);
    assert_eq!(reply.language, Language::Hi);
    assert!(reply.reply_text.contains("सारथी"));
}

#[tokio::test]
async fn timing_query_reads_the_departure() {
    let (agent, _) = agent_with(LmStack::disabled());
    let reply = ask(&agent, "timing of 1001").await;

    assert_eq!(reply.intent, IntentKind::TimingQuery);
    assert!(reply.reply_text.contains("6:15 PM"));
}

#[tokio::test]
async fn route_listing_names_every_match() {
    let (agent, _) = agent_with(LmStack::disabled());
    let reply = ask(&agent, "buses from Agra to Lucknow").await;

    assert_eq!(reply.intent, IntentKind::RouteQuery);
    assert!(reply.reply_text.contains("702"));
    assert!(reply.reply_text.contains("1001"));
    assert_eq!(reply.reply_text.lines().count(), 2);
}

#[tokio::test]
async fn empty_period_degrades_to_the_full_listing() {
    let (agent, _) = agent_with(LmStack::disabled());
    let reply = ask(&agent, "night buses from Agra to Lucknow").await;

    assert_eq!(reply.intent, IntentKind::RouteQuery);
    assert!(
        reply.reply_text.contains("Available buses"),
        "got: {}",
        reply.reply_text
    );
    assert!(reply.reply_text.contains("702 at 11:45 AM"));
}

#[tokio::test]
async fn track_query_reports_a_simulated_position() {
    let (agent, _) = agent_with(LmStack::disabled());
    let reply = ask(&agent, "where is 702").await;

    assert_eq!(reply.intent, IntentKind::TrackQuery);
    assert!(reply.reply_text.starts_with("Bus 702 is currently near"));
}

#[tokio::test]
async fn status_query_is_stable_across_calls() {
    let (agent, _) = agent_with(LmStack::disabled());
    let first = ask(&agent, "status of bus 702").await;
    let second = ask(&agent, "status of bus 702").await;

    assert_eq!(first.intent, IntentKind::StatusQuery);
    assert_eq!(first.reply_text, second.reply_text);
}

#[tokio::test]
async fn every_turn_lands_in_the_transcript() {
    let (agent, store) = agent_with(LmStack::disabled());
    ask(&agent, "fare of bus 702").await;
    ask(&agent, "702").await;

    let turns = store.turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].intent, IntentKind::FareQuery);
    assert_eq!(turns[1].intent, IntentKind::Unknown);
    assert_eq!(turns[0].user_text, "fare of bus 702");
}
