use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use saarthi_agents::TransitAgent;
use saarthi_core::{apology, detect, reply3, ChatInput, Period, ScheduleStore};
use saarthi_lm::LmStack;
use saarthi_observability::{init_tracing, AppMetrics};
use saarthi_storage::Store;
use saarthi_voice::VoiceStack;
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "saarthi")]
#[command(about = "Saarthi bus-transport assistant")]
struct Cli {
    #[arg(long, default_value = "data/sample_buses.json")]
    data: PathBuf,

    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Chat,
    Ask {
        text: String,
        #[arg(long)]
        language: Option<String>,
    },
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
    Complaints {
        #[command(subcommand)]
        command: ComplaintCommand,
    },
}

#[derive(Debug, Subcommand)]
enum ScheduleCommand {
    Bus { number: String },
    Between { from: String, to: String },
    Next { from: String, to: String },
    Last { from: String, to: String, period: String },
}

#[derive(Debug, Subcommand)]
enum ComplaintCommand {
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("saarthi_cli");
    let cli = Cli::parse();

    let agent = build_agent(&cli.data, cli.log_dir.as_deref()).await?;

    match cli.command {
        Command::Chat => run_chat(agent).await?,
        Command::Ask { text, language } => {
            let reply = agent.handle_message(ChatInput { text, language }).await?;
            println!("{}", reply.reply_text);
        }
        Command::Schedule { command } => match command {
            ScheduleCommand::Bus { number } => match agent.schedule().find_by_number(&number) {
                Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
                None => println!("no bus {number} in the schedule"),
            },
            ScheduleCommand::Between { from, to } => {
                let matches = agent.schedule().find_between(&from, &to);
                println!("{}", serde_json::to_string_pretty(&matches)?);
            }
            ScheduleCommand::Next { from, to } => {
                match agent
                    .schedule()
                    .next_departure(&from, &to, Local::now().time())
                {
                    Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
                    None => println!("no service between {from} and {to}"),
                }
            }
            ScheduleCommand::Last { from, to, period } => {
                let period = Period::parse(&period).context("invalid period value")?;
                match agent.schedule().last_in_period(&from, &to, period) {
                    Some(record) => println!("{}", serde_json::to_string_pretty(record)?),
                    None => println!("no service between {from} and {to} in that period"),
                }
            }
        },
        Command::Complaints { command } => match command {
            ComplaintCommand::List => {
                let tickets = agent.complaints().await?;
                println!("{}", serde_json::to_string_pretty(&tickets)?);
            }
        },
    }

    Ok(())
}

async fn run_chat(agent: TransitAgent<Store>) -> Result<()> {
    let voice = VoiceStack::detect();

    println!("Saarthi started! Type 'help' for options and 'exit' to quit.");

    loop {
        let message = match read_message(&voice)? {
            Some(message) => message,
            None => break,
        };
        if message.is_empty() {
            continue;
        }

        let lowered = message.to_lowercase();
        if matches!(lowered.as_str(), "exit" | "quit" | "bye") {
            let goodbye = reply3(
                "Goodbye! Have a safe journey.",
                "अलविदा! आपकी यात्रा शुभ हो।",
                "Goodbye! Aapki yatra shubh ho.",
            )
            .pick(detect(&message));
            println!("Saarthi: {goodbye}");
            voice.speak(&goodbye);
            break;
        }

        if matches!(lowered.as_str(), "help" | "menu") {
            println!("Saarthi:\n{}", help_text(&message));
            continue;
        }

        match agent
            .handle_message(ChatInput {
                text: message.clone(),
                language: None,
            })
            .await
        {
            Ok(reply) => {
                println!("Saarthi: {}", reply.reply_text);
                voice.speak(&reply.speak_text);
            }
            Err(err) => {
                error!(error = ?err, "request failed");
                println!("Saarthi: {}", apology(detect(&message)));
            }
        }
    }

    Ok(())
}

fn read_message(voice: &VoiceStack) -> Result<Option<String>> {
    if voice.stt_available() {
        if let Some(heard) = voice.capture_once() {
            println!("You (voice): {heard}");
            return Ok(Some(heard.trim().to_string()));
        }
    }

    print!("You: ");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = io::stdin().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn help_text(message: &str) -> String {
    reply3(
        "I can help with:\n\
         - Fare: 'fare of bus 701'\n\
         - Timing: 'timing of 1001'\n\
         - Track: 'where is 702'\n\
         - Routes: 'buses from Delhi to Karnal'\n\
         - Next bus: 'next bus from Delhi to Karnal'\n\
         - Status: 'is 1001 late?'\n\
         - Complaint: 'complaint bus 702 driver rude'\n\
         - Type only a number like '702' to see its details.\n\
         - Type 'exit' to quit.",
        "मैं इन बातों में मदद कर सकती हूँ:\n\
         - किराया: '701 का किराया'\n\
         - समय: '1001 कब निकलती है'\n\
         - ट्रैक: '702 कहाँ है'\n\
         - रूट: 'दिल्ली से करनाल की बसें'\n\
         - अगली बस: 'दिल्ली से करनाल अगली बस'\n\
         - स्टेटस: '1001 लेट है?'\n\
         - शिकायत: 'complaint bus 702 driver rude'\n\
         - सिर्फ़ नंबर टाइप करें जैसे '702' — उसकी डिटेल्स मिलेंगी।\n\
         - बाहर निकलने के लिए 'exit' टाइप करें।",
        "Main in cheezon mein madad kar sakti hoon:\n\
         - Kiraya: '701 ka kiraya'\n\
         - Samay: '1001 kab nikalti hai'\n\
         - Track: '702 kidhar hai'\n\
         - Route: 'Delhi se Karnal ki basen'\n\
         - Agla bus: 'Delhi se Karnal agla bus'\n\
         - Status: '1001 late hai?'\n\
         - Sirf number type karein jaise '702' — details milengi.\n\
         - Bahar nikalne ke liye 'exit' type karein.",
    )
    .pick(detect(message))
}

async fn build_agent(data: &std::path::Path, log_dir: Option<&std::path::Path>) -> Result<TransitAgent<Store>> {
    let metrics = AppMetrics::shared();
    let lm = LmStack::load_default();

    let schedule = Arc::new(
        ScheduleStore::load(data)
            .with_context(|| format!("failed loading schedule dataset from {}", data.display()))?,
    );

    let log_dir = match log_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::var("SAARTHI_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs")),
    };
    let store = Store::file(&log_dir).await?;

    Ok(TransitAgent::new(schedule, lm, Arc::new(store), metrics))
}
