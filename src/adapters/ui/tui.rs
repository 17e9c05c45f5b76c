//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Owns the main menu and drives the chat session, doctor search,
//! registration and sign-in screens. All blocking prompt work happens
//! inline; long-running calls (model invocations, external search) get
//! an indicatif spinner.

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Confirm, CustomType, InquireError, Password, Select, Text};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::adapters::audio::MicRecorder;
use crate::domain::{
    AccountType, ChatMessage, Coordinates, DoctorSearchCriteria, DomainError, Language,
    RegistrationInput, Sender,
};
use crate::ports::{IdentityPort, InputPort};
use crate::usecases::{ChatService, DoctorSearchService, RegistrationFlow, SearchOutcome};

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    chat: Mutex<ChatService>,
    search: Arc<DoctorSearchService>,
    registration: Arc<RegistrationFlow>,
    identity: Option<Arc<dyn IdentityPort>>,
}

impl TuiInputPort {
    pub fn new(
        chat: ChatService,
        search: Arc<DoctorSearchService>,
        registration: Arc<RegistrationFlow>,
        identity: Option<Arc<dyn IdentityPort>>,
    ) -> Self {
        Self {
            chat: Mutex::new(chat),
            search,
            registration,
            identity,
        }
    }

    async fn chat_session(&self) -> Result<(), DomainError> {
        let mut chat = self.chat.lock().await;
        println!(
            "\nChat with the health assistant. Commands: :lang, :voice, :say, :stop, :back\n"
        );

        loop {
            let language = chat.language();
            let line = match Text::new("You:")
                .with_placeholder(language.placeholder())
                .prompt()
            {
                Ok(line) => line,
                Err(e) if is_cancel(&e) => return Ok(()),
                Err(e) => return Err(prompt_err(e)),
            };

            match line.trim() {
                "" => continue,
                ":back" => return Ok(()),
                ":lang" => {
                    let choice = select_language()?;
                    chat.set_language(choice);
                    continue;
                }
                ":voice" => {
                    let uri = match record_audio().await {
                        Ok(uri) => uri,
                        Err(err) => {
                            println!("Recording failed: {}", err);
                            continue;
                        }
                    };
                    let spinner = working("Transcribing and answering...");
                    let result = chat.submit_audio(uri).await;
                    spinner.finish_and_clear();
                    if let Err(err) = result {
                        debug!(error = %err, "audio exchange failed");
                    }
                    render_exchange(&chat);
                    continue;
                }
                ":say" => {
                    let last = chat.last_bot_message().and_then(|m| m.text.clone());
                    match last {
                        Some(text) => {
                            let language = chat.language();
                            if let Err(err) = chat.speak(&text, language) {
                                println!("{}", err);
                            }
                        }
                        None => println!("Nothing to read aloud yet."),
                    }
                    continue;
                }
                ":stop" => {
                    chat.stop_speaking();
                    continue;
                }
                question => {
                    let spinner = working("Assistant is typing...");
                    let result = chat.submit_text(question).await;
                    spinner.finish_and_clear();
                    if let Err(err) = result {
                        debug!(error = %err, "text exchange failed");
                    }
                    render_exchange(&chat);
                }
            }
        }
    }

    async fn doctor_search(&self) -> Result<(), DomainError> {
        println!("\nFind a doctor. Leave a field blank to match anything.\n");

        let specialty = optional(Text::new("Specialty:").prompt().map_err(prompt_err)?);
        let language = match Select::new(
            "Doctor speaks:",
            vec!["Any", "English", "Français", "Wolof"],
        )
        .prompt()
        .map_err(prompt_err)?
        {
            "Any" => None,
            chosen => Some(chosen.to_string()),
        };

        let use_coordinates = Confirm::new("Search near exact coordinates?")
            .with_default(false)
            .prompt()
            .map_err(prompt_err)?;

        let (location, coordinates) = if use_coordinates {
            let latitude = CustomType::<f64>::new("Latitude:")
                .prompt()
                .map_err(prompt_err)?;
            let longitude = CustomType::<f64>::new("Longitude:")
                .prompt()
                .map_err(prompt_err)?;
            (
                None,
                Some(Coordinates {
                    latitude,
                    longitude,
                }),
            )
        } else {
            (
                optional(Text::new("Location:").prompt().map_err(prompt_err)?),
                None,
            )
        };

        let radius_km = if coordinates.is_some() || location.is_some() {
            optional(
                Text::new("Radius in km (blank for none):")
                    .prompt()
                    .map_err(prompt_err)?,
            )
            .and_then(|s| s.parse::<u32>().ok())
        } else {
            None
        };

        let criteria = DoctorSearchCriteria {
            specialty,
            location,
            language,
            coordinates,
            radius_km,
        };

        let spinner = working("Searching for doctors...");
        let outcome = self.search.search(&criteria).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(mut outcome) => {
                render_outcome(&outcome);
                self.offer_invite(&mut outcome)?;
                Ok(())
            }
            Err(err) => {
                println!("Search failed: {}", err);
                Ok(())
            }
        }
    }

    fn offer_invite(&self, outcome: &mut SearchOutcome) -> Result<(), DomainError> {
        if outcome.external.is_empty() {
            return Ok(());
        }
        let invite = Confirm::new("Invite an external doctor to join the network?")
            .with_default(false)
            .prompt()
            .map_err(prompt_err)?;
        if !invite {
            return Ok(());
        }

        let options: Vec<String> = outcome
            .external
            .iter()
            .map(|d| format!("{} ({})", d.name, d.id))
            .collect();
        let chosen = Select::new("Invite:", options).prompt().map_err(prompt_err)?;
        // Map the display string back to the id between the parentheses.
        let id = chosen
            .rsplit_once('(')
            .and_then(|(_, rest)| rest.strip_suffix(')'))
            .unwrap_or(&chosen);
        if outcome.mark_invited(id) {
            println!("Invitation sent to {}.", chosen);
        }
        Ok(())
    }

    async fn register(&self) -> Result<(), DomainError> {
        println!("\nCreate an account.\n");

        let first_name = Text::new("First name:").prompt().map_err(prompt_err)?;
        let last_name = Text::new("Last name:").prompt().map_err(prompt_err)?;
        let email = Text::new("Email:").prompt().map_err(prompt_err)?;
        let password = Password::new("Password:")
            .without_confirmation()
            .prompt()
            .map_err(prompt_err)?;
        let account_type = match Select::new("I am a:", vec!["Patient", "Doctor"])
            .prompt()
            .map_err(prompt_err)?
        {
            "Doctor" => AccountType::Doctor,
            _ => AccountType::Patient,
        };

        let input = RegistrationInput {
            first_name,
            last_name,
            email,
            password,
            account_type,
        };

        let spinner = working("Registering...");
        let result = self.registration.register(&input).await;
        spinner.finish_and_clear();

        match result {
            Ok(out) if out.success => {
                println!(
                    "{}",
                    out.message.unwrap_or_else(|| "Registered.".to_string())
                );
            }
            Ok(out) => {
                println!(
                    "Registration failed: {}",
                    out.message.unwrap_or_else(|| "unknown reason".to_string())
                );
            }
            Err(err) => println!("Registration failed: {}", err),
        }
        Ok(())
    }

    async fn sign_in(&self) -> Result<(), DomainError> {
        let Some(identity) = &self.identity else {
            println!("Sign-in is not configured. Set MEDILINGUA_IDENTITY_API_KEY to enable it.");
            return Ok(());
        };

        let email = Text::new("Email:").prompt().map_err(prompt_err)?;
        let password = Password::new("Password:")
            .without_confirmation()
            .prompt()
            .map_err(prompt_err)?;

        let spinner = working("Signing in...");
        let result = identity.sign_in(&email, &password).await;
        spinner.finish_and_clear();

        match result {
            Ok(user) => println!(
                "Signed in as {}.",
                user.display_name.as_deref().unwrap_or(&user.email)
            ),
            Err(err) => println!("{}", err),
        }
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), DomainError> {
        let Some(identity) = &self.identity else {
            println!("Sign-in is not configured.");
            return Ok(());
        };
        match identity.sign_out().await {
            Ok(()) => println!("Signed out."),
            Err(err) => println!("{}", err),
        }
        Ok(())
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let choice = match Select::new(
                "What would you like to do?",
                vec![
                    "Chat with the health assistant",
                    "Find a doctor",
                    "Register",
                    "Sign in",
                    "Sign out",
                    "Quit",
                ],
            )
            .prompt()
            {
                Ok(choice) => choice,
                Err(e) if is_cancel(&e) => return Ok(()),
                Err(e) => return Err(prompt_err(e)),
            };

            match choice {
                "Chat with the health assistant" => self.chat_session().await?,
                "Find a doctor" => self.doctor_search().await?,
                "Register" => self.register().await?,
                "Sign in" => self.sign_in().await?,
                "Sign out" => self.sign_out().await?,
                _ => return Ok(()),
            }
        }
    }
}

/// Record from the microphone until the user presses Enter.
async fn record_audio() -> Result<String, DomainError> {
    let session = MicRecorder::start()?;
    println!("Recording... press Enter to stop.");
    let _ = Text::new("").prompt_skippable();
    tokio::task::spawn_blocking(move || session.finish())
        .await
        .map_err(|e| DomainError::Device(format!("recording task failed: {}", e)))?
}

fn select_language() -> Result<Language, DomainError> {
    let options = vec![Language::En, Language::Fr, Language::Wo];
    let names: Vec<&str> = options.iter().map(|l| l.display_name()).collect();
    let chosen = Select::new("Language:", names).prompt().map_err(prompt_err)?;
    Ok(options
        .into_iter()
        .find(|l| l.display_name() == chosen)
        .unwrap_or(Language::En))
}

/// Print the tail of the log after an exchange: the (possibly updated)
/// user message and the bot's reply.
fn render_exchange(chat: &ChatService) {
    let recent: Vec<&ChatMessage> = chat
        .messages()
        .iter()
        .rev()
        .take(2)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    for message in recent {
        let who = match message.sender {
            Sender::User => "You",
            Sender::Bot => "Assistant",
        };
        if let Some(text) = &message.text {
            println!("{}: {}", who, text);
        }
    }
    println!();
}

fn render_outcome(outcome: &SearchOutcome) {
    if outcome.is_empty() {
        println!("No doctors found for those criteria.");
        return;
    }

    if !outcome.internal.is_empty() {
        println!("\nIn-network doctors:");
        for doctor in &outcome.internal {
            println!(
                "  {} — {} · {} · speaks {}",
                doctor.name,
                doctor.specialty,
                doctor.location,
                doctor.languages.join(", ")
            );
        }
    }

    if !outcome.external.is_empty() {
        println!("\nExternal doctors (not yet in the network):");
        for doctor in &outcome.external {
            println!(
                "  {} — {} · {}",
                doctor.name,
                doctor.specialty.as_deref().unwrap_or("Unknown specialty"),
                doctor.location.as_deref().unwrap_or("Unknown location"),
            );
            if let Some(url) = &doctor.external_profile_url {
                println!("    {}", url);
            }
        }
    }
    println!();
}

fn working(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner());
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_cancel(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

fn prompt_err(e: InquireError) -> DomainError {
    DomainError::Input(e.to_string())
}
