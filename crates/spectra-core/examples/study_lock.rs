//! Study session example — lock in, then answer the quiz to unlock.
//!
//! Starts a time-locked session over sample study text, prints the
//! verification question, and reads unlock attempts from stdin until one
//! clears the recall threshold.
//!
//! # Usage
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run --example study_lock
//! ```

use std::io::Write;
use std::sync::Arc;

use spectra_core::session::{SessionId, SessionLockManager};
use spectra_core::time::Clock;
use spectra_core::{GeminiClient, GeminiConfig};

const STUDY_TEXT: &str = "\
Photosynthesis converts light energy into chemical energy. Chlorophyll in \
the thylakoid membranes absorbs light, driving the reactions that split \
water and fix carbon dioxide into glucose.";

#[tokio::main]
async fn main() -> Result<(), String> {
    // 1. Create the Gemini client from the environment.
    let config = GeminiConfig::from_env()
        .ok_or("Set GEMINI_API_KEY env var to your Google AI Studio key")?;
    let client = Arc::new(GeminiClient::new(Some(config)).map_err(|e| e.to_string())?);

    // 2. Start a 25-minute session for a fixed identity.
    let sessions = SessionLockManager::new(client, Clock::Default);
    let id = SessionId::from("demo");
    let start = sessions
        .start_session(&id, STUDY_TEXT, Some(25))
        .await
        .map_err(|e| e.to_string())?;

    println!(
        "Session locked for {} minutes (until {}).",
        start.duration_minutes, start.recommended_end
    );
    println!("Unlock question: {}", start.question);

    // 3. Read answers until one clears the threshold.
    let stdin = std::io::stdin();
    let mut answer = String::new();
    loop {
        print!("> ");
        std::io::stdout().flush().map_err(|e| e.to_string())?;
        answer.clear();
        if stdin.read_line(&mut answer).map_err(|e| e.to_string())? == 0 {
            return Err("stdin closed before the session was unlocked".to_string());
        }
        match sessions.check_unlock(&id, answer.trim()) {
            Ok(true) => break,
            Ok(false) => println!("Incorrect. Keep studying!"),
            Err(e) => return Err(e.to_string()),
        }
    }
    println!("Correct! Session unlocked.");
    Ok(())
}
