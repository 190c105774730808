//! mindmate - Check in with yourself
//!
//! "A gentle place to check in with yourself."
//!
//! Usage:
//!   mindmate auth sign-up EMAIL        Create a local account
//!   mindmate auth sign-in EMAIL        Start a session
//!   mindmate auth sign-out             End the session
//!   mindmate mood log --level N        Record how you feel
//!   mindmate mood history [DAYS]       Review recent moods
//!   mindmate journal prompt [--next]   Show today's reflection prompt
//!   mindmate journal write TEXT        Save a journal entry
//!   mindmate chat                      Talk with the companion
//!   mindmate activities                List relaxing activities
//!
//! Everything except `auth` needs a signed-in session.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mindmate_core::config::Config;
use mindmate_core::format::{color, progress_bar, BOLD, CYAN, GREEN, MAGENTA, RED, YELLOW};
use mindmate_core::Paths;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use companion::activities;
use companion::auth::SIGN_UP_CONFIRMATION;
use companion::chat::SUGGESTIONS;
use companion::store::Entry;
use companion::{
    guard, AuthError, AuthProvider, AuthStatus, CannedResponder, CompanionSettings, Conversation,
    Emotion, EntryStore, Journal, JsonlStore, LocalAuth, LogStore, MoodDraft, MoodLevel,
    MoodSummary, PromptRotator, Route, RouteDecision, StoreKind, User,
};

/// MindMate - Check in with yourself
#[derive(Parser)]
#[command(name = "mindmate")]
#[command(about = "Mood check-ins, guided journaling, and a companion to talk to")]
#[command(version)]
#[command(after_help = r#"MOOD SCALE:
    1 Very Low   3 Low   5 Neutral   7 Good   9 Excellent

EMOTIONS:
    happy, grateful, energetic, calm, anxious, sad

EXAMPLES:
    mindmate auth sign-up sam@example.com --name Sam  # Create an account
    mindmate auth sign-in sam@example.com             # Prompts for the password
    mindmate mood log -l 7 -e calm -e grateful    # Record a good, calm day
    mindmate mood history 14                      # Last two weeks
    mindmate journal prompt --next                # Skip to another prompt
    mindmate journal write "The lake at dawn"     # Answer the current prompt
    mindmate chat                                 # /quit to leave

CONFIG:
    Set "store": "jsonl" in the "companion" section of
    ~/.config/mindmate/config.json to keep entries on disk.

ALIASES:
    mindmate auth login   # auth sign-in
    mindmate auth logout  # auth sign-out
    mindmate m    # mood
    mindmate j    # journal
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign up, sign in, or sign out
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Record or review moods
    #[command(alias = "m")]
    Mood {
        #[command(subcommand)]
        action: MoodAction,
    },

    /// Reflect on a guided prompt
    #[command(alias = "j")]
    Journal {
        #[command(subcommand)]
        action: JournalAction,
    },

    /// Talk with the companion (/quit to leave)
    Chat,

    /// List relaxing activities
    Activities,
}

impl Commands {
    /// View a command belongs to; None for session management that any
    /// status may run
    fn route(&self) -> Option<Route> {
        match self {
            Commands::Auth {
                action: AuthAction::SignUp { .. } | AuthAction::SignIn { .. },
            } => Some(Route::Auth),
            Commands::Auth { .. } => None,
            Commands::Mood { .. } => Some(Route::Mood),
            Commands::Journal { .. } => Some(Route::Journal),
            Commands::Chat => Some(Route::Chat),
            Commands::Activities => Some(Route::Home),
        }
    }
}

#[derive(Subcommand)]
enum AuthAction {
    /// Create an account
    #[command(alias = "signup")]
    SignUp {
        /// Email address
        email: String,

        /// Name to greet you by
        #[arg(long)]
        name: Option<String>,

        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in to an existing account
    #[command(alias = "login")]
    SignIn {
        /// Email address
        email: String,

        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// End the current session
    #[command(alias = "logout")]
    SignOut,

    /// Confirm an account's email address
    Confirm {
        /// Email address
        email: String,
    },

    /// Show who is signed in
    Status,
}

#[derive(Subcommand)]
enum MoodAction {
    /// Record a mood check-in
    Log {
        /// Mood score: 1, 3, 5, 7, or 9
        #[arg(long, short, value_parser = parse_level)]
        level: MoodLevel,

        /// Emotion tag (repeatable)
        #[arg(long = "emotion", short, value_parser = parse_emotion)]
        emotions: Vec<Emotion>,

        /// Free-form note
        #[arg(long, short)]
        note: Option<String>,
    },

    /// Show recent check-ins
    History {
        /// Number of days to include
        #[arg(default_value = "7")]
        days: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum JournalAction {
    /// Show the current prompt
    Prompt {
        /// Move on to the next prompt first
        #[arg(long)]
        next: bool,
    },

    /// Save an entry for the current prompt
    Write {
        /// Entry text
        text: String,
    },
}

fn parse_level(s: &str) -> Result<MoodLevel, String> {
    let score: u8 = s.parse().map_err(|_| format!("Invalid mood score: {}", s))?;
    MoodLevel::try_from(score)
}

fn parse_emotion(s: &str) -> Result<Emotion, String> {
    Emotion::from_str(s).ok_or_else(|| format!("Unknown emotion: {}", s))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = Paths::new();
    let config = Config::load()?;
    let settings: CompanionSettings = config.section("companion")?;
    let state_dir = paths.state("companion");

    let rt = tokio::runtime::Runtime::new()?;
    let auth = LocalAuth::in_dir(&state_dir, settings.auto_confirm);
    let command = cli.command.unwrap_or(Commands::Activities);

    if let Some(route) = command.route() {
        let decision = rt.block_on(admit(&auth, route));
        if let Some(message) = refusal(decision) {
            exit_with(&message);
        }
    }

    match command {
        Commands::Auth { action } => match rt.block_on(cmd_auth(&auth, action)) {
            Err(e) => match e.downcast_ref::<AuthError>() {
                Some(auth_error) => exit_with(&auth_error.user_message()),
                None => Err(e),
            },
            ok => ok,
        },
        Commands::Mood { action } => match action {
            MoodAction::Log {
                level,
                emotions,
                note,
            } => {
                let store = open_store(&settings, &state_dir)?;
                cmd_mood_log(store.as_ref(), level, emotions, note)
            }
            MoodAction::History { days, json } => cmd_mood_history(&settings, &state_dir, days, json),
        },
        Commands::Journal { action } => match action {
            JournalAction::Prompt { next } => cmd_journal_prompt(&state_dir, next),
            JournalAction::Write { text } => {
                let store = open_store(&settings, &state_dir)?;
                cmd_journal_write(store.as_ref(), &state_dir, text)
            }
        },
        Commands::Chat => rt.block_on(cmd_chat(CannedResponder::new(settings.reply_delay()))),
        Commands::Activities => cmd_activities(),
    }
}

fn exit_with(message: &str) -> ! {
    eprintln!("{} {}", color(RED, "[x]"), message);
    std::process::exit(1)
}

/// Resolve the session and check a view against it
async fn admit<P: AuthProvider>(provider: &P, route: Route) -> RouteDecision {
    let status = AuthStatus::resolve(provider).await;
    guard(&status, route)
}

/// Why a command may not run, or None when it may
fn refusal(decision: RouteDecision) -> Option<String> {
    match decision {
        RouteDecision::Render(_) => None,
        RouteDecision::Redirect(Route::Auth) => Some(
            "Sign in first: 'mindmate auth sign-in EMAIL' (or 'mindmate auth sign-up EMAIL')"
                .to_string(),
        ),
        RouteDecision::Redirect(_) => {
            Some("Already signed in. Run 'mindmate auth sign-out' to switch accounts".to_string())
        }
        RouteDecision::Wait => Some("Still checking your session; try again".to_string()),
    }
}

fn greeting_name(user: &User) -> &str {
    user.display_name.as_deref().unwrap_or(&user.email)
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Manage the local session
async fn cmd_auth(auth: &LocalAuth, action: AuthAction) -> Result<()> {
    match action {
        AuthAction::SignUp {
            email,
            name,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let user = auth.sign_up(&email, &password, name.as_deref()).await?;

            if auth.current_user().await.as_ref() == Some(&user) {
                println!("{} Welcome, {}", color(GREEN, "[ok]"), greeting_name(&user));
            } else {
                println!("{} {}", color(GREEN, "[ok]"), SIGN_UP_CONFIRMATION);
                println!(
                    "  Confirm with 'mindmate auth confirm {}', then sign in",
                    user.email
                );
            }
        }
        AuthAction::SignIn { email, password } => {
            let password = password_or_prompt(password)?;
            let user = auth.sign_in(&email, &password).await?;
            println!("{} Welcome back, {}", color(GREEN, "[ok]"), greeting_name(&user));
        }
        AuthAction::SignOut => {
            auth.sign_out().await?;
            println!("{} Signed out", color(GREEN, "[ok]"));
        }
        AuthAction::Confirm { email } => {
            if !auth.confirm(&email).await? {
                bail!("No account registered for {}", email);
            }
            println!("{} Email confirmed: {}", color(GREEN, "[ok]"), email.trim());
        }
        AuthAction::Status => match auth.current_user().await {
            Some(user) => println!("Signed in as {} ({})", greeting_name(&user), user.email),
            None => println!("Not signed in"),
        },
    }

    Ok(())
}

fn open_store(settings: &CompanionSettings, state_dir: &Path) -> Result<Box<dyn EntryStore>> {
    Ok(match settings.store {
        StoreKind::Log => Box::new(LogStore),
        StoreKind::Jsonl => Box::new(JsonlStore::new(state_dir)?),
    })
}

fn prompt_state_path(state_dir: &Path) -> PathBuf {
    state_dir.join("journal_prompt")
}

/// Saved prompt position, starting at the first prompt
fn load_rotator(state_dir: &Path) -> Result<PromptRotator> {
    let path = prompt_state_path(state_dir);
    if !path.exists() {
        return Ok(PromptRotator::new());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read prompt state: {}", path.display()))?;
    let index: usize = content
        .trim()
        .parse()
        .with_context(|| format!("Invalid prompt state in {}", path.display()))?;

    Ok(PromptRotator::with_index(index))
}

fn save_rotator(state_dir: &Path, rotator: PromptRotator) -> Result<()> {
    fs::create_dir_all(state_dir)
        .with_context(|| format!("Failed to create state directory: {}", state_dir.display()))?;
    let path = prompt_state_path(state_dir);
    fs::write(&path, rotator.index().to_string())
        .with_context(|| format!("Failed to write prompt state: {}", path.display()))
}

/// Record a mood check-in
fn cmd_mood_log(
    store: &dyn EntryStore,
    level: MoodLevel,
    emotions: Vec<Emotion>,
    note: Option<String>,
) -> Result<()> {
    let mut draft = MoodDraft::new();
    draft.select(level);
    for emotion in emotions {
        if !draft.emotions().contains(&emotion) {
            draft.toggle(emotion);
        }
    }
    if let Some(note) = note {
        draft.set_note(note);
    }

    let Some(entry) = draft.submit() else {
        bail!("Select a mood level first");
    };

    let tags: Vec<&str> = entry.emotions.iter().map(|e| e.as_str()).collect();
    store.save(&Entry::Mood(entry.clone()))?;

    println!("{} Mood saved: {}", color(GREEN, "[ok]"), entry.mood);
    if !tags.is_empty() {
        println!("  Feeling: {}", tags.join(", "));
    }
    println!("Thank you for checking in with yourself today.");

    Ok(())
}

/// Show recent check-ins
fn cmd_mood_history(settings: &CompanionSettings, state_dir: &Path, days: u32, json: bool) -> Result<()> {
    if settings.store != StoreKind::Jsonl {
        println!("Mood history needs a persistent store.");
        println!("Set \"store\": \"jsonl\" in the \"companion\" config section.");
        return Ok(());
    }

    let store = JsonlStore::new(state_dir)?;
    let entries = store.mood_entries_for_days(days)?;
    let summary = MoodSummary::from_entries(&entries);

    if json {
        let value = serde_json::json!({
            "days": days,
            "count": summary.count,
            "average": summary.average,
            "entries": entries,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{}",
        color(&format!("{}{}", BOLD, MAGENTA), &format!("MOOD - LAST {} DAYS", days))
    );
    println!();

    if entries.is_empty() {
        println!("No check-ins yet. Try 'mindmate mood log --level 5'");
        return Ok(());
    }

    for entry in &entries {
        let fraction = entry.mood.score() as f64 / 10.0;
        let tags: Vec<&str> = entry.emotions.iter().map(|e| e.as_str()).collect();
        println!(
            "  {}  {} {:<10} {}",
            entry.recorded_at.format("%Y-%m-%d %H:%M"),
            progress_bar(fraction, 10),
            entry.mood.label(),
            tags.join(", ")
        );
        if let Some(note) = &entry.note {
            println!("  {:>16}  {}", "", note);
        }
    }

    println!();
    if let Some(average) = summary.average {
        println!(
            "  {} {} check-ins, average {:.1}{}",
            color(CYAN, "Summary:"),
            summary.count,
            average,
            summary
                .typical()
                .map(|level| format!(" (mostly {})", level))
                .unwrap_or_default()
        );
    }

    Ok(())
}

/// Show the current prompt
fn cmd_journal_prompt(state_dir: &Path, next: bool) -> Result<()> {
    let mut rotator = load_rotator(state_dir)?;
    if next {
        rotator.advance();
        save_rotator(state_dir, rotator)?;
    }

    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), "TODAY'S REFLECTION"));
    println!();
    println!("  \"{}\"", rotator.current());
    println!();
    println!("Answer with 'mindmate journal write \"...\"'");

    Ok(())
}

/// Save an entry for the current prompt
fn cmd_journal_write(store: &dyn EntryStore, state_dir: &Path, text: String) -> Result<()> {
    let mut journal = Journal::with_rotator(load_rotator(state_dir)?);
    journal.set_body(text);

    let chars = journal.char_count();
    let minutes = journal.reading_minutes();

    let Some(entry) = journal.submit() else {
        println!("{} Nothing to save: the entry is empty", color(YELLOW, "[!]"));
        return Ok(());
    };

    store.save(&Entry::Journal(entry))?;
    save_rotator(state_dir, journal.rotator())?;

    println!(
        "{} Journal entry saved ({} characters, ~{} min read)",
        color(GREEN, "[ok]"),
        chars,
        minutes
    );
    println!("Next prompt: \"{}\"", journal.prompt());

    Ok(())
}

/// Interactive conversation over stdin
async fn cmd_chat(responder: CannedResponder) -> Result<()> {
    let mut conversation = Conversation::new();

    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), "MINDMATE"));
    for message in conversation.messages() {
        println!("{} {}", color(CYAN, "mindmate>"), message.content);
    }
    println!();
    println!("Try: {}", SUGGESTIONS.join(" | "));
    println!("Type /quit to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", color(GREEN, "you>"));
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let line = line.trim();
        if line == "/quit" {
            break;
        }

        match conversation.send(line, &responder).await {
            Ok(Some(reply)) => println!("{} {}", color(CYAN, "mindmate>"), reply.content),
            Ok(None) => continue,
            Err(e) => println!("{} {}", color(YELLOW, "[!]"), e),
        }
    }

    println!("Take care of yourself.");
    Ok(())
}

/// List relaxing activities
fn cmd_activities() -> Result<()> {
    println!("{}", color(&format!("{}{}", BOLD, MAGENTA), "MIND RELAXING ACTIVITIES"));
    println!("Simple practices to help calm your mind and reduce stress");
    println!();
    for activity in activities::all() {
        println!("  {}", color(CYAN, activity.title));
        println!("    {}", activity.description);
    }
    println!();
    println!("For a guided exercise, run 'breathe run'");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use companion::journal::PROMPTS;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_mood_log() {
        let cli = Cli::try_parse_from([
            "mindmate", "mood", "log", "-l", "7", "-e", "calm", "-e", "Grateful", "-n", "ok",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Mood {
                action: MoodAction::Log {
                    level,
                    emotions,
                    note,
                },
            }) => {
                assert_eq!(level, MoodLevel::Good);
                assert_eq!(emotions, vec![Emotion::Calm, Emotion::Grateful]);
                assert_eq!(note.as_deref(), Some("ok"));
            }
            _ => panic!("expected mood log"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_level_and_emotion() {
        assert!(Cli::try_parse_from(["mindmate", "mood", "log", "-l", "4"]).is_err());
        assert!(Cli::try_parse_from(["mindmate", "m", "log", "-l", "5", "-e", "bored"]).is_err());
    }

    #[test]
    fn test_history_days_default() {
        let cli = Cli::try_parse_from(["mindmate", "mood", "history"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Mood {
                action: MoodAction::History { days: 7, json: false }
            })
        ));
    }

    #[tokio::test]
    async fn test_signed_out_mood_log_is_redirected() {
        let cli = Cli::try_parse_from(["mindmate", "mood", "log", "-l", "5"]).unwrap();
        let route = cli.command.unwrap().route().unwrap();
        assert_eq!(route, Route::Mood);

        let auth = companion::InMemoryAuth::auto_confirming();
        let decision = admit(&auth, route).await;
        assert_eq!(decision, RouteDecision::Redirect(Route::Auth));
        assert!(refusal(decision).unwrap().contains("Sign in first"));

        auth.sign_up("sam@example.com", "secret1", None).await.unwrap();
        assert_eq!(refusal(admit(&auth, route).await), None);
    }

    #[tokio::test]
    async fn test_sign_in_view_redirects_when_signed_in() {
        let auth = companion::InMemoryAuth::auto_confirming();
        auth.sign_up("sam@example.com", "secret1", None).await.unwrap();

        let cli = Cli::try_parse_from(["mindmate", "auth", "login", "sam@example.com"]).unwrap();
        let route = cli.command.unwrap().route().unwrap();
        assert_eq!(admit(&auth, route).await, RouteDecision::Redirect(Route::Home));

        let cli = Cli::try_parse_from(["mindmate", "auth", "sign-out"]).unwrap();
        assert_eq!(cli.command.unwrap().route(), None);
    }

    #[test]
    fn test_every_command_is_gated_but_session_management() {
        for args in [
            vec!["mindmate", "chat"],
            vec!["mindmate", "activities"],
            vec!["mindmate", "journal", "prompt"],
            vec!["mindmate", "mood", "history"],
        ] {
            let route = Cli::try_parse_from(args).unwrap().command.unwrap().route().unwrap();
            assert!(route.is_protected());
        }
    }

    #[tokio::test]
    async fn test_auth_commands_walk_through_confirmation() {
        let dir = TempDir::new().unwrap();
        let auth = LocalAuth::in_dir(dir.path(), false);

        cmd_auth(
            &auth,
            AuthAction::SignUp {
                email: "ana@example.com".into(),
                name: Some("Ana".into()),
                password: Some("s3cret!".into()),
            },
        )
        .await
        .unwrap();
        assert!(auth.current_user().await.is_none());

        let sign_in = || AuthAction::SignIn {
            email: "ana@example.com".into(),
            password: Some("s3cret!".into()),
        };
        let err = cmd_auth(&auth, sign_in()).await.unwrap_err();
        assert_eq!(err.downcast_ref::<AuthError>(), Some(&AuthError::EmailNotConfirmed));

        cmd_auth(&auth, AuthAction::Confirm { email: "ana@example.com".into() })
            .await
            .unwrap();
        cmd_auth(&auth, sign_in()).await.unwrap();
        assert_eq!(
            AuthStatus::resolve(&auth).await.user().map(|u| u.email.as_str()),
            Some("ana@example.com")
        );

        assert!(cmd_auth(&auth, AuthAction::Confirm { email: "nobody@example.com".into() })
            .await
            .is_err());

        cmd_auth(&auth, AuthAction::SignOut).await.unwrap();
        assert_eq!(AuthStatus::resolve(&auth).await, AuthStatus::SignedOut);
    }

    #[test]
    fn test_rotator_state_persists() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("companion");
        assert_eq!(load_rotator(&state).unwrap().index(), 0);

        save_rotator(&state, PromptRotator::with_index(3)).unwrap();
        assert_eq!(load_rotator(&state).unwrap().current(), PROMPTS[3]);
    }

    #[test]
    fn test_journal_write_advances_saved_prompt() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().to_path_buf();
        let store = JsonlStore::new(&state).unwrap();

        cmd_journal_write(&store, &state, "Grateful for tea".into()).unwrap();
        assert_eq!(load_rotator(&state).unwrap().index(), 1);

        let entries = store.entries_for_days(1).unwrap();
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            Entry::Journal(j) => assert_eq!(j.prompt, PROMPTS[0]),
            other => panic!("unexpected entry {:?}", other),
        }

        cmd_journal_write(&store, &state, "   ".into()).unwrap();
        assert_eq!(load_rotator(&state).unwrap().index(), 1);
    }

    #[test]
    fn test_mood_log_dedups_emotions() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path()).unwrap();
        cmd_mood_log(
            &store,
            MoodLevel::Low,
            vec![Emotion::Sad, Emotion::Sad, Emotion::Anxious],
            None,
        )
        .unwrap();

        let moods = store.mood_entries_for_days(1).unwrap();
        assert_eq!(moods[0].emotions, vec![Emotion::Sad, Emotion::Anxious]);
    }
}
