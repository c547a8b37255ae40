//! Animated terminal chat client.
//!
//! Plays the boot sequence, hands the terminal over to the matrix theme and
//! then chats with the endpoint at `--api-url` (or `$CUSTODIAN_API_URL`).
//!
//! # Usage
//!
//! ```bash
//! # Full boot sequence
//! custodian --api-url http://localhost:3000
//!
//! # Straight to the prompt, logging traffic
//! custodian --skip-boot --log-file /tmp/custodian.jsonl
//! ```
//!
//! Ctrl+C or Ctrl+D quits at any point.

use std::io;
use std::sync::Arc;

use arrrg::CommandLine;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use futures::StreamExt;

use custodian::chat::{ChatArgs, ChatConfig, ChatSession};
use custodian::client::ChatBackend;
use custodian::client_logger::{ChatLogger, JsonLinesLogger};
use custodian::editor::{Key, KeyOutcome, LineEditor};
use custodian::render::{AnsiScreen, Screen};
use custodian::theme::BOOT;
use custodian::{BootTiming, ChatClient, get_or_create_client_id, live_transition, run_boot};

/// Puts the terminal in raw mode and restores it when dropped.
struct TerminalGuard;

impl TerminalGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        AnsiScreen::stdout().reset();
        let _ = terminal::disable_raw_mode();
    }
}

/// Whether the loop should keep going after an event.
enum Flow {
    Continue,
    Quit,
}

fn is_quit(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
}

/// Resolve the client id and open the request log, if one was asked for.
fn open_logger(config: &ChatConfig) -> Option<Arc<dyn ChatLogger>> {
    let client_id = match &config.state_file {
        Some(path) => match get_or_create_client_id(path) {
            Ok(id) => Some(id),
            Err(err) => {
                eprintln!("warning: no client id: {err}");
                None
            }
        },
        None => None,
    };
    let path = config.log_file.as_ref()?;
    match JsonLinesLogger::open(path.as_str()) {
        Ok(logger) => {
            let logger = match client_id {
                Some(id) => logger.with_client_id(id),
                None => logger,
            };
            Some(Arc::new(logger))
        }
        Err(err) => {
            eprintln!("warning: logging disabled: {err}");
            None
        }
    }
}

/// Play the boot sequence, discarding keys.  Returns `Flow::Quit` on Ctrl+C/D.
async fn play_boot(
    screen: &mut AnsiScreen<io::Stdout>,
    events: &mut EventStream,
) -> io::Result<Flow> {
    let timing = BootTiming::default();
    let mut rng = rand::rng();
    let mut resized = None;
    {
        let boot = run_boot(screen, &timing, &mut rng);
        tokio::pin!(boot);
        loop {
            tokio::select! {
                _ = &mut boot => break,
                event = events.next() => match event.transpose()? {
                    Some(Event::Key(key)) if is_quit(&key) => return Ok(Flow::Quit),
                    Some(Event::Resize(cols, rows)) => resized = Some((cols, rows)),
                    Some(_) => {}
                    None => return Ok(Flow::Quit),
                },
            }
        }
    }
    if let Some((cols, rows)) = resized {
        screen.fit(cols, rows);
    }
    Ok(Flow::Continue)
}

/// Run one request while still reading the keyboard.
///
/// Keys reach the editor, which refuses them while the lock is held.  The
/// session owns the screen until the reply is done, so refused keys draw
/// nowhere.
async fn converse<B: ChatBackend>(
    session: &mut ChatSession<B>,
    editor: &mut LineEditor,
    line: String,
    screen: &mut AnsiScreen<io::Stdout>,
    events: &mut EventStream,
) -> io::Result<Flow> {
    let mut muted = AnsiScreen::new(io::sink());
    let mut resized = None;
    {
        let send = session.send(&line, screen);
        tokio::pin!(send);
        loop {
            tokio::select! {
                _ = &mut send => break,
                event = events.next() => match event.transpose()? {
                    Some(Event::Key(key)) if is_quit(&key) => return Ok(Flow::Quit),
                    Some(Event::Key(key)) => {
                        editor.handle_key(Key::from_event(&key), &mut muted);
                    }
                    Some(Event::Resize(cols, rows)) => resized = Some((cols, rows)),
                    Some(_) => {}
                    None => return Ok(Flow::Quit),
                },
            }
        }
    }
    if let Some((cols, rows)) = resized {
        screen.fit(cols, rows);
    }
    Ok(Flow::Continue)
}

/// Main entry point for the custodian terminal.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("custodian [OPTIONS]");
    let config = ChatConfig::from(args);

    let client = ChatClient::new(config.base_url.clone())?;
    let mut session = ChatSession::new(client);
    if let Some(logger) = open_logger(&config) {
        session = session.with_logger(logger);
    }
    let mut editor = LineEditor::new(session.lock());

    let _guard = TerminalGuard::enable()?;
    let mut screen = AnsiScreen::stdout();
    let (cols, rows) = terminal::size()?;
    screen.fit(cols, rows);
    screen.set_theme(&BOOT);
    screen.clear();
    screen.flush();

    let mut events = EventStream::new();
    if !config.skip_boot {
        if let Flow::Quit = play_boot(&mut screen, &mut events).await? {
            return Ok(());
        }
    }
    live_transition(&mut screen);

    while let Some(event) = events.next().await {
        match event? {
            Event::Key(key) if is_quit(&key) => break,
            Event::Key(key) => {
                let outcome = editor.handle_key(Key::from_event(&key), &mut screen);
                screen.flush();
                if let KeyOutcome::Submitted(line) = outcome {
                    let flow =
                        converse(&mut session, &mut editor, line, &mut screen, &mut events).await?;
                    if let Flow::Quit = flow {
                        break;
                    }
                }
            }
            Event::Resize(cols, rows) => screen.fit(cols, rows),
            _ => {}
        }
    }
    Ok(())
}
