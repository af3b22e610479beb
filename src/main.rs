use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use learnpark::app::App;
use learnpark::config::Config;
use learnpark::content::{Dataset, Subject};
use learnpark::event::{AppEvent, EventHandler};
use learnpark::generator::arithmetic::Difficulty;
use learnpark::logging;
use learnpark::narration::spoken::pinyin_spoken;
use learnpark::narration::{CommandBackend, Cue, NarrationBackend, NullBackend};
use learnpark::session::practice::{READ_ALONG_DAYS, read_along_day};
use learnpark::session::{FlowKind, Phase, Session, SessionPlan};
use learnpark::ui::progress_bar::ProgressBar;
use learnpark::ui::render;

#[derive(Parser)]
#[command(name = "learnpark", version, about = "Practice drills for young learners")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Run without narration")]
    no_speech: bool,

    #[arg(long, global = true, help = "Text-to-speech program (espeak-ng, say, ...)")]
    speech_command: Option<String>,

    #[arg(short, long, global = true, help = "Number of words per session")]
    size: Option<usize>,

    #[arg(long, global = true, help = "Seed for a repeatable session")]
    seed: Option<u64>,

    #[arg(long, global = true, help = "Log filter, e.g. debug or learnpark=trace")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the practice flows and their categories
    Categories,
    /// Hear a word, pick it among four
    Dictation { categories: Vec<String> },
    /// Fill the missing vowel
    FillBlank { categories: Vec<String> },
    /// Syllable teaching, decoding and word building
    LongWord,
    /// Matching, sentence fill-in and unscrambling
    Irregular,
    /// Read the sentences of one day aloud
    ReadAlong {
        #[arg(long, help = "Day 1-14, defaults to today's")]
        day: Option<u32>,
    },
    /// Addition and subtraction
    Math {
        #[arg(long, help = "easy, medium or hard")]
        difficulty: Option<String>,
        #[arg(long, help = "10, 20 or 30 questions")]
        count: Option<usize>,
    },
    /// Hear a pinyin unit, or list them all
    Pinyin { unit: Option<String> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    logging::init_tracing(
        cli.log_level.as_deref(),
        &config.log_level,
        &logging::log_path(),
    )?;

    if let Some(size) = cli.size {
        config.session_size = size;
    }
    if let Some(command) = &cli.speech_command {
        config.speech.command = Some(command.clone());
    }
    if cli.no_speech {
        config.speech.enabled = false;
    }

    let dataset = Dataset::load()?;
    let session = match cli.seed {
        Some(seed) => Session::seeded(seed),
        None => Session::new(),
    };
    let backend = speech_backend(&config);
    let mut app = App::new(dataset, config, session, backend);
    let now = Instant::now();

    app.messages = match cli.command {
        Commands::Categories => {
            print_lines(&categories(&app.dataset));
            return Ok(());
        }
        Commands::Pinyin { unit } => return pinyin(&mut app, unit.as_deref()),
        Commands::Dictation { categories } => open(&mut app, FlowKind::Dictation, &categories, now),
        Commands::FillBlank { categories } => open(&mut app, FlowKind::FillBlank, &categories, now),
        Commands::LongWord => app.open_flow(FlowKind::LongWord, now),
        Commands::Irregular => app.open_flow(FlowKind::Irregular, now),
        Commands::ReadAlong { day } => {
            let day = match day {
                Some(day) if (1..=READ_ALONG_DAYS).contains(&day) => day,
                Some(day) => bail!("day must be between 1 and {READ_ALONG_DAYS}, got {day}"),
                None => read_along_day(Local::now().date_naive()),
            };
            app.start(SessionPlan::read_along(day), now)
        }
        Commands::Math { difficulty, count } => {
            let difficulty = match difficulty {
                Some(key) => match Difficulty::from_key(&key) {
                    Some(difficulty) => difficulty,
                    None => bail!("unknown difficulty {key:?}, expected easy, medium or hard"),
                },
                None => app.config.difficulty(),
            };
            if let Some(count) = count {
                app.config.question_count = count;
                app.config.normalize_question_count();
            }
            let count = app.config.question_count;
            app.start(SessionPlan::arithmetic(difficulty, count), now)
        }
    };
    if app.should_quit {
        print_lines(&app.messages);
        return Ok(());
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);
    app.narrator.stop();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Paste(text) => {
                for ch in text.chars().filter(|c| !c.is_control()) {
                    app.type_char(ch);
                }
            }
            AppEvent::Tick => {
                let notices = app.tick(Instant::now());
                app.messages.extend(notices);
            }
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Enter => app.submit_input(Instant::now()),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Esc if app.input.is_empty() => app.should_quit = true,
        KeyCode::Esc => app.input.clear(),
        KeyCode::Char(ch) => app.type_char(ch),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let message_height = u16::try_from(app.messages.len().min(6)).unwrap_or(6) + 2;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(message_height),
            Constraint::Length(3),
        ])
        .split(area);

    let progress = app.session.progress();
    let title = match app.session.flow() {
        Some(flow) => flow.label(),
        None => "learnpark",
    };
    let (done, total) = match app.session.phase() {
        Phase::Completed => (progress.total, progress.total),
        Phase::Revealed => (progress.index + 1, progress.total),
        _ => (progress.index, progress.total),
    };
    frame.render_widget(ProgressBar::new(title, done, total), rows[0]);

    let screen: Vec<Line> = app.screen().into_iter().map(Line::from).collect();
    let body = Paragraph::new(screen)
        .block(Block::bordered())
        .wrap(Wrap { trim: false });
    frame.render_widget(body, rows[1]);

    let messages: Vec<Line> = app
        .messages
        .iter()
        .rev()
        .take(6)
        .rev()
        .map(|m| Line::from(Span::styled(m.clone(), Style::default().fg(Color::Yellow))))
        .collect();
    frame.render_widget(
        Paragraph::new(messages)
            .block(Block::bordered())
            .wrap(Wrap { trim: false }),
        rows[2],
    );

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(app.input.as_str()),
    ]))
    .block(Block::bordered().title(
        " Enter: answer / next   :s hear again  :p phonics  :y syllables  :r again  :q quit ",
    ));
    frame.render_widget(input, rows[3]);

    let cursor_x = rows[3].x + 3 + u16::try_from(app.input.chars().count()).unwrap_or(0);
    frame.set_cursor_position((cursor_x.min(rows[3].right().saturating_sub(2)), rows[3].y + 1));
}

/// Start straight away when categories were given, otherwise open the
/// category list.
fn open(app: &mut App, flow: FlowKind, categories: &[String], now: Instant) -> Vec<String> {
    if categories.is_empty() {
        return app.open_flow(flow, now);
    }
    let keys: Vec<&str> = categories.iter().map(String::as_str).collect();
    let plan = SessionPlan::new(flow, &keys, app.session_size());
    app.start(plan, now)
}

fn speech_backend(config: &Config) -> Box<dyn NarrationBackend> {
    if !config.speech.enabled {
        return Box::new(NullBackend);
    }
    if let Some(program) = &config.speech.command {
        return Box::new(CommandBackend::new(program.clone()));
    }
    // an unavailable backend is reported once as a notice, then muted
    let program = ["espeak-ng", "espeak", "say"]
        .into_iter()
        .find(|program| CommandBackend::new(*program).is_available())
        .unwrap_or("espeak-ng");
    tracing::debug!(program, "speech program");
    Box::new(CommandBackend::new(program))
}

fn categories(dataset: &Dataset) -> Vec<String> {
    let mut lines = vec!["Flows:".to_string()];
    lines.extend(render::flows());
    for &subject in Subject::all() {
        lines.push(String::new());
        lines.push(format!("{}:", subject.to_key()));
        lines.extend(render::categories(dataset, subject, &[]));
    }
    lines.push(String::new());
    lines.push("pinyin:".to_string());
    lines.extend(render::pinyin_table(dataset.pinyin()));
    lines
}

fn pinyin(app: &mut App, unit: Option<&str>) -> Result<()> {
    let Some(unit) = unit else {
        print_lines(&render::pinyin_table(app.dataset.pinyin()));
        return Ok(());
    };
    let text = pinyin_spoken(unit, app.dataset.pinyin());
    if let Some(found) = app.dataset.pinyin().find(unit) {
        println!("{}  {}  {}", found.pinyin, found.example, found.words.join(" "));
    } else {
        println!("{unit}  ({text})");
    }
    let out = app.play(&Cue::Pinyin(text), Instant::now());
    print_lines(&out);

    // let the speech program finish before the backend is dropped
    println!("Press Enter when done.");
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(())
}

fn print_lines(lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    for line in lines {
        let _ = writeln!(stdout, "{line}");
    }
    let _ = stdout.flush();
}
