//! Interactive terminal playback.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use colored::Colorize;
use sb_engine::{Phase, StoryEngine, StoryEventKind};

pub fn run(file: &Path, speed: f64) -> Result<(), String> {
    let graph = super::load_story(file)?;
    let mut engine = StoryEngine::new(graph);
    engine.set_text_speed(speed);

    let pending: Rc<RefCell<Vec<StoryEventKind>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&pending);
    engine.on_any(move |event| sink.borrow_mut().push(event.kind.clone()));

    engine.start().map_err(|e| e.to_string())?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut clock = Instant::now();

    loop {
        render(&pending);
        match engine.phase() {
            // Lines are printed whole, so a partial reveal is just completed.
            Phase::Dialogue => engine.advance().map_err(|e| e.to_string())?,
            Phase::AwaitingInput => {
                if !wait_for_enter(&mut input)? {
                    break; // EOF quits
                }
                engine
                    .update(clock.elapsed().as_secs_f64())
                    .map_err(|e| e.to_string())?;
                clock = Instant::now();
                engine.advance().map_err(|e| e.to_string())?;
            }
            Phase::Choices => {
                let count = engine.current_choices().len();
                let Some(index) = read_selection(&mut input, count)? else {
                    break;
                };
                engine
                    .update(clock.elapsed().as_secs_f64())
                    .map_err(|e| e.to_string())?;
                clock = Instant::now();
                engine.select_choice(index).map_err(|e| e.to_string())?;
            }
            Phase::Ended => break,
            Phase::Idle | Phase::Halted => return Err("story stopped unexpectedly".into()),
        }
    }
    render(&pending);

    Ok(())
}

/// Print everything the engine reported since the last call.
fn render(pending: &Rc<RefCell<Vec<StoryEventKind>>>) {
    for event in pending.borrow_mut().drain(..) {
        match event {
            StoryEventKind::BackgroundChange { location } => {
                println!("{}", format!("[{location}]").dimmed());
            }
            StoryEventKind::BgmPlay { track } => {
                println!("{}", format!("♪ {track}").dimmed());
            }
            StoryEventKind::CharacterEnter { id, .. } => {
                println!("{}", format!("{id} enters.").dimmed());
            }
            StoryEventKind::CharacterExit { id } => {
                println!("{}", format!("{id} leaves.").dimmed());
            }
            StoryEventKind::DialogueStart { speaker, text, .. } => match speaker {
                Some(speaker) => {
                    println!("{}: {text}", speaker.to_string().cyan().bold());
                }
                None => println!("{}", text.italic()),
            },
            StoryEventKind::ChoicesShown { choices, .. } => {
                println!();
                for (i, choice) in choices.iter().enumerate() {
                    println!("  {} {}", format!("[{}]", i + 1).yellow(), choice.text);
                }
            }
            StoryEventKind::EndingReached {
                ending_type,
                playtime_seconds,
                ..
            } => {
                println!();
                let label = ending_type.unwrap_or_else(|| "the end".into());
                println!("{}", format!("— {label} —").green().bold());
                println!("{}", format!("playtime: {playtime_seconds:.0}s").dimmed());
            }
            _ => {}
        }
    }
}

/// Returns `false` on EOF.
fn wait_for_enter(input: &mut impl BufRead) -> Result<bool, String> {
    print!("{}", "▸ ".dimmed());
    io::stdout().flush().map_err(|e| e.to_string())?;
    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(|e| e.to_string())?;
    Ok(read > 0)
}

/// Prompt until a valid 1-based selection is entered. `None` on EOF.
fn read_selection(input: &mut impl BufRead, count: usize) -> Result<Option<usize>, String> {
    loop {
        print!("{}", "? ".yellow());
        io::stdout().flush().map_err(|e| e.to_string())?;
        let mut line = String::new();
        if input.read_line(&mut line).map_err(|e| e.to_string())? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
            _ => println!("  enter a number between 1 and {count}"),
        }
    }
}
