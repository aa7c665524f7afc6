//! A console client for the One Poker round engine.
//!
//! The engine runs on its own thread and owns all the rules; this
//! binary only renders the display stream and answers the prompts for
//! the one interactive seat. Everything it knows arrives over the seat
//! handle, so it works exactly like any other front end would.

use anyhow::{Context, Result, bail};
use pico_args::Arguments;
use std::io::{self, Write};
use std::thread;

use one_poker::bot::BotSeat;
use one_poker::seat::{
    ActionPrompt, CommitPrompt, SeatDriver, SeatMessage, SeatRequest, SeatResponse, remote_seat,
};
use one_poker::{Action, GameConfig, GameEvent, OnePokerState, Outcome, TableView, seat::Update};

const HELP: &str = "\
Play One Poker against the house algorithm

USAGE:
  op_client [OPTIONS]

OPTIONS:
  --name NAME           Display name  [default: your login name]
  --bots N              Number of algorithmic opponents  [default: 1]
  --seed SEED           Fix the shuffle for a reproducible game

FLAGS:
  --auto-continue       Roll into the next round without waiting for enter
  -h, --help            Print help information
";

struct Args {
    name: String,
    bots: usize,
    seed: Option<u64>,
    auto_continue: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        name: pargs
            .value_from_str("--name")
            .unwrap_or_else(|_| whoami::username()),
        bots: pargs.value_from_str("--bots").unwrap_or(1),
        seed: pargs.opt_value_from_str("--seed")?,
        auto_continue: pargs.contains("--auto-continue"),
    };
    if args.bots == 0 {
        bail!("at least one opponent is required");
    }

    run(args)
}

fn run(args: Args) -> Result<()> {
    let (remote, handle) = remote_seat();
    let mut seats: Vec<(String, Box<dyn SeatDriver>)> =
        vec![(args.name.clone(), Box::new(remote))];
    for i in 1..=args.bots {
        seats.push((format!("Bot {i}"), Box::new(BotSeat::new(i))));
    }

    let state = match args.seed {
        Some(seed) => OnePokerState::with_seed(GameConfig::default(), seats, seed),
        None => OnePokerState::new(GameConfig::default(), seats),
    };
    let engine = thread::spawn(move || state.run());

    let mut last_view: Option<TableView> = None;
    while let Ok(message) = handle.recv() {
        match message {
            SeatMessage::Update(Update::Event(event)) => {
                if matches!(event, GameEvent::RoundStarted { .. }) {
                    println!();
                }
                println!("» {event}");
            }
            SeatMessage::Update(Update::View(view)) => last_view = Some(view),
            SeatMessage::Request(request) => {
                if let Some(view) = &last_view {
                    render(view);
                }
                let response = answer(request, args.auto_continue)?;
                if handle.respond(response).is_err() {
                    break;
                }
            }
        }
    }

    match engine.join() {
        Ok(Ok(outcome)) => {
            match outcome {
                Outcome::Champion(0) => println!("\nYou win the game."),
                Outcome::Champion(_) => println!("\nThe house wins."),
                Outcome::DeckExhausted => println!("\nThe deck ran dry; the game is a tie."),
            }
            Ok(())
        }
        Ok(Err(e)) => Err(e).context("the engine stopped early"),
        Err(_) => bail!("the engine thread panicked"),
    }
}

fn render(view: &TableView) {
    println!("--- round {}, {} cards left ---", view.round, view.cards_left);
    for player in &view.players {
        let status = if !player.seated {
            " (out)"
        } else if !player.in_round {
            " (folded)"
        } else {
            ""
        };
        println!(
            "{:<10} balance {:>3}  pot {:>3}  high {} low {}  {:<12} {}{status}",
            player.name,
            player.balance,
            player.pot,
            player.high,
            player.low,
            player.position.to_string(),
            player.slot,
        );
    }
}

fn answer(request: SeatRequest, auto_continue: bool) -> Result<SeatResponse> {
    match request {
        SeatRequest::Commit(prompt) => Ok(SeatResponse::Commit(ask_commit(&prompt)?)),
        SeatRequest::Act(prompt) => Ok(SeatResponse::Act(ask_action(&prompt)?)),
        SeatRequest::Continue => {
            if !auto_continue {
                print!("\npress enter for the next round ");
                io::stdout().flush()?;
                read_input_line()?;
            }
            Ok(SeatResponse::Continue)
        }
    }
}

fn read_input_line() -> Result<String> {
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        bail!("stdin closed");
    }
    Ok(line)
}

fn ask_commit(prompt: &CommitPrompt) -> Result<usize> {
    loop {
        print!(
            "\nselect a card to place down:\n  0) {}\n  1) {}\n> ",
            prompt.cards[0], prompt.cards[1]
        );
        io::stdout().flush()?;
        match read_input_line()?.trim() {
            "0" => return Ok(0),
            "1" => return Ok(1),
            _ => println!("can only choose 0 or 1"),
        }
    }
}

fn ask_action(prompt: &ActionPrompt) -> Result<Action> {
    loop {
        print!("\nyour move ({}): ", prompt.choices);
        io::stdout().flush()?;
        match parse_action(&read_input_line()?) {
            Some(action) => return Ok(action),
            None => println!("try one of: check, call, fold, all-in, raise <amount>"),
        }
    }
}

fn parse_action(line: &str) -> Option<Action> {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "check" => return Some(Action::Check),
        "call" => return Some(Action::Call),
        "fold" => return Some(Action::Fold),
        "all-in" | "allin" | "all in" => return Some(Action::AllIn),
        _ => {}
    }
    let rest = line.strip_prefix("raise")?.trim();
    rest.parse().ok().map(Action::Raise)
}
