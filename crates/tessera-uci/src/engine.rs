//! Event-driven, multi-threaded UCI engine.
//!
//! The main thread owns the engine state and processes events from two
//! sources: a stdin reader thread feeding parsed commands, and a search
//! worker thread reporting completion. The worker owns the searcher
//! (and with it the transposition table) for the duration of a search
//! and hands it back with the result; the only cross-thread signals are
//! the atomic stop flag and the final `SearchDone` message.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

use tracing::{debug, info, warn};

use tessera_engine::{
    Game, Iteration, MAX_DEPTH, SearchResult, Searcher, control_from_go, is_mate_score,
    move_to_uci,
};

use crate::command::{Command, GoParams, parse_command};
use crate::error::UciError;

/// Whether the engine is idle or has a search worker running.
enum EngineState {
    Idle,
    Searching,
}

/// Events processed by the main engine loop.
enum EngineEvent {
    UciCommand(Result<Command, UciError>),
    SearchDone(SearchDone),
    InputClosed,
}

/// Payload returned by the search thread when it finishes.
struct SearchDone {
    result: SearchResult,
    searcher: Searcher,
}

/// The UCI engine: current position, searcher, and search state.
pub struct UciEngine {
    game: Game,
    history: Vec<u64>,
    searcher: Option<Searcher>,
    state: EngineState,
    stop_flag: Arc<AtomicBool>,
}

impl UciEngine {
    /// Create an engine holding the starting position.
    pub fn new() -> Self {
        Self {
            game: Game::starting_position(),
            history: Vec::new(),
            searcher: Some(Searcher::new()),
            state: EngineState::Idle,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run the UCI event loop until `quit` or stdin closes.
    pub fn run(mut self) -> Result<(), UciError> {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        // Stdin reader thread: one event per line.
        let stdin_tx = tx.clone();
        std::thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        debug!(cmd = %trimmed, "received UCI command");
                        let cmd = parse_command(trimmed);
                        if stdin_tx.send(EngineEvent::UciCommand(cmd)).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            let _ = stdin_tx.send(EngineEvent::InputClosed);
        });

        for event in &rx {
            match event {
                EngineEvent::UciCommand(Ok(cmd)) => match cmd {
                    Command::Uci => self.handle_uci(),
                    Command::IsReady => println!("readyok"),
                    Command::UciNewGame => self.handle_ucinewgame(),
                    Command::Position { game, history } => {
                        self.game = game;
                        self.history = history;
                    }
                    Command::Go(params) => self.handle_go(params, &tx),
                    Command::Stop => self.handle_stop(),
                    Command::Quit => {
                        if matches!(self.state, EngineState::Searching) {
                            self.handle_stop();
                            // The worker still owes us a bestmove.
                            for event in &rx {
                                if let EngineEvent::SearchDone(done) = event {
                                    self.finish_search(done);
                                    break;
                                }
                            }
                        }
                        break;
                    }
                    Command::Unknown(word) => {
                        if !word.is_empty() {
                            debug!(%word, "ignoring unknown command");
                        }
                    }
                },
                EngineEvent::UciCommand(Err(e)) => {
                    warn!(error = %e, "rejected UCI command");
                }
                EngineEvent::SearchDone(done) => self.finish_search(done),
                EngineEvent::InputClosed => break,
            }
        }

        info!("tessera shutting down");
        Ok(())
    }

    fn handle_uci(&self) {
        println!("id name tessera {}", env!("CARGO_PKG_VERSION"));
        println!("id author the tessera authors");
        println!("uciok");
    }

    fn handle_ucinewgame(&mut self) {
        self.game = Game::starting_position();
        self.history.clear();
    }

    fn handle_go(&mut self, params: GoParams, tx: &mpsc::Sender<EngineEvent>) {
        if matches!(self.state, EngineState::Searching) {
            warn!("go received while searching, ignoring");
            return;
        }

        // A fresh flag per search: a stale `stop` must not kill this one.
        self.stop_flag = Arc::new(AtomicBool::new(false));

        let control = control_from_go(
            params.wtime,
            params.btime,
            params.winc,
            params.binc,
            params.movetime,
            params.infinite,
            self.game.turn(),
            Arc::clone(&self.stop_flag),
        );
        let depth_limit = params.depth.unwrap_or(MAX_DEPTH - 1);

        let mut searcher = self.searcher.take().unwrap_or_default();
        let game = self.game.clone();
        let history = self.history.clone();
        let tx = tx.clone();

        std::thread::spawn(move || {
            let result = searcher.search(&game, &history, depth_limit, &control, |iter| {
                println!("{}", format_info(iter, control.elapsed().as_millis()));
            });
            let _ = tx.send(EngineEvent::SearchDone(SearchDone { result, searcher }));
        });

        self.state = EngineState::Searching;
    }

    fn handle_stop(&mut self) {
        self.stop_flag.store(true, Ordering::Release);
    }

    fn finish_search(&mut self, done: SearchDone) {
        self.searcher = Some(done.searcher);
        self.state = EngineState::Idle;

        match done.result.best_move {
            Some(mv) => println!("bestmove {}", move_to_uci(&mv)),
            None => println!("bestmove 0000"),
        }
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Format one completed iteration as a UCI `info` line.
fn format_info(iter: &Iteration<'_>, elapsed_ms: u128) -> String {
    let nps = iter.nodes as u128 * 1000 / elapsed_ms.max(1);

    let score = if is_mate_score(iter.score) {
        let sign = if iter.score > 0 { 1 } else { -1 };
        let mate_in = (iter.pv.len() as i32 + 1) / 2 * sign;
        format!("score mate {mate_in}")
    } else {
        format!("score cp {}", iter.score)
    };

    let pv = iter
        .pv
        .iter()
        .map(move_to_uci)
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "info nodes {} nps {} time {} hashfull {} depth {} seldepth {} {} pv {}",
        iter.nodes, nps, elapsed_ms, iter.hashfull, iter.depth, iter.seldepth, score, pv
    )
}
