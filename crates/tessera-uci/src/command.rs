//! UCI command parsing.

use tessera_engine::Game;

use crate::error::UciError;

/// Parameters of a `go` command.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GoParams {
    /// `go depth N` -- fixed-depth search.
    pub depth: Option<i32>,
    /// `go movetime N` -- exact time budget in milliseconds.
    pub movetime: Option<u64>,
    /// White's remaining clock in milliseconds.
    pub wtime: Option<u64>,
    /// Black's remaining clock in milliseconds.
    pub btime: Option<u64>,
    /// White's increment per move in milliseconds.
    pub winc: Option<u64>,
    /// Black's increment per move in milliseconds.
    pub binc: Option<u64>,
    /// `go infinite` -- search until `stop`.
    pub infinite: bool,
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- reset engine state for a fresh game.
    UciNewGame,
    /// `position` -- replace the root position. Carries the position
    /// and the Zobrist hashes of everything played on the way to it,
    /// oldest first, for repetition detection.
    Position {
        /// The new root position.
        game: Game,
        /// Hashes of the positions preceding the root.
        history: Vec<u64>,
    },
    /// `go` -- start searching the current root.
    Go(GoParams),
    /// `stop` -- halt the current search.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
    /// Anything unrecognized, ignored per protocol.
    Unknown(String),
}

/// Parse one line of UCI input.
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&first) = tokens.first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match first {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        _ => Ok(Command::Unknown(first.to_string())),
    }
}

/// Parse `position [startpos | fen <FEN>] [moves <uci>...]`.
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.is_empty() {
        return Err(UciError::MalformedPosition);
    }

    let (mut game, rest) = if tokens[0] == "startpos" {
        (Game::starting_position(), &tokens[1..])
    } else if tokens[0] == "fen" {
        // A FEN is six space-separated fields.
        if tokens.len() < 7 {
            return Err(UciError::InvalidFen {
                fen: tokens[1..].join(" "),
            });
        }
        let fen = tokens[1..7].join(" ");
        let game = Game::from_fen(&fen).map_err(|_| UciError::InvalidFen { fen })?;
        (game, &tokens[7..])
    } else {
        return Err(UciError::MalformedPosition);
    };

    let mut history = Vec::new();
    if let Some((&"moves", moves)) = rest.split_first() {
        for uci in moves {
            history.push(game.hash());
            game = game.play_uci(uci).map_err(|_| UciError::InvalidMove {
                uci_move: uci.to_string(),
            })?;
        }
    }

    Ok(Command::Position { game, history })
}

/// Parse the `go` parameter list. Unknown parameters are skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        let key = tokens[i];
        match key {
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            "depth" | "movetime" | "wtime" | "btime" | "winc" | "binc" => {
                let raw = *tokens.get(i + 1).ok_or_else(|| UciError::InvalidGoValue {
                    param: key.to_string(),
                    value: String::new(),
                })?;
                let value: u64 = raw.parse().map_err(|_| UciError::InvalidGoValue {
                    param: key.to_string(),
                    value: raw.to_string(),
                })?;
                match key {
                    "depth" => params.depth = Some(value as i32),
                    "movetime" => params.movetime = Some(value),
                    "wtime" => params.wtime = Some(value),
                    "btime" => params.btime = Some(value),
                    "winc" => params.winc = Some(value),
                    "binc" => params.binc = Some(value),
                    _ => unreachable!(),
                }
                i += 2;
            }
            _ => i += 1,
        }
    }

    Ok(Command::Go(params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_commands() {
        assert!(matches!(parse_command("uci").unwrap(), Command::Uci));
        assert!(matches!(parse_command("isready").unwrap(), Command::IsReady));
        assert!(matches!(
            parse_command("ucinewgame").unwrap(),
            Command::UciNewGame
        ));
        assert!(matches!(parse_command("stop").unwrap(), Command::Stop));
        assert!(matches!(parse_command("quit").unwrap(), Command::Quit));
    }

    #[test]
    fn parse_position_startpos() {
        let cmd = parse_command("position startpos").unwrap();
        let Command::Position { game, history } = cmd else {
            panic!("expected Position");
        };
        assert_eq!(game.plies(), 0);
        assert!(history.is_empty());
    }

    #[test]
    fn parse_position_with_moves_tracks_history() {
        let cmd = parse_command("position startpos moves e2e4 e7e5 g1f3").unwrap();
        let Command::Position { game, history } = cmd else {
            panic!("expected Position");
        };
        assert_eq!(game.plies(), 3);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0], Game::starting_position().hash());
        assert!(!history.contains(&game.hash()));
    }

    #[test]
    fn parse_position_fen() {
        let cmd = parse_command(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        )
        .unwrap();
        assert!(matches!(cmd, Command::Position { .. }));
    }

    #[test]
    fn parse_position_fen_with_moves() {
        let cmd = parse_command(
            "position fen rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2 moves e4d5",
        )
        .unwrap();
        let Command::Position { game, history } = cmd else {
            panic!("expected Position");
        };
        assert_eq!(game.plies(), 1);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn position_rejects_bad_input() {
        assert!(parse_command("position").is_err());
        assert!(parse_command("position fen notafen").is_err());
        assert!(parse_command("position startpos moves e2e5").is_err());
        assert!(parse_command("position sideways").is_err());
    }

    #[test]
    fn parse_go_depth() {
        let Command::Go(params) = parse_command("go depth 6").unwrap() else {
            panic!("expected Go");
        };
        assert_eq!(params.depth, Some(6));
        assert!(!params.infinite);
    }

    #[test]
    fn parse_go_movetime() {
        let Command::Go(params) = parse_command("go movetime 2500").unwrap() else {
            panic!("expected Go");
        };
        assert_eq!(params.movetime, Some(2500));
    }

    #[test]
    fn parse_go_clocks() {
        let Command::Go(params) =
            parse_command("go wtime 300000 btime 295000 winc 2000 binc 2000").unwrap()
        else {
            panic!("expected Go");
        };
        assert_eq!(params.wtime, Some(300_000));
        assert_eq!(params.btime, Some(295_000));
        assert_eq!(params.winc, Some(2_000));
        assert_eq!(params.binc, Some(2_000));
    }

    #[test]
    fn parse_go_infinite_and_bare() {
        let Command::Go(params) = parse_command("go infinite").unwrap() else {
            panic!("expected Go");
        };
        assert!(params.infinite);

        let Command::Go(params) = parse_command("go").unwrap() else {
            panic!("expected Go");
        };
        assert_eq!(params, GoParams::default());
    }

    #[test]
    fn go_rejects_bad_values() {
        assert!(parse_command("go depth").is_err());
        assert!(parse_command("go movetime soon").is_err());
    }

    #[test]
    fn unknown_commands_are_preserved() {
        assert!(matches!(
            parse_command("xyzzy").unwrap(),
            Command::Unknown(word) if word == "xyzzy"
        ));
        assert!(matches!(parse_command("").unwrap(), Command::Unknown(_)));
    }
}
