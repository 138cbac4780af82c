//! UCI protocol errors.
//!
//! Per protocol convention none of these are fatal: the engine logs the
//! offending line and keeps reading. A failed `position` leaves the
//! root position unchanged.

/// Errors raised while handling UCI input.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The `position` command lacked a `startpos` or `fen` keyword.
    #[error("malformed position command: expected startpos or fen")]
    MalformedPosition,

    /// A FEN string could not be parsed into a legal position.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
    },

    /// A move in the `position` command was illegal or unparsable.
    #[error("invalid move: {uci_move}")]
    InvalidMove {
        /// The UCI move text that was rejected.
        uci_move: String,
    },

    /// A `go` parameter had a missing or unparsable value.
    #[error("invalid value for go parameter {param}: {value:?}")]
    InvalidGoValue {
        /// The parameter name (e.g. "wtime", "depth").
        param: String,
        /// The value text, if any was present.
        value: String,
    },

    /// Reading stdin failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
