//! Chat command parsing.

use crate::catalog::MovieCategory;

pub const GETMOVIE_USAGE: &str = "Usage: getmovie <tmdb id>";

/// Commands understood in the bot channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Liveness check.
    Ping,
    /// Reconcile one catalog listing against the library.
    Check(MovieCategory),
    /// Add a movie to the library by catalog id, without confirmation.
    GetMovie(i64),
    /// A known command was used with bad arguments.
    Usage(&'static str),
}

impl BotCommand {
    /// Parse a message. Returns `None` for anything that isn't a known command.
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let rest = content.trim().strip_prefix(prefix)?;
        let mut parts = rest.split_whitespace();
        let name = parts.next()?.to_ascii_lowercase();

        let command = match name.as_str() {
            "ping" => BotCommand::Ping,
            "checknew" => BotCommand::Check(MovieCategory::Upcoming),
            "checkpop" => BotCommand::Check(MovieCategory::Popular),
            "checknowplaying" => BotCommand::Check(MovieCategory::NowPlaying),
            "checktoprated" => BotCommand::Check(MovieCategory::TopRated),
            "getmovie" => match parts.next().and_then(|arg| arg.parse::<i64>().ok()) {
                Some(id) if id > 0 => BotCommand::GetMovie(id),
                _ => BotCommand::Usage(GETMOVIE_USAGE),
            },
            _ => return None,
        };

        Some(command)
    }
}
