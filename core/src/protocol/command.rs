use std::fmt;
use std::time::Duration;

use super::error::ProtocolError;
use crate::timer::PoolError;

/// Request verbs understood by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Set,
    Cancel,
    Reset,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Set => "SET",
            Verb::Cancel => "CANCEL",
            Verb::Reset => "RESET",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed client request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Set { id: usize, timeout: Duration },
    Cancel { id: usize },
    Reset { id: usize, timeout: Duration },
}

impl Command {
    /// Parse a request line.
    ///
    /// Verbs are case-sensitive. `CANCEL:<id>` is accepted with or without
    /// the trailing colon the reference client always sends; a stray third
    /// field on a cancel is ignored.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }

        let mut fields = line.splitn(3, ':');
        let verb = match fields.next().unwrap_or_default() {
            "SET" => Verb::Set,
            "CANCEL" => Verb::Cancel,
            "RESET" => Verb::Reset,
            other => {
                return Err(ProtocolError::UnknownVerb {
                    verb: other.to_string(),
                });
            }
        };

        let id_field = fields
            .next()
            .filter(|field| !field.is_empty())
            .ok_or(ProtocolError::MissingId)?;
        let id: usize = id_field.parse().map_err(|_| ProtocolError::InvalidId {
            field: id_field.to_string(),
        })?;

        match verb {
            Verb::Cancel => Ok(Command::Cancel { id }),
            Verb::Set | Verb::Reset => {
                let timeout_field = fields
                    .next()
                    .filter(|field| !field.is_empty())
                    .ok_or(ProtocolError::MissingTimeout)?;
                let seconds: u64 =
                    timeout_field
                        .parse()
                        .map_err(|_| ProtocolError::InvalidTimeout {
                            field: timeout_field.to_string(),
                        })?;
                let timeout = Duration::from_secs(seconds);

                Ok(match verb {
                    Verb::Set => Command::Set { id, timeout },
                    _ => Command::Reset { id, timeout },
                })
            }
        }
    }

    /// The verb this command was parsed from
    pub fn verb(&self) -> Verb {
        match self {
            Command::Set { .. } => Verb::Set,
            Command::Cancel { .. } => Verb::Cancel,
            Command::Reset { .. } => Verb::Reset,
        }
    }

    /// The slot id this command addresses
    pub fn id(&self) -> usize {
        match *self {
            Command::Set { id, .. } | Command::Cancel { id } | Command::Reset { id, .. } => id,
        }
    }
}

impl fmt::Display for Command {
    /// Canonical wire form, the inverse of [`Command::parse`]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Set { id, timeout } => write!(f, "SET:{id}:{}", timeout.as_secs()),
            Command::Cancel { id } => write!(f, "CANCEL:{id}:"),
            Command::Reset { id, timeout } => write!(f, "RESET:{id}:{}", timeout.as_secs()),
        }
    }
}

/// A server-to-client line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Command applied: `SET DONE:3`
    Done { verb: Verb, id: usize },

    /// Timer fired: `CALLBACK EXECUTED:3`
    Fired { id: usize },

    /// Pool refused the command: `SET FAILED:3:ALREADY ACTIVE`
    Failed {
        verb: Verb,
        id: usize,
        reason: &'static str,
    },

    /// The line did not parse: `ERROR:<detail>`
    Rejected { detail: String },
}

impl Reply {
    /// Failure reply for a pool rejection.
    pub fn failed(verb: Verb, id: usize, error: &PoolError) -> Self {
        let reason = match error {
            PoolError::InvalidId { .. } => "INVALID ID",
            PoolError::AlreadyActive { .. } => "ALREADY ACTIVE",
            PoolError::NotActive { .. } => "NOT ACTIVE",
        };
        Reply::Failed { verb, id, reason }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Done { verb, id } => write!(f, "{verb} DONE:{id}"),
            Reply::Fired { id } => write!(f, "CALLBACK EXECUTED:{id}"),
            Reply::Failed { verb, id, reason } => write!(f, "{verb} FAILED:{id}:{reason}"),
            Reply::Rejected { detail } => write!(f, "ERROR:{detail}"),
        }
    }
}
