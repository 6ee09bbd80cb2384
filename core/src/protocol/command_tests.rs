//! Tests for wire protocol parsing and rendering

use std::time::Duration;

use super::command::{Command, Reply, Verb};
use super::error::ProtocolError;
use crate::timer::PoolError;

// parse

#[test]
fn test_parse_set() {
    assert_eq!(
        Command::parse("SET:0:30"),
        Ok(Command::Set {
            id: 0,
            timeout: Duration::from_secs(30),
        })
    );
}

#[test]
fn test_parse_reset() {
    assert_eq!(
        Command::parse("RESET:4:1"),
        Ok(Command::Reset {
            id: 4,
            timeout: Duration::from_secs(1),
        })
    );
}

#[test]
fn test_parse_cancel_with_trailing_colon() {
    // The reference client always sends the trailing colon
    assert_eq!(Command::parse("CANCEL:2:"), Ok(Command::Cancel { id: 2 }));
}

#[test]
fn test_parse_cancel_without_trailing_colon() {
    assert_eq!(Command::parse("CANCEL:2"), Ok(Command::Cancel { id: 2 }));
}

#[test]
fn test_parse_cancel_ignores_stray_timeout() {
    assert_eq!(Command::parse("CANCEL:2:15"), Ok(Command::Cancel { id: 2 }));
}

#[test]
fn test_parse_trims_line_endings() {
    // Windows clients leave a \r behind after line splitting
    assert_eq!(
        Command::parse("SET:1:5\r"),
        Ok(Command::Set {
            id: 1,
            timeout: Duration::from_secs(5),
        })
    );
}

#[test]
fn test_parse_empty_line() {
    assert_eq!(Command::parse(""), Err(ProtocolError::Empty));
    assert_eq!(Command::parse("   "), Err(ProtocolError::Empty));
}

#[test]
fn test_parse_unknown_verb() {
    assert_eq!(
        Command::parse("PING:0:1"),
        Err(ProtocolError::UnknownVerb {
            verb: "PING".to_string(),
        })
    );
}

#[test]
fn test_parse_verbs_are_case_sensitive() {
    assert_eq!(
        Command::parse("set:0:1"),
        Err(ProtocolError::UnknownVerb {
            verb: "set".to_string(),
        })
    );
}

#[test]
fn test_parse_missing_id() {
    assert_eq!(Command::parse("SET"), Err(ProtocolError::MissingId));
    assert_eq!(Command::parse("SET:"), Err(ProtocolError::MissingId));
    assert_eq!(Command::parse("SET::5"), Err(ProtocolError::MissingId));
}

#[test]
fn test_parse_invalid_id() {
    assert_eq!(
        Command::parse("SET:zero:5"),
        Err(ProtocolError::InvalidId {
            field: "zero".to_string(),
        })
    );
    assert_eq!(
        Command::parse("CANCEL:-1:"),
        Err(ProtocolError::InvalidId {
            field: "-1".to_string(),
        })
    );
}

#[test]
fn test_parse_missing_timeout() {
    assert_eq!(Command::parse("SET:1"), Err(ProtocolError::MissingTimeout));
    assert_eq!(Command::parse("SET:1:"), Err(ProtocolError::MissingTimeout));
    assert_eq!(
        Command::parse("RESET:1"),
        Err(ProtocolError::MissingTimeout)
    );
}

#[test]
fn test_parse_invalid_timeout() {
    assert_eq!(
        Command::parse("SET:1:1.5"),
        Err(ProtocolError::InvalidTimeout {
            field: "1.5".to_string(),
        })
    );
}

// render

#[test]
fn test_command_display_is_canonical_wire_form() {
    let set = Command::Set {
        id: 3,
        timeout: Duration::from_secs(30),
    };
    assert_eq!(set.to_string(), "SET:3:30");
    assert_eq!(Command::Cancel { id: 3 }.to_string(), "CANCEL:3:");
    let reset = Command::Reset {
        id: 3,
        timeout: Duration::from_secs(2),
    };
    assert_eq!(reset.to_string(), "RESET:3:2");
}

#[test]
fn test_command_display_round_trips_through_parse() {
    let commands = [
        Command::Set {
            id: 0,
            timeout: Duration::from_secs(10),
        },
        Command::Cancel { id: 1 },
        Command::Reset {
            id: 4,
            timeout: Duration::from_secs(0),
        },
    ];
    for command in commands {
        assert_eq!(Command::parse(&command.to_string()), Ok(command));
    }
}

#[test]
fn test_reply_rendering() {
    let done = Reply::Done {
        verb: Verb::Set,
        id: 1,
    };
    assert_eq!(done.to_string(), "SET DONE:1");
    assert_eq!(Reply::Fired { id: 1 }.to_string(), "CALLBACK EXECUTED:1");
}

#[test]
fn test_failure_reply_carries_pool_reason() {
    let already = Reply::failed(Verb::Set, 0, &PoolError::AlreadyActive { id: 0 });
    assert_eq!(already.to_string(), "SET FAILED:0:ALREADY ACTIVE");

    let invalid = Reply::failed(
        Verb::Set,
        9,
        &PoolError::InvalidId { id: 9, capacity: 5 },
    );
    assert_eq!(invalid.to_string(), "SET FAILED:9:INVALID ID");

    let inactive = Reply::failed(Verb::Cancel, 2, &PoolError::NotActive { id: 2 });
    assert_eq!(inactive.to_string(), "CANCEL FAILED:2:NOT ACTIVE");
}

#[test]
fn test_rejected_reply_rendering() {
    let rejected = Reply::Rejected {
        detail: "unknown verb 'PING': expected SET, CANCEL or RESET".to_string(),
    };
    assert_eq!(
        rejected.to_string(),
        "ERROR:unknown verb 'PING': expected SET, CANCEL or RESET"
    );
}
