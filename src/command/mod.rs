pub mod hash;
pub mod server_cmd;
pub mod string;

use crate::error::{KvError, KvResult};
use crate::resp::{Frame, Reply, Value};
use crate::store::Store;

/// What executing one frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub reply: Reply,
    /// The frame's raw bytes must be appended to the log.
    pub persist: bool,
}

impl Outcome {
    fn reply(reply: Reply) -> Self {
        Outcome { reply, persist: false }
    }
}

/// Execute a decoded frame against the store.
///
/// Command names are matched case-sensitively. A buffer whose leading byte
/// is not a type tag is answered with `-INVALID TYPE`. A frame that names no
/// known command, or is not an array, is answered with `+OK`. Writes run
/// only from frames that decoded every announced element, since the log is
/// replayed by the header's count. Failed commands are never persisted.
pub fn dispatch(frame: &Frame, store: &mut Store) -> Outcome {
    if !frame.valid_type {
        return Outcome::reply(Reply::invalid_type());
    }
    // Only array frames can be replayed from the log
    let (name, args) = match frame.items.split_first() {
        Some((Value::BulkString(name), args)) if frame.is_array => (name.as_str(), args),
        _ => return Outcome::reply(Reply::Ok),
    };

    if is_write_command(name) && !frame.complete {
        let err = KvError::IncompleteFrame(name.to_string());
        return Outcome::reply(Reply::error(err.to_resp_error()));
    }

    let result = match name {
        "PING" => server_cmd::cmd_ping(args),
        "SET" => string::cmd_set(args, store),
        "GET" => string::cmd_get(args, store),
        "HSET" => hash::cmd_hset(args, store),
        "HGET" => hash::cmd_hget(args, store),
        _ => return Outcome::reply(Reply::Ok),
    };

    match result {
        Ok(reply) => Outcome {
            reply,
            persist: is_write_command(name),
        },
        Err(e) => Outcome::reply(Reply::error(e.to_resp_error())),
    }
}

/// Commands whose accepted frames are appended to the log.
pub fn is_write_command(cmd: &str) -> bool {
    matches!(cmd, "SET" | "HSET")
}

/// Positional argument `index` as text, failing the command if absent.
pub fn arg_to_string(args: &[Value], index: usize, cmd: &str) -> KvResult<String> {
    args.get(index)
        .map(Value::to_text)
        .ok_or_else(|| KvError::WrongArgCount(cmd.to_string()))
}
