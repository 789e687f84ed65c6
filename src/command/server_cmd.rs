use crate::error::KvResult;
use crate::resp::{Reply, Value};

/// `PING` answers `+PONG`; with arguments they are echoed back joined by
/// spaces inside the reply.
pub fn cmd_ping(args: &[Value]) -> KvResult<Reply> {
    if args.is_empty() {
        return Ok(Reply::Pong(None));
    }
    let joined = args
        .iter()
        .map(Value::to_text)
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Reply::Pong(Some(joined)))
}
