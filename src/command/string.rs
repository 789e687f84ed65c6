use crate::command::arg_to_string;
use crate::error::KvResult;
use crate::resp::{Reply, Value};
use crate::store::Store;

pub fn cmd_set(args: &[Value], store: &mut Store) -> KvResult<Reply> {
    let key = arg_to_string(args, 0, "SET")?;
    let value = arg_to_string(args, 1, "SET")?;
    store.set_string(key, value);
    Ok(Reply::Ok)
}

pub fn cmd_get(args: &[Value], store: &Store) -> KvResult<Reply> {
    let key = arg_to_string(args, 0, "GET")?;
    Ok(match store.get_string(&key) {
        Some(v) => Reply::Value(v.to_string()),
        None => Reply::Null,
    })
}
