use crate::command::arg_to_string;
use crate::error::KvResult;
use crate::resp::{Reply, Value};
use crate::store::Store;

pub fn cmd_hset(args: &[Value], store: &mut Store) -> KvResult<Reply> {
    let map = arg_to_string(args, 0, "HSET")?;
    let field = arg_to_string(args, 1, "HSET")?;
    let value = arg_to_string(args, 2, "HSET")?;
    store.hset(map, field, value);
    Ok(Reply::Ok)
}

pub fn cmd_hget(args: &[Value], store: &Store) -> KvResult<Reply> {
    let map = arg_to_string(args, 0, "HGET")?;
    let field = arg_to_string(args, 1, "HGET")?;
    Ok(match store.hget(&map, &field) {
        Some(v) => Reply::Value(v.to_string()),
        None => Reply::Null,
    })
}
