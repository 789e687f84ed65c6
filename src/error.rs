#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArgCount(String),

    #[error("ERR incomplete frame for '{0}' command")]
    IncompleteFrame(String),

    #[error("ERR too many elements in frame: {0} (max 9)")]
    FrameTooLarge(usize),

    #[error("ERR payload too long: {0} bytes (max 9)")]
    PayloadTooLarge(usize),
}

impl KvError {
    pub fn to_resp_error(&self) -> String {
        format!("{self}")
    }
}

pub type KvResult<T> = Result<T, KvError>;
