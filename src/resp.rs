use crate::error::{KvError, KvResult};

pub const SIMPLE_STRING: u8 = b'+';
pub const SIMPLE_ERROR: u8 = b'-';
pub const INTEGER: u8 = b':';
pub const BULK_STRING: u8 = b'$';
pub const ARRAY: u8 = b'*';

/// Largest element count and payload length the single-digit grammar allows.
pub const MAX_DIGIT: usize = 9;

/// Offset of the first element: type tag, count digit and `\r\n` of the header.
const HEADER_LEN: usize = 4;

/// One decoded protocol value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// +text
    SimpleString(String),
    /// -text
    SimpleError(String),
    /// :123
    Integer(i64),
    /// $text
    BulkString(String),
    /// *text. The payload is carried as opaque text, nested elements are
    /// not decoded.
    Array(String),
}

impl Value {
    /// Textual form used when a value is passed as a command argument.
    pub fn to_text(&self) -> String {
        match self {
            Value::Integer(n) => n.to_string(),
            Value::SimpleString(s)
            | Value::SimpleError(s)
            | Value::BulkString(s)
            | Value::Array(s) => s.clone(),
        }
    }

    fn from_payload(tag: u8, payload: &[u8]) -> Option<Self> {
        let text = String::from_utf8_lossy(payload).into_owned();
        match tag {
            SIMPLE_STRING => Some(Value::SimpleString(text)),
            SIMPLE_ERROR => Some(Value::SimpleError(text)),
            INTEGER => text.parse().ok().map(Value::Integer),
            BULK_STRING => Some(Value::BulkString(text)),
            ARRAY => Some(Value::Array(text)),
            _ => None,
        }
    }
}

pub fn is_valid_type(byte: u8) -> bool {
    matches!(
        byte,
        SIMPLE_STRING | SIMPLE_ERROR | INTEGER | BULK_STRING | ARRAY
    )
}

/// Element count announced by an array header line (`*<N>`, with or without
/// its `\r\n`). Both the decoder and log replay size frames with this.
pub fn element_count(header: &[u8]) -> Option<usize> {
    match header {
        [ARRAY, digit, ..] => digit_value(*digit),
        _ => None,
    }
}

/// Number of protocol lines a frame with `count` elements occupies,
/// header included.
pub fn frame_line_count(count: usize) -> usize {
    2 * count + 1
}

fn digit_value(byte: u8) -> Option<usize> {
    byte.is_ascii_digit().then(|| (byte - b'0') as usize)
}

/// The result of decoding one request buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub items: Vec<Value>,
    /// Bytes of the buffer covered by the header and every decoded element.
    pub consumed: usize,
    /// Whether the buffer's first byte is a known type tag.
    pub valid_type: bool,
    /// Whether the buffer opens with an array header. Only such frames
    /// carry commands.
    pub is_array: bool,
    /// Every element announced by the header was decoded.
    pub complete: bool,
}

impl Frame {
    /// The raw bytes this frame was decoded from.
    pub fn raw<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[..self.consumed.min(buf.len())]
    }
}

/// Fixed-format frame decoder.
///
/// Decoding never fails. When an element is malformed or cut short the
/// decoder stops and returns what it has, with `consumed` left at the start
/// of the bad element.
pub struct Decoder;

impl Decoder {
    pub fn decode(buf: &[u8]) -> Frame {
        let valid_type = buf.first().is_some_and(|b| is_valid_type(*b));
        let is_array = buf.first() == Some(&ARRAY);
        let count = if has_crlf(buf, 2) {
            buf.get(1).and_then(|b| digit_value(*b)).unwrap_or(0)
        } else {
            0
        };

        let mut items = Vec::with_capacity(count);
        let mut cursor = HEADER_LEN.min(buf.len());

        while items.len() < count {
            match Self::decode_element(buf, cursor) {
                Some((value, next)) => {
                    items.push(value);
                    cursor = next;
                }
                None => break,
            }
        }

        Frame {
            complete: items.len() == count,
            items,
            consumed: cursor,
            valid_type,
            is_array,
        }
    }

    /// Decode the element starting at `start`, returning it and the offset
    /// just past its trailing `\r\n`.
    fn decode_element(buf: &[u8], start: usize) -> Option<(Value, usize)> {
        let tag = *buf.get(start)?;
        if !is_valid_type(tag) {
            return None;
        }
        let len = digit_value(*buf.get(start + 1)?)?;
        if !has_crlf(buf, start + 2) {
            return None;
        }
        let data_start = start + 4;
        let data_end = data_start + len;
        if !has_crlf(buf, data_end) {
            return None;
        }
        // The log is replayed line by line, so payloads must stay on one line
        let payload = &buf[data_start..data_end];
        if payload.iter().any(|b| matches!(b, b'\r' | b'\n')) {
            return None;
        }
        let value = Value::from_payload(tag, payload)?;
        Some((value, data_end + 2))
    }
}

fn has_crlf(buf: &[u8], at: usize) -> bool {
    buf.get(at..at + 2) == Some(b"\r\n".as_slice())
}

/// Encode a command as a frame of bulk strings.
pub fn encode_command(words: &[&str]) -> KvResult<Vec<u8>> {
    if words.len() > MAX_DIGIT {
        return Err(KvError::FrameTooLarge(words.len()));
    }
    let mut buf = Vec::with_capacity(HEADER_LEN + words.len() * 16);
    buf.push(ARRAY);
    buf.extend_from_slice(words.len().to_string().as_bytes());
    buf.extend_from_slice(b"\r\n");
    for word in words {
        if word.len() > MAX_DIGIT {
            return Err(KvError::PayloadTooLarge(word.len()));
        }
        buf.push(BULK_STRING);
        buf.extend_from_slice(word.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(word.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
    Ok(buf)
}

/// A response sent back to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// +OK
    Ok,
    /// +PONG, or +PONG "<args>" when PING carried arguments
    Pong(Option<String>),
    /// +<value>
    Value(String),
    /// _
    Null,
    /// -<message>
    Error(String),
}

impl Reply {
    pub fn error(s: impl Into<String>) -> Self {
        Reply::Error(s.into())
    }

    pub fn invalid_type() -> Self {
        Reply::Error("INVALID TYPE".to_string())
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_to(&mut buf);
        buf
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        match self {
            Reply::Ok => buf.extend_from_slice(b"+OK"),
            Reply::Pong(None) => buf.extend_from_slice(b"+PONG"),
            Reply::Pong(Some(args)) => {
                buf.extend_from_slice(b"+PONG \"");
                buf.extend_from_slice(args.as_bytes());
                buf.push(b'"');
            }
            Reply::Value(v) => {
                buf.push(SIMPLE_STRING);
                buf.extend_from_slice(v.as_bytes());
            }
            Reply::Null => buf.push(b'_'),
            Reply::Error(msg) => {
                buf.push(SIMPLE_ERROR);
                buf.extend_from_slice(msg.as_bytes());
            }
        }
        buf.extend_from_slice(b"\r\n");
    }
}
