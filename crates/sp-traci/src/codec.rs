//! Byte-level encoding of TraCI messages.
//!
//! `Writer` builds command payloads; `Reader` walks a received message body.
//! Typed values (a type byte followed by the value) decode into
//! [`TraciValue`], recursively for compounds.

use crate::constants::*;
use crate::{TraciError, TraciResult};

// ── TraciValue ────────────────────────────────────────────────────────────────

/// A typed value as it appears on the wire.
#[derive(Clone, Debug, PartialEq)]
pub enum TraciValue {
    UByte(u8),
    Byte(i8),
    Int(i32),
    Double(f64),
    String(String),
    StringList(Vec<String>),
    Compound(Vec<TraciValue>),
}

impl TraciValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::UByte(_) => "ubyte",
            Self::Byte(_) => "byte",
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::StringList(_) => "string list",
            Self::Compound(_) => "compound",
        }
    }

    fn mismatch(&self, wanted: &str) -> TraciError {
        TraciError::Malformed(format!("expected {wanted}, got {}", self.type_name()))
    }

    pub fn into_int(self) -> TraciResult<i32> {
        match self {
            Self::Int(v) => Ok(v),
            other => Err(other.mismatch("int")),
        }
    }

    /// Doubles, and ints widened to doubles.
    pub fn into_f64(self) -> TraciResult<f64> {
        match self {
            Self::Double(v) => Ok(v),
            Self::Int(v) => Ok(v as f64),
            other => Err(other.mismatch("double")),
        }
    }

    pub fn into_string(self) -> TraciResult<String> {
        match self {
            Self::String(v) => Ok(v),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn into_string_list(self) -> TraciResult<Vec<String>> {
        match self {
            Self::StringList(v) => Ok(v),
            other => Err(other.mismatch("string list")),
        }
    }

    pub fn into_compound(self) -> TraciResult<Vec<TraciValue>> {
        match self {
            Self::Compound(v) => Ok(v),
            other => Err(other.mismatch("compound")),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

// ── Writer ────────────────────────────────────────────────────────────────────

/// Append-only big-endian buffer.
#[derive(Default, Debug)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn f64(&mut self, v: f64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// Length-prefixed UTF-8 string.
    pub fn string(&mut self, s: &str) -> &mut Self {
        self.i32(s.len() as i32);
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    pub fn string_list<S: AsRef<str>>(&mut self, items: &[S]) -> &mut Self {
        self.i32(items.len() as i32);
        for s in items {
            self.string(s.as_ref());
        }
        self
    }

    pub fn bytes(&mut self, raw: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(raw);
        self
    }

    /// Type byte followed by the value.
    pub fn value(&mut self, value: &TraciValue) -> &mut Self {
        match value {
            TraciValue::UByte(v) => self.u8(TYPE_UBYTE).u8(*v),
            TraciValue::Byte(v) => self.u8(TYPE_BYTE).u8(*v as u8),
            TraciValue::Int(v) => self.u8(TYPE_INTEGER).i32(*v),
            TraciValue::Double(v) => self.u8(TYPE_DOUBLE).f64(*v),
            TraciValue::String(v) => self.u8(TYPE_STRING).string(v),
            TraciValue::StringList(v) => self.u8(TYPE_STRINGLIST).string_list(v),
            TraciValue::Compound(items) => {
                self.u8(TYPE_COMPOUND).i32(items.len() as i32);
                for item in items {
                    self.value(item);
                }
                self
            }
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// ── Framing ───────────────────────────────────────────────────────────────────

/// Frame one command: length, id, content.  Commands whose total size
/// exceeds 255 bytes use the extended form (a zero byte, then a 32-bit
/// length).
pub fn encode_command(id: u8, content: &[u8]) -> Vec<u8> {
    let short_len = 1 + 1 + content.len();
    let mut w = Writer::new();
    if short_len <= u8::MAX as usize {
        w.u8(short_len as u8);
    } else {
        w.u8(0).i32((1 + 4 + 1 + content.len()) as i32);
    }
    w.u8(id).bytes(content);
    w.into_bytes()
}

/// Prefix framed commands with the total message length.
pub fn encode_message(commands: &[u8]) -> Vec<u8> {
    let mut w = Writer::new();
    w.i32((4 + commands.len()) as i32).bytes(commands);
    w.into_bytes()
}

/// One framed command inside a received message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawCommand<'a> {
    pub id:      u8,
    pub content: &'a [u8],
}

impl<'a> RawCommand<'a> {
    pub fn reader(&self) -> Reader<'a> {
        Reader::new(self.content)
    }

    /// Interpret this command as a status response to `expected`.
    pub fn into_status(self, expected: u8) -> TraciResult<()> {
        if self.id != expected {
            return Err(TraciError::UnexpectedCommand { expected, got: self.id });
        }
        let mut r = self.reader();
        let result = r.u8()?;
        let description = r.string()?;
        match result {
            RTYPE_OK => Ok(()),
            RTYPE_NOTIMPLEMENTED => Err(TraciError::CommandFailed {
                command: expected,
                description: format!("not implemented: {description}"),
            }),
            _ => Err(TraciError::CommandFailed { command: expected, description }),
        }
    }
}

// ── Reader ────────────────────────────────────────────────────────────────────

/// Cursor over a received message body.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn take(&mut self, n: usize) -> TraciResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(TraciError::Malformed(format!(
                "need {n} bytes at offset {}, {} left",
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> TraciResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> TraciResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn i32(&mut self) -> TraciResult<i32> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    pub fn f64(&mut self) -> TraciResult<f64> {
        Ok(f64::from_be_bytes(self.array()?))
    }

    /// A non-negative 32-bit count or length.
    fn count(&mut self) -> TraciResult<usize> {
        let n = self.i32()?;
        usize::try_from(n).map_err(|_| TraciError::Malformed(format!("negative length {n}")))
    }

    pub fn string(&mut self) -> TraciResult<String> {
        let len = self.count()?;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec())
            .map_err(|e| TraciError::Malformed(format!("invalid UTF-8 string: {e}")))
    }

    pub fn string_list(&mut self) -> TraciResult<Vec<String>> {
        let n = self.count()?;
        let mut out = Vec::with_capacity(n.min(self.remaining() / 4));
        for _ in 0..n {
            out.push(self.string()?);
        }
        Ok(out)
    }

    /// A type byte followed by its value.
    pub fn value(&mut self) -> TraciResult<TraciValue> {
        let ty = self.u8()?;
        self.value_of_type(ty)
    }

    pub fn value_of_type(&mut self, ty: u8) -> TraciResult<TraciValue> {
        Ok(match ty {
            TYPE_UBYTE => TraciValue::UByte(self.u8()?),
            TYPE_BYTE => TraciValue::Byte(self.u8()? as i8),
            TYPE_INTEGER => TraciValue::Int(self.i32()?),
            TYPE_DOUBLE => TraciValue::Double(self.f64()?),
            TYPE_STRING => TraciValue::String(self.string()?),
            TYPE_STRINGLIST => TraciValue::StringList(self.string_list()?),
            TYPE_COMPOUND => {
                let n = self.count()?;
                // Every item carries at least its type byte.
                let mut items = Vec::with_capacity(n.min(self.remaining()));
                for _ in 0..n {
                    items.push(self.value()?);
                }
                TraciValue::Compound(items)
            }
            other => {
                return Err(TraciError::Malformed(format!("unsupported value type 0x{other:02x}")));
            }
        })
    }

    /// Next framed command.
    pub fn command(&mut self) -> TraciResult<RawCommand<'a>> {
        let short = self.u8()? as usize;
        let (total, header) = if short == 0 { (self.count()?, 5) } else { (short, 1) };
        if total < header + 1 {
            return Err(TraciError::Malformed(format!("command length {total} too short")));
        }
        let id = self.u8()?;
        let content = self.take(total - header - 1)?;
        Ok(RawCommand { id, content })
    }
}
