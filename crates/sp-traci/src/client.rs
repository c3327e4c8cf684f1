//! Request/response exchange with a TraCI server.

use std::io::{Read, Write};

use crate::codec::{Reader, TraciValue, Writer, encode_command, encode_message};
use crate::constants::*;
use crate::{TraciError, TraciResult};

/// Blocking TraCI client over any byte stream.
///
/// Each call writes one message and reads exactly one reply, so the
/// connection is never left with unread data.
pub struct TraciClient<S> {
    stream: S,
}

impl<S: Read + Write> TraciClient<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Send one command and return the whole reply body.
    fn exchange(&mut self, id: u8, content: &[u8]) -> TraciResult<Vec<u8>> {
        let message = encode_message(&encode_command(id, content));
        self.stream.write_all(&message)?;
        self.stream.flush()?;

        let mut len = [0u8; 4];
        self.stream.read_exact(&mut len)?;
        let total = i32::from_be_bytes(len);
        let body_len = usize::try_from(total)
            .ok()
            .and_then(|t| t.checked_sub(4))
            .ok_or_else(|| TraciError::Malformed(format!("message length {total}")))?;
        let mut body = vec![0u8; body_len];
        self.stream.read_exact(&mut body)?;
        Ok(body)
    }

    /// Send a command whose reply is a bare status.
    fn command(&mut self, id: u8, content: &[u8]) -> TraciResult<Vec<u8>> {
        let body = self.exchange(id, content)?;
        let mut r = Reader::new(&body);
        r.command()?.into_status(id)?;
        let consumed = body.len() - r.remaining();
        Ok(body[consumed..].to_vec())
    }

    /// `(api_version, identifier)` of the server.
    pub fn version(&mut self) -> TraciResult<(i32, String)> {
        let rest = self.command(CMD_GETVERSION, &[])?;
        let mut r = Reader::new(&rest);
        let cmd = r.command()?;
        if cmd.id != CMD_GETVERSION {
            return Err(TraciError::UnexpectedCommand { expected: CMD_GETVERSION, got: cmd.id });
        }
        let mut c = cmd.reader();
        Ok((c.i32()?, c.string()?))
    }

    /// Advance the simulation by one step.
    pub fn simulation_step(&mut self) -> TraciResult<()> {
        let mut w = Writer::new();
        w.f64(0.0);
        let rest = self.command(CMD_SIMSTEP, w.as_bytes())?;
        let mut r = Reader::new(&rest);
        let subscriptions = r.i32()?;
        if subscriptions != 0 {
            tracing::debug!(subscriptions, "ignoring subscription results");
        }
        Ok(())
    }

    /// Read variable `var` of `object` in the domain served by get command
    /// `domain`.
    pub fn get(&mut self, domain: u8, var: u8, object: &str) -> TraciResult<TraciValue> {
        let mut w = Writer::new();
        w.u8(var).string(object);
        let rest = self.command(domain, w.as_bytes())?;

        let mut r = Reader::new(&rest);
        let cmd = r.command()?;
        let expected = domain.wrapping_add(RESPONSE_OFFSET);
        if cmd.id != expected {
            return Err(TraciError::UnexpectedCommand { expected, got: cmd.id });
        }
        let mut c = cmd.reader();
        let got_var = c.u8()?;
        if got_var != var {
            return Err(TraciError::Malformed(format!(
                "response for variable 0x{got_var:02x}, asked for 0x{var:02x}"
            )));
        }
        let got_object = c.string()?;
        if got_object != object {
            return Err(TraciError::Malformed(format!(
                "response for object {got_object:?}, asked for {object:?}"
            )));
        }
        c.value()
    }

    /// Write variable `var` of `object`.
    pub fn set(&mut self, domain: u8, var: u8, object: &str, value: &TraciValue) -> TraciResult<()> {
        let mut w = Writer::new();
        w.u8(var).string(object).value(value);
        self.command(domain, w.as_bytes())?;
        Ok(())
    }

    /// Ask the server to end the session.
    pub fn close(&mut self) -> TraciResult<()> {
        self.command(CMD_CLOSE, &[])?;
        Ok(())
    }
}
