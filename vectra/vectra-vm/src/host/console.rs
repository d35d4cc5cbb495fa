//! Console natives over any buffered reader and writer (stdin/stdout by default).

use std::io::{self, BufRead, Write};

use tracing::trace;

use super::{NativeDispatch, NativeFunction};
use crate::error::Trap;
use crate::vm::value::Value;

pub struct ConsoleNatives<R, W> {
    input: R,
    output: W,
}

impl ConsoleNatives<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleNatives<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    fn print(&mut self, v: &Value, newline: bool) -> Result<Value, Trap> {
        if newline {
            writeln!(self.output, "{v}")?;
        } else {
            write!(self.output, "{v}")?;
            self.output.flush()?;
        }
        Ok(Value::NULL)
    }

    /// One character, or the empty string at end of stream.
    fn read_char(&mut self) -> Result<Value, Trap> {
        let buf = self.input.fill_buf()?;
        if buf.is_empty() {
            return Ok(Value::string(""));
        }
        // Take one complete UTF-8 sequence; invalid bytes come back as U+FFFD.
        let width = match buf[0] {
            b if b < 0x80 => 1,
            b if b >= 0xF0 => 4,
            b if b >= 0xE0 => 3,
            b if b >= 0xC0 => 2,
            _ => 1,
        };
        let mut bytes = [0u8; 4];
        let mut taken = 0;
        while taken < width {
            let buf = self.input.fill_buf()?;
            if buf.is_empty() {
                break;
            }
            bytes[taken] = buf[0];
            self.input.consume(1);
            taken += 1;
        }
        let s = String::from_utf8_lossy(&bytes[..taken]);
        let first: String = s.chars().take(1).collect();
        Ok(Value::string(first))
    }

    /// A line without its terminator; empty string at end of stream.
    fn read_line(&mut self) -> Result<String, Trap> {
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    fn read_int(&mut self) -> Result<Value, Trap> {
        let line = self.read_line()?;
        let text = line.trim();
        if text.is_empty() {
            return Ok(Value::Number(0.0));
        }
        text.parse::<i64>()
            .map(|n| Value::Number(n as f64))
            .map_err(|_| Trap::InvalidNumber { input: line.clone() })
    }
}

impl<R: BufRead, W: Write> NativeDispatch for ConsoleNatives<R, W> {
    fn invoke(&mut self, id: u16, args: &[Value]) -> Result<Value, Trap> {
        let f = NativeFunction::from_id(id).ok_or(Trap::UnknownNative { id })?;
        f.check_arity(args)?;
        trace!(native = %f, argc = args.len(), "native call");
        match f {
            NativeFunction::Print => self.print(&args[0], false),
            NativeFunction::PrintLine => self.print(&args[0], true),
            NativeFunction::Read => self.read_char(),
            NativeFunction::ReadLine => Ok(Value::string(self.read_line()?)),
            NativeFunction::ReadInt => self.read_int(),
        }
    }
}
