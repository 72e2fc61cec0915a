//! In-memory streams for unit tests.

use std::io::{Cursor, Read, Write};
use std::sync::{Arc, Mutex};

/// Everything written to a [`ScriptedStream`].
pub type Written = Arc<Mutex<Vec<u8>>>;

/// Reads from a fixed script and records writes.
pub struct ScriptedStream {
    input: Cursor<Vec<u8>>,
    output: Written,
}

impl ScriptedStream {
    pub fn new(input: &[u8]) -> (Self, Written) {
        let output = Written::default();
        let stream = ScriptedStream {
            input: Cursor::new(input.to_vec()),
            output: output.clone(),
        };
        (stream, output)
    }
}

impl Read for ScriptedStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for ScriptedStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.output.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Written bytes as text.
pub fn written_text(output: &Written) -> String {
    String::from_utf8_lossy(&output.lock().unwrap()).into_owned()
}
