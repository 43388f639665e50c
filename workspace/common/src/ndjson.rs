//! Incremental splitter for newline-delimited JSON streams.
//!
//! Network reads hand out arbitrary byte chunks: a chunk may end in the middle
//! of a line, or even in the middle of a multi-byte UTF-8 sequence. The decoder
//! keeps the unterminated tail between calls and only hands out complete lines.
//! It knows nothing about the transport, so the backend proxy and the browser
//! client share it.

/// Stateful line splitter.
///
/// Lines are terminated by `\n`; a trailing `\r` is stripped as well. The
/// decoder can be reused for another stream after [`LineDecoder::reset`].
#[derive(Debug, Default, Clone)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // The retained tail never contains a newline, so only new bytes need scanning.
        let mut search_from = self.buffer.len();
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self.buffer[search_from..].iter().position(|b| *b == b'\n') {
            let end = search_from + offset;
            lines.push(decode_line(&self.buffer[consumed..end]));
            consumed = end + 1;
            search_from = consumed;
        }

        if consumed > 0 {
            self.buffer.drain(..consumed);
        }
        lines
    }

    /// Flushes the unterminated remainder at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = decode_line(&self.buffer);
        self.buffer.clear();
        Some(line)
    }

    /// Drops any buffered bytes.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of bytes waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_lines_in_one_chunk() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"{\"type\":\"sql\"}\n{\"type\":\"done\"}\n");
        assert_eq!(lines, vec!["{\"type\":\"sql\"}", "{\"type\":\"done\"}"]);
        assert_eq!(decoder.pending(), 0);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"{\"type\":").is_empty());
        assert_eq!(decoder.pending(), 8);
        assert!(decoder.push(b"\"data\",\"data\"").is_empty());
        let lines = decoder.push(b":1}\n{\"ty");
        assert_eq!(lines, vec!["{\"type\":\"data\",\"data\":1}"]);
        assert_eq!(decoder.finish(), Some("{\"ty".to_string()));
    }

    #[test]
    fn test_byte_at_a_time() {
        let input = "{\"a\":1}\n{\"b\":2}\n{\"c\":3}";
        let mut decoder = LineDecoder::new();
        let mut lines = Vec::new();
        for byte in input.as_bytes() {
            lines.extend(decoder.push(std::slice::from_ref(byte)));
        }
        lines.extend(decoder.finish());
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}", "{\"c\":3}"]);
    }

    #[test]
    fn test_multibyte_character_split() {
        let input = "{\"vendor\":\"Müller ☕\"}\n".as_bytes();
        // Split inside the two-byte 'ü' and inside the three-byte '☕'
        let split_a = input.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let split_b = input.iter().position(|b| *b == 0xE2).unwrap() + 2;

        let mut decoder = LineDecoder::new();
        assert!(decoder.push(&input[..split_a]).is_empty());
        assert!(decoder.push(&input[split_a..split_b]).is_empty());
        let lines = decoder.push(&input[split_b..]);
        assert_eq!(lines, vec!["{\"vendor\":\"Müller ☕\"}"]);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"one\r\n\r\ntwo\n");
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn test_reset_discards_tail() {
        let mut decoder = LineDecoder::new();
        decoder.push(b"partial");
        decoder.reset();
        assert_eq!(decoder.pending(), 0);
        assert_eq!(decoder.push(b"fresh\n"), vec!["fresh"]);
    }
}
