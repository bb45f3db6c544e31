/// RFC 2821 caps command and reply lines at 512 bytes including <CRLF>.
/// Message text is allowed 1000, but since the body is discarded unread the
/// command-line bound is enough for everything this server accumulates.
pub const MAX_LINE: usize = 512;

/// Bounded accumulation buffer for one session.
///
/// Bytes read from the socket are appended as they arrive; once the total
/// would exceed the capacity, just enough bytes are evicted from the front
/// to make room. The newest bytes always survive, so a terminator arriving
/// at the end of a flood of garbage is still seen.
pub struct LineBuffer {
    buf: Vec<u8>,
    capacity: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LINE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `bytes`, evicting from the front on overflow.
    ///
    /// Note that an eviction can shift out part of a terminator that was
    /// still waiting to be recognized. When that happens the remaining
    /// fragment no longer matches and detection is deferred until a later
    /// read completes a terminator again. This is a known consequence of
    /// the front-eviction policy and is kept as-is.
    pub fn push(&mut self, bytes: &[u8]) {
        if bytes.len() >= self.capacity {
            self.buf.clear();
            self.buf.extend_from_slice(&bytes[bytes.len() - self.capacity..]);
            return;
        }

        let total = self.buf.len() + bytes.len();
        if total > self.capacity {
            self.buf.drain(..total - self.capacity);
        }
        self.buf.extend_from_slice(bytes);
    }

    /// Scan for `terminator` anywhere in the accumulated bytes.
    pub fn contains(&self, terminator: &[u8]) -> bool {
        self.buf
            .windows(terminator.len())
            .any(|window| window == terminator)
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_scan() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"HELO client.local");
        assert!(!buffer.contains(b"\r\n"));

        buffer.push(b"\r\n");
        assert!(buffer.contains(b"\r\n"));
        assert_eq!(buffer.as_bytes(), b"HELO client.local\r\n");
    }

    #[test]
    fn test_terminator_found_mid_buffer() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"NOOP\r\ntrailing");
        assert!(buffer.contains(b"\r\n"));
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut buffer = LineBuffer::new();
        for _ in 0..10 {
            buffer.push(&[b'x'; 100]);
            assert!(buffer.len() <= MAX_LINE);
        }
        assert_eq!(buffer.len(), MAX_LINE);
    }

    #[test]
    fn test_overflow_evicts_oldest_first() {
        let mut buffer = LineBuffer::with_capacity(8);
        buffer.push(b"abcdefgh");
        buffer.push(b"123");
        assert_eq!(buffer.as_bytes(), b"defgh123");
    }

    #[test]
    fn test_push_larger_than_capacity_keeps_newest() {
        let mut buffer = LineBuffer::with_capacity(4);
        buffer.push(b"0123456789");
        assert_eq!(buffer.as_bytes(), b"6789");
    }

    #[test]
    fn test_eviction_straddling_terminator_defers_detection() {
        let mut buffer = LineBuffer::with_capacity(8);
        buffer.push(b"abcdef\r\n");
        assert!(buffer.contains(b"\r\n"));

        // The next append rotates the '\r' out, splitting the only
        // terminator occurrence. The leftover '\n' must not match.
        buffer.push(b"1234567");
        assert_eq!(buffer.as_bytes(), b"\n1234567");
        assert!(!buffer.contains(b"\r\n"));

        // Detection resumes once a later read supplies a full terminator.
        buffer.push(b"\r\n");
        assert!(buffer.contains(b"\r\n"));
    }

    #[test]
    fn test_clear() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"QUIT\r\n");
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(!buffer.contains(b"\r\n"));
    }
}
