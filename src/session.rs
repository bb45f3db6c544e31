use std::net::SocketAddr;

use crate::buffer::LineBuffer;

/// The two states of the per-session protocol machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Reading CRLF-terminated command lines.
    Command,
    /// Reading the message body, up to the <CRLF>.<CRLF> terminator.
    Data,
}

impl Mode {
    /// The byte sequence that completes a read in this mode.
    pub fn terminator(&self) -> &'static [u8] {
        match self {
            Mode::Command => b"\r\n",
            Mode::Data => b"\r\n.\r\n",
        }
    }
}

/// State owned by exactly one connection's task, from accept to close.
pub struct Session {
    pub client_addr: SocketAddr,
    pub mode: Mode,
    pub buffer: LineBuffer,
}

impl Session {
    pub fn new(client_addr: SocketAddr) -> Self {
        Self {
            client_addr,
            mode: Mode::Command,
            buffer: LineBuffer::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:2525".parse().unwrap()
    }

    #[test]
    fn test_new_session_starts_in_command_mode() {
        let session = Session::new(addr());
        assert_eq!(session.mode, Mode::Command);
        assert!(session.buffer.is_empty());
    }

    #[test]
    fn test_mode_terminators() {
        assert_eq!(Mode::Command.terminator(), b"\r\n");
        assert_eq!(Mode::Data.terminator(), b"\r\n.\r\n");
    }
}
