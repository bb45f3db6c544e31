//! The SMTP verb table and its reply literals.
//!
//! The table is scanned linearly and the first matching entry wins, so the
//! declared order is part of the protocol behavior: RCPT and DATA each
//! appear twice, with the accept/continue literal first and its paired
//! rejection/final literal directly after it. Dispatch only ever matches
//! the first of a pair and reaches the second through `pair_reply`.

pub const VERB_LEN: usize = 4;

/// Sent exactly once per connection, before anything else.
pub const GREETING: &str = "220 Void SMTP server @ your service\r\n";

/// Sent when no table entry matches the first 4 bytes of a line.
pub const REPLY_UNRECOGNISED: &str = "500 Syntax error, command unrecognised.\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    /// First RCPT entry: reply depends on the trigger filters.
    Recipient,
    /// First DATA entry: switches the session into data mode.
    BeginData,
}

pub struct Command {
    pub verb: &'static [u8; VERB_LEN],
    pub reply: &'static str,
    pub special: Option<Special>,
}

const fn entry(verb: &'static [u8; VERB_LEN], reply: &'static str) -> Command {
    Command {
        verb,
        reply,
        special: None,
    }
}

const fn special(
    verb: &'static [u8; VERB_LEN],
    reply: &'static str,
    special: Special,
) -> Command {
    Command {
        verb,
        reply,
        special: Some(special),
    }
}

/// Index of the DATA final-ack entry, used directly by the data-mode path.
pub const DATA_FINAL: usize = 6;

/// RFC 2821 verbs this server answers. Replies are fixed literals that must
/// stay byte-for-byte stable; existing clients and the tests depend on them.
pub static TABLE: [Command; 17] = [
    entry(b"HELO", "250 Hi there\r\n"),
    entry(b"EHLO", "250 VoidSMTP server @ your service\r\n"),
    entry(b"MAIL", "250 ok\r\n"),
    special(b"RCPT", "250 ok\r\n", Special::Recipient),
    entry(b"RCPT", "550 Invalid mailbox\r\n"),
    special(b"DATA", "354 Go ahead. End with <CRLF>.<CRLF>\r\n", Special::BeginData),
    entry(b"DATA", "250 ok 1234567890 qp 777\r\n"),
    entry(b"RSET", "250 ok\r\n"),
    entry(b"SEND", "250 ok\r\n"),
    entry(b"SOML", "250 ok\r\n"),
    entry(b"SAML", "250 ok\r\n"),
    entry(b"VRFY", "250 ok\r\n"),
    entry(b"EXPN", "250 ok\r\n"),
    entry(b"NOOP", "250 ok\r\n"),
    entry(b"QUIT", "221 Bye 4 now. Hope 2 see u again\r\n"),
    entry(b"TURN", "250 ok\r\n"),
    entry(b"HELP", "214 HELP yourself\r\n"),
];

/// Find the first table entry whose verb equals the first 4 bytes of `line`.
/// Matching is exact; callers uppercase the verb prefix first.
pub fn lookup(line: &[u8]) -> Option<usize> {
    if line.len() < VERB_LEN {
        return None;
    }
    TABLE.iter().position(|command| &line[..VERB_LEN] == command.verb)
}

/// The paired literal of a duplicated entry (RCPT rejection, DATA final ack).
pub fn pair_reply(index: usize) -> &'static str {
    TABLE[index + 1].reply
}

/// Uppercase only the verb token; trailing content is matched as sent.
pub fn uppercase_verb(line: &mut [u8]) {
    for byte in line.iter_mut().take(VERB_LEN) {
        byte.make_ascii_uppercase();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_seventeen_entries() {
        assert_eq!(TABLE.len(), 17);
    }

    #[test]
    fn test_lookup_returns_first_duplicate() {
        let rcpt = lookup(b"RCPT TO:<user@example.com>\r\n").unwrap();
        assert_eq!(TABLE[rcpt].special, Some(Special::Recipient));
        assert_eq!(TABLE[rcpt].reply, "250 ok\r\n");
        assert_eq!(pair_reply(rcpt), "550 Invalid mailbox\r\n");

        let data = lookup(b"DATA\r\n").unwrap();
        assert_eq!(TABLE[data].special, Some(Special::BeginData));
        assert_eq!(TABLE[data].reply, "354 Go ahead. End with <CRLF>.<CRLF>\r\n");
        assert_eq!(pair_reply(data), "250 ok 1234567890 qp 777\r\n");
    }

    #[test]
    fn test_lookup_matches_verb_only() {
        assert!(lookup(b"NOOP whatever trails here\r\n").is_some());
        assert!(lookup(b"HELP\r\n").is_some());
    }

    #[test]
    fn test_lookup_rejects_unknown_and_short_lines() {
        assert!(lookup(b"WXYZ\r\n").is_none());
        assert!(lookup(b"\r\n").is_none());
        assert!(lookup(b"").is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive_without_normalization() {
        assert!(lookup(b"quit\r\n").is_none());

        let mut line = *b"quit\r\n";
        uppercase_verb(&mut line);
        assert_eq!(&line, b"QUIT\r\n");
        assert!(lookup(&line).is_some());
    }

    #[test]
    fn test_uppercase_verb_leaves_arguments_alone() {
        let mut line = *b"rcpt TO:<MixedCase@example.com>\r\n";
        uppercase_verb(&mut line);
        assert_eq!(&line[..], b"RCPT TO:<MixedCase@example.com>\r\n");
    }

    #[test]
    fn test_data_final_index_points_at_the_final_ack() {
        assert_eq!(TABLE[DATA_FINAL].verb, b"DATA");
        assert_eq!(TABLE[DATA_FINAL].reply, "250 ok 1234567890 qp 777\r\n");
    }

    #[test]
    fn test_quit_reply_literal() {
        let quit = lookup(b"QUIT\r\n").unwrap();
        assert_eq!(TABLE[quit].reply, "221 Bye 4 now. Hope 2 see u again\r\n");
    }
}
