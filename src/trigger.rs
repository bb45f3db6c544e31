use tokio::process::Command;

/// A configured trigger: an address substring filter paired with the shell
/// command to run when the filter matches an RCPT line.
pub struct Trigger {
    address: String,
    command: String,
}

impl Trigger {
    pub fn new(address: String, command: String) -> Self {
        Self { address, command }
    }

    /// Substring test over the full line, not just the part after the verb.
    pub fn matches(&self, line: &[u8]) -> bool {
        let needle = self.address.as_bytes();
        line.windows(needle.len()).any(|window| window == needle)
    }

    /// Run the command through the shell and wait for it to finish.
    ///
    /// The protocol layer never distinguishes failure modes here: a command
    /// that cannot be started reports 127 like the shell would, and the
    /// reply already chosen for the client is sent regardless of the status.
    pub async fn run(&self) -> i32 {
        match Command::new("sh").arg("-c").arg(&self.command).status().await {
            Ok(status) => status.code().unwrap_or(-1),
            Err(e) => {
                eprintln!("[ERROR] Failed to start trigger command: {}", e);
                127
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(address: &str, command: &str) -> Trigger {
        Trigger::new(address.to_string(), command.to_string())
    }

    #[test]
    fn test_matches_anywhere_in_line() {
        let t = trigger("user@example.com", "true");
        assert!(t.matches(b"RCPT TO:<user@example.com>\r\n"));
        assert!(t.matches(b"user@example.com leading the line\r\n"));
        assert!(!t.matches(b"RCPT TO:<other@example.com>\r\n"));
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        let t = trigger("User@Example.com", "true");
        assert!(!t.matches(b"RCPT TO:<user@example.com>\r\n"));
    }

    #[tokio::test]
    async fn test_run_reports_exit_status() {
        assert_eq!(trigger("x", "true").run().await, 0);
        assert_eq!(trigger("x", "false").run().await, 1);
        assert_eq!(trigger("x", "exit 7").run().await, 7);
    }

    #[tokio::test]
    async fn test_run_reports_generic_status_for_missing_command() {
        let status = trigger("x", "/nonexistent/command-that-is-not-there").run().await;
        assert_ne!(status, 0);
    }
}
