use crate::buffer::MAX_LINE;
use crate::commands::{self, Special};
use crate::session::{Mode, Session};
use crate::trigger::Trigger;
use crate::utils::Logger;
use crate::Opt;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

pub struct VoidSmtp {
    opt: Opt,
    logger: Logger,
    mail_trigger: Trigger,
    reset_trigger: Option<Trigger>,
}

impl VoidSmtp {
    pub fn new(opt: Opt) -> Result<Self> {
        let logger = Logger::new(opt.log_level, opt.log_file.clone())?;
        let mail_trigger = Trigger::new(opt.mail_address.clone(), opt.mail_command.clone());
        let reset_trigger = match (&opt.reset_address, &opt.reset_command) {
            (Some(address), Some(command)) => Some(Trigger::new(address.clone(), command.clone())),
            _ => None,
        };

        Ok(Self {
            opt,
            logger,
            mail_trigger,
            reset_trigger,
        })
    }

    pub async fn run(self: Arc<Self>) -> Result<()> {
        let addr = format!("{}:{}", self.opt.address, self.opt.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;
        self.run_with_listener(listener).await
    }

    /// Accept loop. Each connection gets its own task; finished tasks report
    /// back on the completion channel, which is drained here without ever
    /// blocking a pending accept.
    pub async fn run_with_listener(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        self.logger
            .info(
                &local_addr,
                &format!("VoidSMTP server started using port {}", local_addr.port()),
            )
            .await;

        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<SocketAddr>();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, client_addr)) => {
                        self.logger.notice(&client_addr, "connected").await;

                        let this = Arc::clone(&self);
                        let done = done_tx.clone();
                        tokio::spawn(async move {
                            if let Err(e) = this.handle_client(stream, client_addr).await {
                                this.logger
                                    .error(&client_addr, &format!("session error: {}", e))
                                    .await;
                            }
                            let _ = done.send(client_addr);
                        });
                    }
                    Err(e) => {
                        self.logger
                            .notice(&local_addr, &format!("accept failed: {}", e))
                            .await;
                    }
                },
                Some(client_addr) = done_rx.recv() => {
                    self.logger.info(&client_addr, "session finished").await;
                }
            }
        }
    }

    async fn handle_client(&self, stream: TcpStream, client_addr: SocketAddr) -> Result<()> {
        let (mut reader, mut writer) = stream.into_split();
        let mut session = Session::new(client_addr);

        self.send_reply(&mut writer, &client_addr, commands::GREETING)
            .await?;

        let mut chunk = [0u8; MAX_LINE];
        loop {
            if !self
                .read_until_terminator(&mut reader, &mut session, &mut chunk)
                .await
            {
                self.logger
                    .warning(&client_addr, "connection closed by client")
                    .await;
                return Ok(());
            }

            match session.mode {
                Mode::Command => {
                    commands::uppercase_verb(session.buffer.as_bytes_mut());

                    let line = String::from_utf8_lossy(session.buffer.as_bytes()).into_owned();
                    self.logger
                        .info(&client_addr, &format!(">> {}", line.trim_end()))
                        .await;

                    let reply = self.dispatch(&mut session).await;
                    self.send_reply(&mut writer, &client_addr, reply).await?;
                }
                Mode::Data => {
                    // One body per transaction; the content is discarded unread.
                    session.mode = Mode::Command;
                    self.send_reply(&mut writer, &client_addr, commands::TABLE[commands::DATA_FINAL].reply)
                        .await?;
                }
            }

            if session.buffer.as_bytes().starts_with(b"QUIT") {
                self.logger
                    .notice(&client_addr, "connection gracefully closed")
                    .await;
                return Ok(());
            }

            session.buffer.clear();
        }
    }

    /// Accumulate reads until the current mode's terminator shows up.
    /// Returns false when the peer closed the connection. A read error is
    /// logged and the read retried; it does not end the session by itself.
    async fn read_until_terminator(
        &self,
        reader: &mut OwnedReadHalf,
        session: &mut Session,
        chunk: &mut [u8],
    ) -> bool {
        loop {
            match reader.read(chunk).await {
                Ok(0) => return false,
                Ok(n) => {
                    session.buffer.push(&chunk[..n]);
                    if session.buffer.contains(session.mode.terminator()) {
                        return true;
                    }
                }
                Err(e) => {
                    self.logger
                        .error(&session.client_addr, &format!("read failed: {}", e))
                        .await;
                }
            }
        }
    }

    /// Table dispatch for a completed command line. The buffer's verb prefix
    /// has already been uppercased.
    async fn dispatch(&self, session: &mut Session) -> &'static str {
        let index = match commands::lookup(session.buffer.as_bytes()) {
            Some(index) => index,
            None => return commands::REPLY_UNRECOGNISED,
        };

        let command = &commands::TABLE[index];
        match command.special {
            Some(Special::Recipient) => self.dispatch_recipient(session, index).await,
            Some(Special::BeginData) => {
                session.mode = Mode::Data;
                command.reply
            }
            None => command.reply,
        }
    }

    async fn dispatch_recipient(&self, session: &Session, index: usize) -> &'static str {
        let line = session.buffer.as_bytes();

        if self.mail_trigger.matches(line) {
            let status = self.mail_trigger.run().await;
            self.logger
                .notice(
                    &session.client_addr,
                    &format!("valid mail address, command returned code '{}'", status),
                )
                .await;
            return commands::TABLE[index].reply;
        }

        if let Some(reset_trigger) = &self.reset_trigger {
            if reset_trigger.matches(line) {
                // The reset trigger fires, but the client is still turned
                // away: a matching filter must never read as a delivered
                // recipient.
                let status = reset_trigger.run().await;
                self.logger
                    .notice(
                        &session.client_addr,
                        &format!("valid reset address, command returned code '{}'", status),
                    )
                    .await;
            }
        }

        commands::pair_reply(index)
    }

    async fn send_reply(
        &self,
        writer: &mut OwnedWriteHalf,
        client_addr: &SocketAddr,
        reply: &str,
    ) -> Result<()> {
        writer.write_all(reply.as_bytes()).await?;
        self.logger
            .info(client_addr, &format!("<< {}", reply.trim_end()))
            .await;
        Ok(())
    }
}
