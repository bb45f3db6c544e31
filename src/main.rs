mod buffer;
mod commands;
mod daemon;
mod server;
mod session;
mod trigger;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use structopt::StructOpt;

#[derive(Debug, StructOpt, Clone)]
#[structopt(
    name = "voidsmtp",
    about = "A void SMTP server that discards all mail and runs a shell trigger on matching recipients"
)]
pub struct Opt {
    /// TCP port to listen on
    #[structopt(short = "p", long = "port", default_value = "25")]
    pub port: u16,

    /// Listening address
    #[structopt(short = "a", long = "address", default_value = "0.0.0.0")]
    pub address: String,

    /// Email address (filter) that fires the mail command
    #[structopt(short = "m", long = "mail-address")]
    pub mail_address: String,

    /// Command/script to execute when the mail address matches
    #[structopt(short = "M", long = "mail-command")]
    pub mail_command: String,

    /// Email reset address (filter) that fires the reset command
    #[structopt(short = "r", long = "reset-address")]
    pub reset_address: Option<String>,

    /// Command/script to execute when the reset address matches
    #[structopt(short = "R", long = "reset-command")]
    pub reset_command: Option<String>,

    /// Log verbosity threshold (0 = info, 1 = notice, 2 = warning, 3 = error)
    #[structopt(short = "l", long = "log-level", default_value = "0")]
    pub log_level: u8,

    /// Log file path
    #[structopt(long = "logs", parse(from_os_str))]
    pub log_file: Option<PathBuf>,

    /// Run as daemon
    #[structopt(short = "d", long = "daemon")]
    pub daemon: bool,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    if opt.mail_address.is_empty() || opt.mail_command.is_empty() {
        eprintln!("[ERROR] --mail-address and --mail-command must not be empty");
        std::process::exit(1);
    }

    let reset_pair_ok = match (&opt.reset_address, &opt.reset_command) {
        (None, None) => true,
        (Some(address), Some(command)) => !address.is_empty() && !command.is_empty(),
        _ => false,
    };
    if !reset_pair_ok {
        eprintln!("[ERROR] --reset-address and --reset-command must be given together");
        std::process::exit(1);
    }

    println!("==========================================");
    println!("VoidSMTP v{}", env!("CARGO_PKG_VERSION"));
    println!("==========================================");
    println!("[INFO] Listening on: {}:{}", opt.address, opt.port);
    println!("[INFO] Mail address filter: {}", opt.mail_address);
    if let Some(reset_address) = &opt.reset_address {
        println!("[INFO] Reset address filter: {}", reset_address);
    }
    println!("[INFO] Log level: {}", opt.log_level);

    if opt.daemon {
        daemon::daemonize()?;
    }

    let server = Arc::new(server::VoidSmtp::new(opt)?);

    // The runtime is built after the daemon fork; tokio does not survive one.
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.run())
}
