pub use clap::Parser;

use url::Url;

#[derive(Parser, Debug)]
#[command(name = "commsec")]
#[command(about = "Post-quantum KEM key-agreement service and handshake probe")]
pub struct Args {
    /// Base URL of the commsec daemon API
    #[arg(long, global = true, default_value = "http://127.0.0.1:3000")]
    pub remote: Url,

    #[command(subcommand)]
    pub command: crate::Command,
}
