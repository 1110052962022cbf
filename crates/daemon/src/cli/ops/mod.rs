mod daemon;
mod handshake;
mod health;
mod version;

pub use daemon::Daemon;
pub use handshake::Handshake;
pub use health::Health;
pub use version::Version;
