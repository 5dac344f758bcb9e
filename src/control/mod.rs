//! # Control Channel
//!
//! Bridges external control connections (TCP, named pipe) to the generator
//! thread: [`transport`] yields raw lines, [`parser`] turns them into
//! [`command::Command`] values, and the generator's bounded
//! `std::sync::mpsc::SyncSender<Command>` carries them across the
//! thread/async boundary.

pub mod command;
pub mod parser;
pub mod transport;

pub use command::Command;
pub use transport::ControlTransport;
