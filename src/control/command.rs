//! # Control Commands
//!
//! The parsed form of one control-line instruction. Every setter on
//! [`crate::rds::PiState`] has a corresponding variant; [`Command::GetParams`]
//! lets a caller read back the published snapshot, and [`Command::Shutdown`]
//! requests a clean generator stop.

use tokio::sync::oneshot;

use crate::rds::{ErtCharset, Params, ProgramFlags, RtPlusTag};

/// One instruction sent from a control transport to the generator thread.
pub enum Command {
    SetPi(u16),
    SetPs(String),
    SetRt(String),
    SetPty(u8),
    SetFlags(ProgramFlags),
    SetAf(Vec<f64>),
    SetPtyn(String),
    SetLps(String),
    SetErt(String, ErtCharset),
    SetRtPlus {
        tag1: Option<RtPlusTag>,
        tag2: Option<RtPlusTag>,
        running: bool,
    },
    /// Carries a filesystem path; the generator thread (which may block)
    /// reads the file itself rather than requiring the control transport
    /// to buffer arbitrary file contents in memory ahead of time.
    LoadRftFile(String),
    ClearRft,
    /// Appends one Alternative Frequency (MHz) to the AF list.
    AddAf(f64),
    /// Clears the AF list (`AFC` on the wire).
    ClearAf,
    /// Sets the master volume, 0..=100 percent.
    SetVolume(u8),
    /// Restores the programme-information store to its startup defaults.
    Reset,
    /// Requests the current snapshot be sent back over the given channel.
    GetParams(oneshot::Sender<Params>),
    Shutdown,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::SetPi(pi) => f.debug_tuple("SetPi").field(pi).finish(),
            Command::SetPs(ps) => f.debug_tuple("SetPs").field(ps).finish(),
            Command::SetRt(rt) => f.debug_tuple("SetRt").field(rt).finish(),
            Command::SetPty(pty) => f.debug_tuple("SetPty").field(pty).finish(),
            Command::SetFlags(flags) => f.debug_tuple("SetFlags").field(flags).finish(),
            Command::SetAf(af) => f.debug_tuple("SetAf").field(af).finish(),
            Command::SetPtyn(ptyn) => f.debug_tuple("SetPtyn").field(ptyn).finish(),
            Command::SetLps(lps) => f.debug_tuple("SetLps").field(lps).finish(),
            Command::SetErt(text, charset) => {
                f.debug_tuple("SetErt").field(text).field(charset).finish()
            }
            Command::SetRtPlus { tag1, tag2, running } => f
                .debug_struct("SetRtPlus")
                .field("tag1", tag1)
                .field("tag2", tag2)
                .field("running", running)
                .finish(),
            Command::LoadRftFile(path) => f.debug_tuple("LoadRftFile").field(path).finish(),
            Command::ClearRft => write!(f, "ClearRft"),
            Command::AddAf(freq) => f.debug_tuple("AddAf").field(freq).finish(),
            Command::ClearAf => write!(f, "ClearAf"),
            Command::SetVolume(pct) => f.debug_tuple("SetVolume").field(pct).finish(),
            Command::Reset => write!(f, "Reset"),
            Command::GetParams(_) => write!(f, "GetParams(..)"),
            Command::Shutdown => write!(f, "Shutdown"),
        }
    }
}
