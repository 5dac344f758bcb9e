//! # RDS / RDS2 Protocol Layer
//!
//! Everything from checkword arithmetic up through group scheduling: the
//! programme-information store ([`pi_state`]), block CRC ([`block`]), group
//! assembly ([`group`]), file transfer chunking ([`rft`]), the basic
//! character set ([`xlat`]), and the cadence that decides which group goes
//! out next ([`sequencer`]).

pub mod block;
pub mod group;
pub mod pi_state;
pub mod rft;
pub mod sequencer;
pub mod xlat;

pub use group::Group;
pub use pi_state::{ErtCharset, Params, PiState, ProgramFlags, RtPlusTag, RtPlusTags};
pub use rft::RftImage;
pub use sequencer::GroupSequencer;
