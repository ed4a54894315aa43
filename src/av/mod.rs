//! Media tooling: shell execution, probing, transcoding and the external
//! comparison script.

pub mod cmd;
pub mod compare;
pub mod probe;
pub mod transcode;
