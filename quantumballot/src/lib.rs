#[macro_use]
extern crate serde;

#[macro_use]
extern crate log;

mod error;
mod hash;
mod identity;
mod roles;
mod sampler;
mod snapshot;
mod store;
mod tally;
mod verify;
mod vote;

pub use error::*;
pub use hash::*;
pub use identity::*;
pub use roles::*;
pub use sampler::*;
pub use snapshot::*;
pub use store::*;
pub use tally::*;
pub use verify::*;
pub use vote::*;
