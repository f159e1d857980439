//! Bank contract client: wallet session, action handlers and the event relay.

pub mod actions;
pub mod config;
pub mod contract;
pub mod error;
pub mod interface;
pub mod relay;
pub mod session;
pub mod surface;

pub use config::SessionConfig;
pub use contract::Contract;
pub use error::{ClientError, ValidationError};
pub use interface::{load_interface, InterfaceError, InterfaceSource, StaticInterface};
pub use relay::{Delivery, EventRelay, StreamItem};
pub use session::{Connection, Session};
pub use surface::{InputField, MemorySurface, Surface};
