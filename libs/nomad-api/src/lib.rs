//! Nomad API models
//!
//! Job definitions are owned by the Nomad cluster and carry far more fields
//! than the deployer understands. Only the fields the deployer reads or
//! patches are typed; everything else is kept as raw JSON.

pub mod models;

pub use models::job::{JobDocument, JobMeta, RawFields, Slot};
pub use models::register::JobRegisterRequest;
pub use models::DocumentError;
