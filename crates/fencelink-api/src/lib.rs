// fencelink-api: Async client for the LoRaWAN network-server device queue API

pub mod error;
pub mod queue;
pub mod transport;

pub use error::Error;
pub use queue::{DeviceQueueItem, EnqueueResponse, QueueClient};
pub use transport::{TlsMode, TransportConfig};
