pub mod local_store;
pub mod mutation_queue;
pub mod network;
pub mod remote_backend;

pub use local_store::LocalStore;
pub use mutation_queue::MutationQueue;
pub use network::NetworkMonitor;
pub use remote_backend::{RemoteBackend, SessionProvider};
