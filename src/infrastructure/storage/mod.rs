pub mod local_store;
pub mod mutation_queue;
mod rows;

pub use local_store::SqliteLocalStore;
pub use mutation_queue::SqliteMutationQueue;
