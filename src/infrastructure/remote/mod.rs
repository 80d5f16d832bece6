pub mod rest_backend;
pub mod session;

pub use rest_backend::RestRemoteBackend;
pub use session::StaticSession;
