pub mod identity;
pub mod local_store;
pub mod remote;
pub mod rest;
pub mod sync;

pub use identity::{IdentityProvider, SessionIdentity};
pub use local_store::LocalStore;
pub use remote::{RemoteStore, RemoteStoreError};
pub use rest::RestRemoteStore;
pub use sync::{Watchlist, WatchlistState};
