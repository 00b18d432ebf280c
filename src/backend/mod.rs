//! Document store clients.
//!
//! Every store implements [`DocumentBackend`]. The cache never knows which
//! one it talks to; [`connect`] picks the implementation from the
//! configured [`Credentials`].

mod credentials;
#[cfg(feature = "firestore")]
pub mod firestore;
#[cfg(feature = "supabase")]
pub mod supabase;
pub mod traits;

pub use credentials::{BackendKind, Credentials, KeyStyle, connect};
#[cfg(feature = "firestore")]
pub use firestore::FirestoreClient;
#[cfg(feature = "supabase")]
pub use supabase::SupabaseClient;
pub use traits::DocumentBackend;
