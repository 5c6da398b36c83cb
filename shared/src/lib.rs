pub mod auth;
pub mod error;
pub mod ids;
pub mod respond;
pub mod state;

pub use auth::AuthContext;
pub use error::StoreError;
pub use state::AppState;
