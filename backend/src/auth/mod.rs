pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod routes;

pub use credentials::{CredentialError, CredentialStore};
pub use jwt::{JwtError, JwtService};
pub use middleware::{AuthMiddleware, AuthenticatedUser};
pub use models::SessionPrincipal;
