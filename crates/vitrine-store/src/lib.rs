//! Document-store contracts for Vitrine, plus in-memory backends.
//!
//! The server talks to persistence only through the traits in this
//! crate. The in-memory implementations back tests and the default dev
//! wiring; a real deployment would put a document database behind the
//! same traits. The store layer is also where the two integrity rules
//! that must survive concurrent retries live:
//!
//! - order inserts are unique per `payment_ref` (a duplicate insert
//!   returns the already-persisted order),
//! - cart writes are compare-and-swap on the user's `cart_revision`.

mod error;
mod order;
mod product;
mod session;
mod user;

pub use error::StoreError;
pub use order::{MemoryOrderStore, OrderStore};
pub use product::{MemoryProductStore, ProductStore};
pub use session::{MemorySessionStore, SessionStore};
pub use user::{MemoryUserStore, UserStore};
