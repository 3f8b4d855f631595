//! Postgres repositories.
//!
//! One repository struct per aggregate, each holding a `PgPool` clone. All
//! queries are runtime `sqlx::query`/`query_as` calls so no DATABASE_URL is
//! needed at build time.

mod book;
mod exchange;
mod pending_cover;
mod transaction;
mod user;
mod wanted;

pub use book::OfferedBookRepository;
pub use exchange::ExchangeRequestRepository;
pub use pending_cover::PendingCoverRepository;
pub use transaction::with_transaction;
pub use user::UserRepository;
pub use wanted::WantedBookRepository;
