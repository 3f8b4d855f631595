//! Application state shared by every handler.

use std::sync::Arc;

use giralibros_core::Config;
use giralibros_db::{
    ExchangeRequestRepository, OfferedBookRepository, PendingCoverRepository, UserRepository,
    WantedBookRepository,
};
use giralibros_processing::{CoverNormalizer, UploadPolicy};
use giralibros_storage::Storage;
use sqlx::PgPool;

use crate::services::CoverBroker;

pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub users: UserRepository,
    pub books: OfferedBookRepository,
    pub wanted: WantedBookRepository,
    pub exchanges: ExchangeRequestRepository,
    pub normalizer: Arc<CoverNormalizer>,
    pub policy: UploadPolicy,
    pub broker: CoverBroker,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, storage: Arc<dyn Storage>) -> Self {
        let users = UserRepository::new(pool.clone());
        let books = OfferedBookRepository::new(pool.clone());
        let wanted = WantedBookRepository::new(pool.clone());
        let exchanges = ExchangeRequestRepository::new(pool.clone());
        let pending = PendingCoverRepository::new(pool.clone());

        let normalizer = Arc::new(CoverNormalizer::new(giralibros_processing::CoverSpec {
            max_width: config.cover_max_width,
            max_height: config.cover_max_height,
            jpeg_quality: config.cover_jpeg_quality,
        }));
        let policy = UploadPolicy::new(
            config.max_upload_bytes,
            config.allowed_content_types.clone(),
        );
        let broker = CoverBroker::new(pending, books.clone(), storage);

        Self {
            config,
            pool,
            users,
            books,
            wanted,
            exchanges,
            normalizer,
            policy,
            broker,
        }
    }
}
