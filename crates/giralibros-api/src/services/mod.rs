mod cover_broker;

pub use cover_broker::CoverBroker;
