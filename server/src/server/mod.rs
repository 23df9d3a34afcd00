mod server;
pub use server::TierSyncServer;

mod server_config;
pub use server_config::ServerConfig;
