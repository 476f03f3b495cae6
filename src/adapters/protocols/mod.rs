//! Built-in protocol handlers: `tcp`, `http`, `dns` (§4.1a).

pub mod dns;
pub mod http;
pub mod tcp;

pub use dns::DnsHandler;
pub use http::HttpHandler;
pub use tcp::TcpHandler;

use crate::services::ProtocolRegistry;

/// Registers all three built-in handlers under their protocol names.
pub fn register_builtin_handlers(registry: &mut ProtocolRegistry) {
    registry.register("tcp", Box::new(|| Box::new(TcpHandler)));
    registry.register("http", Box::new(|| Box::new(HttpHandler)));
    registry.register("dns", Box::new(|| Box::new(DnsHandler)));
}
