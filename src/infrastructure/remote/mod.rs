pub mod http_gateway;
pub mod wire;

pub use http_gateway::HttpGateway;
