// Adapters layer: concrete translations between the orchestrator and the outside world
// (API Gateway events, HTTP replies, remote chat endpoints).

pub mod gateway;
pub mod http;
pub mod remote;
