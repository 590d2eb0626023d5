/// Configures the built-in `envoy.filters.http.router` filter, which
/// implements HTTP forwarding.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Router {
    /// Whether the router generates dynamic cluster statistics.
    #[prost(message, optional, tag = "1")]
    pub dynamic_stats: ::core::option::Option<bool>,
}
