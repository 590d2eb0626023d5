#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TlsCertificate {
    /// The TLS certificate chain.
    #[prost(message, optional, tag = "1")]
    pub certificate_chain: ::core::option::Option<
        super::super::super::super::config::core::v3::DataSource,
    >,
    /// The TLS private key.
    #[prost(message, optional, tag = "2")]
    pub private_key: ::core::option::Option<
        super::super::super::super::config::core::v3::DataSource,
    >,
}
/// TLS context shared by both client and server TLS contexts.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommonTlsContext {
    /// Only a single TLS certificate is supported in client contexts. In
    /// server contexts, the first RSA certificate is used for clients that
    /// only support RSA and the first ECDSA certificate is used for clients
    /// that support ECDSA.
    #[prost(message, repeated, tag = "2")]
    pub tls_certificates: ::prost::alloc::vec::Vec<TlsCertificate>,
    /// Supplies the list of ALPN protocols that the listener should expose.
    #[prost(string, repeated, tag = "4")]
    pub alpn_protocols: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DownstreamTlsContext {
    /// Common TLS context settings.
    #[prost(message, optional, tag = "1")]
    pub common_tls_context: ::core::option::Option<CommonTlsContext>,
    /// If specified, Envoy will reject connections without a valid client
    /// certificate.
    #[prost(message, optional, tag = "2")]
    pub require_client_certificate: ::core::option::Option<bool>,
}
