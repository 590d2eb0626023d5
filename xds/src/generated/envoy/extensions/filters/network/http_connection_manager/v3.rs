#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpConnectionManager {
    /// Supplies the type of codec that the connection manager should use.
    #[prost(
        enumeration = "http_connection_manager::CodecType",
        tag = "1"
    )]
    pub codec_type: i32,
    /// The human readable prefix to use when emitting statistics for the
    /// connection manager.
    #[prost(string, tag = "2")]
    pub stat_prefix: ::prost::alloc::string::String,
    /// A list of individual HTTP filters that make up the filter chain for
    /// requests made to the connection manager. Order matters as the filters
    /// are processed sequentially as request events happen.
    #[prost(message, repeated, tag = "5")]
    pub http_filters: ::prost::alloc::vec::Vec<HttpFilter>,
    /// Configuration for HTTP access logs emitted by the connection manager.
    #[prost(message, repeated, tag = "37")]
    pub access_log: ::prost::alloc::vec::Vec<
        super::super::super::super::super::config::accesslog::v3::AccessLog,
    >,
    #[prost(oneof = "http_connection_manager::RouteSpecifier", tags = "4")]
    pub route_specifier: ::core::option::Option<
        http_connection_manager::RouteSpecifier,
    >,
}
/// Nested message and enum types in `HttpConnectionManager`.
pub mod http_connection_manager {
    #[derive(
        Clone,
        Copy,
        Debug,
        PartialEq,
        Eq,
        Hash,
        PartialOrd,
        Ord,
        ::prost::Enumeration
    )]
    #[repr(i32)]
    pub enum CodecType {
        /// For every new connection, the connection manager will determine
        /// which codec to use.
        Auto = 0,
        /// The connection manager will assume that the client is speaking
        /// HTTP/1.1.
        Http1 = 1,
        /// The connection manager will assume that the client is speaking
        /// HTTP/2.
        Http2 = 2,
        /// The connection manager will assume that the client is speaking
        /// HTTP/3.
        Http3 = 3,
    }
    impl CodecType {
        /// String value of the enum field names used in the ProtoBuf definition.
        ///
        /// The values are not transformed in any way and thus are considered stable
        /// (if the ProtoBuf definition does not change) and safe for programmatic use.
        pub fn as_str_name(&self) -> &'static str {
            match self {
                CodecType::Auto => "AUTO",
                CodecType::Http1 => "HTTP1",
                CodecType::Http2 => "HTTP2",
                CodecType::Http3 => "HTTP3",
            }
        }
        /// Creates an enum from field names used in the ProtoBuf definition.
        pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
            match value {
                "AUTO" => Some(Self::Auto),
                "HTTP1" => Some(Self::Http1),
                "HTTP2" => Some(Self::Http2),
                "HTTP3" => Some(Self::Http3),
                _ => None,
            }
        }
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum RouteSpecifier {
        /// The route table for the connection manager is static and is
        /// specified in this property.
        #[prost(message, tag = "4")]
        RouteConfig(
            super::super::super::super::super::super::config::route::v3::RouteConfiguration,
        ),
    }
}
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HttpFilter {
    /// The name of the filter configuration.
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(oneof = "http_filter::ConfigType", tags = "4")]
    pub config_type: ::core::option::Option<http_filter::ConfigType>,
}
/// Nested message and enum types in `HttpFilter`.
pub mod http_filter {
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ConfigType {
        /// Filter specific configuration which depends on the filter being
        /// instantiated.
        #[prost(message, tag = "4")]
        TypedConfig(::prost_types::Any),
    }
}
