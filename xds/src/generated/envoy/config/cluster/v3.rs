/// Configuration for a single upstream cluster.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Cluster {
    /// Supplies the name of the cluster which must be unique across all
    /// clusters. The cluster name is used when emitting statistics and in
    /// routing.
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    /// The timeout for new network connections to hosts in the cluster.
    #[prost(message, optional, tag = "4")]
    pub connect_timeout: ::core::option::Option<::prost_types::Duration>,
    /// Additional options when handling HTTP2 requests upstream. These
    /// options will be applicable only when the selected codec is HTTP2.
    #[prost(message, optional, tag = "14")]
    pub http2_protocol_options: ::core::option::Option<
        super::super::core::v3::Http2ProtocolOptions,
    >,
    /// Setting this is required for specifying members of STATIC,
    /// STRICT_DNS or LOGICAL_DNS clusters.
    #[prost(message, optional, tag = "33")]
    pub load_assignment: ::core::option::Option<
        super::super::endpoint::v3::ClusterLoadAssignment,
    >,
    #[prost(oneof = "cluster::ClusterDiscoveryType", tags = "2")]
    pub cluster_discovery_type: ::core::option::Option<cluster::ClusterDiscoveryType>,
}
/// Nested message and enum types in `Cluster`.
pub mod cluster {
    /// Refer to the service discovery type for an explanation on each type.
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
    pub enum DiscoveryType {
        /// Refer to the static discovery type for an explanation.
        Static = 0,
        /// Refer to the strict DNS discovery type for an explanation.
        StrictDns = 1,
        /// Refer to the logical DNS discovery type for an explanation.
        LogicalDns = 2,
        /// Refer to the endpoint discovery service for an explanation.
        Eds = 3,
        /// Refer to the original destination discovery type for an
        /// explanation.
        OriginalDst = 4,
    }
    impl DiscoveryType {
        /// String value of the enum field names used in the ProtoBuf definition.
        ///
        /// The values are not transformed in any way and thus are considered stable
        /// (if the ProtoBuf definition does not change) and safe for programmatic use.
        pub fn as_str_name(&self) -> &'static str {
            match self {
                DiscoveryType::Static => "STATIC",
                DiscoveryType::StrictDns => "STRICT_DNS",
                DiscoveryType::LogicalDns => "LOGICAL_DNS",
                DiscoveryType::Eds => "EDS",
                DiscoveryType::OriginalDst => "ORIGINAL_DST",
            }
        }
        /// Creates an enum from field names used in the ProtoBuf definition.
        pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
            match value {
                "STATIC" => Some(Self::Static),
                "STRICT_DNS" => Some(Self::StrictDns),
                "LOGICAL_DNS" => Some(Self::LogicalDns),
                "EDS" => Some(Self::Eds),
                "ORIGINAL_DST" => Some(Self::OriginalDst),
                _ => None,
            }
        }
    }
    #[allow(clippy::derive_partial_eq_without_eq)]
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum ClusterDiscoveryType {
        /// The service discovery type to use for resolving the cluster.
        #[prost(enumeration = "DiscoveryType", tag = "2")]
        Type(i32),
    }
}
