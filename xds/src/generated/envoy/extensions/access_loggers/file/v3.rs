/// Custom configuration for an AccessLog that writes log entries directly to
/// a file. Configures the built-in `envoy.access_loggers.file` AccessLog.
#[allow(clippy::derive_partial_eq_without_eq)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FileAccessLog {
    /// A path to a local file to which to write the access log entries.
    #[prost(string, tag = "1")]
    pub path: ::prost::alloc::string::String,
}
