pub mod access_loggers {
    pub mod file {
        pub mod v3;
    }
}
pub mod filters {
    pub mod http {
        pub mod router {
            pub mod v3;
        }
    }
    pub mod network {
        pub mod http_connection_manager {
            pub mod v3;
        }
    }
}
pub mod transport_sockets {
    pub mod tls {
        pub mod v3;
    }
}
