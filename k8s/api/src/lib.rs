#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod ingress;

pub use self::ingress::{Ingress, IngressCondition, IngressSpec, IngressStatus};
pub use k8s_openapi::{
    api::core::v1::{
        EndpointAddress, EndpointSubset, Endpoints, Secret, Service, ServicePort, ServiceSpec,
    },
    apimachinery::pkg::util::intstr::IntOrString,
};
pub use kube::{
    api::{Api, ObjectMeta, Patch, PatchParams, Resource, ResourceExt},
    Client,
};
