pub mod cluster_deployment;
