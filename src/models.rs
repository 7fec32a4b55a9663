pub mod admin;
pub mod auth;
pub mod contract;
pub mod customer;
pub mod material;
pub mod project;
pub mod report;
pub mod subscription;
pub mod task;
pub mod team;
