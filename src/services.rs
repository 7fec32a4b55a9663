pub mod admin_service;
pub mod ai_service;
pub mod auth;
pub mod contract_service;
pub mod customer_service;
pub mod document_service;
pub mod edge;
pub mod entitlement;
pub mod finance_service;
pub mod material_service;
pub mod project_service;
pub mod report_service;
pub mod storage;
pub mod subscription;
pub mod task_service;
pub mod team_service;
