pub mod admin_repo;
pub use admin_repo::AdminRepository;
pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod material_repo;
pub use material_repo::MaterialRepository;
pub mod project_repo;
pub use project_repo::ProjectRepository;
pub mod role_repo;
pub use role_repo::RoleRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod team_repo;
pub use team_repo::TeamRepository;
