//! Entity module - Contains all `SeaORM` entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod admin_grant;
pub mod alert;
pub mod audit_log;
pub mod category_mapping;
pub mod channel_mapping;
pub mod dashboard;
pub mod dashboard_component;
pub mod dashboard_message;
pub mod metric;
pub mod project;
pub mod rate_limit;
pub mod session;
pub mod task;
pub mod user;

// Re-export specific types to avoid conflicts
pub use admin_grant::{Entity as AdminGrant, Model as AdminGrantModel};
pub use alert::{Entity as Alert, Model as AlertModel};
pub use audit_log::{Entity as AuditLog, Model as AuditLogModel};
pub use category_mapping::{Entity as CategoryMapping, Model as CategoryMappingModel};
pub use channel_mapping::{Entity as ChannelMapping, Model as ChannelMappingModel};
pub use dashboard::{Entity as Dashboard, Model as DashboardModel};
pub use dashboard_component::{Entity as DashboardComponent, Model as DashboardComponentModel};
pub use dashboard_message::{Entity as DashboardMessage, Model as DashboardMessageModel};
pub use metric::{Entity as Metric, Model as MetricModel};
pub use project::{Entity as Project, Model as ProjectModel};
pub use rate_limit::{Entity as RateLimit, Model as RateLimitModel};
pub use session::{Entity as Session, Model as SessionModel};
pub use task::{Entity as Task, Model as TaskModel};
pub use user::{Entity as User, Model as UserModel};
