pub mod connection;
pub mod entities;
pub mod error;
pub mod factory;
pub mod repositories;
pub mod unit_of_work;

pub use connection::DbPool;
pub use error::DbError;
pub use factory::RepositoryFactory;
pub use repositories::Repositories;
pub use unit_of_work::UnitOfWork;
