#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod pathway_service;
pub mod session_service;

pub use tokio_util::sync::CancellationToken;

pub use app_services::AppServices;
pub use error::{AppServicesError, PathwayServiceError, SessionServiceError};
pub use pathway_service::{PathwayLoad, PathwayService};
pub use session_service::{SessionService, SignIn};
