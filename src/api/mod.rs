//! Framework-agnostic request handlers.
//!
//! Each handler takes the injected `Database` (and any external-service
//! client it needs), the resolved user id, and a typed request, and
//! returns `Result<T, ApiError>`. The routing layer maps `ApiError` to a
//! status code and JSON body via `status_code()` and `body()`.

pub mod collectibles;
pub mod error;
pub mod reflections;
pub mod settings;
pub mod tasks;
pub mod types;

pub use error::ApiError;
pub use types::{
    ClearDataResponse, CreateReflectionRequest, CreateTaskRequest, GenerateStepsRequest,
    PurchaseRequest, PurchaseResponse, StepToggle, UpdateTaskRequest,
};
