mod analyze;
mod cancel;
mod download;
mod error_response;
mod health;
mod job_status;
mod results;

pub use analyze::{AnalyzeResponse, analyze_handler};
pub use cancel::{CancelResponse, cancel_handler};
pub use download::download_handler;
pub use error_response::ErrorResponse;
pub use health::health_handler;
pub use job_status::{JobStatusResponse, job_status_handler};
pub use results::results_handler;
