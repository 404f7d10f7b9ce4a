use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::{JobRepository, ResultStore};
use crate::application::services::{AnalysisMessage, CancellationRegistry};
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub job_repository: Arc<dyn JobRepository>,
    pub result_store: Arc<dyn ResultStore>,
    pub cancellations: Arc<CancellationRegistry>,
    pub analysis_sender: mpsc::Sender<AnalysisMessage>,
    pub settings: Settings,
}
