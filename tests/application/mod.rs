mod analysis_worker_test;
mod analysis_service_test;
