pub mod http_test_utils;
pub mod mock_progress_store;
pub mod postgres_test_utils;
pub mod test_logging;
