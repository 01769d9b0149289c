mod mock_provider;
mod pipeline;
mod scheduler;
