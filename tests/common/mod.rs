pub mod containers;
pub mod mock_store;
