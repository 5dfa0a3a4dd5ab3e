pub mod app;
pub mod blockchain_info;
pub mod contract_interaction;
pub mod injected;
pub mod shared_state;
pub mod transaction_sender;
pub mod wallet_connect;
