pub mod health;
pub mod live_updates;
pub mod workbench;
pub mod ws_server;
