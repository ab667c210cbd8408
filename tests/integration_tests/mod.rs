mod bulk;
mod client_config;
mod crud;
mod events;
mod paging;
mod transport;
