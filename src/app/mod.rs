pub mod auth;
pub mod communities;
pub mod events;
pub mod guild_configs;
pub mod ident;
pub mod profiles;
pub mod reports;
pub mod rules;
pub mod webhooks;
