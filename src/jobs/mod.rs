pub mod webhook_dispatcher;
