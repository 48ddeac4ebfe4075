pub mod webhook_request;
