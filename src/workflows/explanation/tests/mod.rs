mod common;
mod fallback;
mod provider;
mod service;
