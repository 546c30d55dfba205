mod cmake;
mod config;
