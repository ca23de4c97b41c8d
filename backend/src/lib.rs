//! Real-time two-player chess game server: session registry, connection
//! handling and the external app-service adapter built on top of the
//! `chess_engine` rules engine.

pub mod app_service;
pub mod board_view;
pub mod config;
pub mod connection;
pub mod elo;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod session;
