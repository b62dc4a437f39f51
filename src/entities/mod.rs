//! Durable records backing the transfer protocol. Status columns are
//! string-backed active enums so every transition site matches
//! exhaustively instead of comparing loose strings.

pub mod notification;
pub mod order;
pub mod order_history;
pub mod order_piece;
pub mod reposition;
pub mod reposition_folio_counter;
pub mod reposition_history;
pub mod reposition_piece;
pub mod reposition_transfer;
pub mod transfer;
