//! Network side of the floor-plan editor.
//!
//! `floorplan` owns every editing rule and never touches the network. This
//! crate connects it to the POS backend: the REST endpoints for zones,
//! tables, and map objects, the save/load choreography for a whole layout,
//! and the Socket.IO channel the backend uses to announce changes. It also
//! builds the PromptPay payloads shown at checkout.
//!
//! | Module | Responsibility |
//! |--------|---------------|
//! | [`config`] | Typed settings read from the environment |
//! | [`error`] | `ClientError`, shared by every operation |
//! | [`api`] | `PosApi`, one method per backend endpoint |
//! | [`layout`] | `LayoutBackend` seam, fetch/save of a full layout |
//! | [`socket`] | `RealtimeClient`, the injected real-time connection |
//! | [`promptpay`] | EMVCo PromptPay QR payload and CRC |

pub mod api;
pub mod config;
pub mod error;
pub mod layout;
pub mod promptpay;
pub mod socket;

pub use api::{Ack, PosApi};
pub use config::ClientConfig;
pub use error::ClientError;
pub use layout::{LayoutBackend, delete_entity, fetch_layout, save_layout};
pub use socket::{ConnectionStatus, RealtimeClient};
