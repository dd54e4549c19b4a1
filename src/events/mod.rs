//! # Events Module
//!
//! Progress reporting for the two parallel stages.
//!
//! ## Design
//! The core library emits events through channels, so the CLI (or any
//! other front end) can render counters and progress bars without the
//! engine knowing how.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Fingerprint(StageEvent::Started { to_compute, cached }) = event {
//!             println!("Computing {} fingerprints ({} cached)", to_compute, cached);
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender, StageTracker};
pub use types::*;
