//! # pluvio-calendar
//!
//! Date arithmetic for the CF-convention calendars found in climate-model
//! output, and decoding of numeric time axes (`"days since ..."`) into
//! `(year, month, day)` labels.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["calendar attribute"] -->|"Calendar::parse()"| B["Calendar"]
//!     C["units attribute"] -->|"TimeUnits::parse()"| D["TimeUnits"]
//!     D -->|".decode_all(offsets)"| E["Vec of CfDate"]
//!     E -->|".year() / .month()"| F["scheduler labels"]
//!     G["CfDate"] -->|"daily_sequence()"| E
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use pluvio_calendar::{Calendar, CfDate, TimeUnits, daily_sequence};
//!
//! let cal = Calendar::parse("noleap").unwrap();
//! let units = TimeUnits::parse("days since 2000-01-01", cal).unwrap();
//! let dates = units.decode_all(&[0.0, 59.0], cal).unwrap(); // Jan 1, Mar 1
//!
//! let start = CfDate::new(2000, 1, 1, Calendar::Day360).unwrap();
//! let year = daily_sequence(start, 360, Calendar::Day360);
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `calendar` | Calendar kinds and month-length tables |
//! | `date` | Calendar-aware date |
//! | `units` | CF time-unit parsing and offset decoding |
//! | `sequence` | Daily date sequence generation |
//! | `error` | Error types |

mod calendar;
mod date;
mod error;
mod sequence;
mod units;

pub use calendar::Calendar;
pub use date::CfDate;
pub use error::CalendarError;
pub use sequence::daily_sequence;
pub use units::{TimeUnit, TimeUnits};
