//! Application services
//!
//! One service per use-case cluster, all borrowing the shared
//! [`ServiceContext`]. Transitions guard first, mutate through conditional
//! repository writes second, and publish realtime events last; event
//! publishing is best-effort and never fails the operation.

mod appointment;
mod context;
mod conversation;
mod error;
mod message;
mod payment;
mod presence;
mod quote;
mod read;
mod timeline;

pub use appointment::AppointmentService;
pub use context::{EngineSettings, ServiceContext, ServiceContextBuilder};
pub use conversation::{ConversationService, ConversationSummary};
pub use error::{ServiceError, ServiceResult};
pub use message::MessageService;
pub use payment::{PaymentCoordinator, PaymentInitiation, PaymentWatch};
pub use presence::PresenceService;
pub use quote::QuoteService;
pub use read::ReadTracker;
pub use timeline::{merge_timeline, TimelineEntry, TimelineItem, TimelineService};
