/*!
 * Alert decisions for incoming posts.
 *
 * - `gate`: mention classification and staleness/replay suppression
 * - `alerts`: click, per-title and cooldown limits at raise time
 */

pub use self::alerts::AlertGate;
pub use self::gate::{MentionKind, NotificationDecision, NotificationGate};

pub mod alerts;
pub mod gate;
