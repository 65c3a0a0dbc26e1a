/*!
 * Realtime event stream ingestion.
 *
 * - `connection`: reconnecting websocket client and frame filter
 * - `protocol`: envelope and post wire types
 * - `watch_set`: hot-swappable set of watched channels
 */

pub use self::connection::{ConnectionManager, ConnectionSnapshot, ConnectionState, PostHandler};
pub use self::protocol::IncomingPost;
pub use self::watch_set::WatchSet;

pub mod connection;
pub mod protocol;
pub mod watch_set;
