// Output sinks: the enriched-event snapshot and the zero-traffic id list

pub mod id_list;
pub mod snapshot;

pub use id_list::write_id_list;
pub use snapshot::{read_snapshot, write_snapshot};
