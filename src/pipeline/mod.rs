// Pipelines — the end-to-end runs behind the `cluster` and `optimize`
// commands.

pub mod batch;
pub mod optimize;
